/// Errors from a text-generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    #[error("Generation API returned empty content")]
    EmptyContent,

    #[error("No API key configured for the generation provider")]
    MissingApiKey,

    /// The response body did not have the expected shape.
    #[error("Malformed generation response: {0}")]
    Decode(String),
}
