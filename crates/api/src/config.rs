use brandquiz_llm::LlmConfig;

/// Where sessions and ratings are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// In-process store; contents are lost on restart.
    Memory,
}

impl StorageBackend {
    pub fn from_str_env(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Some(Self::Postgres),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). Generation calls
    /// run inside the request, so this sits above the LLM timeout.
    pub request_timeout_secs: u64,
    pub storage: StorageBackend,
    /// Required when `storage` is Postgres.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub llm: LlmConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `120`                      |
    /// | `QUIZ_STORAGE`             | `postgres` (or `memory`)   |
    /// | `DATABASE_URL`             | unset                      |
    /// | `DATABASE_MAX_CONNECTIONS` | `20`                       |
    ///
    /// Generation settings are read by [`LlmConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let storage = std::env::var("QUIZ_STORAGE")
            .map(|raw| {
                StorageBackend::from_str_env(&raw)
                    .expect("QUIZ_STORAGE must be 'postgres' or 'memory'")
            })
            .unwrap_or(StorageBackend::Postgres);

        let database_url = std::env::var("DATABASE_URL").ok();

        let database_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            storage,
            database_url,
            database_max_connections,
            llm: LlmConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_backend_names() {
        assert_eq!(StorageBackend::from_str_env("Memory"), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::from_str_env("postgres"), Some(StorageBackend::Postgres));
        assert_eq!(StorageBackend::from_str_env("sqlite"), None);
    }
}
