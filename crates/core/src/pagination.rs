//! Limit helpers for list endpoints.

/// Default number of rows returned by list endpoints.
pub const DEFAULT_LIMIT: i64 = 20;

/// Upper bound on rows returned by list endpoints.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a user-provided limit into `1..=max`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}
