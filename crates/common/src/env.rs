//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the database is touched.

use tracing::warn;

/// Load `.env` if present and report which well-known variables are missing.
///
/// Returns the names of the variables that were not set, so callers can decide
/// whether a config file is expected to supply them.
pub fn ensure_env(expected: &[&str]) -> Vec<String> {
    let _ = dotenvy::dotenv();
    let missing: Vec<String> = expected
        .iter()
        .filter(|name| std::env::var(name).map(|v| v.trim().is_empty()).unwrap_or(true))
        .map(|name| name.to_string())
        .collect();
    for name in &missing {
        warn!(variable = %name, "environment variable not set; relying on config.toml");
    }
    missing
}
