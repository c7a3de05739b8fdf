//! API credential resolution
//!
//! The key is looked up in precedence order: the `--api-key` flag, the
//! first line of the `--api-key-file` file, then the `QUERY_API_KEY`
//! environment variable. Resolution happens before any request is issued.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::CliError;

/// Environment variable consulted when no flag or file is given.
pub const API_KEY_ENV: &str = "QUERY_API_KEY";

/// Resolve the API key from flag, key file, or environment.
pub fn resolve_api_key(
    api_key: Option<&str>,
    api_key_file: Option<&PathBuf>,
) -> Result<String, CliError> {
    if let Some(key) = api_key {
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::ConfigurationError(
                "--api-key must not be empty".to_string(),
            ));
        }
        debug!("Using API key from command line");
        return Ok(key.to_string());
    }

    if let Some(path) = api_key_file {
        debug!(path = %path.display(), "Reading API key file");
        return read_key_file(path);
    }

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            debug!("Using API key from {API_KEY_ENV}");
            return Ok(key);
        }
    }

    Err(CliError::ConfigurationError(format!(
        "No API key: pass --api-key, --api-key-file, or set {API_KEY_ENV}"
    )))
}

/// Read the key from the first line of a file.
fn read_key_file(path: &Path) -> Result<String, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CliError::ConfigurationError(format!(
            "Failed to read API key file {}: {e}",
            path.display()
        ))
    })?;

    let key = contents.lines().next().unwrap_or("").trim().to_string();
    if key.is_empty() {
        return Err(CliError::ConfigurationError(format!(
            "API key file {} is empty",
            path.display()
        )));
    }

    Ok(key)
}
