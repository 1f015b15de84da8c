//! Configuration file loader for the `.app-builder/` directory.
//!
//! Settings come from three layers, later ones winning:
//! - built-in defaults ([`ClientConfig::default`])
//! - `.app-builder/config.toml` under the working root
//! - `APP_BUILDER_API_URL` / `APP_BUILDER_SOCKET_URL` environment variables

use crate::config::error::{ConfigError, ConfigResult};
use ab_protocol::ClientConfig;
use std::path::{Path, PathBuf};
use url::Url;

/// Directory holding configuration and logs, relative to the root.
pub const CONFIG_DIR: &str = ".app-builder";

pub const CONFIG_FILE: &str = "config.toml";

/// Overrides `server.api_base_url`.
pub const ENV_API_URL: &str = "APP_BUILDER_API_URL";

/// Overrides `server.socket_url`.
pub const ENV_SOCKET_URL: &str = "APP_BUILDER_SOCKET_URL";

/// Log filter directive (`tracing_subscriber::EnvFilter` syntax).
pub const ENV_LOG: &str = "APP_BUILDER_LOG";

pub fn config_dir(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR)
}

/// Directory the TUI writes its rolling log files to.
pub fn log_dir(root: &Path) -> PathBuf {
    config_dir(root).join("logs")
}

/// Loads the client configuration for `root`.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.app-builder/` folder
///
/// # Returns
///
/// The merged configuration. A missing directory or file yields defaults
/// (plus environment overrides) rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - `config.toml` exists but cannot be read
/// - `config.toml` has invalid TOML syntax or value types
/// - a resulting value is unusable (bad URL, zero capacity or attempts)
///
/// # Example
///
/// ```rust,no_run
/// use ab_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("API at {}", config.server.api_base_url);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<ClientConfig> {
    let mut config = load_file(root)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config, &config_dir(root).join(CONFIG_FILE).display().to_string())?;
    Ok(config)
}

/// Reads `config.toml`, falling back to defaults when it does not exist.
fn load_file(root: &Path) -> ConfigResult<ClientConfig> {
    let config_path = config_dir(root).join(CONFIG_FILE);

    if !config_path.exists() {
        return Ok(ClientConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Apply environment overrides. `lookup` resolves a variable name.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_API_URL) {
        config.server.api_base_url = url;
    }
    if let Some(url) = non_empty(ENV_SOCKET_URL) {
        config.server.socket_url = url;
    }
}

/// Reject values the client cannot work with.
pub fn validate(config: &ClientConfig, origin: &str) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::InvalidConfig {
        origin: origin.to_string(),
        reason,
    };

    for (key, value) in [
        ("server.api_base_url", &config.server.api_base_url),
        ("server.socket_url", &config.server.socket_url),
    ] {
        Url::parse(value).map_err(|e| invalid(format!("{key} = {value:?}: {e}")))?;
    }

    if config.log_capacity == 0 {
        return Err(invalid("log_capacity must be at least 1".to_string()));
    }
    if config.reconnection.attempts == 0 {
        return Err(invalid(
            "reconnection.attempts must be at least 1".to_string(),
        ));
    }
    if config.reconnection.delay_max_ms < config.reconnection.delay_ms {
        return Err(invalid(
            "reconnection.delay_max_ms must not be below reconnection.delay_ms".to_string(),
        ));
    }
    Ok(())
}
