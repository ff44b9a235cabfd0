use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::Deserialize;
use std::path::PathBuf;

/// Configuration for melodex.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (MELODEX_* prefix)
/// 3. Config file (~/.config/melodex/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Source weight table used for scoring.
    ///
    /// Can be set via:
    /// - CLI: --weights /path/to/weights.toml
    /// - ENV: MELODEX_WEIGHTS_PATH
    /// - Config: weights_path = "/path/to/weights.toml"
    /// - Default: ~/.config/melodex/weights.toml when present, else built-in weights
    #[serde(default)]
    pub weights_path: Option<PathBuf>,

    /// Maximum number of ranked tracks to print.
    #[serde(default)]
    pub limit: Option<usize>,

    /// Logger options.
    #[serde(default)]
    pub logging: twyg::Opts,
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("melodex");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// The weight table to use: the configured path, else the default file if
    /// it has been created.
    pub fn effective_weights_path(&self) -> Option<PathBuf> {
        self.weights_path.clone().or_else(|| {
            let default = default_weights_path();
            default.exists().then_some(default)
        })
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("melodex")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/melodex/config.toml
/// - macOS: ~/Library/Application Support/melodex/config.toml
/// - Windows: %APPDATA%\melodex\config.toml
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the default source weight table path, next to the config file.
pub fn default_weights_path() -> PathBuf {
    config_dir().join("weights.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Melodex Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (MELODEX_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Source weight table used for scoring
#
# Create the default table with: melodex weights init
#
# Can also be set via:
# - CLI: melodex rank --weights /custom/weights.toml
# - Environment: MELODEX_WEIGHTS_PATH=/custom/weights.toml
#
# Default: weights.toml next to this file, or the built-in table
#weights_path = "/path/to/weights.toml"

# Maximum number of ranked tracks to print
#limit = 50

# Logging
#[logging]
#level = "info"
#coloured = true
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
