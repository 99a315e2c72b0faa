//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/liferec/config.toml)
//! 3. Environment variables (LIFEREC_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "LIFEREC";

/// Name of the database file inside the data directory
pub const DATABASE_FILE_NAME: &str = "life_records.json";

/// Data directory used in debug mode when none is configured
const DEBUG_DATA_DIR: &str = "./data";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the database file
    ///
    /// `None` means "use the platform default" (or `./data` in debug mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Debug mode: pretty-printed database and a local data directory
    #[serde(default)]
    pub debug: bool,

    /// Log file for the TUI (defaults to `{data_dir}/debug.log`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            debug: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (LIFEREC_DATA_DIR, LIFEREC_DEBUG, LIFEREC_LOG_FILE)
    /// 2. Config file (~/.config/liferec/config.toml or LIFEREC_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // LIFEREC_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // LIFEREC_DEBUG
        if let Ok(val) = std::env::var(format!("{}_DEBUG", ENV_PREFIX)) {
            self.debug = val.eq_ignore_ascii_case("true") || val == "1";
        }

        // LIFEREC_LOG_FILE
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with LIFEREC_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("liferec")
            .join("config.toml")
    }

    /// The effective data directory
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None if self.debug => PathBuf::from(DEBUG_DATA_DIR),
            None => default_data_dir(),
        }
    }

    /// Get the path to the default database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(DATABASE_FILE_NAME)
    }

    /// Get the path to the TUI log file
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("debug.log"))
    }

    /// Whether the database should be written pretty-printed
    pub fn pretty_json(&self) -> bool {
        self.debug
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("liferec")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &["LIFEREC_DATA_DIR", "LIFEREC_DEBUG", "LIFEREC_LOG_FILE"];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.debug);
        assert!(config.data_dir.is_none());
        assert!(config.data_dir().ends_with("liferec"));
        assert!(!config.pretty_json());
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            data_dir: Some(PathBuf::from("/data/liferec")),
            ..Config::default()
        };

        assert_eq!(
            config.database_path(),
            PathBuf::from("/data/liferec/life_records.json")
        );
        assert_eq!(config.log_path(), PathBuf::from("/data/liferec/debug.log"));
    }

    #[test]
    fn test_debug_uses_local_data_dir() {
        let config = Config {
            debug: true,
            ..Config::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("./data"));
        assert!(config.pretty_json());

        // An explicit directory wins over the debug default
        let config = Config {
            debug: true,
            data_dir: Some(PathBuf::from("/explicit")),
            log_file: None,
        };
        assert_eq!(config.data_dir(), PathBuf::from("/explicit"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("LIFEREC_DATA_DIR", "/tmp/liferec-test");
        config.apply_env_overrides();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/liferec-test")));

        // Empty string clears it
        env::set_var("LIFEREC_DATA_DIR", "");
        config.apply_env_overrides();
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_env_override_debug() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("LIFEREC_DEBUG", "true");
        config.apply_env_overrides();
        assert!(config.debug);

        env::set_var("LIFEREC_DEBUG", "1");
        config.debug = false;
        config.apply_env_overrides();
        assert!(config.debug);

        env::set_var("LIFEREC_DEBUG", "0");
        config.apply_env_overrides();
        assert!(!config.debug);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: Some(PathBuf::from("/data/liferec")),
            debug: true,
            log_file: Some(PathBuf::from("/tmp/liferec.log")),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("debug"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.debug, config.debug);
        assert_eq!(parsed.log_file, config.log_file);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            debug = true
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/custom/data")));
        assert!(config.debug);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(!config.debug);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("config.toml");

        let config = Config {
            data_dir: Some(temp_dir.path().join("data")),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let reloaded = Config::load_from_path(&path).unwrap();
        assert_eq!(reloaded.data_dir, config.data_dir);
    }
}
