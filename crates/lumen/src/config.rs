use lumen_platform::AppPaths;
use serde::{Deserialize, Serialize};

/// Updater configuration, read from `config.json` in the app config
/// directory. Missing or unreadable files fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name used when deriving installer filenames.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// GitHub repository the application publishes releases to.
    #[serde(default = "default_github_owner")]
    pub github_owner: String,

    #[serde(default = "default_github_repo")]
    pub github_repo: String,

    /// Version treated as currently installed when `--current` is not given.
    #[serde(default = "default_current_version")]
    pub current_version: String,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_app_name() -> String {
    "lumen".to_string()
}

fn default_github_owner() -> String {
    "lumen-app".to_string()
}

fn default_github_repo() -> String {
    "lumen".to_string()
}

fn default_current_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_http_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            github_owner: default_github_owner(),
            github_repo: default_github_repo(),
            current_version: default_current_version(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let Ok(paths) = AppPaths::new() else {
            return Self::default();
        };
        Self::load_from(&paths.config_file())
    }

    fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }
}
