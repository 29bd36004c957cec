use std::{env, path::PathBuf, time::Duration};

/// Where the scan log lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Firebase(FirebaseConfig),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub database_url: String,
    pub auth_token: Option<String>,
    pub logs_path: String,
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { var: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "{} must be set in .env file", var),
            ConfigError::Invalid { var, value } => {
                write!(f, "Invalid value for {}: {:?}", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration loaded from environment variables
///
/// Environment variables:
/// - `TROLLEY_STORE` (default: firebase) - `firebase` or `file`
/// - `FIREBASE_DATABASE_URL` (required for firebase)
/// - `FIREBASE_AUTH_TOKEN` (optional)
/// - `TROLLEY_LOGS_PATH` (default: rfidLogs)
/// - `TROLLEY_LOG_FILE` (default: rfid_logs.json) - used by the file store
/// - `TROLLEY_CATALOG_PATH` (optional, built-in catalog when unset)
/// - `REFRESH_INTERVAL_SECS` (default: 2, minimum 1)
/// - `STORE_TIMEOUT_SECS` (default: 10)
/// - `RUST_LOG` (optional)
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub catalog_path: Option<PathBuf>,
    pub refresh_interval: Duration,
    pub rust_log: Option<String>,
}

pub const DEFAULT_REFRESH_SECS: u64 = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOGS_PATH: &str = "rfidLogs";
pub const DEFAULT_LOG_FILE: &str = "rfid_logs.json";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let secs = |name: &str, default: u64| {
            var(name)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let store = match var("TROLLEY_STORE").as_deref().map(str::trim) {
            None | Some("firebase") => {
                let database_url =
                    var("FIREBASE_DATABASE_URL").ok_or(ConfigError::Missing("FIREBASE_DATABASE_URL"))?;
                if !database_url.starts_with("http://") && !database_url.starts_with("https://") {
                    return Err(ConfigError::Invalid {
                        var: "FIREBASE_DATABASE_URL",
                        value: database_url,
                    });
                }

                StoreBackend::Firebase(FirebaseConfig {
                    database_url,
                    auth_token: var("FIREBASE_AUTH_TOKEN"),
                    logs_path: var("TROLLEY_LOGS_PATH")
                        .unwrap_or_else(|| DEFAULT_LOGS_PATH.to_string()),
                    timeout: Duration::from_secs(secs("STORE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
                })
            }
            Some("file") => StoreBackend::File(PathBuf::from(
                var("TROLLEY_LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            )),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "TROLLEY_STORE",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            store,
            catalog_path: var("TROLLEY_CATALOG_PATH").map(PathBuf::from),
            refresh_interval: Duration::from_secs(
                secs("REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_SECS).max(1),
            ),
            rust_log: var("RUST_LOG"),
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::collections::HashMap};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_lookup(lookup(&[(
            "FIREBASE_DATABASE_URL",
            "https://trolley-demo.firebaseio.com",
        )]))
        .unwrap();

        assert_eq!(
            config.store,
            StoreBackend::Firebase(FirebaseConfig {
                database_url: "https://trolley-demo.firebaseio.com".to_string(),
                auth_token: None,
                logs_path: "rfidLogs".to_string(),
                timeout: Duration::from_secs(10),
            })
        );
        assert_eq!(config.catalog_path, None);
        assert_eq!(config.refresh_interval, Duration::from_secs(2));
        assert_eq!(config.rust_log, None);
    }

    #[test]
    fn test_file_store_config() {
        let config = Config::from_lookup(lookup(&[
            ("TROLLEY_STORE", "file"),
            ("TROLLEY_LOG_FILE", "/tmp/scans.json"),
            ("TROLLEY_CATALOG_PATH", "/etc/trolley/catalog.json"),
            ("REFRESH_INTERVAL_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.store, StoreBackend::File(PathBuf::from("/tmp/scans.json")));
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/trolley/catalog.json"))
        );
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_numbers_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("TROLLEY_STORE", "file"),
            ("REFRESH_INTERVAL_SECS", "soon"),
        ]))
        .unwrap();
        assert_eq!(config.refresh_interval, Duration::from_secs(2));

        let config = Config::from_lookup(lookup(&[
            ("TROLLEY_STORE", "file"),
            ("REFRESH_INTERVAL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.refresh_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_missing_and_invalid_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("FIREBASE_DATABASE_URL"))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("FIREBASE_DATABASE_URL", "trolley-demo")])),
            Err(ConfigError::Invalid { var: "FIREBASE_DATABASE_URL", .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("TROLLEY_STORE", "redis")])),
            Err(ConfigError::Invalid { var: "TROLLEY_STORE", .. })
        ));
    }
}
