use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tollgate_auth::AuthConfig;

/// Server configuration: listener, logging and the auth settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Validates the server and auth sections.
    ///
    /// # Errors
    /// Returns `LoadError::Invalid` or `LoadError::Auth` describing the first
    /// problem found.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.server.port == 0 {
            return Err(LoadError::Invalid("server.port must be > 0".into()));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(LoadError::Invalid("server.body_limit_bytes must be > 0".into()));
        }
        self.auth.validate()?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Errors raised while loading the server configuration.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("config build error: {0}")]
    Build(#[from] config::ConfigError),

    #[error("invalid server configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Auth(#[from] tollgate_auth::ConfigError),
}

pub mod loader {
    use super::*;
    use config::{Config, Environment, File};

    /// Default configuration file, relative to the working directory.
    pub const DEFAULT_CONFIG_PATH: &str = "tollgate.toml";

    /// Loads configuration from `path` (or `tollgate.toml`) overlaid with
    /// `TOLLGATE__`-prefixed environment variables.
    ///
    /// A missing file is not an error; defaults and the environment apply.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, LoadError> {
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));

        let mut builder = Config::builder();
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., TOLLGATE__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("TOLLGATE")
                .try_parsing(true)
                .separator("__"),
        );

        let merged: AppConfig = builder.build()?.try_deserialize()?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::loader::load_config;
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    const VALID: &str = r#"
[server]
host = "127.0.0.1"
port = 9090

[logging]
level = "debug"

[auth]
issuer = "https://auth.example.com"
access_token_lifetime = "15m"
clock_skew = "30s"

[auth.signing]
algorithm = "HS256"
secret = "0123456789abcdef0123456789abcdef"

[[auth.clients]]
client_id = "client123"
secret = "secret456"
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(VALID);
        let cfg = load_config(file.path().to_str()).unwrap();

        assert_eq!(cfg.addr().to_string(), "127.0.0.1:9090");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.auth.issuer, "https://auth.example.com");
        assert_eq!(cfg.auth.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(cfg.auth.clock_skew, Duration::from_secs(30));
        assert_eq!(cfg.auth.clients.len(), 1);
        assert_eq!(cfg.auth.clients[0].client_id, "client123");
    }

    #[test]
    fn test_invalid_auth_rejected() {
        let file = write_config(&VALID.replace("0123456789abcdef0123456789abcdef", "short"));
        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(matches!(err, LoadError::Auth(_)));
    }

    #[test]
    fn test_zero_port_rejected() {
        let file = write_config(&VALID.replace("port = 9090", "port = 0"));
        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("[server\nport = ");
        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(matches!(err, LoadError::Build(_)));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let file = write_config(VALID);
        let cfg = load_config(file.path().to_str()).unwrap();

        let rendered = toml::to_string(&cfg).unwrap();
        let reparsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed.server.port, 9090);
        assert_eq!(reparsed.auth.access_token_lifetime, Duration::from_secs(900));
    }
}
