use std::env;

use tollgate_auth::password;
use tollgate_server::ServerBuilder;
use tollgate_server::config::loader::{DEFAULT_CONFIG_PATH, load_config};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From TOLLGATE_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (tollgate.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (TOLLGATE_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // .env is optional
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    if let Some(code) = run_utility_command() {
        std::process::exit(code);
    }

    tollgate_server::observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    tollgate_server::observability::apply_logging_level(&cfg.logging.level);

    let server = match ServerBuilder::new().with_config(cfg).build() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Server initialization failed: {e}");
            std::process::exit(2);
        }
    };

    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
        std::process::exit(1);
    }
}

/// Handles `hash-secret <secret>` and `generate-secret`.
///
/// Returns the exit code if a utility command ran.
fn run_utility_command() -> Option<i32> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("generate-secret") => {
            println!("{}", password::generate_client_secret());
            Some(0)
        }
        Some("hash-secret") => {
            let Some(secret) = args.next() else {
                eprintln!("Usage: tollgate hash-secret <secret>");
                return Some(2);
            };
            match password::hash_password(&secret) {
                Ok(hash) => {
                    println!("{hash}");
                    Some(0)
                }
                Err(e) => {
                    eprintln!("Failed to hash secret: {e}");
                    Some(1)
                }
            }
        }
        _ => None,
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: TOLLGATE_CONFIG
/// 3. Default: tollgate.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("TOLLGATE_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    (DEFAULT_CONFIG_PATH.to_string(), ConfigSource::Default)
}
