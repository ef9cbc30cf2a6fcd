use std::env;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {0} has an invalid value: {1}")]
    Invalid(&'static str, String),
    #[error("root directory {0} is not accessible: {1}")]
    BadRoot(String, std::io::Error),
}

#[derive(Debug, Clone)]
pub enum AuthConfig {
    Disabled,
    Enabled { users_file: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical absolute path all sessions are confined to.
    pub root_dir: PathBuf,
    pub bind_host: Ipv4Addr,
    pub bind_port: u16,
    pub auth: AuthConfig,
}

impl Config {
    /// Reads the server configuration from the environment:
    /// `ROOT_DIRECTORY`, `BIND_HOST`, `BIND_PORT`, and optionally
    /// `USERS_FILE` / `AUTH_DISABLED`. The root is canonicalized once here;
    /// everything downstream relies on it being absolute and symlink-free.
    pub fn from_env() -> Result<Self, ConfigError> {
        let root = required("ROOT_DIRECTORY")?;
        let root_dir = PathBuf::from(&root)
            .canonicalize()
            .map_err(|e| ConfigError::BadRoot(root, e))?;

        let host = required("BIND_HOST")?;
        let bind_host: Ipv4Addr = host
            .parse()
            .map_err(|_| ConfigError::Invalid("BIND_HOST", host))?;

        let port = required("BIND_PORT")?;
        let bind_port: u16 = port
            .parse()
            .map_err(|_| ConfigError::Invalid("BIND_PORT", port))?;

        let auth = if env::var("AUTH_DISABLED").ok().as_deref() == Some("1") {
            AuthConfig::Disabled
        } else {
            AuthConfig::Enabled {
                users_file: PathBuf::from(required("USERS_FILE")?),
            }
        };

        Ok(Config {
            root_dir,
            bind_host,
            bind_port,
            auth,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}
