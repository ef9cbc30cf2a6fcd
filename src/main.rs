mod config;
mod constants;
mod core_access;
mod core_auth;
mod core_ftpcommand;
mod core_network;
mod core_streams;
mod helpers;
mod replies;
mod server;
mod session;

use std::io::Write;

use anyhow::{Context, Result};
use env_logger::{Builder, Env};
use log::info;

use crate::config::{AuthConfig, Config};
use crate::core_auth::Authenticator;
use crate::server::ServerContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger with a custom format
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let config = Config::from_env().context("invalid server configuration")?;
    log_config(&config);

    let authenticator = match &config.auth {
        AuthConfig::Disabled => Authenticator::disabled(),
        AuthConfig::Enabled { users_file } => Authenticator::from_users_file(users_file)
            .with_context(|| format!("failed to load users file {:?}", users_file))?,
    };

    server::run(ServerContext {
        config,
        authenticator,
    })
    .await
}

fn log_config(config: &Config) {
    info!("  Root directory: {:?}", config.root_dir);
    info!("  Bind host: {}", config.bind_host);
    info!("  Bind port: {}", config.bind_port);
    match &config.auth {
        AuthConfig::Disabled => info!("  Authentication: disabled"),
        AuthConfig::Enabled { users_file } => {
            info!("  Authentication: users file {:?}", users_file)
        }
    }
}
