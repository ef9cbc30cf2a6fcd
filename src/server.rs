use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::config::Config;
use crate::core_auth::Authenticator;
use crate::core_network::network;

/// State shared by every per-connection task.
pub struct ServerContext {
    pub config: Config,
    pub authenticator: Authenticator,
}

/// Runs the file-transfer server until the process is killed.
pub async fn run(ctx: ServerContext) -> Result<()> {
    info!(
        "Serving root {:?} on {}:{}",
        ctx.config.root_dir, ctx.config.bind_host, ctx.config.bind_port
    );
    network::start_server(Arc::new(ctx)).await
}
