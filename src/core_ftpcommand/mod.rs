pub mod abor;
pub mod cdup;
pub mod cwd;
pub mod dele;
pub mod ftpcommand;
pub mod handlers;
pub mod help;
pub mod list;
pub mod mkd;
pub mod mode;
pub mod noop;
pub mod pass;
pub mod quit;
pub mod retr;
pub mod rmd;
pub mod sleep;
pub mod stor;
pub mod stru;
pub mod type_;
pub mod user;

use std::io;

use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Runs a filesystem mutation in its own worker; the session blocks on
/// completion before replying, so no other reply can interleave. The access
/// check re-runs inside the worker against the recorded uid. `None` means
/// the worker itself died.
pub(crate) async fn run_mutation_worker<T, F>(op: F) -> Option<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(op).await {
        Ok(result) => Some(result),
        Err(e) => {
            log::warn!("Mutation worker failed: {}", e);
            None
        }
    }
}

/// Pre-transfer gate shared by the data-bearing commands: there must be a
/// Ready endpoint and no worker still running. Failures reply with a single
/// 425 so the 150 opener is only ever sent for a transfer that actually
/// starts.
pub(crate) async fn check_data_connect(
    writer: &SharedWriter,
    session: &mut Session,
) -> io::Result<bool> {
    if session.data.is_running() {
        send_reply(writer, 425, "Data connection already in use.").await?;
        return Ok(false);
    }
    if !session.data.is_ready() {
        send_reply(writer, 425, "Open data connection firstly by PASV or PORT.").await?;
        return Ok(false);
    }
    Ok(true)
}
