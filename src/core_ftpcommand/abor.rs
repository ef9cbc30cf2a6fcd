use std::io;

use log::info;

use crate::core_network::data::AbortOutcome;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles ABOR. Idempotent over the data-connection state: afterwards the
/// state is always cleared and a new PORT/PASV succeeds.
pub async fn handle_abor_command(
    writer: &SharedWriter,
    session: &mut Session,
    arg: String,
) -> io::Result<()> {
    if !arg.is_empty() {
        return send_reply(writer, 500, "Syntax error. Extra data found.").await;
    }
    match session.data.abort().await {
        AbortOutcome::NoConnection => send_reply(writer, 502, "No active data connection.").await,
        AbortOutcome::ClearedReady => send_reply(writer, 225, "Aborted successfully.").await,
        AbortOutcome::KilledRunning => {
            info!("Aborted a running transfer");
            send_reply(writer, 226, "Aborted successfully.").await
        }
    }
}
