use std::io;

use crate::core_ftpcommand::check_data_connect;
use crate::core_network::data::TransferJob;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles SLEEP, a diagnostic transfer that holds the data connection open
/// for a while and sends nothing.
pub async fn handle_sleep_command(writer: &SharedWriter, session: &mut Session) -> io::Result<()> {
    if !check_data_connect(writer, session).await? {
        return Ok(());
    }
    send_reply(writer, 150, "Successfully started.").await?;
    session.data.start(
        writer.clone(),
        session.mode,
        session.guard.clone(),
        TransferJob::Sleep,
    );
    Ok(())
}
