use std::io;

use log::info;

use crate::core_ftpcommand::check_data_connect;
use crate::core_network::data::TransferJob;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles RETR: streams a readable file under the root to the client.
pub async fn handle_retr_command(
    writer: &SharedWriter,
    session: &mut Session,
    arg: String,
) -> io::Result<()> {
    if !check_data_connect(writer, session).await? {
        return Ok(());
    }
    if arg.is_empty() {
        return send_reply(writer, 501, "Path should be specified.").await;
    }
    let target = session.resolve_path(&arg);
    let Some(canonical) = session.guard.read_access(&target, session.uid) else {
        return send_reply(writer, 550, "No access.").await;
    };
    info!("Sending file {:?}", canonical);
    send_reply(writer, 150, "Successfully started.").await?;
    session.data.start(
        writer.clone(),
        session.mode,
        session.guard.clone(),
        TransferJob::SendFile { path: canonical },
    );
    Ok(())
}
