use std::io;

use log::info;

use crate::core_ftpcommand::check_data_connect;
use crate::core_network::data::TransferJob;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles STOR and APPE: receives the data channel into a file under the
/// root, truncating or appending.
pub async fn handle_stor_command(
    writer: &SharedWriter,
    session: &mut Session,
    arg: String,
    append: bool,
) -> io::Result<()> {
    if !check_data_connect(writer, session).await? {
        return Ok(());
    }
    if arg.is_empty() {
        return send_reply(writer, 501, "Path should be specified.").await;
    }
    let target = session.resolve_path(&arg);
    let Some(resolved) = session.guard.write_access(&target, session.uid) else {
        return send_reply(writer, 550, "No access.").await;
    };
    info!("Receiving file {:?} (append: {})", resolved, append);
    send_reply(writer, 150, "Successfully started.").await?;
    session.data.start(
        writer.clone(),
        session.mode,
        session.guard.clone(),
        TransferJob::ReceiveFile {
            path: resolved,
            append,
        },
    );
    Ok(())
}
