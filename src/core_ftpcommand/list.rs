use std::io;

use log::info;

use crate::core_ftpcommand::check_data_connect;
use crate::core_network::data::TransferJob;
use crate::helpers::shell_quote;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles LIST and NLST. Listings come from the shell's `ls`, streamed over
/// the data channel through the session's codec.
pub async fn handle_list_command(
    writer: &SharedWriter,
    session: &mut Session,
    arg: String,
    names_only: bool,
) -> io::Result<()> {
    if !check_data_connect(writer, session).await? {
        return Ok(());
    }
    let target = if arg.is_empty() {
        session.cwd_path()
    } else {
        session.resolve_path(&arg)
    };
    let Some(canonical) = session.guard.folder_access(&target, session.uid) else {
        return send_reply(writer, 450, "No such folder.").await;
    };
    let command = if names_only {
        format!("ls -1 {}", shell_quote(&canonical))
    } else {
        // tail +2 drops the "total N" line.
        format!("ls -l {} | tail +2", shell_quote(&canonical))
    };
    info!("Listing {:?}", canonical);
    send_reply(writer, 150, "Successfully started.").await?;
    session.data.start(
        writer.clone(),
        session.mode,
        session.guard.clone(),
        TransferJob::SendListing { command },
    );
    Ok(())
}
