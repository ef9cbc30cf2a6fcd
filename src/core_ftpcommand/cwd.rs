use std::io;

use log::debug;

use crate::core_ftpcommand::run_mutation_worker;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles CWD: the target must be a directory under the root that the
/// recorded uid may enter. The check runs in a worker the session blocks
/// on, like every other filesystem-touching command.
pub async fn handle_cwd_command(
    writer: &SharedWriter,
    session: &mut Session,
    arg: String,
) -> io::Result<()> {
    if arg.is_empty() {
        return send_reply(writer, 501, "Path should be specified.").await;
    }
    let target = session.resolve_path(&arg);
    let guard = session.guard.clone();
    let uid = session.uid;
    let Some(outcome) = run_mutation_worker(move || guard.folder_access(&target, uid)).await
    else {
        return send_reply(writer, 421, "Internal error.").await;
    };
    match outcome {
        Some(canonical) => {
            session.set_current_dir(&canonical);
            debug!("Current directory is now {:?}", session.current_dir);
            send_reply(writer, 250, "OK.").await
        }
        None => send_reply(writer, 550, "No access.").await,
    }
}
