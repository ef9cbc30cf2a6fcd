use std::io;

use crate::core_ftpcommand::run_mutation_worker;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles CDUP: moves one directory up, still confined to the root. The
/// reachability check runs in a worker under the recorded uid.
pub async fn handle_cdup_command(
    writer: &SharedWriter,
    session: &mut Session,
    arg: String,
) -> io::Result<()> {
    if !arg.is_empty() {
        return send_reply(writer, 501, "Arguments not expected.").await;
    }
    let target = session.cwd_path().join("..");
    let guard = session.guard.clone();
    let uid = session.uid;
    let Some(outcome) = run_mutation_worker(move || guard.folder_access(&target, uid)).await
    else {
        return send_reply(writer, 421, "Internal error.").await;
    };
    match outcome {
        Some(canonical) => {
            session.set_current_dir(&canonical);
            send_reply(writer, 200, "OK.").await
        }
        None => send_reply(writer, 550, "No access.").await,
    }
}
