use std::io;
use std::path::PathBuf;

use log::info;

use crate::core_ftpcommand::run_mutation_worker;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles DELE: unlinks a writable regular file under the root. The access
/// check and unlink run in a worker under the recorded uid.
pub async fn handle_dele_command(
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
    let worker = move || -> Result<PathBuf, &'static str> {
        let canonical = guard.delete_access(&target, uid).ok_or("Incorrect path.")?;
        std::fs::remove_file(&canonical).map_err(|e| {
            log::warn!("unlink {:?} failed: {}", canonical, e);
            "No access."
        })?;
        Ok(canonical)
    };
    let Some(outcome) = run_mutation_worker(worker).await else {
        return send_reply(writer, 421, "Internal error.").await;
    };
    match outcome {
        Ok(canonical) => {
            info!("Deleted file {:?}", canonical);
            send_reply(writer, 250, "OK.").await
        }
        Err(text) => send_reply(writer, 550, text).await,
    }
}
