use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::PathBuf;

use log::info;

use crate::core_ftpcommand::run_mutation_worker;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles MKD. The existence check, access check, and mkdir all run in a
/// worker under the recorded uid. Directories are created with mode 0700 so
/// the creating user can traverse them.
pub async fn handle_mkd_command(
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
        if target.exists() {
            return Err("Path already exists.");
        }
        let resolved = guard.create_access(&target, uid).ok_or("No access.")?;
        let mut builder = std::fs::DirBuilder::new();
        builder.mode(0o700);
        builder.create(&resolved).map_err(|e| {
            log::warn!("mkdir {:?} failed: {}", resolved, e);
            "No access."
        })?;
        Ok(resolved)
    };
    let Some(outcome) = run_mutation_worker(worker).await else {
        return send_reply(writer, 421, "Internal error.").await;
    };
    match outcome {
        Ok(resolved) => {
            info!("Created directory {:?}", resolved);
            send_reply(writer, 257, "OK.").await
        }
        Err(text) => send_reply(writer, 550, text).await,
    }
}
