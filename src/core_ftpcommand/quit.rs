use std::io;

use crate::replies::{send_reply, SharedWriter};

/// Handles QUIT. Returns `true` when the session should close.
pub async fn handle_quit_command(writer: &SharedWriter, arg: String) -> io::Result<bool> {
    if !arg.is_empty() {
        send_reply(writer, 500, "Syntax error. Extra data found.").await?;
        return Ok(false);
    }
    send_reply(writer, 221, "Bye").await?;
    Ok(true)
}
