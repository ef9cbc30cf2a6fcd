use std::io;

use crate::replies::{send_reply, SharedWriter};

/// Handles STRU. Only the File structure is supported; Record and Page are
/// recognized but rejected.
pub async fn handle_stru_command(writer: &SharedWriter, arg: String) -> io::Result<()> {
    match arg.to_ascii_uppercase().as_str() {
        "F" => send_reply(writer, 200, "OK.").await,
        "R" | "P" => send_reply(writer, 504, "Not OK.").await,
        _ => send_reply(writer, 500, "Unknown structure.").await,
    }
}
