use std::io;

use crate::replies::{send_reply, SharedWriter};

pub async fn handle_noop_command(writer: &SharedWriter, arg: String) -> io::Result<()> {
    if !arg.is_empty() {
        return send_reply(writer, 500, "Syntax error. Extra data found.").await;
    }
    send_reply(writer, 200, "OK.").await
}
