use std::io;

use log::debug;

use crate::core_streams::ModeType;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles MODE: selects the data-channel codec for following transfers.
pub async fn handle_mode_command(
    writer: &SharedWriter,
    session: &mut Session,
    arg: String,
) -> io::Result<()> {
    let mode = match arg.to_ascii_uppercase().as_str() {
        "S" => ModeType::Stream,
        "B" => ModeType::Block,
        "C" => ModeType::Compressed,
        _ => return send_reply(writer, 500, "Unknown mode.").await,
    };
    session.mode = mode;
    debug!("Transfer mode set to {:?}", mode);
    send_reply(writer, 200, "OK.").await
}
