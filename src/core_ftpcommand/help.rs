use std::io;

use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::replies::{send_multiline, SharedWriter};
use crate::session::Session;

const VERBS_PER_LINE: usize = 6;

/// Handles HELP: one 214 block listing the verbs registered in the current
/// authentication phase.
pub async fn handle_help_command(writer: &SharedWriter, session: &Session) -> io::Result<()> {
    let mut lines = vec!["You can use following queries:".to_string()];
    for chunk in FtpCommand::registered_verbs(session.phase).chunks(VERBS_PER_LINE) {
        lines.push(chunk.join(" "));
    }
    send_multiline(writer, 214, &lines, "Have a nice day.").await
}
