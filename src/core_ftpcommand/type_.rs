use std::io;

use crate::replies::{send_reply, SharedWriter};
use crate::session::{Session, TransferType};

/// Handles TYPE. Only ASCII non-print (`A` / `AN`) and 8-bit local bytes
/// (`L 8`) are supported; both transfer bytes verbatim.
pub async fn handle_type_command(
    writer: &SharedWriter,
    session: &mut Session,
    arg: String,
) -> io::Result<()> {
    let arg = arg.to_ascii_uppercase();
    let accepted = match arg.as_str() {
        "A" | "AN" => Some(TransferType::AsciiNonPrint),
        "L 8" => Some(TransferType::Local8),
        _ => None,
    };
    match accepted {
        Some(transfer_type) => {
            session.transfer_type = transfer_type;
            log::debug!("Transfer type set to {:?}", session.transfer_type);
            send_reply(writer, 200, "OK.").await
        }
        None => {
            let text = format!("Only 8bit ASCII non-print supported, not {}.", arg);
            send_reply(writer, 504, &text).await
        }
    }
}
