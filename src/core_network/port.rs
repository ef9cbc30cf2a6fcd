use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};

use log::info;

use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Parses the strict `h1,h2,h3,h4,p1,p2` PORT argument. Each field is a bare
/// decimal 0-255; anything else (signs, spaces, missing or extra fields) is
/// rejected.
pub fn parse_port_argument(arg: &str) -> Option<SocketAddrV4> {
    let mut fields = [0u8; 6];
    let mut count = 0;
    for part in arg.split(',') {
        if count == 6 || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        fields[count] = part.parse().ok()?;
        count += 1;
    }
    if count != 6 {
        return None;
    }
    let ip = Ipv4Addr::new(fields[0], fields[1], fields[2], fields[3]);
    let port = ((fields[4] as u16) << 8) | fields[5] as u16;
    Some(SocketAddrV4::new(ip, port))
}

/// Handles the PORT (active mode) command: records the endpoint the client
/// announced. The actual dial happens when a transfer starts.
pub async fn handle_port_command(
    writer: &SharedWriter,
    session: &mut Session,
    arg: String,
) -> io::Result<()> {
    if session.data.is_running() {
        return send_reply(writer, 500, "Already running other transfer.").await;
    }
    session.data.clear();
    let Some(addr) = parse_port_argument(&arg) else {
        return send_reply(writer, 501, "Bad format.").await;
    };
    if !session.data.set_active(addr) {
        return send_reply(writer, 500, "Internal error.").await;
    }
    info!("Active data endpoint set to {}", addr);
    send_reply(writer, 200, "Success.").await
}
