use std::io;
use std::net::Ipv4Addr;

use log::{debug, info};
use tokio::net::TcpListener;

use crate::constants::PASV_PORTS;
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles the PASV command: binds a listener on the configured host at the
/// first free port of the passive pool and advertises it in 6-tuple form.
pub async fn handle_pasv_command(
    writer: &SharedWriter,
    bind_host: Ipv4Addr,
    session: &mut Session,
    arg: String,
) -> io::Result<()> {
    if !arg.is_empty() {
        return send_reply(writer, 501, "Arguments not expected.").await;
    }
    if session.data.is_running() {
        return send_reply(writer, 500, "Already running other transfer.").await;
    }
    session.data.clear();

    let Some(listener) = bind_in_pool(bind_host).await else {
        return send_reply(writer, 500, "Internal error.").await;
    };
    let port = listener.local_addr()?.port();
    if !session.data.set_passive(listener) {
        return send_reply(writer, 500, "Internal error.").await;
    }
    info!("Passive listener bound on {}:{}", bind_host, port);

    let o = bind_host.octets();
    let text = format!(
        "Passive mode ({},{},{},{},{},{})",
        o[0],
        o[1],
        o[2],
        o[3],
        port >> 8,
        port & 0xFF
    );
    send_reply(writer, 227, &text).await
}

async fn bind_in_pool(host: Ipv4Addr) -> Option<TcpListener> {
    for port in PASV_PORTS {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Some(listener),
            Err(e) => debug!("Passive port {} unavailable: {}", port, e),
        }
    }
    None
}
