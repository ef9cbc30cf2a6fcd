use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::constants::CONTROL_TIMEOUT;
use crate::core_access::AccessGuard;
use crate::core_ftpcommand::handlers::{self, ControlFlow};
use crate::replies::{send_reply, SharedWriter};
use crate::server::ServerContext;
use crate::session::Session;

pub async fn start_server(ctx: Arc<ServerContext>) -> Result<()> {
    let listener = bind(&ctx).await?;
    serve(listener, ctx).await
}

pub async fn bind(ctx: &ServerContext) -> Result<TcpListener> {
    let listener = TcpListener::bind((ctx.config.bind_host, ctx.config.bind_port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                ctx.config.bind_host, ctx.config.bind_port
            )
        })?;
    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

pub async fn serve(listener: TcpListener, ctx: Arc<ServerContext>) -> Result<()> {
    loop {
        let (socket, addr) = listener.accept().await?;
        info!("New control connection from {}", addr);
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, ctx).await {
                warn!("Session from {} ended with error: {}", addr, e);
            }
            info!("Connection closed for {}", addr);
        });
    }
}

/// Drives one control connection: greeting, then the command loop until
/// QUIT, EOF, or a control timeout. Dropping the session on the way out
/// aborts any transfer worker that is still running.
pub async fn handle_connection(socket: TcpStream, ctx: Arc<ServerContext>) -> io::Result<()> {
    let (read_half, write_half) = socket.into_split();
    let writer: SharedWriter = Arc::new(Mutex::new(write_half));
    let mut reader = BufReader::new(read_half);
    let mut session = Session::new(AccessGuard::new(ctx.config.root_dir.clone()));

    send_reply(&writer, 220, "Service ready.").await?;

    let mut raw = Vec::new();
    loop {
        raw.clear();
        let n = match timeout(CONTROL_TIMEOUT, reader.read_until(b'\n', &mut raw)).await {
            Ok(result) => result?,
            Err(_) => {
                let _ = send_reply(&writer, 421, "Timeout.").await;
                break;
            }
        };
        if n == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&raw);
        let Some((verb, arg)) = parse_command_line(&line) else {
            send_reply(&writer, 500, "Bad command format.").await?;
            continue;
        };
        if verb.is_empty() {
            continue;
        }
        match handlers::dispatch(&writer, &ctx, &mut session, &verb, arg).await? {
            ControlFlow::Continue => {}
            ControlFlow::Quit => break,
        }
    }
    Ok(())
}

/// Splits a raw control line into an uppercased verb and its argument. The
/// separator must be exactly one space; a verb token carrying any other
/// whitespace is malformed.
fn parse_command_line(line: &str) -> Option<(String, String)> {
    let line = line
        .strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line);
    let (verb, arg) = match line.split_once(' ') {
        Some((verb, arg)) => (verb, arg),
        None => (line, ""),
    };
    if verb.chars().any(|c| c.is_ascii_whitespace()) {
        return None;
    }
    Some((verb.to_ascii_uppercase(), arg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, SocketAddr};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use crate::config::{AuthConfig, Config};
    use crate::core_auth::Authenticator;
    use crate::core_streams::{BlockReader, BlockWriter};

    #[test]
    fn command_lines_split_on_a_single_space() {
        assert_eq!(
            parse_command_line("mOde S\r\n"),
            Some(("MODE".into(), "S".into()))
        );
        assert_eq!(parse_command_line("NOOP\r\n"), Some(("NOOP".into(), String::new())));
        assert_eq!(
            parse_command_line("STOR a file.txt\r\n"),
            Some(("STOR".into(), "a file.txt".into()))
        );
        // Tab-separated remainder is a malformed command.
        assert_eq!(parse_command_line("NOOP\textra\r\n"), None);
    }

    struct TestServer {
        addr: SocketAddr,
        root: tempfile::TempDir,
        _task: tokio::task::JoinHandle<()>,
    }

    async fn start_test_server() -> TestServer {
        let root = tempfile::tempdir().unwrap();
        let config = Config {
            root_dir: root.path().canonicalize().unwrap(),
            bind_host: Ipv4Addr::LOCALHOST,
            bind_port: 0,
            auth: AuthConfig::Disabled,
        };
        let ctx = Arc::new(ServerContext {
            config,
            authenticator: Authenticator::disabled(),
        });
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let _ = serve(listener, ctx).await;
        });
        TestServer {
            addr,
            root,
            _task: task,
        }
    }

    struct Client {
        reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
        writer: tokio::net::tcp::OwnedWriteHalf,
    }

    impl Client {
        async fn connect(addr: SocketAddr) -> Client {
            let socket = TcpStream::connect(addr).await.unwrap();
            let (read_half, write_half) = socket.into_split();
            let mut client = Client {
                reader: BufReader::new(read_half),
                writer: write_half,
            };
            let greeting = client.read_reply().await;
            assert!(greeting.starts_with("220"), "greeting: {}", greeting);
            client
        }

        async fn read_line(&mut self) -> String {
            let mut line = String::new();
            self.reader.read_line(&mut line).await.unwrap();
            assert!(!line.is_empty(), "control connection closed unexpectedly");
            line
        }

        /// Reads one reply, following a multi-line block to its closing line.
        async fn read_reply(&mut self) -> String {
            let first = self.read_line().await;
            let mut reply = first.clone();
            if first.len() >= 4 && first.as_bytes()[3] == b'-' {
                let code = first[..3].to_string();
                loop {
                    let line = self.read_line().await;
                    reply.push_str(&line);
                    if line.starts_with(&code) && line.as_bytes().get(3) == Some(&b' ') {
                        break;
                    }
                }
            }
            reply
        }

        async fn cmd(&mut self, line: &str) -> String {
            self.writer
                .write_all(format!("{}\r\n", line).as_bytes())
                .await
                .unwrap();
            self.read_reply().await
        }

        async fn login(&mut self) {
            let reply = self.cmd("USER tester").await;
            assert!(reply.starts_with("230"), "login reply: {}", reply);
        }

        /// Binds a local listener and announces it with PORT.
        async fn announce_active(&mut self) -> TcpListener {
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
            let port = listener.local_addr().unwrap().port();
            let reply = self
                .cmd(&format!("PORT 127,0,0,1,{},{}", port >> 8, port & 0xFF))
                .await;
            assert!(reply.starts_with("200"), "PORT reply: {}", reply);
            listener
        }
    }

    #[tokio::test]
    async fn verbs_are_case_insensitive_and_gated_by_login() {
        let server = start_test_server().await;
        let mut client = Client::connect(server.addr).await;

        assert!(client.cmd("MODE S").await.starts_with("530"));
        client.login().await;
        assert!(client.cmd("mOdE s").await.starts_with("200"));
        assert!(client.cmd("NOSUCH").await.starts_with("502"));
        assert!(client.cmd("TYPE A").await.starts_with("200"));
        assert!(client.cmd("TYPE E").await.starts_with("504"));
        assert!(client.cmd("STRU F").await.starts_with("200"));
        assert!(client.cmd("STRU R").await.starts_with("504"));
        assert!(client.cmd("QUIT").await.starts_with("221"));
    }

    #[tokio::test]
    async fn active_mode_stores_then_retrieves_a_file() {
        let server = start_test_server().await;
        let mut client = Client::connect(server.addr).await;
        client.login().await;

        let listener = client.announce_active().await;
        assert!(client.cmd("STOR f.txt").await.starts_with("150"));
        let (mut data, _) = listener.accept().await.unwrap();
        data.write_all(b"abc").await.unwrap();
        drop(data);
        assert!(client.read_reply().await.starts_with("226"));
        assert_eq!(
            std::fs::read(server.root.path().join("f.txt")).unwrap(),
            b"abc"
        );

        let listener = client.announce_active().await;
        assert!(client.cmd("RETR f.txt").await.starts_with("150"));
        let (mut data, _) = listener.accept().await.unwrap();
        let mut payload = Vec::new();
        data.read_to_end(&mut payload).await.unwrap();
        assert_eq!(payload, b"abc");
        assert!(client.read_reply().await.starts_with("226"));
    }

    #[tokio::test]
    async fn passive_mode_advertises_a_usable_port() {
        let server = start_test_server().await;
        std::fs::write(server.root.path().join("p.txt"), b"passive payload").unwrap();
        let mut client = Client::connect(server.addr).await;
        client.login().await;

        let reply = client.cmd("PASV").await;
        assert!(reply.starts_with("227"), "PASV reply: {}", reply);
        let tuple = reply
            .split('(')
            .nth(1)
            .and_then(|t| t.split(')').next())
            .unwrap();
        let fields: Vec<u16> = tuple.split(',').map(|f| f.parse().unwrap()).collect();
        assert_eq!(&fields[..4], &[127, 0, 0, 1]);
        let port = (fields[4] << 8) + fields[5];

        assert!(client.cmd("RETR p.txt").await.starts_with("150"));
        let mut data = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.unwrap();
        let mut payload = Vec::new();
        data.read_to_end(&mut payload).await.unwrap();
        assert_eq!(payload, b"passive payload");
        assert!(client.read_reply().await.starts_with("226"));
    }

    #[tokio::test]
    async fn paths_are_confined_to_the_root() {
        let server = start_test_server().await;
        let outside = tempfile::NamedTempFile::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), server.root.path().join("escape")).unwrap();
        let mut client = Client::connect(server.addr).await;
        client.login().await;

        let _listener = client.announce_active().await;
        // Rewritten to <root>/etc/hostname, which does not exist.
        assert!(client.cmd("RETR /etc/hostname").await.starts_with("550"));
        assert!(client.cmd("RETR ../outside.txt").await.starts_with("550"));
        assert!(client.cmd("RETR escape").await.starts_with("550"));
        assert!(client.cmd("CWD ..").await.starts_with("550"));
    }

    #[tokio::test]
    async fn abort_clears_state_and_allows_new_setup() {
        let server = start_test_server().await;
        let mut client = Client::connect(server.addr).await;
        client.login().await;

        assert!(client.cmd("ABOR").await.starts_with("502"));
        let _listener = client.announce_active().await;
        assert!(client.cmd("ABOR").await.starts_with("225"));
        let _listener = client.announce_active().await;
    }

    #[tokio::test]
    async fn block_mode_transfers_roundtrip() {
        let server = start_test_server().await;
        let mut client = Client::connect(server.addr).await;
        client.login().await;
        assert!(client.cmd("MODE B").await.starts_with("200"));

        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 253) as u8).collect();
        let listener = client.announce_active().await;
        assert!(client.cmd("STOR blob.bin").await.starts_with("150"));
        let (data, _) = listener.accept().await.unwrap();
        let mut block_writer = BlockWriter::new(data);
        block_writer.write_all(&payload).await.unwrap();
        drop(block_writer.finish().await.unwrap());
        assert!(client.read_reply().await.starts_with("226"));
        assert_eq!(
            std::fs::read(server.root.path().join("blob.bin")).unwrap(),
            payload
        );

        let listener = client.announce_active().await;
        assert!(client.cmd("RETR blob.bin").await.starts_with("150"));
        let (data, _) = listener.accept().await.unwrap();
        let mut block_reader = BlockReader::new(data);
        let mut decoded = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = block_reader.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            decoded.extend_from_slice(&buf[..n]);
        }
        assert_eq!(decoded, payload);
        assert!(client.read_reply().await.starts_with("226"));
    }

    #[tokio::test]
    async fn directory_commands_manage_the_tree() {
        let server = start_test_server().await;
        let mut client = Client::connect(server.addr).await;
        client.login().await;

        assert!(client.cmd("MKD inbox").await.starts_with("257"));
        assert!(client.cmd("MKD inbox").await.starts_with("550"));
        assert!(client.cmd("CWD inbox").await.starts_with("250"));
        assert!(client.cmd("CWD nowhere").await.starts_with("550"));
        assert!(client.cmd("CDUP extra").await.starts_with("501"));
        assert!(client.cmd("CDUP").await.starts_with("200"));
        assert!(client.cmd("RMD inbox").await.starts_with("250"));
        assert!(client.cmd("DELE missing.txt").await.starts_with("550"));
    }

    #[tokio::test]
    async fn transfers_without_an_endpoint_get_a_single_425() {
        let server = start_test_server().await;
        let mut client = Client::connect(server.addr).await;
        client.login().await;

        let reply = client.cmd("RETR anything").await;
        assert!(reply.starts_with("425"), "reply: {}", reply);
        // The next command gets its own reply immediately: no stray 150.
        assert!(client.cmd("NOOP").await.starts_with("200"));
    }

    #[tokio::test]
    async fn help_listing_follows_the_registered_set() {
        let server = start_test_server().await;
        let mut client = Client::connect(server.addr).await;

        let before = client.cmd("HELP").await;
        assert!(before.starts_with("214-"), "help: {}", before);
        assert!(!before.contains("RETR"));
        client.login().await;
        let after = client.cmd("HELP").await;
        assert!(after.contains("RETR") && after.contains("SLEEP"));
    }

    #[tokio::test]
    async fn listings_come_over_the_data_channel() {
        let server = start_test_server().await;
        std::fs::write(server.root.path().join("seen.txt"), b"x").unwrap();
        let mut client = Client::connect(server.addr).await;
        client.login().await;

        let listener = client.announce_active().await;
        assert!(client.cmd("NLST").await.starts_with("150"));
        let (mut data, _) = listener.accept().await.unwrap();
        let mut listing = String::new();
        data.read_to_string(&mut listing).await.unwrap();
        assert!(listing.contains("seen.txt"), "listing: {}", listing);
        assert!(client.read_reply().await.starts_with("226"));

        // LIST of something that is not a folder.
        let _listener = client.announce_active().await;
        assert!(client.cmd("LIST seen.txt").await.starts_with("450"));
    }
}
