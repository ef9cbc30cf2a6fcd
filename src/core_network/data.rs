//! Data-connection broker: tracks the per-session data-channel endpoint and
//! runs each transfer in a dedicated worker task. The worker opens the
//! socket (dial for active mode, accept for passive), applies the session's
//! codec, and writes its own terminal reply on the control channel.

use std::io;
use std::net::SocketAddrV4;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use log::warn;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::constants::{DATA_TIMEOUT, SLEEP_TRANSFER_SECS, TRANSFER_BUF_SIZE};
use crate::core_access::AccessGuard;
use crate::core_streams::{DataReader, DataWriter, ModeType};
use crate::replies::{send_reply, SharedWriter};

/// One transfer's worth of work, built fresh per command invocation.
pub enum TransferJob {
    /// Streams the output of a shell listing command.
    SendListing { command: String },
    SendFile { path: PathBuf },
    ReceiveFile { path: PathBuf, append: bool },
    /// Diagnostic no-op transfer: hold the data connection open, then finish.
    Sleep,
}

enum DataConnState {
    None,
    ReadyActive(SocketAddrV4),
    ReadyPassive(TcpListener),
    Running(JoinHandle<()>),
}

enum Endpoint {
    Active(SocketAddrV4),
    Passive(TcpListener),
}

pub enum AbortOutcome {
    /// Nothing to abort: no endpoint was set up, or the worker had already
    /// finished.
    NoConnection,
    /// A Ready endpoint was discarded before any transfer started.
    ClearedReady,
    /// A running worker was terminated and reaped.
    KilledRunning,
}

pub struct DataConnection {
    state: DataConnState,
    uid: Option<u32>,
}

impl DataConnection {
    pub fn new() -> Self {
        Self {
            state: DataConnState::None,
            uid: None,
        }
    }

    pub fn set_uid(&mut self, uid: Option<u32>) {
        self.uid = uid;
    }

    pub fn is_ready(&self) -> bool {
        matches!(
            self.state,
            DataConnState::ReadyActive(_) | DataConnState::ReadyPassive(_)
        )
    }

    /// Whether a worker is still executing a transfer.
    pub fn is_running(&self) -> bool {
        match &self.state {
            DataConnState::Running(handle) => !handle.is_finished(),
            _ => false,
        }
    }

    /// Discards any Ready endpoint or reaped worker. Fails while a worker is
    /// still running.
    pub fn clear(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = DataConnState::None;
        true
    }

    /// Records the peer endpoint announced by PORT. Only valid from the
    /// cleared state.
    pub fn set_active(&mut self, addr: SocketAddrV4) -> bool {
        if !matches!(self.state, DataConnState::None) {
            return false;
        }
        self.state = DataConnState::ReadyActive(addr);
        true
    }

    /// Stores the listener bound for PASV. Only valid from the cleared state.
    pub fn set_passive(&mut self, listener: TcpListener) -> bool {
        if !matches!(self.state, DataConnState::None) {
            return false;
        }
        self.state = DataConnState::ReadyPassive(listener);
        true
    }

    /// Terminates whatever the data connection is doing. The state is None
    /// afterwards, so a following PORT or PASV succeeds.
    pub async fn abort(&mut self) -> AbortOutcome {
        match std::mem::replace(&mut self.state, DataConnState::None) {
            DataConnState::None => AbortOutcome::NoConnection,
            DataConnState::Running(handle) => {
                if handle.is_finished() {
                    AbortOutcome::NoConnection
                } else {
                    handle.abort();
                    let _ = handle.await;
                    AbortOutcome::KilledRunning
                }
            }
            _ready => AbortOutcome::ClearedReady,
        }
    }

    /// Spawns the transfer worker, consuming the Ready endpoint (the
    /// listener moves into the worker, so the broker never double-accepts).
    /// The caller has already emitted the 150 opener; the worker emits the
    /// terminal reply itself.
    pub fn start(
        &mut self,
        writer: SharedWriter,
        mode: ModeType,
        guard: AccessGuard,
        job: TransferJob,
    ) {
        let endpoint = match std::mem::replace(&mut self.state, DataConnState::None) {
            DataConnState::ReadyActive(addr) => Endpoint::Active(addr),
            DataConnState::ReadyPassive(listener) => Endpoint::Passive(listener),
            other => {
                debug_assert!(false, "transfer started without a ready endpoint");
                self.state = other;
                return;
            }
        };
        let uid = self.uid;
        let handle = tokio::spawn(run_worker(writer, endpoint, mode, guard, uid, job));
        self.state = DataConnState::Running(handle);
    }
}

impl Drop for DataConnection {
    fn drop(&mut self) {
        // Closing the control connection implicitly aborts a running worker.
        if let DataConnState::Running(handle) = &self.state {
            handle.abort();
        }
    }
}

async fn run_worker(
    writer: SharedWriter,
    endpoint: Endpoint,
    mode: ModeType,
    guard: AccessGuard,
    uid: Option<u32>,
    job: TransferJob,
) {
    // The session checked access already; check once more in the worker so a
    // file swapped underneath the transfer is still caught under the
    // recorded uid.
    let allowed = match &job {
        TransferJob::SendFile { path } => guard.read_access(path, uid).is_some(),
        TransferJob::ReceiveFile { path, .. } => guard.write_access(path, uid).is_some(),
        _ => true,
    };
    if !allowed {
        let _ = send_reply(&writer, 451, "Internal error.").await;
        return;
    }
    let socket = match open_data_socket(endpoint).await {
        Ok(socket) => socket,
        Err(e) => {
            warn!("Failed to open data connection: {}", e);
            let _ = send_reply(&writer, 425, "Can not open data connection.").await;
            return;
        }
    };
    match run_job(socket, mode, job).await {
        Ok(()) => {
            let _ = send_reply(&writer, 226, "Success.").await;
        }
        Err(e) => {
            warn!("Transfer failed: {}", e);
            let _ = send_reply(
                &writer,
                451,
                "Requested action aborted. Local error in processing.",
            )
            .await;
        }
    }
}

async fn open_data_socket(endpoint: Endpoint) -> io::Result<TcpStream> {
    let deadline =
        || io::Error::new(io::ErrorKind::TimedOut, "data connection deadline elapsed");
    match endpoint {
        Endpoint::Active(addr) => timeout(DATA_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| deadline())?,
        Endpoint::Passive(listener) => {
            let (socket, _peer) = timeout(DATA_TIMEOUT, listener.accept())
                .await
                .map_err(|_| deadline())??;
            Ok(socket)
        }
    }
}

async fn run_job(socket: TcpStream, mode: ModeType, job: TransferJob) -> io::Result<()> {
    match job {
        TransferJob::SendFile { path } => {
            let mut file = tokio::fs::File::open(&path).await?;
            let mut writer = DataWriter::new(mode, socket);
            let mut buf = vec![0u8; TRANSFER_BUF_SIZE];
            loop {
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                writer.write_all(&buf[..n]).await?;
            }
            writer.finish().await
        }
        TransferJob::SendListing { command } => {
            let mut child = tokio::process::Command::new("sh")
                .arg("-c")
                .arg(&command)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .spawn()?;
            let mut stdout = child
                .stdout
                .take()
                .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "listing has no stdout"))?;
            let mut writer = DataWriter::new(mode, socket);
            let mut buf = vec![0u8; TRANSFER_BUF_SIZE];
            loop {
                let n = stdout.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                writer.write_all(&buf[..n]).await?;
            }
            writer.finish().await?;
            child.wait().await?;
            Ok(())
        }
        TransferJob::ReceiveFile { path, append } => {
            let mut options = tokio::fs::OpenOptions::new();
            options.write(true).create(true);
            if append {
                options.append(true);
            } else {
                options.truncate(true);
            }
            let mut file = options.open(&path).await?;
            let mut reader = DataReader::new(mode, socket);
            let mut buf = vec![0u8; TRANSFER_BUF_SIZE];
            loop {
                let n = reader.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                file.write_all(&buf[..n]).await?;
            }
            file.flush().await
        }
        TransferJob::Sleep => {
            let writer = DataWriter::new(mode, socket);
            tokio::time::sleep(Duration::from_secs(SLEEP_TRANSFER_SECS)).await;
            writer.finish().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn active_addr() -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::LOCALHOST, 10_000)
    }

    #[tokio::test]
    async fn setup_requires_a_cleared_state() {
        let mut conn = DataConnection::new();
        assert!(conn.set_active(active_addr()));
        assert!(!conn.set_active(active_addr()));
        assert!(conn.is_ready());

        assert!(conn.clear());
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        assert!(conn.set_passive(listener));
        assert!(conn.is_ready());
    }

    #[tokio::test]
    async fn abort_reports_what_it_found() {
        let mut conn = DataConnection::new();
        assert!(matches!(conn.abort().await, AbortOutcome::NoConnection));

        conn.set_active(active_addr());
        assert!(matches!(conn.abort().await, AbortOutcome::ClearedReady));
        assert!(!conn.is_ready());

        // After an abort the state is cleared, so new setup succeeds.
        assert!(conn.set_active(active_addr()));
    }
}
