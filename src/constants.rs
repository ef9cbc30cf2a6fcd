// src/constants.rs

use std::ops::RangeInclusive;
use std::time::Duration;

/// Receive/send deadline on the control channel.
pub const CONTROL_TIMEOUT: Duration = Duration::from_secs(60);

/// Deadline for dialing (active) or accepting (passive) the data channel.
pub const DATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Ports tried for a passive-mode listener.
pub const PASV_PORTS: RangeInclusive<u16> = 10000..=10009;

/// Chunk size for file and listing transfers.
pub const TRANSFER_BUF_SIZE: usize = 8192;

/// Largest payload of a single block-mode frame.
pub const BLOCK_FRAME_MAX: usize = 65535;

/// Largest literal record in compressed mode.
pub const COMPRESS_LITERAL_MAX: usize = 127;

/// Largest run length in compressed mode.
pub const COMPRESS_RUN_MAX: usize = 63;

/// Duration of the SLEEP diagnostic transfer.
pub const SLEEP_TRANSFER_SECS: u64 = 20;
