use embassy_time::Duration;

/// Number of modem socket connections tracked by the engine.
pub const MAX_CONNS: usize = 6;

/// Receive slots per connection.
pub const POOL_SLOTS: usize = 11;

/// Bytes held by a single receive slot. A slot is sized for one hex encoded
/// fetch of `3000` characters.
pub const SLOT_CAPACITY: usize = 1500;

/// Size of the modem's AT command buffer.
pub const AT_BUFFER_SIZE: usize = 0x400;

/// Pending read descriptors the flow controller can hold. Once full, an
/// announcement grows the newest descriptor of its connection instead.
pub const RING_CAPACITY: usize = 32;

/// Longest line the ingress can assemble, terminator included.
pub const INGRESS_BUF_SIZE: usize = 512;

/// Longest formatted AT command.
pub const CMD_BUF_SIZE: usize = 256;

/// Largest payload passed to the modem after a single `>` prompt.
pub const SEND_CHUNK_SIZE: usize = 1024;

pub const MAX_SCAN_RESULTS: usize = 10;
pub const MAX_SMS_ENTRIES: usize = 8;
pub const MAX_PB_ENTRIES: usize = 8;

pub const EVENT_CAPACITY: usize = 8;
pub const EVENT_SUBSCRIBERS: usize = 2;

/// Bytes requested by one `+SQNSRECV` fetch.
pub const DEFAULT_FETCH_QUANTUM: usize = AT_BUFFER_SIZE / 2;

pub trait CellularConfig {
    /// Receive payloads are exchanged as hex encoded text (`+SQNSCFGEXT`
    /// `recvDataMode` 1).
    const HEX_MODE: bool = true;

    const FETCH_QUANTUM: usize = DEFAULT_FETCH_QUANTUM;

    /// How often the runner re-examines the pending read ring while it is
    /// non-empty.
    const FETCH_POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// A fetch that has not been acknowledged after this long is re-issued.
    const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

    /// Upper bound for commands that carry no timeout of their own.
    const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Configuration with every knob at its default.
pub struct DefaultConfig;

impl CellularConfig for DefaultConfig {}
