//! Numeric limits and protocol constants

/// Protocol version major, reported in `ConfigInfo`
pub const PROTOCOL_VERSION_MAJOR: u8 = 1;

/// Protocol version minor, reported in `ConfigInfo`
pub const PROTOCOL_VERSION_MINOR: u8 = 0;

/// Maximum data bytes per transaction (DMA buffer size)
pub const CHUNK_SIZE: usize = 4096;

/// Largest image the link is sized for (64 KiB)
pub const MAX_IMAGE_SIZE: usize = 65536;

/// Command packet header: command, sequence, payload_len
pub const COMMAND_HEADER_SIZE: usize = 4;

/// Response header: status, error_code, sequence, reserved, data_len
pub const RESPONSE_HEADER_SIZE: usize = 8;

/// Largest command packet on the wire
pub const MAX_COMMAND_SIZE: usize = COMMAND_HEADER_SIZE + CHUNK_SIZE;

/// Largest response on the wire
pub const MAX_RESPONSE_SIZE: usize = RESPONSE_HEADER_SIZE + CHUNK_SIZE;

/// Transaction buffer size that fits either direction
pub const TRANSACTION_BUFFER_SIZE: usize = if MAX_COMMAND_SIZE > MAX_RESPONSE_SIZE {
    MAX_COMMAND_SIZE
} else {
    MAX_RESPONSE_SIZE
};

/// Command packet marker (reserved, not sent in protocol 1.0)
pub const PROTOCOL_MAGIC_CMD: u8 = 0xCA;

/// Response packet marker (reserved, not sent in protocol 1.0)
pub const PROTOCOL_MAGIC_RSP: u8 = 0xAC;

/// Max time to wait for a capture to complete
pub const TIMEOUT_CAPTURE_MS: u32 = 5000;

/// Max time for a complete image transfer
pub const TIMEOUT_TRANSFER_MS: u32 = 10000;

/// Max time per chunk transaction
pub const TIMEOUT_CHUNK_MS: u32 = 100;

/// Max time for a single command transaction
pub const TIMEOUT_COMMAND_MS: u32 = 1000;

/// READY line level when no image is waiting
pub const READY_PIN_LOW: bool = false;

/// READY line level when an image is waiting for transfer
pub const READY_PIN_HIGH: bool = true;
