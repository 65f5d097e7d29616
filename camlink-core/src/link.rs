//! Per-device link diagnostics

use camlink_protocol::{ErrorCode, Status};

/// Slave-side link state, mutated only by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveLinkState {
    pub status: Status,
    pub last_error: ErrorCode,
    /// Sequence of the last decoded command
    pub sequence: u8,
    pub commands_received: u32,
    pub bytes_transferred: u32,
    pub errors: u32,
}

impl SlaveLinkState {
    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }
}

/// Master-side link state, mutated only by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MasterLinkState {
    pub connected: bool,
    pub last_status: Status,
    pub last_error: ErrorCode,
    pub last_image_size: u32,
    pub last_image_width: u16,
    pub last_image_height: u16,
    pub captures_requested: u32,
    pub captures_completed: u32,
    pub transfer_errors: u32,
}

impl MasterLinkState {
    /// Sequence byte for the next command
    pub fn next_sequence(&self) -> u8 {
        self.captures_requested
            .wrapping_add(self.captures_completed) as u8
    }
}
