//! Slave state machine
//!
//! The capture/transfer state is a function of the current state and an
//! event. Side-channel commands (status, info, config, settings) never
//! raise events.

use camlink_protocol::Status;

use super::events::Event;

/// Slave states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveState {
    /// No image held, ready for commands
    #[default]
    Idle,
    /// Sensor is grabbing a frame
    Capturing,
    /// Encoding in progress (reserved, no command enters it)
    Processing,
    /// Image held, READY line high
    Ready,
    /// Image partially read out
    Transferring,
    /// Last capture failed
    Error,
}

impl SlaveState {
    /// Status byte reported for this state
    pub fn status(&self) -> Status {
        match self {
            SlaveState::Idle => Status::Idle,
            SlaveState::Capturing => Status::Capturing,
            SlaveState::Processing => Status::Processing,
            SlaveState::Ready => Status::Ready,
            SlaveState::Transferring => Status::Transferring,
            SlaveState::Error => Status::Error,
        }
    }

    /// Check if an image is held in this state
    pub fn holds_image(&self) -> bool {
        matches!(self, SlaveState::Ready | SlaveState::Transferring)
    }

    /// Process an event and return the next state
    ///
    /// A capture started while an image is held replaces it: the held
    /// frame is released before the sensor is asked for a new one.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use SlaveState::*;

        match (self, event) {
            // Capture
            (Idle | Ready | Transferring | Error, CaptureStarted) => Capturing,
            (Capturing | Processing, CaptureSucceeded) => Ready,
            (Capturing | Processing, CaptureFailed) => Error,

            // Transfer
            (Ready | Transferring, ChunkSent) => Transferring,
            (Ready | Transferring, TransferComplete) => Idle,

            // Control
            (_, Abort) => Idle,
            (_, Reset) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
