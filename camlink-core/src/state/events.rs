//! Events that trigger slave state transitions

/// Events raised by the dispatcher while serving commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Capture events
    /// CAPTURE_PHOTO accepted, sensor is grabbing a frame
    CaptureStarted,
    /// Frame stored and ready for transfer
    CaptureSucceeded,
    /// Sensor failed or the frame was rejected
    CaptureFailed,

    // Transfer events
    /// A chunk was served and bytes remain
    ChunkSent,
    /// The final chunk was served
    TransferComplete,

    // Control events
    /// ABORT_TRANSFER received
    Abort,
    /// RESET received
    Reset,
}

impl Event {
    /// Check if this event drops the held image
    pub fn releases_image(&self) -> bool {
        matches!(self, Event::TransferComplete | Event::Abort | Event::Reset)
    }
}
