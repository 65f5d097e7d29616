//! Client errors

use camlink_protocol::{ErrorCode, ProtocolError};

/// Errors returned by [`CameraClient`](super::CameraClient) calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClientError<E> {
    /// SPI transaction failed
    Bus(E),
    /// Response could not be decoded or was inconsistent
    Protocol(ProtocolError),
    /// Slave answered with an error code
    Device(ErrorCode),
    /// READY not seen within the timeout
    Timeout,
    /// Image does not fit the caller's buffer
    BufferTooSmall { needed: usize, available: usize },
    /// Reassembled image does not match the slave's checksum
    ChecksumMismatch { expected: u16, actual: u16 },
    /// Argument outside its valid range
    InvalidArgument,
}

impl<E> From<ProtocolError> for ClientError<E> {
    fn from(e: ProtocolError) -> Self {
        ClientError::Protocol(e)
    }
}

impl<E> ClientError<E> {
    /// Check if the failure happened on the bus rather than in the slave
    pub fn is_bus(&self) -> bool {
        matches!(self, ClientError::Bus(_))
    }

    /// Error code reported by the slave, if any
    pub fn device_code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Device(code) => Some(*code),
            _ => None,
        }
    }
}
