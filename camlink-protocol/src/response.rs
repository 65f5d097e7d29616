//! Responses sent from the slave to the master

use crate::constants::RESPONSE_HEADER_SIZE;
use crate::error::ProtocolError;

/// Slave status, reported in every response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    /// Ready for commands, no image held
    #[default]
    Idle = 0x00,
    /// Capture in progress
    Capturing = 0x01,
    /// Image processing (JPEG encode)
    Processing = 0x02,
    /// Image ready for transfer
    Ready = 0x03,
    /// Image transfer in progress
    Transferring = 0x04,
    /// Busy with another operation
    Busy = 0x80,
    /// Error state; see the error code
    Error = 0xFF,
}

impl Status {
    /// Parse a status byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Idle),
            0x01 => Some(Status::Capturing),
            0x02 => Some(Status::Processing),
            0x03 => Some(Status::Ready),
            0x04 => Some(Status::Transferring),
            0x80 => Some(Status::Busy),
            0xFF => Some(Status::Error),
            _ => None,
        }
    }

    /// Status byte on the wire
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Check if the slave is in the middle of an operation
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            Status::Capturing | Status::Processing | Status::Transferring | Status::Busy
        )
    }
}

/// Error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ErrorCode {
    /// No error
    #[default]
    None = 0x00,
    /// Command code not recognized
    UnknownCommand = 0x01,
    /// Invalid parameter value
    InvalidParam = 0x02,
    /// Camera initialization failed
    CameraInit = 0x10,
    /// Camera capture failed
    CameraCapture = 0x11,
    /// No image available for transfer
    NoImage = 0x12,
    /// Transfer was aborted
    TransferAborted = 0x13,
    /// Image too large for buffer
    BufferOverflow = 0x20,
    /// Operation timed out
    Timeout = 0x30,
    /// Internal error
    Internal = 0xFF,
}

impl ErrorCode {
    /// Parse an error byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(ErrorCode::None),
            0x01 => Some(ErrorCode::UnknownCommand),
            0x02 => Some(ErrorCode::InvalidParam),
            0x10 => Some(ErrorCode::CameraInit),
            0x11 => Some(ErrorCode::CameraCapture),
            0x12 => Some(ErrorCode::NoImage),
            0x13 => Some(ErrorCode::TransferAborted),
            0x20 => Some(ErrorCode::BufferOverflow),
            0x30 => Some(ErrorCode::Timeout),
            0xFF => Some(ErrorCode::Internal),
            _ => None,
        }
    }

    /// Error byte on the wire
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Check if this code reports a failure
    pub fn is_error(self) -> bool {
        self != ErrorCode::None
    }
}

/// Fixed 8-byte response header
///
/// `data_len` counts the data bytes that follow the header in the same
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseHeader {
    pub status: Status,
    pub error: ErrorCode,
    pub sequence: u8,
    pub data_len: u32,
}

impl ResponseHeader {
    /// Create a header
    pub const fn new(status: Status, error: ErrorCode, sequence: u8, data_len: u32) -> Self {
        Self {
            status,
            error,
            sequence,
            data_len,
        }
    }

    /// Header with no data and no error
    pub const fn status_only(status: Status, sequence: u8) -> Self {
        Self::new(status, ErrorCode::None, sequence, 0)
    }

    /// Encode the header into the first 8 bytes of `buffer`
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
        if buffer.len() < RESPONSE_HEADER_SIZE {
            return Err(ProtocolError::BufferTooSmall);
        }
        buffer[0] = self.status.to_byte();
        buffer[1] = self.error.to_byte();
        buffer[2] = self.sequence;
        buffer[3] = 0; // reserved
        buffer[4..8].copy_from_slice(&self.data_len.to_le_bytes());
        Ok(RESPONSE_HEADER_SIZE)
    }

    /// Encode the header into a fixed array
    pub fn to_bytes(&self) -> [u8; RESPONSE_HEADER_SIZE] {
        let mut bytes = [0u8; RESPONSE_HEADER_SIZE];
        bytes[0] = self.status.to_byte();
        bytes[1] = self.error.to_byte();
        bytes[2] = self.sequence;
        bytes[4..8].copy_from_slice(&self.data_len.to_le_bytes());
        bytes
    }

    /// Decode a header from the start of `buf`
    ///
    /// The reserved byte is ignored.
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() < RESPONSE_HEADER_SIZE {
            return Err(ProtocolError::Truncated);
        }
        let status = Status::from_byte(buf[0]).ok_or(ProtocolError::InvalidValue)?;
        let error = ErrorCode::from_byte(buf[1]).ok_or(ProtocolError::InvalidValue)?;
        Ok(Self {
            status,
            error,
            sequence: buf[2],
            data_len: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_header_layout() {
        let header = ResponseHeader::new(Status::Transferring, ErrorCode::None, 0x21, 0x0000_1000);
        assert_eq!(header.to_bytes(), [0x04, 0x00, 0x21, 0x00, 0x00, 0x10, 0x00, 0x00]);
    }

    #[test]
    fn test_encode_matches_to_bytes() {
        let header = ResponseHeader::new(Status::Error, ErrorCode::NoImage, 5, 0);
        let mut buffer = [0xEEu8; 12];
        assert_eq!(header.encode(&mut buffer), Ok(8));
        assert_eq!(&buffer[..8], &header.to_bytes());
        assert_eq!(buffer[8], 0xEE);
    }

    #[test]
    fn test_decode_ignores_reserved() {
        let bytes = [0x03, 0x00, 9, 0x5A, 12, 0, 0, 0];
        let header = ResponseHeader::decode(&bytes).unwrap();
        assert_eq!(header.status, Status::Ready);
        assert_eq!(header.sequence, 9);
        assert_eq!(header.data_len, 12);
    }

    #[test]
    fn test_decode_rejects_unknown_status() {
        let bytes = [0x07, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(ResponseHeader::decode(&bytes), Err(ProtocolError::InvalidValue));
        let bytes = [0x00, 0x99, 0, 0, 0, 0, 0, 0];
        assert_eq!(ResponseHeader::decode(&bytes), Err(ProtocolError::InvalidValue));
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(ResponseHeader::decode(&[0u8; 7]), Err(ProtocolError::Truncated));
        let mut small = [0u8; 4];
        assert_eq!(
            ResponseHeader::default().encode(&mut small),
            Err(ProtocolError::BufferTooSmall)
        );
    }

    #[test]
    fn test_status_busy() {
        assert!(Status::Capturing.is_busy());
        assert!(Status::Busy.is_busy());
        assert!(Status::Transferring.is_busy());
        assert!(!Status::Idle.is_busy());
        assert!(!Status::Ready.is_busy());
        assert!(!Status::Error.is_busy());
    }

    #[test]
    fn test_error_code_bytes() {
        assert_eq!(ErrorCode::TransferAborted.to_byte(), 0x13);
        assert_eq!(ErrorCode::BufferOverflow.to_byte(), 0x20);
        assert_eq!(ErrorCode::from_byte(0x30), Some(ErrorCode::Timeout));
        assert_eq!(ErrorCode::from_byte(0x03), None);
        assert!(!ErrorCode::None.is_error());
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(seq in any::<u8>(), data_len in any::<u32>(), status_idx in 0usize..7) {
            let statuses = [
                Status::Idle, Status::Capturing, Status::Processing, Status::Ready,
                Status::Transferring, Status::Busy, Status::Error,
            ];
            let header = ResponseHeader::new(statuses[status_idx], ErrorCode::None, seq, data_len);
            prop_assert_eq!(ResponseHeader::decode(&header.to_bytes()), Ok(header));
        }
    }
}
