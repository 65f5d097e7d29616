//! Commands sent from the master to the slave

use heapless::Vec;

use crate::constants::{CHUNK_SIZE, COMMAND_HEADER_SIZE, MAX_COMMAND_SIZE};
use crate::error::ProtocolError;

/// Command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// No operation, used for polling
    Nop = 0x00,
    /// Trigger a camera capture
    CapturePhoto = 0x01,
    /// Query slave status and last error
    GetStatus = 0x02,
    /// Get size, dimensions and checksum of the held image
    GetImageInfo = 0x03,
    /// Read one chunk of image data
    GetImageData = 0x04,
    /// Abort the current transfer and drop the image
    AbortTransfer = 0x05,

    // Configuration commands
    /// Configure capture resolution
    SetResolution = 0x10,
    /// Configure JPEG quality (1-100, higher is better)
    SetQuality = 0x11,
    /// Adjust brightness (-2..=2)
    SetBrightness = 0x12,
    /// Adjust contrast (-2..=2)
    SetContrast = 0x13,
    /// Read the current camera configuration
    GetConfig = 0x14,

    // System commands
    /// Health check / keepalive
    Ping = 0xFE,
    /// Soft reset of the camera module
    Reset = 0xFF,
}

impl Command {
    /// Parse a command code
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Command::Nop),
            0x01 => Some(Command::CapturePhoto),
            0x02 => Some(Command::GetStatus),
            0x03 => Some(Command::GetImageInfo),
            0x04 => Some(Command::GetImageData),
            0x05 => Some(Command::AbortTransfer),
            0x10 => Some(Command::SetResolution),
            0x11 => Some(Command::SetQuality),
            0x12 => Some(Command::SetBrightness),
            0x13 => Some(Command::SetContrast),
            0x14 => Some(Command::GetConfig),
            0xFE => Some(Command::Ping),
            0xFF => Some(Command::Reset),
            _ => None,
        }
    }

    /// Command code on the wire
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Command::from_byte(byte).ok_or(ProtocolError::UnknownCommand(byte))
    }
}

/// A command packet borrowed from a transaction buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandPacket<'a> {
    /// Raw command code; may be unknown to this firmware
    pub command: u8,
    /// Caller-assigned sequence number, echoed in the response
    pub sequence: u8,
    /// Payload bytes (`payload_len` on the wire)
    pub payload: &'a [u8],
}

impl<'a> CommandPacket<'a> {
    /// Create a packet for a known command
    pub fn new(command: Command, sequence: u8, payload: &'a [u8]) -> Result<Self, ProtocolError> {
        if payload.len() > CHUNK_SIZE {
            return Err(ProtocolError::PayloadTooLarge);
        }
        Ok(Self {
            command: command.to_byte(),
            sequence,
            payload,
        })
    }

    /// Create a packet with no payload
    pub fn empty(command: Command, sequence: u8) -> Self {
        Self {
            command: command.to_byte(),
            sequence,
            payload: &[],
        }
    }

    /// The decoded command, if the code is known
    pub fn kind(&self) -> Option<Command> {
        Command::from_byte(self.command)
    }

    /// Bytes this packet occupies on the wire
    pub fn encoded_len(&self) -> usize {
        COMMAND_HEADER_SIZE + self.payload.len()
    }

    /// Decode a packet from the bytes received in one transaction
    ///
    /// `buf` holds exactly the bytes the master clocked. Bytes after the
    /// declared payload are padding and are ignored.
    pub fn decode(buf: &'a [u8]) -> Result<Self, ProtocolError> {
        if buf.len() < COMMAND_HEADER_SIZE {
            return Err(ProtocolError::Truncated);
        }

        let payload_len = u16::from_le_bytes([buf[2], buf[3]]) as usize;
        if payload_len > CHUNK_SIZE {
            return Err(ProtocolError::PayloadTooLarge);
        }

        let available = buf.len() - COMMAND_HEADER_SIZE;
        if payload_len > available {
            return Err(ProtocolError::LengthMismatch);
        }

        Ok(Self {
            command: buf[0],
            sequence: buf[1],
            payload: &buf[COMMAND_HEADER_SIZE..COMMAND_HEADER_SIZE + payload_len],
        })
    }

    /// Encode this packet into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
        if self.payload.len() > CHUNK_SIZE {
            return Err(ProtocolError::PayloadTooLarge);
        }
        let len = self.encoded_len();
        if buffer.len() < len {
            return Err(ProtocolError::BufferTooSmall);
        }

        buffer[0] = self.command;
        buffer[1] = self.sequence;
        buffer[2..4].copy_from_slice(&(self.payload.len() as u16).to_le_bytes());
        buffer[COMMAND_HEADER_SIZE..len].copy_from_slice(self.payload);

        Ok(len)
    }

    /// Encode this packet into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_COMMAND_SIZE>, ProtocolError> {
        let mut vec = Vec::new();
        vec.resize(self.encoded_len(), 0)
            .map_err(|_| ProtocolError::PayloadTooLarge)?;
        self.encode(&mut vec)?;
        Ok(vec)
    }
}
