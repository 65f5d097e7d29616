//! Codec errors

/// Errors that can occur while encoding or decoding packets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Fewer bytes than the fixed header needs
    Truncated,
    /// Declared payload exceeds the chunk size
    PayloadTooLarge,
    /// Declared length exceeds the bytes actually received
    LengthMismatch,
    /// Output buffer too small for encoding
    BufferTooSmall,
    /// Command byte is not a known command
    UnknownCommand(u8),
    /// Field holds a value outside its enumeration
    InvalidValue,
}
