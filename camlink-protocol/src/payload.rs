//! Fixed-layout payload structures

use crate::constants::{PROTOCOL_VERSION_MAJOR, PROTOCOL_VERSION_MINOR};
use crate::error::ProtocolError;

/// Capture resolution presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[repr(u8)]
pub enum Resolution {
    /// 160x120
    Qqvga = 0,
    /// 320x240
    Qvga = 1,
    /// 640x480
    #[default]
    Vga = 2,
    /// 800x600
    Svga = 3,
    /// 1024x768
    Xga = 4,
    /// 1280x1024
    Sxga = 5,
    /// 1600x1200
    Uxga = 6,
    /// 2048x1536
    Qxga = 7,
    /// 2592x1944
    #[cfg_attr(feature = "serde", serde(rename = "5MP"))]
    FiveMp = 8,
}

impl Resolution {
    /// All presets, in wire order
    pub const ALL: [Resolution; 9] = [
        Resolution::Qqvga,
        Resolution::Qvga,
        Resolution::Vga,
        Resolution::Svga,
        Resolution::Xga,
        Resolution::Sxga,
        Resolution::Uxga,
        Resolution::Qxga,
        Resolution::FiveMp,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Width and height in pixels
    pub fn dimensions(self) -> (u16, u16) {
        match self {
            Resolution::Qqvga => (160, 120),
            Resolution::Qvga => (320, 240),
            Resolution::Vga => (640, 480),
            Resolution::Svga => (800, 600),
            Resolution::Xga => (1024, 768),
            Resolution::Sxga => (1280, 1024),
            Resolution::Uxga => (1600, 1200),
            Resolution::Qxga => (2048, 1536),
            Resolution::FiveMp => (2592, 1944),
        }
    }
}

/// Image encoding reported in `ImageInfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ImageFormat {
    #[default]
    Jpeg = 0,
}

impl ImageFormat {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Response data for `GET_IMAGE_INFO` (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageInfo {
    /// Total image size in bytes
    pub image_size: u32,
    pub width: u16,
    pub height: u16,
    pub format: ImageFormat,
    /// Internal quality (1-63, lower is better)
    pub quality: u8,
    /// CRC-16 over the full image
    pub checksum: u16,
}

impl ImageInfo {
    pub const SIZE: usize = 12;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.image_size.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.width.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.height.to_le_bytes());
        bytes[8] = self.format.to_byte();
        bytes[9] = self.quality;
        bytes[10..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() < Self::SIZE {
            return Err(ProtocolError::Truncated);
        }
        Ok(Self {
            image_size: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            width: u16::from_le_bytes([buf[4], buf[5]]),
            height: u16::from_le_bytes([buf[6], buf[7]]),
            format: ImageFormat::from_byte(buf[8]).ok_or(ProtocolError::InvalidValue)?,
            quality: buf[9],
            checksum: u16::from_le_bytes([buf[10], buf[11]]),
        })
    }
}

/// Response data for `GET_CONFIG` (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigInfo {
    pub resolution: Resolution,
    /// Internal quality (1-63, lower is better)
    pub quality: u8,
    pub brightness: i8,
    pub contrast: i8,
    pub protocol_major: u8,
    pub protocol_minor: u8,
}

impl ConfigInfo {
    pub const SIZE: usize = 8;

    /// Config info stamped with this crate's protocol version
    pub fn new(resolution: Resolution, quality: u8, brightness: i8, contrast: i8) -> Self {
        Self {
            resolution,
            quality,
            brightness,
            contrast,
            protocol_major: PROTOCOL_VERSION_MAJOR,
            protocol_minor: PROTOCOL_VERSION_MINOR,
        }
    }

    /// Check if the peer speaks a compatible protocol
    pub fn is_compatible(&self) -> bool {
        self.protocol_major == PROTOCOL_VERSION_MAJOR
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        [
            self.resolution.to_byte(),
            self.quality,
            self.brightness as u8,
            self.contrast as u8,
            self.protocol_major,
            self.protocol_minor,
            0,
            0,
        ]
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() < Self::SIZE {
            return Err(ProtocolError::Truncated);
        }
        Ok(Self {
            resolution: Resolution::from_byte(buf[0]).ok_or(ProtocolError::InvalidValue)?,
            quality: buf[1],
            brightness: buf[2] as i8,
            contrast: buf[3] as i8,
            protocol_major: buf[4],
            protocol_minor: buf[5],
        })
    }
}

/// Request payload for `GET_IMAGE_DATA` (8 bytes)
///
/// A `length` of 0 asks for everything remaining, capped at one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GetImageReq {
    pub offset: u32,
    pub length: u16,
}

impl GetImageReq {
    pub const SIZE: usize = 8;

    pub fn new(offset: u32, length: u16) -> Self {
        Self { offset, length }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.offset.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.length.to_le_bytes());
        bytes
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() < Self::SIZE {
            return Err(ProtocolError::Truncated);
        }
        Ok(Self {
            offset: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            length: u16::from_le_bytes([buf[4], buf[5]]),
        })
    }
}
