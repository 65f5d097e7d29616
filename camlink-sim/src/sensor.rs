//! Simulated image sensor
//!
//! Produces deterministic JPEG-framed byte streams whose size follows the
//! configured resolution and quality, with one-shot fault injection.

use std::collections::VecDeque;

use camlink_core::traits::{FrameFormat, ImageSensor, SensorError, SensorFrame};
use camlink_protocol::{Resolution, MAX_IMAGE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// Smallest frame the simulated encoder emits
const MIN_FRAME_SIZE: usize = 512;

/// Simulated sensor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Fixed frame size; derived from resolution and quality when unset
    pub frame_size: Option<usize>,
    /// Seed for frame contents
    pub seed: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            frame_size: None,
            seed: 0x5EED,
        }
    }
}

/// One-shot faults applied to the next matching operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// Next `init` fails
    InitFails,
    /// Next capture returns no frame
    NoFrame,
    /// Next capture returns a raw RGB565 frame
    NotJpeg,
    /// Next capture returns a frame one byte over the link limit
    Oversized,
}

/// Frame buffer lent out by [`SimSensor`]
#[derive(Debug)]
pub struct SimFrame {
    data: Vec<u8>,
    width: u16,
    height: u16,
    format: FrameFormat,
}

impl SensorFrame for SimFrame {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn format(&self) -> FrameFormat {
        self.format
    }
}

#[derive(Debug)]
pub struct SimSensor {
    config: SensorConfig,
    faults: VecDeque<SensorFault>,
    powered: bool,
    resolution: Resolution,
    quality: u8,
    brightness: i8,
    contrast: i8,
    captures: u32,
    outstanding: u32,
    released: u32,
    last_frame: Vec<u8>,
}

impl SimSensor {
    pub fn new(config: SensorConfig) -> Self {
        Self {
            config,
            faults: VecDeque::new(),
            powered: false,
            resolution: Resolution::Vga,
            quality: 20,
            brightness: 0,
            contrast: 0,
            captures: 0,
            outstanding: 0,
            released: 0,
            last_frame: Vec::new(),
        }
    }

    /// Queue a fault for the next matching operation
    pub fn inject(&mut self, fault: SensorFault) {
        self.faults.push_back(fault);
    }

    /// Bytes of the most recent frame handed out
    pub fn last_frame(&self) -> &[u8] {
        &self.last_frame
    }

    /// Frames handed out and not yet released
    pub fn outstanding(&self) -> u32 {
        self.outstanding
    }

    pub fn released(&self) -> u32 {
        self.released
    }

    pub fn captures(&self) -> u32 {
        self.captures
    }

    pub fn brightness(&self) -> i8 {
        self.brightness
    }

    pub fn contrast(&self) -> i8 {
        self.contrast
    }

    /// Encoded size for the current settings
    pub fn frame_size(&self) -> usize {
        if let Some(size) = self.config.frame_size {
            return size;
        }
        let (w, h) = self.resolution.dimensions();
        let pixels = w as usize * h as usize;
        // Lower internal quality value means less compression
        pixels * (64 - self.quality.min(63) as usize) / 640 + MIN_FRAME_SIZE
    }

    fn take_fault(&mut self, wanted: &[SensorFault]) -> Option<SensorFault> {
        let pos = self.faults.iter().position(|f| wanted.contains(f))?;
        self.faults.remove(pos)
    }

    fn synthesize(&self, size: usize) -> Vec<u8> {
        let size = size.max(JPEG_SOI.len() + JPEG_EOI.len());
        let mut state = self.config.seed ^ self.captures.wrapping_mul(0x9E37_79B9);
        let mut data = Vec::with_capacity(size);
        data.extend_from_slice(&JPEG_SOI);
        while data.len() < size - JPEG_EOI.len() {
            // Numerical Recipes LCG
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            data.push((state >> 24) as u8);
        }
        data.extend_from_slice(&JPEG_EOI);
        data
    }
}

impl ImageSensor for SimSensor {
    type Frame = SimFrame;

    fn init(&mut self) -> Result<(), SensorError> {
        if self.take_fault(&[SensorFault::InitFails]).is_some() {
            return Err(SensorError::NotDetected);
        }
        self.powered = true;
        debug!("Simulated sensor powered up");
        Ok(())
    }

    fn deinit(&mut self) {
        self.powered = false;
    }

    fn capture_frame(&mut self) -> Result<SimFrame, SensorError> {
        if !self.powered {
            return Err(SensorError::NotInitialized);
        }

        let fault = self.take_fault(&[
            SensorFault::NoFrame,
            SensorFault::NotJpeg,
            SensorFault::Oversized,
        ]);
        let (size, format) = match fault {
            Some(SensorFault::NoFrame) => return Err(SensorError::NoFrame),
            Some(SensorFault::NotJpeg) => (self.frame_size(), FrameFormat::Rgb565),
            Some(SensorFault::Oversized) => (MAX_IMAGE_SIZE + 1, FrameFormat::Jpeg),
            _ => (self.frame_size(), FrameFormat::Jpeg),
        };

        let data = self.synthesize(size);
        let (width, height) = self.resolution.dimensions();
        self.captures = self.captures.wrapping_add(1);
        self.outstanding += 1;
        self.last_frame.clone_from(&data);
        trace!(size = data.len(), "Frame captured");

        Ok(SimFrame {
            data,
            width,
            height,
            format,
        })
    }

    fn release_frame(&mut self, frame: SimFrame) {
        drop(frame);
        self.outstanding = self.outstanding.saturating_sub(1);
        self.released = self.released.wrapping_add(1);
    }

    fn set_framesize(&mut self, resolution: Resolution) -> Result<(), SensorError> {
        self.resolution = resolution;
        Ok(())
    }

    fn set_quality(&mut self, quality: u8) -> Result<(), SensorError> {
        if !(1..=63).contains(&quality) {
            return Err(SensorError::Unsupported);
        }
        self.quality = quality;
        Ok(())
    }

    fn set_brightness(&mut self, level: i8) -> Result<(), SensorError> {
        self.brightness = level;
        Ok(())
    }

    fn set_contrast(&mut self, level: i8) -> Result<(), SensorError> {
        self.contrast = level;
        Ok(())
    }
}
