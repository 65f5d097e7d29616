//! Image sensor driver trait
//!
//! The sensor driver owns the frame buffers. A captured frame is handed
//! out by value and must be handed back with `release_frame` before the
//! driver can reuse its memory. Passing the frame by value means a
//! released frame can be neither read nor released a second time.

use camlink_protocol::Resolution;

/// Errors reported by the sensor driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Driver used before `init` succeeded
    NotInitialized,
    /// Sensor did not respond on its control bus
    NotDetected,
    /// No frame could be grabbed
    NoFrame,
    /// Setting rejected by the driver
    Unsupported,
}

/// Pixel encoding of a captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameFormat {
    Jpeg,
    Rgb565,
    Yuv422,
    Grayscale,
}

/// A frame buffer lent out by the sensor driver
pub trait SensorFrame {
    /// Encoded image bytes
    fn data(&self) -> &[u8];

    fn width(&self) -> u16;

    fn height(&self) -> u16;

    fn format(&self) -> FrameFormat;

    /// Encoded size in bytes
    fn len(&self) -> usize {
        self.data().len()
    }

    fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}

/// Trait for camera sensor drivers
pub trait ImageSensor {
    /// Frame handle returned by `capture_frame`
    type Frame: SensorFrame;

    /// Power up and configure the sensor
    fn init(&mut self) -> Result<(), SensorError>;

    /// Power down the sensor
    ///
    /// All frames must have been released.
    fn deinit(&mut self);

    /// Grab one encoded frame
    fn capture_frame(&mut self) -> Result<Self::Frame, SensorError>;

    /// Return a frame buffer to the driver
    fn release_frame(&mut self, frame: Self::Frame);

    fn set_framesize(&mut self, resolution: Resolution) -> Result<(), SensorError>;

    /// Set encoder quality (internal scale, 1-63, lower is better)
    fn set_quality(&mut self, quality: u8) -> Result<(), SensorError>;

    /// Set brightness (-2..=2)
    fn set_brightness(&mut self, level: i8) -> Result<(), SensorError>;

    /// Set contrast (-2..=2)
    fn set_contrast(&mut self, level: i8) -> Result<(), SensorError>;
}
