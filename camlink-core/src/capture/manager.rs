//! Capture manager
//!
//! Holds at most one captured frame at a time. The frame stays owned by
//! the manager until a transfer completes, the master aborts or resets,
//! or a new capture replaces it; it is then handed back to the sensor.

use camlink_protocol::{
    crc16, ConfigInfo, ErrorCode, ImageFormat, ImageInfo, Resolution, MAX_IMAGE_SIZE,
};

use crate::traits::{FrameFormat, ImageSensor, SensorError, SensorFrame};

/// Default internal JPEG quality (1-63, lower is better)
pub const DEFAULT_QUALITY: u8 = 20;

/// Brightness and contrast range accepted by the sensor
pub const LEVEL_MIN: i8 = -2;
pub const LEVEL_MAX: i8 = 2;

/// Errors from capture manager operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError {
    /// `init` has not succeeded yet
    NotInitialized,
    /// Sensor returned no frame
    CaptureFailed,
    /// Sensor returned a frame that is not JPEG
    NotJpeg,
    /// Frame exceeds the largest image the link carries
    TooLarge,
    /// No image is held
    NoImage,
    /// Setting out of range
    InvalidParam,
    /// Sensor driver rejected the operation
    Sensor(SensorError),
}

impl CaptureError {
    /// Error code reported to the master
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CaptureError::NotInitialized => ErrorCode::CameraInit,
            CaptureError::CaptureFailed | CaptureError::NotJpeg => ErrorCode::CameraCapture,
            CaptureError::TooLarge => ErrorCode::BufferOverflow,
            CaptureError::NoImage => ErrorCode::NoImage,
            CaptureError::InvalidParam | CaptureError::Sensor(_) => ErrorCode::InvalidParam,
        }
    }
}

impl From<SensorError> for CaptureError {
    fn from(e: SensorError) -> Self {
        CaptureError::Sensor(e)
    }
}

/// Map external quality (1-100, higher is better) to the sensor's
/// internal scale (1-63, lower is better)
///
/// Integer division truncates; the exact rounding is part of the
/// contract since both sides report the internal value.
pub fn quality_to_internal(quality: u8) -> u8 {
    let q = quality.clamp(1, 100) as u32;
    (63 - (q - 1) * 62 / 99) as u8
}

/// Persisted camera settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CameraSettings {
    pub resolution: Resolution,
    /// Internal quality (1-63)
    pub quality: u8,
    pub brightness: i8,
    pub contrast: i8,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::Vga,
            quality: DEFAULT_QUALITY,
            brightness: 0,
            contrast: 0,
        }
    }
}

/// Diagnostic snapshot of the capture manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureState {
    pub initialized: bool,
    pub ready: bool,
    pub size: u32,
    pub width: u16,
    pub height: u16,
}

/// Owns the sensor and the currently held frame
pub struct CaptureManager<S: ImageSensor> {
    sensor: S,
    frame: Option<S::Frame>,
    settings: CameraSettings,
    initialized: bool,
}

impl<S: ImageSensor> CaptureManager<S> {
    /// Create a manager with default settings
    ///
    /// The sensor is not touched until `init`.
    pub fn new(sensor: S) -> Self {
        Self::with_settings(sensor, CameraSettings::default())
    }

    /// Create a manager with the given settings
    pub fn with_settings(sensor: S, settings: CameraSettings) -> Self {
        Self {
            sensor,
            frame: None,
            settings,
            initialized: false,
        }
    }

    /// Initialize the sensor and apply the stored settings
    ///
    /// Calling again after success is a no-op.
    pub fn init(&mut self) -> Result<(), CaptureError> {
        if self.initialized {
            return Ok(());
        }

        self.sensor.init().map_err(|e| {
            error!("Camera init failed: {:?}", e);
            CaptureError::NotInitialized
        })?;

        let s = self.settings;
        self.sensor.set_framesize(s.resolution)?;
        self.sensor.set_quality(s.quality)?;
        self.sensor.set_brightness(s.brightness)?;
        self.sensor.set_contrast(s.contrast)?;

        self.initialized = true;
        info!("Camera initialized ({:?}, quality {})", s.resolution, s.quality);
        Ok(())
    }

    /// Release any held frame and power the sensor down
    pub fn deinit(&mut self) {
        if !self.initialized {
            return;
        }
        self.clear_image();
        self.sensor.deinit();
        self.initialized = false;
        info!("Camera deinitialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Capture one frame, replacing any held image
    pub fn capture(&mut self) -> Result<(), CaptureError> {
        if !self.initialized {
            return Err(CaptureError::NotInitialized);
        }

        self.clear_image();

        let frame = self.sensor.capture_frame().map_err(|e| {
            warn!("Frame capture failed: {:?}", e);
            CaptureError::CaptureFailed
        })?;

        if frame.format() != FrameFormat::Jpeg {
            warn!("Frame is not JPEG: {:?}", frame.format());
            self.sensor.release_frame(frame);
            return Err(CaptureError::NotJpeg);
        }
        if frame.is_empty() {
            self.sensor.release_frame(frame);
            return Err(CaptureError::CaptureFailed);
        }
        if frame.len() > MAX_IMAGE_SIZE {
            warn!("Frame too large: {} bytes", frame.len());
            self.sensor.release_frame(frame);
            return Err(CaptureError::TooLarge);
        }

        debug!(
            "Captured {}x{} ({} bytes)",
            frame.width(),
            frame.height(),
            frame.len()
        );
        self.frame = Some(frame);
        Ok(())
    }

    /// Held image bytes, if any
    pub fn image(&self) -> Option<&[u8]> {
        self.frame.as_ref().map(|f| f.data())
    }

    /// Size of the held image, 0 when none
    pub fn image_size(&self) -> usize {
        self.frame.as_ref().map_or(0, |f| f.len())
    }

    pub fn is_ready(&self) -> bool {
        self.frame.is_some()
    }

    /// Describe the held image
    ///
    /// The checksum is computed on every call.
    pub fn info(&self) -> Result<ImageInfo, CaptureError> {
        let frame = self.frame.as_ref().ok_or(CaptureError::NoImage)?;
        Ok(ImageInfo {
            image_size: frame.len() as u32,
            width: frame.width(),
            height: frame.height(),
            format: ImageFormat::Jpeg,
            quality: self.settings.quality,
            checksum: crc16(frame.data()),
        })
    }

    /// Hand the held frame back to the sensor
    ///
    /// No-op when nothing is held.
    pub fn clear_image(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.sensor.release_frame(frame);
            trace!("Image released");
        }
    }

    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CaptureError> {
        self.sensor.set_framesize(resolution)?;
        self.settings.resolution = resolution;
        info!("Resolution set to {:?}", resolution);
        Ok(())
    }

    /// Set quality on the external 1-100 scale
    pub fn set_quality(&mut self, quality: u8) -> Result<(), CaptureError> {
        if !(1..=100).contains(&quality) {
            return Err(CaptureError::InvalidParam);
        }
        let internal = quality_to_internal(quality);
        self.sensor.set_quality(internal)?;
        self.settings.quality = internal;
        info!("Quality set to {} (internal {})", quality, internal);
        Ok(())
    }

    pub fn set_brightness(&mut self, level: i8) -> Result<(), CaptureError> {
        if !(LEVEL_MIN..=LEVEL_MAX).contains(&level) {
            return Err(CaptureError::InvalidParam);
        }
        self.sensor.set_brightness(level)?;
        self.settings.brightness = level;
        Ok(())
    }

    pub fn set_contrast(&mut self, level: i8) -> Result<(), CaptureError> {
        if !(LEVEL_MIN..=LEVEL_MAX).contains(&level) {
            return Err(CaptureError::InvalidParam);
        }
        self.sensor.set_contrast(level)?;
        self.settings.contrast = level;
        Ok(())
    }

    pub fn settings(&self) -> CameraSettings {
        self.settings
    }

    /// Current configuration as reported over the link
    pub fn config(&self) -> ConfigInfo {
        let s = self.settings;
        ConfigInfo::new(s.resolution, s.quality, s.brightness, s.contrast)
    }

    pub fn state(&self) -> CaptureState {
        CaptureState {
            initialized: self.initialized,
            ready: self.is_ready(),
            size: self.image_size() as u32,
            width: self.frame.as_ref().map_or(0, |f| f.width()),
            height: self.frame.as_ref().map_or(0, |f| f.height()),
        }
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockFault, MockSensor};
    use proptest::prelude::*;

    fn ready_manager() -> CaptureManager<MockSensor> {
        let mut camera = CaptureManager::new(MockSensor::new(1000));
        camera.init().unwrap();
        camera
    }

    #[test]
    fn test_quality_mapping_bounds() {
        assert_eq!(quality_to_internal(1), 63);
        assert_eq!(quality_to_internal(100), 1);
        assert_eq!(quality_to_internal(50), 33);
    }

    #[test]
    fn test_defaults() {
        let camera = CaptureManager::new(MockSensor::new(10));
        let config = camera.config();
        assert_eq!(config.resolution, Resolution::Vga);
        assert_eq!(config.quality, 20);
        assert_eq!(config.brightness, 0);
        assert_eq!(config.contrast, 0);
        assert_eq!(config.protocol_major, 1);
        assert_eq!(config.protocol_minor, 0);
    }

    #[test]
    fn test_init_applies_settings_once() {
        let mut camera = CaptureManager::new(MockSensor::new(10));
        camera.init().unwrap();
        camera.init().unwrap();
        assert_eq!(camera.sensor().init_calls, 1);
        assert_eq!(camera.sensor().quality, 20);
        assert_eq!(camera.sensor().framesize, Some(Resolution::Vga));
    }

    #[test]
    fn test_init_failure() {
        let mut sensor = MockSensor::new(10);
        sensor.fault = Some(MockFault::InitFails);
        let mut camera = CaptureManager::new(sensor);
        assert_eq!(camera.init(), Err(CaptureError::NotInitialized));
        assert!(!camera.is_initialized());
    }

    #[test]
    fn test_capture_requires_init() {
        let mut camera = CaptureManager::new(MockSensor::new(10));
        assert_eq!(camera.capture(), Err(CaptureError::NotInitialized));
        assert_eq!(CaptureError::NotInitialized.error_code(), ErrorCode::CameraInit);
    }

    #[test]
    fn test_capture_and_info() {
        let mut camera = ready_manager();
        camera.capture().unwrap();

        assert!(camera.is_ready());
        let info = camera.info().unwrap();
        assert_eq!(info.image_size, 1000);
        assert_eq!(info.width, 640);
        assert_eq!(info.height, 480);
        assert_eq!(info.format, ImageFormat::Jpeg);
        assert_eq!(info.quality, 20);
        assert_eq!(info.checksum, crc16(camera.image().unwrap()));

        // Reading does not consume
        assert!(camera.image().is_some());
        assert_eq!(camera.image_size(), 1000);
    }

    #[test]
    fn test_info_without_image() {
        let camera = ready_manager();
        assert_eq!(camera.info(), Err(CaptureError::NoImage));
        assert!(camera.image().is_none());
        assert_eq!(camera.image_size(), 0);
    }

    #[test]
    fn test_capture_replaces_previous_frame() {
        let mut camera = ready_manager();
        camera.capture().unwrap();
        camera.capture().unwrap();
        assert_eq!(camera.sensor().outstanding, 1);
        assert_eq!(camera.sensor().released, 1);
    }

    #[test]
    fn test_clear_image_idempotent() {
        let mut camera = ready_manager();
        camera.capture().unwrap();
        camera.clear_image();
        camera.clear_image();
        assert_eq!(camera.sensor().outstanding, 0);
        assert_eq!(camera.sensor().released, 1);
        assert!(!camera.is_ready());
    }

    #[test]
    fn test_capture_failure() {
        let mut camera = ready_manager();
        camera.sensor_mut().fault = Some(MockFault::NoFrame);
        assert_eq!(camera.capture(), Err(CaptureError::CaptureFailed));
        assert_eq!(CaptureError::CaptureFailed.error_code(), ErrorCode::CameraCapture);
        assert!(!camera.is_ready());
    }

    #[test]
    fn test_non_jpeg_frame_released() {
        let mut camera = ready_manager();
        camera.sensor_mut().fault = Some(MockFault::WrongFormat);
        assert_eq!(camera.capture(), Err(CaptureError::NotJpeg));
        assert_eq!(camera.sensor().outstanding, 0);
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut camera = CaptureManager::new(MockSensor::new(MAX_IMAGE_SIZE + 1));
        camera.init().unwrap();
        assert_eq!(camera.capture(), Err(CaptureError::TooLarge));
        assert_eq!(camera.sensor().outstanding, 0);
        assert_eq!(CaptureError::TooLarge.error_code(), ErrorCode::BufferOverflow);
    }

    #[test]
    fn test_max_size_frame_accepted() {
        let mut camera = CaptureManager::new(MockSensor::new(MAX_IMAGE_SIZE));
        camera.init().unwrap();
        assert!(camera.capture().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut camera = ready_manager();
        assert_eq!(camera.set_quality(0), Err(CaptureError::InvalidParam));
        assert_eq!(camera.set_quality(101), Err(CaptureError::InvalidParam));
        assert_eq!(camera.set_brightness(3), Err(CaptureError::InvalidParam));
        assert_eq!(camera.set_contrast(-3), Err(CaptureError::InvalidParam));

        camera.set_quality(100).unwrap();
        camera.set_brightness(-2).unwrap();
        camera.set_contrast(2).unwrap();
        camera.set_resolution(Resolution::Qvga).unwrap();

        let config = camera.config();
        assert_eq!(config.quality, 1);
        assert_eq!(config.brightness, -2);
        assert_eq!(config.contrast, 2);
        assert_eq!(config.resolution, Resolution::Qvga);
        assert_eq!(camera.sensor().quality, 1);
    }

    #[test]
    fn test_rejected_setting_not_persisted() {
        let mut camera = ready_manager();
        camera.sensor_mut().fault = Some(MockFault::RejectSettings);
        assert_eq!(
            camera.set_resolution(Resolution::FiveMp),
            Err(CaptureError::Sensor(SensorError::Unsupported))
        );
        assert_eq!(camera.settings().resolution, Resolution::Vga);
    }

    #[test]
    fn test_deinit_releases_frame() {
        let mut camera = ready_manager();
        camera.capture().unwrap();
        camera.deinit();
        assert_eq!(camera.sensor().outstanding, 0);
        assert!(!camera.is_initialized());
        assert!(!camera.state().ready);
    }

    proptest! {
        #[test]
        fn prop_quality_mapping_monotonic(q in 1u8..100) {
            let hi = quality_to_internal(q + 1);
            let lo = quality_to_internal(q);
            prop_assert!(hi <= lo);
            prop_assert!((1..=63).contains(&lo));
        }
    }
}
