//! Capture and image buffer management (slave side)

pub mod manager;

pub use manager::{
    quality_to_internal, CameraSettings, CaptureError, CaptureManager, CaptureState,
};
