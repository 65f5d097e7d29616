//! Hardware abstraction traits
//!
//! Pins and SPI come from `camlink-hal`; the sensor driver trait lives
//! here because only the capture manager consumes it.

pub mod sensor;

pub use camlink_hal::{
    AsyncReadyWait, InputPin, OutputPin, ReadyLatch, ReadyWait, SpiMaster, SpiSlave,
};
pub use sensor::{FrameFormat, ImageSensor, SensorError, SensorFrame};
