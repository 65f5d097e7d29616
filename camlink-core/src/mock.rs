//! Test doubles shared by the unit tests

use std::cell::Cell;
use std::rc::Rc;
use std::vec::Vec;

use camlink_hal::{InputPin, OutputPin, ReadyLatch, ReadyWait, SpiMaster};
use camlink_protocol::Resolution;
use embedded_hal_async::delay::DelayNs;

use crate::slave::Dispatcher;
use crate::traits::{FrameFormat, ImageSensor, SensorError, SensorFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    InitFails,
    NoFrame,
    WrongFormat,
    RejectSettings,
}

pub struct MockFrame {
    data: Vec<u8>,
    format: FrameFormat,
}

impl SensorFrame for MockFrame {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn width(&self) -> u16 {
        640
    }

    fn height(&self) -> u16 {
        480
    }

    fn format(&self) -> FrameFormat {
        self.format
    }
}

/// Sensor producing frames of a fixed size
pub struct MockSensor {
    pub frame_size: usize,
    pub fault: Option<MockFault>,
    pub init_calls: u32,
    pub captures: u32,
    pub outstanding: u32,
    pub released: u32,
    pub framesize: Option<Resolution>,
    pub quality: u8,
    pub brightness: i8,
    pub contrast: i8,
}

impl MockSensor {
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size,
            fault: None,
            init_calls: 0,
            captures: 0,
            outstanding: 0,
            released: 0,
            framesize: None,
            quality: 0,
            brightness: 0,
            contrast: 0,
        }
    }

    /// Bytes of the frame the next capture will return
    pub fn frame_bytes(&self) -> Vec<u8> {
        let seed = self.captures as usize;
        (0..self.frame_size)
            .map(|i| match i {
                0 => 0xFF,
                1 => 0xD8,
                _ => ((i * 7 + seed) % 251) as u8,
            })
            .collect()
    }

    fn check_settings(&self) -> Result<(), SensorError> {
        match self.fault {
            Some(MockFault::RejectSettings) => Err(SensorError::Unsupported),
            _ => Ok(()),
        }
    }
}

impl ImageSensor for MockSensor {
    type Frame = MockFrame;

    fn init(&mut self) -> Result<(), SensorError> {
        self.init_calls += 1;
        match self.fault {
            Some(MockFault::InitFails) => Err(SensorError::NotDetected),
            _ => Ok(()),
        }
    }

    fn deinit(&mut self) {
        assert_eq!(self.outstanding, 0, "deinit with frames outstanding");
    }

    fn capture_frame(&mut self) -> Result<MockFrame, SensorError> {
        let format = match self.fault {
            Some(MockFault::NoFrame) => return Err(SensorError::NoFrame),
            Some(MockFault::WrongFormat) => FrameFormat::Rgb565,
            _ => FrameFormat::Jpeg,
        };
        let data = self.frame_bytes();
        self.captures += 1;
        self.outstanding += 1;
        Ok(MockFrame { data, format })
    }

    fn release_frame(&mut self, _frame: MockFrame) {
        assert!(self.outstanding > 0, "frame released twice");
        self.outstanding -= 1;
        self.released += 1;
    }

    fn set_framesize(&mut self, resolution: Resolution) -> Result<(), SensorError> {
        self.check_settings()?;
        self.framesize = Some(resolution);
        Ok(())
    }

    fn set_quality(&mut self, quality: u8) -> Result<(), SensorError> {
        self.check_settings()?;
        self.quality = quality;
        Ok(())
    }

    fn set_brightness(&mut self, level: i8) -> Result<(), SensorError> {
        self.check_settings()?;
        self.brightness = level;
        Ok(())
    }

    fn set_contrast(&mut self, level: i8) -> Result<(), SensorError> {
        self.check_settings()?;
        self.contrast = level;
        Ok(())
    }
}

/// READY line shared between the slave output and master input
#[derive(Clone, Default)]
pub struct SharedLine {
    level: Rc<Cell<bool>>,
    rising_edges: Rc<Cell<u32>>,
}

impl SharedLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rising_edges(&self) -> u32 {
        self.rising_edges.get()
    }
}

impl OutputPin for SharedLine {
    fn set_high(&mut self) {
        if !self.level.get() {
            self.rising_edges.set(self.rising_edges.get() + 1);
        }
        self.level.set(true);
    }

    fn set_low(&mut self) {
        self.level.set(false);
    }

    fn is_set_high(&self) -> bool {
        self.level.get()
    }
}

impl InputPin for SharedLine {
    fn is_high(&self) -> bool {
        self.level.get()
    }
}

/// Ready notification driven by the line's rising edge counter
pub struct EdgeWait {
    line: SharedLine,
    seen: u32,
    pub deliver: bool,
}

impl EdgeWait {
    pub fn new(line: SharedLine) -> Self {
        Self {
            seen: line.rising_edges(),
            line,
            deliver: true,
        }
    }
}

impl ReadyLatch for EdgeWait {
    fn clear(&mut self) {
        self.seen = self.line.rising_edges();
    }
}

impl ReadyWait for EdgeWait {
    fn wait(&mut self, _timeout_ms: u32) -> bool {
        if self.deliver && self.line.rising_edges() > self.seen {
            self.seen = self.line.rising_edges();
            true
        } else {
            false
        }
    }
}

/// Completes every delay at once and records what was asked for
#[derive(Default)]
pub struct InstantDelay {
    pub calls: u32,
    pub elapsed_ms: u32,
}

impl DelayNs for InstantDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.elapsed_ms += ns / 1_000_000;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.elapsed_ms += ms;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

/// Master bus that answers each transfer from a dispatcher in place
pub struct LoopbackSpi {
    pub dispatcher: Dispatcher<MockSensor, SharedLine>,
    pub fail_next: u32,
    /// Transfers let through before `fail_next` applies
    pub pass_first: u32,
    pub transfers: u32,
    /// Rewrites the response before the master sees it
    pub tamper: Option<fn(&mut [u8])>,
}

impl LoopbackSpi {
    pub fn new(dispatcher: Dispatcher<MockSensor, SharedLine>) -> Self {
        Self {
            dispatcher,
            fail_next: 0,
            pass_first: 0,
            transfers: 0,
            tamper: None,
        }
    }
}

impl SpiMaster for LoopbackSpi {
    type Error = BusFault;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), BusFault> {
        self.transfers += 1;
        if self.fail_next > 0 {
            if self.pass_first > 0 {
                self.pass_first -= 1;
            } else {
                self.fail_next -= 1;
                return Err(BusFault);
            }
        }
        read.fill(0);
        self.dispatcher.process(write, read);
        if let Some(tamper) = self.tamper {
            tamper(read);
        }
        Ok(())
    }
}
