//! Host simulation of the camlink SPI camera link
//!
//! Wires a master [`CameraClient`] to a slave [`Dispatcher`] through an
//! in-memory bus, with a simulated sensor and a READY line that posts a
//! semaphore on its rising edge.
//!
//! [`Dispatcher`]: camlink_core::Dispatcher

pub mod config;
pub mod error;
pub mod link;
pub mod sensor;

use std::sync::{Arc, Mutex};

use camlink_core::capture::CaptureManager;
use camlink_core::{CameraClient, Dispatcher, MasterLinkState, SlaveLinkState};
use tracing::{debug, info, warn};

pub use config::SimConfig;
pub use error::{BusError, SimError};
pub use link::{
    lock_slave, FaultInjector, LoopbackBus, ReadyLine, ReadySemaphore, SimDispatcher, SlaveHandle,
};
pub use sensor::{SensorConfig, SensorFault, SimFrame, SimSensor};

pub type SimClient = CameraClient<LoopbackBus, ReadyLine, ReadySemaphore>;

/// Both ends of a simulated link
pub struct Simulation {
    pub client: SimClient,
    pub slave: SlaveHandle,
    pub line: ReadyLine,
    pub faults: FaultInjector,
}

impl Simulation {
    /// Build the link and bring both sides up
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let sim = Self::unstarted(config)?;
        {
            let mut slave = lock_slave(&sim.slave);
            slave.camera_mut().init().map_err(|e| {
                warn!(?e, "Camera init failed");
                SimError::CameraInit
            })?;
        }
        Ok(sim)
    }

    /// Build the link without initializing the camera
    pub fn unstarted(config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        debug!(
            master_ready = config.pins.master.ready,
            slave_ready = config.pins.slave.ready,
            "READY line wired"
        );

        let semaphore = ReadySemaphore::new();
        let line = ReadyLine::new(semaphore.clone());

        let camera =
            CaptureManager::with_settings(SimSensor::new(config.sensor), config.camera.settings()?);
        let slave: SlaveHandle = Arc::new(Mutex::new(Dispatcher::new(camera, line.clone())));

        let bus = LoopbackBus::new(slave.clone(), config.link.spi_config()?);
        let faults = bus.fault_injector();
        let client = CameraClient::new(bus, line.clone(), semaphore, config.link);

        Ok(Self {
            client,
            slave,
            line,
            faults,
        })
    }

    /// Snapshot of the slave's link state
    pub fn slave_state(&self) -> SlaveLinkState {
        lock_slave(&self.slave).link_state()
    }

    pub fn master_state(&self) -> MasterLinkState {
        *self.client.link_state()
    }

    /// Capture and fetch `count` images, returning the last one
    pub fn run_captures(&mut self, count: u32) -> Result<Vec<u8>, SimError> {
        if !self.client.init() {
            return Err(SimError::CameraInit);
        }

        let mut buffer = vec![0u8; camlink_protocol::MAX_IMAGE_SIZE];
        let mut last = Vec::new();
        for n in 1..=count {
            let size = self.client.capture_and_get(&mut buffer)?;
            info!(capture = n, size, "Image fetched");
            last.clear();
            last.extend_from_slice(&buffer[..size]);
        }
        Ok(last)
    }
}
