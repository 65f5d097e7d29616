//! Slave command dispatcher
//!
//! Decodes command packets, drives the capture manager and the READY
//! line, and writes responses into the outgoing transaction buffer.
//!
//! Two entry points share the same dispatch logic:
//!
//! - [`Dispatcher::process`] answers within the transaction that carried
//!   the command, for transports that can turn a response around in time.
//! - [`Dispatcher::serve`] runs one cycle of a blocking slave loop. The
//!   response to a command is clocked out on the *next* transaction; when
//!   the previous cycle produced nothing, the outgoing buffer carries the
//!   current status instead.

use camlink_hal::{OutputPin, SpiSlave};
use camlink_protocol::{
    Command, CommandPacket, ConfigInfo, ErrorCode, GetImageReq, ImageInfo, Resolution,
    ResponseHeader, Status, CHUNK_SIZE, RESPONSE_HEADER_SIZE,
};

use crate::capture::CaptureManager;
use crate::indicator::LedMode;
use crate::link::SlaveLinkState;
use crate::state::{Event, SlaveState};
use crate::traits::ImageSensor;

/// Serves commands from the master
pub struct Dispatcher<S: ImageSensor, P: OutputPin> {
    camera: CaptureManager<S>,
    ready_pin: P,
    state: SlaveState,
    link: SlaveLinkState,
    /// Outgoing buffer holds a response produced last cycle
    staged: bool,
}

impl<S: ImageSensor, P: OutputPin> Dispatcher<S, P> {
    /// Create a dispatcher; the READY line is driven low
    pub fn new(camera: CaptureManager<S>, mut ready_pin: P) -> Self {
        ready_pin.set_low();
        Self {
            camera,
            ready_pin,
            state: SlaveState::Idle,
            link: SlaveLinkState::default(),
            staged: false,
        }
    }

    pub fn state(&self) -> SlaveState {
        self.state
    }

    pub fn link_state(&self) -> SlaveLinkState {
        self.link
    }

    pub fn is_busy(&self) -> bool {
        self.link.is_busy()
    }

    pub fn camera(&self) -> &CaptureManager<S> {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CaptureManager<S> {
        &mut self.camera
    }

    pub fn ready_pin(&self) -> &P {
        &self.ready_pin
    }

    /// LED mode for the current state
    pub fn led_mode(&self) -> LedMode {
        if !self.camera.is_initialized() {
            return LedMode::Off;
        }
        match self.state {
            SlaveState::Idle => LedMode::Idle,
            SlaveState::Capturing | SlaveState::Processing => LedMode::Capturing,
            SlaveState::Ready => LedMode::Ready,
            SlaveState::Transferring => LedMode::Transferring,
            SlaveState::Error => LedMode::Error,
        }
    }

    /// Status header the slave reports when it has no fresh response
    pub fn status_header(&self) -> ResponseHeader {
        ResponseHeader::new(self.link.status, self.link.last_error, 0, 0)
    }

    /// Run one blocking slave transaction
    ///
    /// SPI errors are counted and returned; the caller keeps looping.
    pub fn serve<SPI: SpiSlave>(
        &mut self,
        spi: &mut SPI,
        rx: &mut [u8],
        tx: &mut [u8],
    ) -> Result<(), SPI::Error> {
        if !self.staged {
            self.prefill(tx);
        }

        let received = match spi.transaction(rx, tx) {
            Ok(n) => n.min(rx.len()),
            Err(e) => {
                self.link.errors = self.link.errors.wrapping_add(1);
                self.staged = false;
                warn!("SPI slave transaction failed");
                return Err(e);
            }
        };

        self.staged = self.process(&rx[..received], tx).is_some();
        Ok(())
    }

    /// Serve transactions forever
    pub fn run<SPI: SpiSlave>(&mut self, spi: &mut SPI, rx: &mut [u8], tx: &mut [u8]) -> ! {
        info!("Dispatcher running");
        loop {
            // Errors are already counted
            let _ = self.serve(spi, rx, tx);
        }
    }

    /// Decode and execute one command
    ///
    /// Returns the response length written to `tx`, or `None` when the
    /// packet was malformed and no response is due. `tx` should hold at
    /// least a header plus one chunk; image data is capped to fit.
    pub fn process(&mut self, rx: &[u8], tx: &mut [u8]) -> Option<usize> {
        let packet = match CommandPacket::decode(rx) {
            Ok(p) => p,
            Err(e) => {
                trace!("Discarding packet: {:?}", e);
                return None;
            }
        };
        if tx.len() < RESPONSE_HEADER_SIZE {
            return None;
        }

        self.link.commands_received = self.link.commands_received.wrapping_add(1);
        self.link.sequence = packet.sequence;

        let (header, data_len) = self.dispatch(&packet, &mut tx[RESPONSE_HEADER_SIZE..]);
        let len = header.encode(tx).ok()?;
        Some(len + data_len)
    }

    fn prefill(&self, tx: &mut [u8]) {
        tx.fill(0);
        // Buffer shorter than a header gets zeros only
        let _ = self.status_header().encode(tx);
    }

    fn dispatch(&mut self, packet: &CommandPacket<'_>, data: &mut [u8]) -> (ResponseHeader, usize) {
        let seq = packet.sequence;

        let Some(command) = packet.kind() else {
            warn!("Unknown command {}", packet.command);
            self.link.errors = self.link.errors.wrapping_add(1);
            return (Self::error(ErrorCode::UnknownCommand, seq), 0);
        };
        debug!("Command {:?} seq {}", command, seq);

        match command {
            Command::Nop | Command::GetStatus => (
                ResponseHeader::new(self.link.status, self.link.last_error, seq, 0),
                0,
            ),
            Command::Ping => (ResponseHeader::status_only(Status::Idle, seq), 0),
            Command::CapturePhoto => (self.capture(seq), 0),
            Command::GetImageInfo => self.image_info(seq, data),
            Command::GetImageData => self.image_data(seq, packet.payload, data),
            Command::AbortTransfer => {
                self.apply(Event::Abort);
                info!("Transfer aborted");
                (
                    ResponseHeader::new(Status::Idle, ErrorCode::TransferAborted, seq, 0),
                    0,
                )
            }
            Command::SetResolution => {
                let result = match packet.payload.first().copied().map(Resolution::from_byte) {
                    Some(Some(res)) => self.camera.set_resolution(res).is_ok(),
                    _ => false,
                };
                (Self::setting_response(result, seq), 0)
            }
            Command::SetQuality => {
                let result = match packet.payload.first() {
                    Some(&q) => self.camera.set_quality(q).is_ok(),
                    None => false,
                };
                (Self::setting_response(result, seq), 0)
            }
            Command::SetBrightness => {
                let result = match packet.payload.first() {
                    Some(&b) => self.camera.set_brightness(b as i8).is_ok(),
                    None => false,
                };
                (Self::setting_response(result, seq), 0)
            }
            Command::SetContrast => {
                let result = match packet.payload.first() {
                    Some(&c) => self.camera.set_contrast(c as i8).is_ok(),
                    None => false,
                };
                (Self::setting_response(result, seq), 0)
            }
            Command::GetConfig => self.config(seq, data),
            Command::Reset => {
                self.apply(Event::Reset);
                self.link.last_error = ErrorCode::None;
                info!("Reset");
                (ResponseHeader::status_only(Status::Idle, seq), 0)
            }
        }
    }

    fn capture(&mut self, seq: u8) -> ResponseHeader {
        if self.state.holds_image() {
            debug!("Capture replaces held image");
        }
        self.set_ready(false);
        self.apply(Event::CaptureStarted);

        match self.camera.capture() {
            Ok(()) => {
                self.apply(Event::CaptureSucceeded);
                self.link.last_error = ErrorCode::None;
                self.set_ready(true);
                info!("Capture complete, {} bytes", self.camera.image_size());
                ResponseHeader::status_only(Status::Ready, seq)
            }
            Err(e) => {
                self.apply(Event::CaptureFailed);
                let code = e.error_code();
                self.link.last_error = code;
                self.link.errors = self.link.errors.wrapping_add(1);
                error!("Capture failed: {:?}", e);
                Self::error(code, seq)
            }
        }
    }

    fn image_info(&mut self, seq: u8, data: &mut [u8]) -> (ResponseHeader, usize) {
        let Ok(info) = self.camera.info() else {
            return (Self::error(ErrorCode::NoImage, seq), 0);
        };
        if data.len() < ImageInfo::SIZE {
            return (Self::error(ErrorCode::BufferOverflow, seq), 0);
        }
        data[..ImageInfo::SIZE].copy_from_slice(&info.to_bytes());
        (
            ResponseHeader::new(Status::Ready, ErrorCode::None, seq, ImageInfo::SIZE as u32),
            ImageInfo::SIZE,
        )
    }

    fn image_data(&mut self, seq: u8, payload: &[u8], data: &mut [u8]) -> (ResponseHeader, usize) {
        let size = self.camera.image_size();
        if !self.camera.is_ready() {
            return (Self::error(ErrorCode::NoImage, seq), 0);
        }
        let Ok(req) = GetImageReq::from_bytes(payload) else {
            return (Self::error(ErrorCode::InvalidParam, seq), 0);
        };

        let offset = req.offset as usize;
        if offset >= size {
            debug!("Offset {} past image end {}", offset, size);
            return (Self::error(ErrorCode::InvalidParam, seq), 0);
        }

        let remaining = size - offset;
        let requested = req.length as usize;
        let chunk = if requested > 0 && requested < remaining {
            requested
        } else {
            remaining
        };
        let chunk = chunk.min(CHUNK_SIZE).min(data.len());

        if let Some(image) = self.camera.image() {
            data[..chunk].copy_from_slice(&image[offset..offset + chunk]);
        }
        self.link.bytes_transferred = self.link.bytes_transferred.wrapping_add(chunk as u32);

        if offset + chunk >= size {
            self.apply(Event::TransferComplete);
            info!("Transfer complete, {} bytes", size);
        } else {
            self.apply(Event::ChunkSent);
        }

        (
            ResponseHeader::new(Status::Transferring, ErrorCode::None, seq, chunk as u32),
            chunk,
        )
    }

    fn config(&self, seq: u8, data: &mut [u8]) -> (ResponseHeader, usize) {
        if data.len() < ConfigInfo::SIZE {
            return (Self::error(ErrorCode::BufferOverflow, seq), 0);
        }
        data[..ConfigInfo::SIZE].copy_from_slice(&self.camera.config().to_bytes());
        (
            ResponseHeader::new(Status::Idle, ErrorCode::None, seq, ConfigInfo::SIZE as u32),
            ConfigInfo::SIZE,
        )
    }

    fn apply(&mut self, event: Event) {
        if event.releases_image() {
            self.release_image();
        }
        let next = self.state.transition(event);
        if next != self.state {
            trace!("{:?} -> {:?}", self.state, next);
        }
        self.state = next;
        self.link.status = next.status();
    }

    fn release_image(&mut self) {
        self.camera.clear_image();
        self.set_ready(false);
    }

    fn set_ready(&mut self, ready: bool) {
        self.ready_pin.set_level(ready);
    }

    fn setting_response(accepted: bool, seq: u8) -> ResponseHeader {
        if accepted {
            ResponseHeader::status_only(Status::Idle, seq)
        } else {
            Self::error(ErrorCode::InvalidParam, seq)
        }
    }

    fn error(code: ErrorCode, seq: u8) -> ResponseHeader {
        ResponseHeader::new(Status::Error, code, seq, 0)
    }
}
