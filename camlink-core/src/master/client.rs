//! Master protocol client
//!
//! Every call is one synchronous SPI transaction: the command packet goes
//! out while the response header (and data) comes back. The transaction is
//! sized to the larger of the two.
//!
//! ```text
//! capture_photo ──► wait_ready ──► get_image_info ──► GET_IMAGE_DATA × n
//!                    │ pin high?                        offset += data_len
//!                    │ edge notification
//!                    └ GET_STATUS == READY
//! ```
//!
//! `wait_ready` blocks on a [`ReadyWait`]; `wait_ready_async` awaits an
//! [`AsyncReadyWait`] so a bare-metal executor can sleep through it.

use camlink_hal::{AsyncReadyWait, InputPin, ReadyLatch, ReadyWait, SpiMaster};
use camlink_protocol::{
    crc16, Command, CommandPacket, ConfigInfo, ErrorCode, GetImageReq, ImageInfo, ProtocolError,
    Resolution, ResponseHeader, Status, CHUNK_SIZE, RESPONSE_HEADER_SIZE,
    TRANSACTION_BUFFER_SIZE,
};

use super::error::ClientError;
use crate::config::LinkConfig;
use crate::link::MasterLinkState;

type Result<T, E> = core::result::Result<T, ClientError<E>>;

/// Client for the camera sub-module
pub struct CameraClient<SPI, PIN, W> {
    spi: SPI,
    ready_pin: PIN,
    ready_wait: W,
    config: LinkConfig,
    link: MasterLinkState,
    tx: [u8; TRANSACTION_BUFFER_SIZE],
    rx: [u8; TRANSACTION_BUFFER_SIZE],
}

impl<SPI, PIN, W> CameraClient<SPI, PIN, W>
where
    SPI: SpiMaster,
    PIN: InputPin,
    W: ReadyLatch,
{
    pub fn new(spi: SPI, ready_pin: PIN, ready_wait: W, config: LinkConfig) -> Self {
        Self {
            spi,
            ready_pin,
            ready_wait,
            config,
            link: MasterLinkState::default(),
            tx: [0; TRANSACTION_BUFFER_SIZE],
            rx: [0; TRANSACTION_BUFFER_SIZE],
        }
    }

    /// Check that the slave answers
    ///
    /// Returns whether it answered. A silent slave is not fatal; later
    /// calls retry the link.
    pub fn init(&mut self) -> bool {
        match self.ping() {
            Ok(()) => {
                info!("Camera module connected");
                true
            }
            Err(e) if e.is_bus() => {
                warn!("Camera module not responding");
                false
            }
            Err(e) => {
                warn!("Camera module answered with {:?}", e.device_code());
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.connected
    }

    pub fn link_state(&self) -> &MasterLinkState {
        &self.link
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Release the bus, pin and notification
    pub fn free(self) -> (SPI, PIN, W) {
        (self.spi, self.ready_pin, self.ready_wait)
    }

    pub fn ping(&mut self) -> Result<(), SPI::Error> {
        let header = self.transact(Command::Ping, &[], 0)?;
        Self::check(header).map(|_| ())
    }

    /// Current slave status and last error
    pub fn get_status(&mut self) -> Result<(Status, ErrorCode), SPI::Error> {
        let header = self.transact(Command::GetStatus, &[], 0)?;
        Ok((header.status, header.error))
    }

    /// Ask the slave to capture
    ///
    /// Does not wait for the image; follow with [`wait_ready`](Self::wait_ready).
    pub fn capture_photo(&mut self) -> Result<(), SPI::Error> {
        self.link.captures_requested = self.link.captures_requested.wrapping_add(1);
        self.ready_wait.clear();

        let header = self.transact(Command::CapturePhoto, &[], 0)?;
        Self::check(header)?;
        debug!("Capture requested, slave status {:?}", header.status);
        Ok(())
    }

    /// Non-blocking check for a waiting image
    pub fn image_ready(&self) -> bool {
        self.ready_pin.is_high() || self.link.last_status == Status::Ready
    }

    pub fn get_image_info(&mut self) -> Result<ImageInfo, SPI::Error> {
        let header = self.transact(Command::GetImageInfo, &[], ImageInfo::SIZE)?;
        Self::check(header)?;
        let info = ImageInfo::from_bytes(self.response_data(&header))?;

        self.link.last_image_size = info.image_size;
        self.link.last_image_width = info.width;
        self.link.last_image_height = info.height;
        Ok(info)
    }

    /// Read the held image into `buffer`
    ///
    /// Returns the image size. The slave decides each chunk's length; the
    /// offset advances by what it actually sent. A failed read is not
    /// resumed; the caller retries from the start or aborts. Only failures
    /// after the first chunk request count as transfer errors.
    pub fn get_image(&mut self, buffer: &mut [u8]) -> Result<usize, SPI::Error> {
        let info = self.get_image_info()?;
        let size = info.image_size as usize;
        if size > buffer.len() {
            return Err(ClientError::BufferTooSmall {
                needed: size,
                available: buffer.len(),
            });
        }

        match self.receive_image(&mut buffer[..size], &info) {
            Ok(()) => {
                self.link.captures_completed = self.link.captures_completed.wrapping_add(1);
                info!("Image received: {} bytes ({}x{})", size, info.width, info.height);
                Ok(size)
            }
            Err(e) => {
                self.link.transfer_errors = self.link.transfer_errors.wrapping_add(1);
                Err(e)
            }
        }
    }

    /// Drop the held image on the slave
    pub fn abort_transfer(&mut self) -> Result<(), SPI::Error> {
        let header = self.transact(Command::AbortTransfer, &[], 0)?;
        match header.error {
            ErrorCode::None | ErrorCode::TransferAborted => Ok(()),
            code => Err(ClientError::Device(code)),
        }
    }

    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), SPI::Error> {
        self.set(Command::SetResolution, resolution.to_byte())
    }

    /// Set quality on the external 1-100 scale
    pub fn set_quality(&mut self, quality: u8) -> Result<(), SPI::Error> {
        if !(1..=100).contains(&quality) {
            return Err(ClientError::InvalidArgument);
        }
        self.set(Command::SetQuality, quality)
    }

    pub fn set_brightness(&mut self, level: i8) -> Result<(), SPI::Error> {
        if !(-2..=2).contains(&level) {
            return Err(ClientError::InvalidArgument);
        }
        self.set(Command::SetBrightness, level as u8)
    }

    pub fn set_contrast(&mut self, level: i8) -> Result<(), SPI::Error> {
        if !(-2..=2).contains(&level) {
            return Err(ClientError::InvalidArgument);
        }
        self.set(Command::SetContrast, level as u8)
    }

    pub fn get_config(&mut self) -> Result<ConfigInfo, SPI::Error> {
        let header = self.transact(Command::GetConfig, &[], ConfigInfo::SIZE)?;
        Self::check(header)?;
        let config = ConfigInfo::from_bytes(self.response_data(&header))?;
        if !config.is_compatible() {
            warn!(
                "Slave protocol {}.{} differs from ours",
                config.protocol_major,
                config.protocol_minor
            );
        }
        Ok(config)
    }

    /// Soft reset of the camera module
    pub fn reset(&mut self) -> Result<(), SPI::Error> {
        let header = self.transact(Command::Reset, &[], 0)?;
        Self::check(header).map(|_| ())
    }

    fn set(&mut self, command: Command, value: u8) -> Result<(), SPI::Error> {
        let header = self.transact(command, &[value], 0)?;
        Self::check(header).map(|_| ())
    }

    fn receive_image(&mut self, image: &mut [u8], info: &ImageInfo) -> Result<(), SPI::Error> {
        self.read_chunks(image)?;

        if self.config.verify_checksum {
            let actual = crc16(image);
            if actual != info.checksum {
                warn!("Checksum mismatch: expected {}, got {}", info.checksum, actual);
                return Err(ClientError::ChecksumMismatch {
                    expected: info.checksum,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn read_chunks(&mut self, image: &mut [u8]) -> Result<(), SPI::Error> {
        let size = image.len();
        let chunk_size = (self.config.chunk_size as usize).clamp(1, CHUNK_SIZE);
        let mut offset = 0;

        while offset < size {
            let request = (size - offset).min(chunk_size);
            let req = GetImageReq::new(offset as u32, request as u16);
            let header = self.transact(Command::GetImageData, &req.to_bytes(), request)?;
            Self::check(header)?;

            let received = header.data_len as usize;
            if received == 0 || received > request {
                warn!("Bad chunk length {} at offset {}", received, offset);
                return Err(ClientError::Protocol(ProtocolError::LengthMismatch));
            }

            image[offset..offset + received].copy_from_slice(self.response_data(&header));
            offset += received;
            trace!("Chunk {} bytes, {}/{}", received, offset, size);
        }
        Ok(())
    }

    /// Run one command transaction
    ///
    /// `data_len` is the response data the caller expects after the header.
    fn transact(
        &mut self,
        command: Command,
        payload: &[u8],
        data_len: usize,
    ) -> Result<ResponseHeader, SPI::Error> {
        let packet = CommandPacket::new(command, self.link.next_sequence(), payload)?;
        let tx_len = packet.encode(&mut self.tx)?;
        let len = tx_len.max(RESPONSE_HEADER_SIZE + data_len);
        if len > TRANSACTION_BUFFER_SIZE {
            return Err(ClientError::Protocol(ProtocolError::BufferTooSmall));
        }
        self.tx[tx_len..len].fill(0);

        if let Err(e) = self.spi.transfer(&mut self.rx[..len], &self.tx[..len]) {
            self.link.connected = false;
            warn!("SPI transfer failed for {:?}", command);
            return Err(ClientError::Bus(e));
        }

        let header = match ResponseHeader::decode(&self.rx[..len]) {
            Ok(h) => h,
            Err(e) => {
                self.link.connected = false;
                return Err(ClientError::Protocol(e));
            }
        };
        // A floating MISO reads as all ones and lands here
        if header.data_len as usize > len - RESPONSE_HEADER_SIZE {
            self.link.connected = false;
            warn!("Response claims {} data bytes for {:?}", header.data_len, command);
            return Err(ClientError::Protocol(ProtocolError::LengthMismatch));
        }

        // TRANSFER_ABORTED is the normal answer to ABORT_TRANSFER
        self.link.connected = matches!(header.error, ErrorCode::None | ErrorCode::TransferAborted);
        self.link.last_status = header.status;
        self.link.last_error = header.error;
        Ok(header)
    }

    fn response_data(&self, header: &ResponseHeader) -> &[u8] {
        let end = RESPONSE_HEADER_SIZE + header.data_len as usize;
        &self.rx[RESPONSE_HEADER_SIZE..end]
    }

    /// One GET_STATUS after the READY notification timed out
    fn ready_fallback(&mut self, timeout_ms: u32) -> Result<(), SPI::Error> {
        debug!("No READY edge after {} ms, polling status", timeout_ms);
        match self.get_status()? {
            (Status::Ready, _) => Ok(()),
            (Status::Error, code) => Err(ClientError::Device(code)),
            _ => Err(ClientError::Timeout),
        }
    }

    fn check(header: ResponseHeader) -> Result<ResponseHeader, SPI::Error> {
        if header.error.is_error() {
            Err(ClientError::Device(header.error))
        } else {
            Ok(header)
        }
    }
}

impl<SPI, PIN, W> CameraClient<SPI, PIN, W>
where
    SPI: SpiMaster,
    PIN: InputPin,
    W: ReadyWait,
{
    /// Wait until the slave holds an image
    ///
    /// Checks the READY line, then blocks on the edge notification, then
    /// asks for status once in case the edge was missed.
    pub fn wait_ready(&mut self, timeout_ms: u32) -> Result<(), SPI::Error> {
        if self.ready_pin.is_high() {
            return Ok(());
        }
        if self.ready_wait.wait(timeout_ms) {
            return Ok(());
        }
        self.ready_fallback(timeout_ms)
    }

    /// Capture, wait for READY and read the image
    pub fn capture_and_get(&mut self, buffer: &mut [u8]) -> Result<usize, SPI::Error> {
        self.capture_photo()?;
        self.wait_ready(self.config.capture_timeout_ms)?;
        self.get_image(buffer)
    }
}

impl<SPI, PIN, W> CameraClient<SPI, PIN, W>
where
    SPI: SpiMaster,
    PIN: InputPin,
    W: AsyncReadyWait,
{
    /// [`wait_ready`](Self::wait_ready) for async executors
    ///
    /// The task is suspended while waiting for the edge; the SPI
    /// transactions around it stay blocking.
    pub async fn wait_ready_async(&mut self, timeout_ms: u32) -> Result<(), SPI::Error> {
        if self.ready_pin.is_high() {
            return Ok(());
        }
        if self.ready_wait.wait(timeout_ms).await {
            return Ok(());
        }
        self.ready_fallback(timeout_ms)
    }

    pub async fn capture_and_get_async(
        &mut self,
        buffer: &mut [u8],
    ) -> Result<usize, SPI::Error> {
        self.capture_photo()?;
        self.wait_ready_async(self.config.capture_timeout_ms).await?;
        self.get_image(buffer)
    }
}
