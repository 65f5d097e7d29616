//! Adapters from `embedded-hal` 1.0 types
//!
//! Lets board firmware hand chip-HAL pins and SPI devices straight to the
//! camera link. Only the master side is covered: `embedded-hal` has no
//! SPI slave trait.

use core::cell::RefCell;

use embedded_hal::digital::{InputPin as EhInputPin, OutputPin as EhOutputPin};
use embedded_hal::spi::SpiDevice;

use crate::gpio::{InputPin, OutputPin};
use crate::spi::SpiMaster;

/// Wraps an `embedded-hal` SPI device (bus plus chip select)
pub struct EhSpiMaster<D> {
    device: D,
}

impl<D: SpiDevice> EhSpiMaster<D> {
    /// Wrap a SPI device
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Release the wrapped device
    pub fn free(self) -> D {
        self.device
    }
}

impl<D: SpiDevice> SpiMaster for EhSpiMaster<D> {
    type Error = D::Error;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.device.transfer(read, write)
    }
}

/// Wraps an `embedded-hal` output pin
///
/// Pin errors are ignored: push-pull GPIO on the supported chips is
/// infallible. The commanded level is tracked locally.
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P: EhOutputPin> EhOutput<P> {
    /// Wrap an output pin and drive it low
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, high: false }
    }

    /// Release the wrapped pin
    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: EhOutputPin> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Wraps an `embedded-hal` input pin
pub struct EhInput<P> {
    pin: RefCell<P>,
}

impl<P: EhInputPin> EhInput<P> {
    /// Wrap an input pin
    pub fn new(pin: P) -> Self {
        Self {
            pin: RefCell::new(pin),
        }
    }
}

impl<P: EhInputPin> InputPin for EhInput<P> {
    fn is_high(&self) -> bool {
        self.pin.borrow_mut().is_high().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::spi::{ErrorType as SpiErrorType, Operation};

    #[derive(Default)]
    struct FakePin {
        high: bool,
        writes: u32,
    }

    impl PinErrorType for FakePin {
        type Error = Infallible;
    }

    impl EhOutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    impl EhInputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.high)
        }
    }

    /// Echoes each written byte back inverted
    struct InvertingDevice;

    impl SpiErrorType for InvertingDevice {
        type Error = Infallible;
    }

    impl SpiDevice for InvertingDevice {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            for op in operations {
                if let Operation::Transfer(read, write) = op {
                    for (r, w) in read.iter_mut().zip(write.iter()) {
                        *r = !*w;
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_output_starts_low() {
        let pin = FakePin {
            high: true,
            writes: 0,
        };
        let out = EhOutput::new(pin);
        assert!(!out.is_set_high());
        let pin = out.free();
        assert!(!pin.high);
        assert_eq!(pin.writes, 1);
    }

    #[test]
    fn test_output_tracks_level() {
        let mut out = EhOutput::new(FakePin::default());
        out.set_high();
        assert!(out.is_set_high());
        out.set_level(false);
        assert!(!out.is_set_high());
        assert!(!out.free().high);
    }

    #[test]
    fn test_input_reads_pin() {
        let input = EhInput::new(FakePin {
            high: true,
            writes: 0,
        });
        assert!(input.is_high());
        assert!(!input.is_low());
    }

    #[test]
    fn test_spi_transfer_passthrough() {
        let mut spi = EhSpiMaster::new(InvertingDevice);
        let mut read = [0u8; 3];
        spi.transfer(&mut read, &[0x00, 0x0F, 0xFF]).unwrap();
        assert_eq!(read, [0xFF, 0xF0, 0x00]);
    }
}
