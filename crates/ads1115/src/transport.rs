//! The bus capability the driver needs: 16-bit register access plus a delay.
//! The `i2c` feature gates the real rppal transport.

use std::time::Duration;

use crate::register::Register;

/// 16-bit register access to one device on an I2C bus.
///
/// Values are host order; implementations put them on the wire big-endian,
/// which is what the ADS1115 expects.
pub trait Transport {
    type Error: std::error::Error + 'static;

    fn write16(&mut self, reg: Register, value: u16) -> Result<(), Self::Error>;

    fn read16(&mut self, reg: Register) -> Result<u16, Self::Error>;

    /// Block the caller for `duration`.
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ---------------------------------------------------------------------------
// Real I2C transport (production — requires rppal + Raspberry Pi hardware)
// ---------------------------------------------------------------------------
#[cfg(feature = "i2c")]
pub use self::rpi::RppalTransport;

#[cfg(feature = "i2c")]
mod rpi {
    use rppal::i2c::I2c;

    use super::Transport;
    use crate::register::Register;

    /// ADS1115 access through `/dev/i2c-<bus>` via `rppal::i2c`.
    pub struct RppalTransport {
        i2c: I2c,
    }

    impl RppalTransport {
        /// Open `bus` and address the chip at `addr` (0x48–0x4B).
        pub fn open(bus: u8, addr: u16) -> Result<Self, rppal::i2c::Error> {
            let mut i2c = I2c::with_bus(bus)?;
            i2c.set_slave_address(addr)?;

            tracing::info!(
                bus,
                addr = format_args!("0x{addr:02x}"),
                "ads1115 i2c transport opened"
            );

            Ok(Self { i2c })
        }
    }

    impl Transport for RppalTransport {
        type Error = rppal::i2c::Error;

        fn write16(&mut self, reg: Register, value: u16) -> Result<(), Self::Error> {
            self.i2c.block_write(reg.addr(), &value.to_be_bytes())
        }

        fn read16(&mut self, reg: Register) -> Result<u16, Self::Error> {
            let mut buf = [0u8; 2];
            self.i2c.block_read(reg.addr(), &mut buf)?;
            Ok(u16::from_be_bytes(buf))
        }
    }
}
