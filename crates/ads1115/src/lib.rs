//! Single-shot driver for the TI ADS1115 16-bit I2C ADC.
//!
//! ```no_run
//! # #[cfg(feature = "i2c")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use ads1115::{Ads1115, RppalTransport};
//!
//! let mut adc = Ads1115::new(RppalTransport::open(1, 0x48)?);
//! let volts = adc.read_single_shot_blocking(0, 1)?; // AIN0, ±4.096 V
//! println!("{volts:.4} V");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "i2c"))]
//! # fn main() {}
//! ```

pub mod codes;
pub mod driver;
pub mod error;
pub mod register;
#[cfg(feature = "sim")]
pub mod sim;
pub mod transport;

pub use codes::{is_valid_sample_rate, max_gain_for, sample_rate_for, DataRate, Gain};
pub use driver::{Ads1115, PollSettings};
pub use error::{CodeError, CodeField, Error};
pub use register::{Configuration, OperationMode, Register};
#[cfg(feature = "sim")]
pub use sim::SimTransport;
#[cfg(feature = "i2c")]
pub use transport::RppalTransport;
pub use transport::Transport;
