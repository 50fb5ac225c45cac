//! Simulated ADS1115 for local development without hardware.
//!
//! Models the parts of the chip the driver touches:
//! - Config register latching, with OS reading back 0 while a conversion runs
//! - A conversion that completes after a random number of ready polls
//! - Single-ended inputs from a fixed per-channel voltage plus ADC noise
//! - Clipping at the selected gain's full-scale range

use std::convert::Infallible;
use std::time::Duration;

use crate::codes::Gain;
use crate::register::{Configuration, Register, OS_READY_BIT};
use crate::transport::Transport;

// ---------------------------------------------------------------------------
// Gaussian approximation (no extra dependency)
// ---------------------------------------------------------------------------

/// Approximate a sample from N(0,1) using the Irwin-Hall method:
/// sum of 12 uniform [0,1) values minus 6.
fn approx_std_normal() -> f32 {
    (0..12).map(|_| fastrand::f32()).sum::<f32>() - 6.0
}

// ---------------------------------------------------------------------------
// Simulated chip
// ---------------------------------------------------------------------------

/// An in-memory ADS1115 with four single-ended inputs.
pub struct SimTransport {
    /// Voltage on AIN0–AIN3.
    inputs: [f32; 4],
    /// ADC noise sigma in volts.
    noise_volts: f32,
    /// Upper bound on the polls a conversion stays busy for.
    max_busy_polls: u32,

    config: u16,
    busy_polls: u32,
    conversion: i16,
    real_time: bool,
}

impl SimTransport {
    /// `inputs` are the voltages seen on AIN0–AIN3.
    pub fn new(inputs: [f32; 4]) -> Self {
        Self {
            inputs,
            noise_volts: 0.002,
            max_busy_polls: 3,
            // Datasheet reset value.
            config: 0x8583,
            busy_polls: 0,
            conversion: 0,
            real_time: true,
        }
    }

    pub fn with_noise(mut self, sigma_volts: f32) -> Self {
        self.noise_volts = sigma_volts.max(0.0);
        self
    }

    /// Polls a conversion stays busy for is drawn from `0..=max`.
    pub fn with_max_busy_polls(mut self, max: u32) -> Self {
        self.max_busy_polls = max;
        self
    }

    /// Skip the actual delays; useful in tests.
    pub fn without_delays(mut self) -> Self {
        self.real_time = false;
        self
    }

    /// Change the voltage on one input.  Out-of-range channels are ignored.
    pub fn set_input(&mut self, channel: usize, volts: f32) {
        if let Some(v) = self.inputs.get_mut(channel) {
            *v = volts;
        }
    }

    fn start_conversion(&mut self) {
        let cfg = Configuration::from_register(self.config);
        let full_scale = Gain::from_bits(cfg.gain).full_scale_volts();
        let input = self.inputs[usize::from(cfg.channel)];
        let volts = input + self.noise_volts * approx_std_normal();
        let counts = (volts / full_scale * 32767.0).round().clamp(-32768.0, 32767.0);
        self.conversion = counts as i16;
        self.busy_polls = fastrand::u32(0..=self.max_busy_polls);
    }
}

impl Transport for SimTransport {
    type Error = Infallible;

    fn write16(&mut self, reg: Register, value: u16) -> Result<(), Infallible> {
        if reg == Register::Config {
            self.config = value & !OS_READY_BIT;
            if value & OS_READY_BIT != 0 {
                self.start_conversion();
            }
        }
        Ok(())
    }

    fn read16(&mut self, reg: Register) -> Result<u16, Infallible> {
        Ok(match reg {
            Register::Config => {
                if self.busy_polls > 0 {
                    self.busy_polls -= 1;
                    self.config
                } else {
                    self.config | OS_READY_BIT
                }
            }
            Register::Conversion => self.conversion as u16,
        })
    }

    fn sleep(&mut self, duration: Duration) {
        if self.real_time {
            std::thread::sleep(duration);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
