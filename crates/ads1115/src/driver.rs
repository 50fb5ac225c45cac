//! Single-shot ADS1115 driver.
//!
//! One conversion cycle goes Idle → config written → polling → ready → Idle.
//! The driver keeps a copy of the last configuration it wrote so a raw
//! sample can be scaled by the gain that produced it.  Anything else that
//! reprograms the chip's PGA behind the driver's back breaks that scaling,
//! so share one instance (behind one lock) per physical chip.

use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;
use crate::register::{is_conversion_ready, Configuration, Register};
use crate::transport::Transport;

/// Full-scale positive count of the signed 16-bit conversion result.
const FULL_SCALE_COUNTS: f32 = 32767.0;

// ── Polling ─────────────────────────────────────────────────────────────────

/// Timing for config writes and the conversion-ready poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Delay between config register reads while waiting for a conversion.
    pub poll_interval_ms: u64,
    /// Config register reads before giving up with a timeout.  0 counts as 1.
    pub max_attempts: u32,
    /// Delay after every config write.
    pub settle_ms: u64,
}

impl Default for PollSettings {
    /// 1 ms spacing, ~1 s ceiling: comfortably above the 125 ms an 8 SPS
    /// conversion takes.
    fn default() -> Self {
        Self {
            poll_interval_ms: 1,
            max_attempts: 1000,
            settle_ms: 1,
        }
    }
}

impl PollSettings {
    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

// ── Driver ──────────────────────────────────────────────────────────────────

/// ADS1115 driver over any [`Transport`].
pub struct Ads1115<T> {
    transport: T,
    settings: PollSettings,
    last_config: Configuration,
}

impl<T: Transport> Ads1115<T> {
    pub fn new(transport: T) -> Self {
        Self::with_settings(transport, PollSettings::default())
    }

    pub fn with_settings(transport: T, settings: PollSettings) -> Self {
        Self {
            transport,
            settings,
            last_config: Configuration::default(),
        }
    }

    /// The configuration most recently written through this driver.  All
    /// fields are zero until the first write.
    pub fn last_config(&self) -> &Configuration {
        &self.last_config
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give the transport back.
    pub fn release(self) -> T {
        self.transport
    }

    /// Write `config` to the chip and remember it for later scaling.
    pub fn write_config(&mut self, config: Configuration) -> Result<(), Error<T::Error>> {
        let value = config.to_register();
        self.last_config = config;

        tracing::debug!(
            register = format_args!("0x{value:04x}"),
            channel = config.channel,
            gain = config.gain,
            "ads1115 config write"
        );

        self.transport
            .write16(Register::Config, value)
            .map_err(Error::Transport)?;
        self.transport.sleep(self.settings.settle());
        Ok(())
    }

    /// Start a single-ended, single-shot conversion of `channel` at 128 SPS.
    pub fn start_single_shot(&mut self, channel: u8, gain: u8) -> Result<(), Error<T::Error>> {
        self.write_config(Configuration::single_shot(channel, gain))
    }

    /// Start a conversion, wait for it, and return the result in volts.
    ///
    /// Fails with [`Error::ConversionTimeout`] when the chip has not raised
    /// its ready flag after `max_attempts` polls.
    pub fn read_single_shot_blocking(
        &mut self,
        channel: u8,
        gain: u8,
    ) -> Result<f32, Error<T::Error>> {
        self.start_single_shot(channel, gain)?;
        self.wait_ready()?;
        self.read_last_voltage()
    }

    /// Read the conversion register and scale it by the last written gain.
    pub fn read_last_voltage(&mut self) -> Result<f32, Error<T::Error>> {
        let raw = self
            .transport
            .read16(Register::Conversion)
            .map_err(Error::Transport)? as i16;

        let volts = scale(raw, self.last_config.effective_gain().full_scale_volts());
        tracing::trace!(raw, volts, "ads1115 conversion read");
        Ok(volts)
    }

    fn wait_ready(&mut self) -> Result<(), Error<T::Error>> {
        let max_attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let status = self
                .transport
                .read16(Register::Config)
                .map_err(Error::Transport)?;
            if is_conversion_ready(status) {
                tracing::trace!(attempt, "ads1115 conversion ready");
                return Ok(());
            }
            if attempt < max_attempts {
                self.transport.sleep(self.settings.poll_interval());
            }
        }

        tracing::warn!(
            attempts = max_attempts,
            channel = self.last_config.channel,
            "ads1115 conversion never became ready"
        );
        Err(Error::ConversionTimeout {
            attempts: max_attempts,
        })
    }
}

fn scale(raw: i16, full_scale_volts: f32) -> f32 {
    full_scale_volts * f32::from(raw) / FULL_SCALE_COUNTS
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::max_gain_for;
    use crate::transport::mock::MockTransport;

    fn driver(mock: MockTransport) -> Ads1115<MockTransport> {
        Ads1115::new(mock)
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // -- write_config ---------------------------------------------------------

    #[test]
    fn write_config_mirrors_input() {
        let mut adc = driver(MockTransport::default());
        let cfg = Configuration {
            channel: 3,
            gain: 4,
            data_rate: 7,
            ..Configuration::default()
        };
        adc.write_config(cfg).unwrap();
        assert_eq!(adc.last_config().channel, 3);
        assert_eq!(adc.last_config().gain, 4);
        assert_eq!(*adc.last_config(), cfg);
    }

    #[test]
    fn write_config_sends_packed_value_then_settles() {
        let mut adc = driver(MockTransport::default());
        let cfg = Configuration::single_shot(1, 2);
        adc.write_config(cfg).unwrap();

        let mock = adc.transport();
        assert_eq!(mock.writes, vec![(Register::Config, cfg.to_register())]);
        assert_eq!(mock.sleeps, vec![Duration::from_millis(1)]);
    }

    #[test]
    fn mirror_starts_zeroed() {
        let adc = driver(MockTransport::default());
        assert_eq!(*adc.last_config(), Configuration::default());
    }

    #[test]
    fn write_failure_propagates() {
        let mut adc = driver(MockTransport {
            fail: true,
            ..MockTransport::default()
        });
        let err = adc.write_config(Configuration::default()).unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    }

    // -- start_single_shot ----------------------------------------------------

    #[test]
    fn start_single_shot_channel_2_gain_1() {
        let mut adc = driver(MockTransport::default());
        adc.start_single_shot(2, 1).unwrap();

        let writes = &adc.transport().writes;
        assert_eq!(writes.len(), 1);
        let (reg, value) = writes[0];
        assert_eq!(reg, Register::Config);
        assert_eq!(value, 0xE383, "got {value:#06x}");
        assert_eq!(value >> 12 & 0b11, 2, "channel bits");
        assert_eq!(value >> 9 & 0b111, 1, "gain bits");
        assert_eq!(value >> 8 & 1, 1, "single-shot");
        assert_eq!(value >> 5 & 0b111, 4, "128 SPS");
    }

    #[test]
    fn start_single_shot_updates_mirror() {
        let mut adc = driver(MockTransport::default());
        adc.start_single_shot(3, 5).unwrap();
        assert_eq!(*adc.last_config(), Configuration::single_shot(3, 5));
    }

    // -- read_last_voltage ----------------------------------------------------

    #[test]
    fn scaling_half_scale_at_6v144() {
        let mut adc = driver(MockTransport::with_sample(16384));
        adc.start_single_shot(0, 0).unwrap();
        let volts = adc.read_last_voltage().unwrap();
        assert!(approx_eq(volts, 3.072), "got {volts}");
    }

    #[test]
    fn scaling_uses_every_gain() {
        for gain in 0..8u8 {
            let mut adc = driver(MockTransport::with_sample(1000));
            adc.start_single_shot(0, gain).unwrap();
            let want = max_gain_for(i32::from(gain)).unwrap() * 1000.0 / 32767.0;
            let got = adc.read_last_voltage().unwrap();
            assert!(approx_eq(got, want), "gain {gain}: {got} != {want}");
        }
    }

    #[test]
    fn scaling_negative_sample() {
        let mut adc = driver(MockTransport::with_sample(-32767));
        adc.start_single_shot(1, 1).unwrap();
        let volts = adc.read_last_voltage().unwrap();
        assert!(approx_eq(volts, -4.096), "got {volts}");
    }

    #[test]
    fn scaling_full_scale_positive() {
        let mut adc = driver(MockTransport::with_sample(i16::MAX));
        adc.start_single_shot(0, 2).unwrap();
        assert!(approx_eq(adc.read_last_voltage().unwrap(), 2.048));
    }

    #[test]
    fn scaling_truncates_oversized_gain() {
        // gain 9 is programmed as PGA 001 on the wire
        let mut adc = driver(MockTransport::with_sample(16384));
        adc.start_single_shot(0, 9).unwrap();
        let volts = adc.read_last_voltage().unwrap();
        assert!(approx_eq(volts, 4.096 * 16384.0 / 32767.0), "got {volts}");
    }

    #[test]
    fn scaling_before_any_write_uses_zeroed_mirror() {
        let mut adc = driver(MockTransport::with_sample(16384));
        let volts = adc.read_last_voltage().unwrap();
        assert!(approx_eq(volts, 3.072), "got {volts}");
    }

    // -- read_single_shot_blocking -------------------------------------------

    #[test]
    fn ready_on_first_poll() {
        let mut adc = driver(MockTransport::with_sample(8192));
        let volts = adc.read_single_shot_blocking(0, 1).unwrap();
        assert!(approx_eq(volts, 4.096 * 8192.0 / 32767.0), "got {volts}");

        let mock = adc.transport();
        assert_eq!(mock.config_reads, 1);
        assert_eq!(mock.conversion_reads, 1);
        // settle only, no poll delay
        assert_eq!(mock.sleeps.len(), 1);
    }

    #[test]
    fn polls_exactly_n_plus_one_times() {
        for n in [1usize, 3, 25] {
            let mut adc = driver(MockTransport {
                not_ready_polls: n,
                ..MockTransport::with_sample(100)
            });
            adc.read_single_shot_blocking(2, 2).unwrap();

            let mock = adc.transport();
            assert_eq!(mock.config_reads, n + 1, "n = {n}");
            assert_eq!(mock.conversion_reads, 1);
            // one settle delay plus one 1 ms delay per not-ready poll
            assert_eq!(mock.sleeps.len(), n + 1);
            assert!(mock.sleeps.iter().all(|d| *d == Duration::from_millis(1)));
        }
    }

    #[test]
    fn times_out_when_never_ready() {
        let settings = PollSettings {
            max_attempts: 5,
            ..PollSettings::default()
        };
        let mock = MockTransport {
            not_ready_polls: usize::MAX,
            ..MockTransport::default()
        };
        let mut adc = Ads1115::with_settings(mock, settings);

        let err = adc.read_single_shot_blocking(0, 0).unwrap_err();
        assert!(
            matches!(err, Error::ConversionTimeout { attempts: 5 }),
            "got {err:?}"
        );
        let mock = adc.transport();
        assert_eq!(mock.config_reads, 5);
        assert_eq!(mock.conversion_reads, 0, "no sample read after timeout");
    }

    #[test]
    fn ready_on_last_allowed_attempt() {
        let settings = PollSettings {
            max_attempts: 4,
            ..PollSettings::default()
        };
        let mock = MockTransport {
            not_ready_polls: 3,
            ..MockTransport::with_sample(1)
        };
        let mut adc = Ads1115::with_settings(mock, settings);
        adc.read_single_shot_blocking(0, 0).unwrap();
        assert_eq!(adc.transport().config_reads, 4);
    }

    #[test]
    fn zero_max_attempts_still_polls_once() {
        let settings = PollSettings {
            max_attempts: 0,
            ..PollSettings::default()
        };
        let mut adc = Ads1115::with_settings(MockTransport::with_sample(1), settings);
        adc.read_single_shot_blocking(1, 1).unwrap();
        assert_eq!(adc.transport().config_reads, 1);
    }

    #[test]
    fn custom_poll_interval_is_used() {
        let settings = PollSettings {
            poll_interval_ms: 3,
            settle_ms: 0,
            max_attempts: 10,
        };
        let mock = MockTransport {
            not_ready_polls: 2,
            ..MockTransport::default()
        };
        let mut adc = Ads1115::with_settings(mock, settings);
        adc.read_single_shot_blocking(0, 0).unwrap();
        assert_eq!(
            adc.transport().sleeps,
            vec![
                Duration::ZERO,
                Duration::from_millis(3),
                Duration::from_millis(3)
            ]
        );
    }

    #[test]
    fn timeout_error_message() {
        let err: Error<crate::transport::mock::MockError> =
            Error::ConversionTimeout { attempts: 7 };
        assert_eq!(
            err.to_string(),
            "conversion not ready after 7 poll(s) of the config register"
        );
    }

    // -- settings -------------------------------------------------------------

    #[test]
    fn poll_settings_default() {
        let s = PollSettings::default();
        assert_eq!(s.poll_interval_ms, 1);
        assert_eq!(s.max_attempts, 1000);
        assert_eq!(s.settle_ms, 1);
    }

    #[test]
    fn poll_settings_partial_toml() {
        let s: PollSettings = toml::from_str("max_attempts = 50").unwrap();
        assert_eq!(s.max_attempts, 50);
        assert_eq!(s.poll_interval_ms, 1);
        assert_eq!(s.settle_ms, 1);
    }

    #[test]
    fn instances_keep_separate_mirrors() {
        let mut a = driver(MockTransport::with_sample(16384));
        let mut b = driver(MockTransport::with_sample(16384));
        a.start_single_shot(0, 0).unwrap();
        b.start_single_shot(1, 3).unwrap();
        assert!(approx_eq(a.read_last_voltage().unwrap(), 3.072));
        assert!(approx_eq(b.read_last_voltage().unwrap(), 1.024 * 16384.0 / 32767.0));
    }
}
