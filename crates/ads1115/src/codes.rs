//! Programmable gain and data-rate codes with their datasheet lookup tables.

use std::time::Duration;

use crate::error::{CodeError, CodeField};

// ── Datasheet tables ────────────────────────────────────────────────────────

/// Full-scale range in volts, indexed by PGA code.  Codes 5–7 all select
/// ±0.256 V on the physical chip.
const FULL_SCALE_VOLTS: [f32; 8] = [6.144, 4.096, 2.048, 1.024, 0.512, 0.256, 0.256, 0.256];

/// Conversion rate in samples per second, indexed by DR code.
const SAMPLES_PER_SECOND: [u16; 8] = [8, 16, 32, 64, 128, 250, 475, 860];

const CODE_MASK: u8 = 0b111;

// ── Gain ────────────────────────────────────────────────────────────────────

/// A validated PGA code (0–7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gain(u8);

impl Gain {
    /// ±6.144 V
    pub const FSR_6_144: Gain = Gain(0);
    /// ±4.096 V
    pub const FSR_4_096: Gain = Gain(1);
    /// ±2.048 V, the power-on default.
    pub const FSR_2_048: Gain = Gain(2);
    /// ±1.024 V
    pub const FSR_1_024: Gain = Gain(3);
    /// ±0.512 V
    pub const FSR_0_512: Gain = Gain(4);
    /// ±0.256 V
    pub const FSR_0_256: Gain = Gain(5);

    /// Keep the low three bits of `bits`, the same truncation the chip applies.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & CODE_MASK)
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Magnitude of the largest voltage representable at this gain.
    pub fn full_scale_volts(self) -> f32 {
        FULL_SCALE_VOLTS[usize::from(self.0)]
    }
}

impl TryFrom<i32> for Gain {
    type Error = CodeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match u8::try_from(code) {
            Ok(c) if c <= CODE_MASK => Ok(Self(c)),
            _ => Err(CodeError::OutOfRange {
                field: CodeField::Gain,
                code,
            }),
        }
    }
}

// ── Data rate ───────────────────────────────────────────────────────────────

/// A validated DR code (0–7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataRate(u8);

impl DataRate {
    /// 128 SPS, used by single-shot reads.
    pub const SPS_128: DataRate = DataRate(4);

    /// Keep the low three bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & CODE_MASK)
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn samples_per_second(self) -> u16 {
        SAMPLES_PER_SECOND[usize::from(self.0)]
    }

    /// Nominal time for one conversion, rounded up to the microsecond.
    pub fn conversion_time(self) -> Duration {
        let sps = u64::from(self.samples_per_second());
        Duration::from_micros(1_000_000_u64.div_ceil(sps))
    }
}

impl TryFrom<i32> for DataRate {
    type Error = CodeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match u8::try_from(code) {
            Ok(c) if c <= CODE_MASK => Ok(Self(c)),
            _ => Err(CodeError::OutOfRange {
                field: CodeField::DataRate,
                code,
            }),
        }
    }
}

// ── Table queries on raw integers ───────────────────────────────────────────

/// Full-scale voltage for a raw gain code.
pub fn max_gain_for(code: i32) -> Result<f32, CodeError> {
    Gain::try_from(code).map(Gain::full_scale_volts)
}

/// Samples per second for a raw data-rate code.
pub fn sample_rate_for(code: i32) -> Result<u16, CodeError> {
    DataRate::try_from(code).map(DataRate::samples_per_second)
}

/// Whether `code` names one of the eight data rates.
pub fn is_valid_sample_rate(code: i32) -> bool {
    DataRate::try_from(code).is_ok()
}

// ── Tests ───────────────────────────────────────────────────────────────────
