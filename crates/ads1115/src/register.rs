//! ADS1115 register map and the 16-bit config register encoding.
//!
//! Config register layout (MSB first):
//!
//! ```text
//!   [15]    OS         write 1 to start a single-shot conversion;
//!                      reads back 1 once the conversion is ready
//!   [14]    MUX[2]     1 = single-ended (AINx vs GND)
//!   [13:12] MUX[1:0]   input channel 0–3
//!   [11:9]  PGA        gain / full-scale range code
//!   [8]     MODE       0 = continuous, 1 = single-shot
//!   [7:5]   DR         data-rate code
//!   [4]     COMP_MODE  0 = traditional, 1 = window
//!   [3]     COMP_POL   0 = active-low
//!   [2]     COMP_LAT   0 = non-latching
//!   [1:0]   COMP_QUE   11 = comparator disabled
//! ```

use crate::codes::{DataRate, Gain};

/// Register pointer addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// Last conversion result (read-only, signed 16-bit).
    Conversion = 0x00,
    /// Configuration (read/write).
    Config = 0x01,
}

impl Register {
    pub fn addr(self) -> u8 {
        self as u8
    }
}

// ── Bit positions ───────────────────────────────────────────────────────────

const OS_SHIFT: u16 = 15;
const MUX_MODE_SHIFT: u16 = 14;
const CHANNEL_SHIFT: u16 = 12;
const PGA_SHIFT: u16 = 9;
const MODE_SHIFT: u16 = 8;
const DR_SHIFT: u16 = 5;
const COMP_MODE_SHIFT: u16 = 4;
const COMP_POL_SHIFT: u16 = 3;
const COMP_LAT_SHIFT: u16 = 2;

const CHANNEL_MASK: u16 = 0b11;
const PGA_MASK: u16 = 0b111;
const DR_MASK: u16 = 0b111;
const COMP_QUE_MASK: u16 = 0b11;

/// Bit 15 of the config register: conversion-ready flag when read.
pub const OS_READY_BIT: u16 = 1 << OS_SHIFT;

/// COMP_QUE value that turns the comparator off.
pub const COMPARATOR_DISABLED: u8 = 0b11;

/// Whether a config register value read back from the chip reports a
/// finished conversion.
pub fn is_conversion_ready(register: u16) -> bool {
    register & OS_READY_BIT != 0
}

// ── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationMode {
    #[default]
    Continuous,
    SingleShot,
}

/// Field-wise mirror of the config register.
///
/// Multi-bit fields hold raw codes.  Out-of-range values are not rejected;
/// [`to_register`](Self::to_register) keeps only the bits each field owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Configuration {
    /// OS: start a single conversion.
    pub start: bool,
    /// MUX[2]: measure AINx against GND.
    pub single_ended: bool,
    /// MUX[1:0]: input channel, 0–3.
    pub channel: u8,
    /// PGA code, 0–7.
    pub gain: u8,
    pub operation_mode: OperationMode,
    /// DR code, 0–7.
    pub data_rate: u8,
    /// COMP_MODE: window comparator instead of traditional.
    pub compare_window: bool,
    /// COMP_POL: ALERT/RDY pin active high.
    pub active_high: bool,
    /// COMP_LAT
    pub latching: bool,
    /// COMP_QUE, 0–3.
    pub comparator_queue: u8,
}

impl Configuration {
    /// Single-ended single-shot read of `channel` at 128 SPS with the
    /// comparator off.
    pub fn single_shot(channel: u8, gain: u8) -> Self {
        Self {
            start: true,
            single_ended: true,
            channel,
            gain,
            operation_mode: OperationMode::SingleShot,
            data_rate: DataRate::SPS_128.code(),
            compare_window: false,
            active_high: false,
            latching: false,
            comparator_queue: COMPARATOR_DISABLED,
        }
    }

    /// Pack into the 16-bit register value (host order).
    pub fn to_register(&self) -> u16 {
        let flag = |on: bool, shift: u16| u16::from(on) << shift;

        flag(self.start, OS_SHIFT)
            | flag(self.single_ended, MUX_MODE_SHIFT)
            | (u16::from(self.channel) & CHANNEL_MASK) << CHANNEL_SHIFT
            | (u16::from(self.gain) & PGA_MASK) << PGA_SHIFT
            | flag(self.operation_mode == OperationMode::SingleShot, MODE_SHIFT)
            | (u16::from(self.data_rate) & DR_MASK) << DR_SHIFT
            | flag(self.compare_window, COMP_MODE_SHIFT)
            | flag(self.active_high, COMP_POL_SHIFT)
            | flag(self.latching, COMP_LAT_SHIFT)
            | u16::from(self.comparator_queue) & COMP_QUE_MASK
    }

    /// Decode a register value.  On read-back `start` carries the
    /// conversion-ready flag.
    pub fn from_register(value: u16) -> Self {
        let bit = |shift: u16| value >> shift & 1 == 1;
        let field = |shift: u16, mask: u16| ((value >> shift) & mask) as u8;

        Self {
            start: bit(OS_SHIFT),
            single_ended: bit(MUX_MODE_SHIFT),
            channel: field(CHANNEL_SHIFT, CHANNEL_MASK),
            gain: field(PGA_SHIFT, PGA_MASK),
            operation_mode: if bit(MODE_SHIFT) {
                OperationMode::SingleShot
            } else {
                OperationMode::Continuous
            },
            data_rate: field(DR_SHIFT, DR_MASK),
            compare_window: bit(COMP_MODE_SHIFT),
            active_high: bit(COMP_POL_SHIFT),
            latching: bit(COMP_LAT_SHIFT),
            comparator_queue: field(0, COMP_QUE_MASK),
        }
    }

    /// The gain the chip actually applies for this configuration.
    pub fn effective_gain(&self) -> Gain {
        Gain::from_bits(self.gain)
    }

    pub fn effective_data_rate(&self) -> DataRate {
        DataRate::from_bits(self.data_rate)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
