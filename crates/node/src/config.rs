//! TOML config file loading and validation for the sampling node.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;

use ads1115::{Gain, PollSettings};

// ---------------------------------------------------------------------------
// Config file structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceEntry,
    #[serde(default)]
    pub polling: PollSettings,
    #[serde(default = "default_sample_every_s")]
    pub sample_every_s: u64,
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
    #[serde(default)]
    pub sim: SimEntry,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceEntry {
    pub bus: u8,
    pub address: u16,
}

impl Default for DeviceEntry {
    fn default() -> Self {
        Self {
            bus: 1,
            address: 0x48,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelEntry {
    pub label: String,
    pub channel: i64,
    pub gain: i64,
}

/// Input voltages for the simulated chip (AIN0–AIN3).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimEntry {
    pub volts: [f32; 4],
}

impl Default for SimEntry {
    fn default() -> Self {
        Self {
            volts: [1.65, 0.8, 2.4, 0.0],
        }
    }
}

fn default_sample_every_s() -> u64 {
    5
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum valid ADS1115 channel index (0–3 for single-ended).
const MAX_CHANNEL: i64 = 3;

/// ADDR pin strapping selects one of four addresses.
const VALID_ADDRESSES: std::ops::RangeInclusive<u16> = 0x48..=0x4B;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl Config {
    /// Validate all config entries. Returns `Ok(())` or an error describing
    /// every violation found (not just the first one).
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        self.validate_device(&mut errors);
        self.validate_channels(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "config validation failed ({} error{}):\n  - {}",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" },
                errors.join("\n  - ")
            );
        }
    }

    fn validate_device(&self, errors: &mut Vec<String>) {
        if !VALID_ADDRESSES.contains(&self.device.address) {
            errors.push(format!(
                "device: address 0x{:02x} is not an ADS1115 address (allowed: 0x48-0x4b)",
                self.device.address
            ));
        }
        if self.sample_every_s == 0 {
            errors.push("sample_every_s must be positive, got 0".to_string());
        }
        if self.polling.max_attempts == 0 {
            errors.push("polling: max_attempts must be positive, got 0".to_string());
        }
    }

    fn validate_channels(&self, errors: &mut Vec<String>) {
        if self.channels.is_empty() {
            errors.push("no channels configured".to_string());
        }

        let mut seen_labels: HashSet<&str> = HashSet::new();

        for (i, c) in self.channels.iter().enumerate() {
            let ctx = || {
                if c.label.is_empty() {
                    format!("channels[{i}]")
                } else {
                    format!("channel '{}'", c.label)
                }
            };

            if c.label.trim().is_empty() {
                errors.push(format!("{}: label is empty", ctx()));
            } else if !seen_labels.insert(&c.label) {
                errors.push(format!("{}: duplicate label", ctx()));
            }

            if !(0..=MAX_CHANNEL).contains(&c.channel) {
                errors.push(format!(
                    "{}: channel {} out of range (0-{MAX_CHANNEL})",
                    ctx(),
                    c.channel
                ));
            }

            let gain_ok = i32::try_from(c.gain)
                .ok()
                .and_then(|g| Gain::try_from(g).ok())
                .is_some();
            if !gain_ok {
                errors.push(format!("{}: gain code {} out of range (0-7)", ctx(), c.gain));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read, parse, and validate a TOML config file.
pub fn load(path: &str) -> Result<Config> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("failed to read config: {path}"))?;
    let config: Config =
        toml::from_str(&contents).with_context(|| format!("failed to parse config: {path}"))?;
    config
        .validate()
        .with_context(|| format!("invalid config: {path}"))?;
    Ok(config)
}

// ===========================================================================
// Tests
// ===========================================================================
