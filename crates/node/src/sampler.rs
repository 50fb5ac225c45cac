//! Reads every configured ADS1115 channel once per round.

use serde::Serialize;

use ads1115::{Ads1115, DataRate, Gain, Transport};

use crate::config::ChannelEntry;

// ── Channel configuration ───────────────────────────────────────────────────

/// A validated mapping from an ADS1115 input to a reading label.
#[derive(Debug, Clone)]
pub struct ChannelMap {
    /// ADS1115 channel index (0 = AIN0, 1 = AIN1, …).
    pub channel: u8,
    pub gain: Gain,
    /// Label published with each reading (e.g. "battery").
    pub label: String,
}

impl ChannelMap {
    /// Convert a config entry.  Fails on codes the chip cannot represent.
    pub fn from_entry(entry: &ChannelEntry) -> anyhow::Result<Self> {
        let channel = u8::try_from(entry.channel)
            .ok()
            .filter(|c| *c <= 3)
            .ok_or_else(|| anyhow::anyhow!("channel {} out of range (0-3)", entry.channel))?;
        let gain = i32::try_from(entry.gain)
            .map_err(|_| anyhow::anyhow!("gain code {} out of range (0-7)", entry.gain))?;
        let gain = Gain::try_from(gain)?;

        Ok(Self {
            channel,
            gain,
            label: entry.label.clone(),
        })
    }
}

// ── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub label: String,
    pub channel: u8,
    pub gain: u8,
    pub volts: f32,
}

#[derive(Debug, Serialize)]
pub struct ReadingMsg {
    pub ts: i64,
    pub readings: Vec<Reading>,
}

// ── Sampler ─────────────────────────────────────────────────────────────────

pub struct Sampler<T> {
    adc: Ads1115<T>,
    channels: Vec<ChannelMap>,
}

impl<T: Transport> Sampler<T> {
    pub fn new(adc: Ads1115<T>, channels: Vec<ChannelMap>) -> Self {
        let per_read = DataRate::SPS_128.conversion_time();
        tracing::info!(
            channels = ?channels,
            conversion_us = per_read.as_micros() as u64,
            "sampler initialised"
        );
        Self { adc, channels }
    }

    /// Read all configured channels.
    ///
    /// On per-channel failure the channel is skipped (logged, not fatal).
    pub fn read_all(&mut self) -> Vec<Reading> {
        let mut readings = Vec::with_capacity(self.channels.len());

        for ch in &self.channels {
            match self.adc.read_single_shot_blocking(ch.channel, ch.gain.code()) {
                Ok(volts) => readings.push(Reading {
                    label: ch.label.clone(),
                    channel: ch.channel,
                    gain: ch.gain.code(),
                    volts,
                }),
                Err(e) => {
                    tracing::error!(
                        channel = ch.channel,
                        label = %ch.label,
                        "adc read failed: {e}"
                    );
                }
            }
        }

        readings
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
