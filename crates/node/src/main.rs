mod config;
mod sampler;

use anyhow::{Context, Result};
use std::{env, thread, time::Duration};
use tracing_subscriber::EnvFilter;

use ads1115::{Ads1115, Transport};
use sampler::{ChannelMap, ReadingMsg, Sampler};

#[cfg(not(any(feature = "sim", feature = "i2c")))]
compile_error!("enable the `sim` or `i2c` feature to pick an ADS1115 transport");

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Env config ──────────────────────────────────────────────────
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "ads1115.toml".to_string());
    let sample_count: u64 = env::var("SAMPLE_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let cfg = config::load(&config_path)?;
    let channels = cfg
        .channels
        .iter()
        .map(ChannelMap::from_entry)
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        config = %config_path,
        bus = cfg.device.bus,
        addr = format_args!("0x{:02x}", cfg.device.address),
        every_s = cfg.sample_every_s,
        "ads1115 node starting"
    );

    // ── Transport ───────────────────────────────────────────────────
    #[cfg(feature = "i2c")]
    let transport = ads1115::RppalTransport::open(cfg.device.bus, cfg.device.address)
        .with_context(|| format!("failed to open i2c bus {}", cfg.device.bus))?;

    #[cfg(all(feature = "sim", not(feature = "i2c")))]
    let transport = {
        tracing::warn!(volts = ?cfg.sim.volts, "using simulated ADS1115 (no hardware)");
        ads1115::SimTransport::new(cfg.sim.volts)
    };

    let adc = Ads1115::with_settings(transport, cfg.polling);
    run(
        Sampler::new(adc, channels),
        Duration::from_secs(cfg.sample_every_s),
        sample_count,
    )
}

/// Sample every `every` and print one JSON line per round.  Runs forever
/// when `rounds` is 0.
fn run<T: Transport>(mut sampler: Sampler<T>, every: Duration, rounds: u64) -> Result<()> {
    let mut done = 0u64;

    loop {
        let msg = ReadingMsg {
            ts: now_unix(),
            readings: sampler.read_all(),
        };

        let line = serde_json::to_string(&msg).context("failed to encode readings")?;
        println!("{line}");
        tracing::debug!(ts = msg.ts, count = msg.readings.len(), "round complete");

        done += 1;
        if rounds != 0 && done >= rounds {
            return Ok(());
        }
        thread::sleep(every);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
