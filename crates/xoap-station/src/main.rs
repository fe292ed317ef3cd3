//! Binary crate for the `xoap-station` command-line tool.
//!
//! Runs one weather update cycle and prints the resulting sensor points.
//! Scheduling repeated cycles is left to the caller (cron, a systemd timer).

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use xoap_core::Unit;
use xoap_station::{PointTable, StationConfig, StationOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitArg {
    Standard,
    Metric,
}

impl From<UnitArg> for Unit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Standard => Unit::Standard,
            UnitArg::Metric => Unit::Metric,
        }
    }
}

/// Fetch XOAP weather data into sensor points.
#[derive(Debug, Parser)]
#[command(name = "xoap-station", version, about)]
struct Cli {
    /// Station configuration file (PID, LKEY, LOCID, FORECASTED_DAYS)
    #[arg(long, default_value = "/etc/xoap-station.conf")]
    config: PathBuf,

    /// Unit system of the published values
    #[arg(long, value_enum, default_value_t = UnitArg::Standard)]
    unit: UnitArg,

    /// Do not query the rain gauge
    #[arg(long)]
    skip_rain: bool,

    /// Print the point table as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StationConfig::from_file(&cli.config)?;
    let options = StationOptions {
        unit: cli.unit.into(),
        ..StationOptions::default()
    };

    let mut session = xoap_station::open_session(&config, &options)
        .context("Failed to configure weather session")?;
    let mut points = PointTable::default();
    let result = xoap_station::update_weather(
        &session,
        &mut points,
        !cli.skip_rain,
        Local::now().naive_local(),
    )
    .await;
    session.release();
    result.context("Weather update failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        println!("{}", points.render());
    }
    Ok(())
}
