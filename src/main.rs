use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;

use thermolog::cache::LoadCache;
use thermolog::config::{EnergySettings, GradeBasis, HeaderRows, LoadOptions};
use thermolog::intervals::DEFAULT_GAP_MINUTES;
use thermolog::metrics::EfficiencyGrade;
use thermolog::report::{self, AnalysisReport};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Analyzes a thermostat CSV export", long_about = None)]
struct Cli {
    /// Path to the exported CSV file.
    #[clap(long, value_parser)]
    input: PathBuf,
    /// Number of metadata rows before the header. Autodetected when omitted
    /// (exports carry 4 or 5 depending on the app version).
    #[clap(long)]
    header_rows: Option<usize>,
    /// Disable value-range reclassification of ambiguous sensor columns.
    #[clap(long)]
    no_repair: bool,
    /// Electricity rate, $/kWh.
    #[clap(long, default_value_t = 0.14)]
    kwh_price: f64,
    /// Heat pump power draw, kW.
    #[clap(long, default_value_t = 3.0)]
    heat_pump_kw: f64,
    /// Auxiliary/emergency heat power draw, kW.
    #[clap(long, default_value_t = 5.0)]
    aux_heat_kw: f64,
    /// Outdoor temp (°F) above which aux heat counts as unnecessary.
    #[clap(long, default_value_t = 40.0)]
    critical_temp: f64,
    /// Merge tolerance between occupancy samples, in minutes.
    #[clap(long, default_value_t = DEFAULT_GAP_MINUTES)]
    gap_minutes: i64,
    #[clap(long, value_enum, default_value_t = GradeBasis::Restricted)]
    grade_basis: GradeBasis,
    /// Emit the full report as JSON instead of a text summary.
    #[clap(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = EnergySettings {
        kwh_price: cli.kwh_price,
        heat_pump_kw: cli.heat_pump_kw,
        aux_heat_kw: cli.aux_heat_kw,
        critical_outdoor_temp: cli.critical_temp,
        grade_basis: cli.grade_basis,
    };
    settings.validate().context("Invalid energy settings")?;

    let options = LoadOptions {
        header_rows: cli
            .header_rows
            .map(HeaderRows::Fixed)
            .unwrap_or(HeaderRows::Auto),
        repair_channels: !cli.no_repair,
    };

    let bytes = fs::read(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let mut cache = LoadCache::new();
    let table = cache
        .get_or_parse(&bytes, &options)
        .with_context(|| format!("Failed to parse {}", cli.input.display()))?;

    let report = report::analyze(&table, &settings, Duration::minutes(cli.gap_minutes));

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    println!("--- Energy Efficiency Report ---");
    println!(
        "Total heating time: {:.1} hrs",
        report.energy.total_heating_minutes / 60.0
    );
    println!("Total aux heat:     {:.1}%", report.energy.aux_percentage);
    if let Some(restricted) = &report.energy.restricted {
        println!(
            "Unnecessary aux (>= {:.0}°F outdoors): {:.1}%",
            restricted.critical_temp, restricted.aux_percentage
        );
    }
    match &report.energy.grade {
        EfficiencyGrade::Scored { score, label, .. } => {
            println!("Efficiency grade:   {} ({})", score, label)
        }
        EfficiencyGrade::InsufficientData => {
            println!("Efficiency grade:   insufficient data")
        }
    }
    println!("Estimated cost:     ${:.2}", report.energy.estimated_cost);

    if let Some(balance) = &report.room_balance {
        println!("--- Room Balancing (baseline: {}) ---", balance.baseline);
        for offset in &balance.offsets {
            println!(
                "  {:<30} {:+.1}°F ({:?})",
                offset.sensor, offset.offset, offset.class
            );
        }
    }

    if !report.motion.is_empty() {
        println!("--- Occupancy ---");
        for timeline in &report.motion {
            println!("  {}: {} active block(s)", timeline.channel, timeline.blocks.len());
        }
    }

    for tip in &report.recommendations {
        println!("Tip: {}", tip);
    }
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }
}
