use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;

use comtrade::parser::{Parser, ParserOptions};
use comtrade::schema::Schema;
use comtrade::units::AngleUnit;

const USAGE: &str = "usage: comtrade-dump [--relaxed] [--json] [--no-utc] [--angle <unit>] [--limit <n>] <file.cfg|file.cff>";

struct Args {
    path: String,
    relaxed: bool,
    json: bool,
    options: ParserOptions,
    limit: usize,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        path: String::new(),
        relaxed: false,
        json: false,
        options: ParserOptions::default(),
        limit: 5,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--relaxed" => args.relaxed = true,
            "--json" => args.json = true,
            "--no-utc" => args.options.adjust_to_utc = false,
            "--angle" => {
                let unit = iter.next().context("--angle needs a unit")?;
                args.options.target_angle_unit =
                    Some(AngleUnit::from_str(&unit).with_context(|| format!("unknown angle unit \"{}\"", unit))?);
            }
            "--limit" => {
                let limit = iter.next().context("--limit needs a count")?;
                args.limit = limit.parse().with_context(|| format!("invalid limit \"{}\"", limit))?;
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ if arg.starts_with("--") => bail!("unknown option {}\n{}", arg, USAGE),
            _ => args.path = arg,
        }
    }

    if args.path.is_empty() {
        bail!("{}", USAGE);
    }
    Ok(args)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = parse_args()?;
    let schema = Schema::from_file(&args.path, args.relaxed)
        .with_context(|| format!("failed to load configuration {}", args.path))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
    } else {
        print_schema(&schema);
    }

    if args.limit == 0 {
        return Ok(());
    }

    let mut parser = Parser::with_options(&schema, args.options)?;
    parser.open_files().context("failed to open data files")?;

    println!("\n=== First {} Samples ===", args.limit);
    let mut count = 0;
    while count < args.limit && parser.read_next()? {
        let values: Vec<String> = parser.values().iter().map(|v| format!("{:.4}", v)).collect();
        let time = parser
            .datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
            .unwrap_or_default();
        println!("  {:>6} {} | {}", parser.sample(), time, values.join(", "));
        count += 1;
    }
    if count == 0 {
        println!("  (no records)");
    }

    parser.close_files();
    Ok(())
}

fn print_schema(schema: &Schema) {
    println!("=== Configuration ===");
    println!("Station: {}", schema.station_name);
    println!("Device: {}", schema.device_id);
    println!("Version: {}", schema.version);
    println!("File type: {}", schema.file_type);
    println!(
        "Layout: {}",
        if schema.is_combined_file_format { "combined" } else { "split" }
    );
    println!("Nominal frequency: {} Hz", schema.nominal_frequency());
    println!("Start: {}", schema.start_time);
    println!("Trigger: {}", schema.trigger_time);
    println!("Time code: {} (local {})", schema.time_code, schema.local_code);

    println!("\n=== Sample Rates ===");
    for rate in schema.sample_rates() {
        println!("  {} Hz up to sample {}", rate.rate, rate.end_sample);
    }

    println!("\n=== Analog Channels ({}) ===", schema.total_analog_channels());
    for channel in &schema.analog_channels {
        let unit = channel.units();
        let unit_str = if unit.is_empty() {
            String::new()
        } else {
            format!(" [{}]", unit)
        };
        println!(
            "  {:3}. {} ({}, {}){} x{} +{}",
            channel.index,
            channel.name(),
            channel.phase_id(),
            channel.signal_kind(),
            unit_str,
            channel.multiplier,
            channel.adder
        );
    }

    println!("\n=== Digital Channels ({}) ===", schema.total_digital_channels());
    for channel in schema.digital_channels.iter().take(32) {
        println!(
            "  {:3}. {} ({}) normal {}",
            channel.index,
            channel.name(),
            channel.phase_id(),
            u8::from(channel.normal_state)
        );
    }
    if schema.total_digital_channels() > 32 {
        println!("  ... and {} more channels", schema.total_digital_channels() - 32);
    }
}
