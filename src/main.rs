use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use diadash::chart::{bolus_by_day, daily_distribution};
use diadash::cli::{Args, OutputFormat, setup_logging};
use diadash::constants::{DAY_LABEL_FORMAT, UNAVAILABLE};
use diadash::models::CleanedDataset;
use diadash::pipeline;
use diadash::stats::{self, StatsSnapshot};
use serde_json::json;
use std::process;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    if let Err(error) = run(&args) {
        eprintln!("{} {:#}", "Error:".bright_red().bold(), error);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.to_config();
    config.validate().context("Invalid statistics parameters")?;

    let dataset = pipeline::load_dataset(Some(&config.data_path))
        .with_context(|| format!("Failed to clean export {}", config.data_path.display()))?;
    let snapshot = stats::compute(dataset.as_ref(), &config.stats_params());

    match args.format {
        OutputFormat::Text => {
            print_text(&snapshot, &config.data_path.display().to_string(), dataset.is_some());
            if args.daily {
                if let Some(dataset) = &dataset {
                    print_daily(dataset);
                }
            }
        }
        OutputFormat::Json => print_json(&snapshot, dataset.as_ref(), args.daily)?,
    }

    Ok(())
}

fn print_text(snapshot: &StatsSnapshot, source: &str, has_data: bool) {
    println!("{}", "Weekly summary".bright_green().bold());
    println!("  {} {}", "Export:".bright_cyan(), source);
    if !has_data {
        println!(
            "  {}",
            "No export found; statistics are unavailable".bright_yellow()
        );
    }
    println!();

    for card in snapshot.cards() {
        let value = if card.value == UNAVAILABLE {
            card.value.bright_black()
        } else {
            card.value.bright_white().bold()
        };
        println!("  {} {}", format!("{:<20}", card.title).bright_cyan(), value);
    }
}

fn print_daily(dataset: &CleanedDataset) {
    println!();
    println!("{}", "Daily glucose".bright_green().bold());
    for day in daily_distribution(&dataset.glucose) {
        println!(
            "  {} min {} / median {} / max {} / mean {:.1} ({} readings)",
            format!("{:<16}", day.label).bright_cyan(),
            day.min,
            day.median,
            day.max,
            day.mean,
            day.values.len()
        );
    }

    println!();
    println!("{}", "Daily bolus".bright_green().bold());
    for (date, units) in bolus_by_day(&dataset.general) {
        println!(
            "  {} {}U",
            format!("{:<16}", date.format(DAY_LABEL_FORMAT)).bright_cyan(),
            units
        );
    }
}

fn print_json(
    snapshot: &StatsSnapshot,
    dataset: Option<&CleanedDataset>,
    daily: bool,
) -> Result<()> {
    let mut report = json!({ "stats": snapshot.cards() });

    if daily {
        if let Some(dataset) = dataset {
            report["daily"] = json!({
                "glucose": daily_distribution(&dataset.glucose),
                "bolus": bolus_by_day(&dataset.general),
            });
        }
    }

    let text = serde_json::to_string_pretty(&report).context("Failed to render JSON output")?;
    println!("{}", text);
    Ok(())
}
