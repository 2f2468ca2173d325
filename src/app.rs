//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and environment settings
//! - runs the allocation or margin pipeline
//! - prints reports/plots
//! - writes optional exports and the offer document

use chrono::Local;
use clap::Parser;
use tracing::info;

use crate::cli::{AllocateArgs, Cli, Command, MarginArgs, SampleArgs};
use crate::config::Settings;
use crate::domain::{AllocConfig, MarginConfig, SampleConfig};
use crate::error::AppError;
use crate::io::export::{write_allocation, write_averages, write_margins};
use crate::io::offer::{Offer, write_offer};
use crate::report::format;

pub mod pipeline;

/// Entry point for the `desk` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Allocate(args) => handle_allocate(alloc_config_from_args(&args, &settings)),
        Command::Margin(args) => handle_margin(margin_config_from_args(&args, &settings)),
        Command::Sample(args) => handle_sample(sample_config_from_args(&args)),
    }
}

fn handle_allocate(config: AllocConfig) -> Result<(), AppError> {
    // Fail before doing any work if the offer cannot be addressed.
    let client = match (config.offer, config.client.as_deref()) {
        (true, None) => {
            return Err(AppError::Config("--offer needs --client".to_string()));
        }
        (_, client) => client,
    };

    let run = pipeline::run_allocation(&config)?;

    println!(
        "{}",
        format::format_allocation_summary(&run.load, &run.allocation, &run.table)
    );

    if config.plot {
        let base = (run.allocation.cal > 0.0).then(|| {
            run.allocation
                .steps
                .first()
                .map(|s| s.base_load)
                .unwrap_or(0.0)
        });
        let plot = crate::plot::render_consumption_plot(
            &run.load.series,
            base,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    for path in &config.exports {
        write_allocation(path, &run.table)?;
    }

    if let (true, Some(client)) = (config.offer, client) {
        let offer = Offer {
            client,
            generated: Local::now().date_naive(),
            valid_until: config.valid_until,
            table: &run.table,
        };
        let path = write_offer(&config.output_dir, &offer)?;
        println!("Offer written to {}", path.display());
    }

    Ok(())
}

fn handle_margin(config: MarginConfig) -> Result<(), AppError> {
    let run = pipeline::run_margin(&config)?;

    println!(
        "{}",
        format::format_margin_header(
            run.rows_loaded,
            &run.years,
            &run.types,
            &run.filter,
            run.margins.len()
        )
    );
    println!("{}", format::format_margins(&run.margins));
    println!("{}", format::format_averages(&run.averages));
    match &run.model {
        Ok(model) => println!("{}", format::format_model(model, run.prediction)),
        Err(e) => println!("Margin model: not available ({e})\n"),
    }

    if let Some(path) = &config.export_margins {
        write_margins(path, &run.margins)?;
    }
    if let Some(path) = &config.export_averages {
        write_averages(path, &run.averages)?;
    }

    Ok(())
}

fn handle_sample(config: SampleConfig) -> Result<(), AppError> {
    let series = crate::data::generate_profile(&config)?;
    crate::data::write_profile_csv(&config.output, &series)?;
    info!(path = %config.output.display(), "sample written");
    println!(
        "Wrote {} hourly rows ({:.3} MWh) to {}",
        series.len(),
        series.total_mwh(),
        config.output.display()
    );
    Ok(())
}

pub fn alloc_config_from_args(args: &AllocateArgs, settings: &Settings) -> AllocConfig {
    AllocConfig {
        input: args.input.clone(),
        client: args.client.clone(),
        valid_until: args.valid_until,
        offer: args.offer,
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| settings.output_dir.clone()),
        exports: args.export.clone(),
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}

pub fn margin_config_from_args(args: &MarginArgs, settings: &Settings) -> MarginConfig {
    MarginConfig {
        input: args.input.clone(),
        db_url: args.db_url.clone().or_else(|| settings.database_url.clone()),
        query: args.query.clone(),
        manual_rows: args.rows.clone(),
        year: args.year,
        entity_type: args.entity_type.clone(),
        predict: args.predict,
        export_margins: args.export_margins.clone(),
        export_averages: args.export_averages.clone(),
    }
}

pub fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        output: args.output.clone(),
        seed: args.seed,
        year: args.year,
        base_mwh: args.base_mwh,
    }
}
