mod api;
mod cli;
mod config;
mod import;
mod preview;
mod sheet;
mod timetable;

use anyhow::{Result, bail};
use clap::Parser;
use colored::*;
use log::{info, warn};

use api::SupabaseClient;
use cli::Cli;
use config::ImportConfig;
use import::Importer;
use sheet::{read_embedded_images, read_staff_sheet};

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine; variables may come from the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = ImportConfig::resolve(&cli)?;
    run(config).await
}

fn init_logging(verbose: u8) {
    let env = env_logger::Env::default().default_filter_or(log_level(verbose));
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}

/// Default log filter for a `-v` count; `RUST_LOG` still takes precedence
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

async fn run(config: ImportConfig) -> Result<()> {
    let sheet = read_staff_sheet(&config.workbook, config.sheet.as_deref())?;
    println!(
        "Reading {} (sheet '{}', {} row(s))",
        config.workbook.display().to_string().cyan(),
        sheet.sheet_name,
        sheet.rows.len()
    );

    for column in sheet.invalid_period_columns() {
        warn!(
            "Column '{}' names a period outside 1-7; rows with a value in it will fail",
            column
        );
    }

    let rows = sheet.import_rows();
    let images = read_embedded_images(&config.workbook, &sheet.sheet_name)?;
    info!("{} row(s) have an embedded photo", images.len());

    if config.dry_run {
        return preview::print_dry_run(&rows, &images);
    }

    let backend = config.backend()?;
    let client = SupabaseClient::new(&backend.url, &backend.service_key)?;
    info!("Importing into {}", client.base_url());

    let importer = Importer::new(client, config.context.clone());
    let report = importer.run(&rows, &images).await;
    report.print_summary();

    if let Some(row_number) = report.stopped_at() {
        bail!("Import stopped at row {} after a backend error", row_number);
    }
    if report.failed() > 0 {
        bail!("{} of {} row(s) failed", report.failed(), rows.len());
    }
    Ok(())
}
