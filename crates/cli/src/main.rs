use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use connectors::postgres::adapter::PgAdapter;
use loader::{
    batch::BatchLoader,
    extract::PgExtractor,
    progress::fetch_progress,
};
use model::{
    config::{LoadMode, LoaderConfig},
    core::identifiers::Partition,
    progress::LoadProgress,
    schema::{LoadKind, TableModel},
};
use tracing::{Level, info};

mod commands;
mod error;
mod registry;

#[derive(Parser)]
#[command(name = "idrload", version = "0.1.0", about = "IDR batch loader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            source,
            target,
            table,
            mode,
            batch_size,
            min_transaction_date,
            force_load_progress,
            partition,
        } => {
            let config = LoaderConfig {
                load_mode: parse_mode(&mode)?,
                batch_size,
                min_transaction_date,
                force_load_progress,
            };
            let models = resolve_tables(&table)?;
            run_load(&source, &target, models, &partition, config).await?;
        }
        Commands::Progress {
            target,
            table,
            partition,
            json,
        } => {
            show_progress(&target, &table, &partition, json).await?;
        }
        Commands::TestConn { conn_str } => {
            let adapter = PgAdapter::connect(&conn_str).await?;
            adapter.exec("SELECT 1").await?;
            info!("Connection OK");
        }
    }

    Ok(())
}

fn parse_mode(mode: &str) -> Result<LoadMode, CliError> {
    match mode {
        "local" => Ok(LoadMode::Local),
        "idr" => Ok(LoadMode::Idr),
        other => Err(CliError::InvalidLoadMode(other.to_string())),
    }
}

/// Requested tables in registry load order, or every table when none
/// were named.
fn resolve_tables(names: &[String]) -> Result<Vec<&'static dyn TableModel>, CliError> {
    if names.is_empty() {
        return Ok(registry::all_tables());
    }
    names
        .iter()
        .map(|name| registry::find(name).ok_or_else(|| CliError::UnknownTable(name.clone())))
        .collect()
}

/// Replace tables always reload whole. For everything else only a
/// completed prior window gets a delta scan: while `batch_complete_ts`
/// still carries the incomplete sentinel the interrupted run resumes
/// with the same full-scan column set, and the incremental extraction
/// floor never applies to rows the first scan had yet to reach.
fn choose_kind(model: &dyn TableModel, progress: Option<&LoadProgress>) -> LoadKind {
    if model.should_replace() {
        return LoadKind::Initial;
    }
    match progress {
        Some(p) if p.is_complete() => LoadKind::Incremental,
        _ => LoadKind::Initial,
    }
}

async fn run_load(
    source_url: &str,
    target_url: &str,
    models: Vec<&'static dyn TableModel>,
    partition: &str,
    config: LoaderConfig,
) -> Result<(), CliError> {
    let source = PgAdapter::connect(source_url).await?;
    let mut target = PgAdapter::connect(target_url).await?;
    let partition = Partition::new(partition);

    for model in models {
        let progress = if config.track_progress() {
            fetch_progress(&target, &model.table().to_string(), &partition).await?
        } else {
            None
        };
        let kind = choose_kind(model, progress.as_ref());
        info!(table = %model.table(), ?kind, "starting load");

        let extractor = PgExtractor::new(&source, model, kind, &config, progress.as_ref());
        let mut load = BatchLoader::new(
            &mut target,
            extractor,
            model,
            kind,
            partition.clone(),
            config.clone(),
        );
        load.load().await?;
    }

    Ok(())
}

async fn show_progress(
    target_url: &str,
    table: &str,
    partition: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let adapter = PgAdapter::connect(target_url).await?;
    // Accept bare table names for registered tables.
    let table_name = registry::find(table)
        .map(|model| model.table().to_string())
        .unwrap_or_else(|| table.to_string());
    let partition = Partition::new(partition);

    match fetch_progress(&adapter, &table_name, &partition).await? {
        Some(progress) if as_json => {
            let json =
                serde_json::to_string_pretty(&progress).map_err(CliError::JsonSerialize)?;
            println!("{json}");
        }
        Some(progress) => print_progress_table(&progress),
        None => println!("No progress recorded for '{table_name}' / partition '{partition}'"),
    }

    Ok(())
}

fn print_progress_table(progress: &LoadProgress) {
    println!(
        "Progress for '{}' / partition '{}':",
        progress.table_name, progress.batch_partition
    );
    println!("-----------------------------");
    println!("{:<20} {}", "Last timestamp", progress.last_ts.to_rfc3339());
    println!("{:<20} {}", "Last id", progress.last_id);
    println!("{:<20} {}", "Job start", progress.job_start_ts.to_rfc3339());
    println!(
        "{:<20} {}",
        "Batch start",
        progress.batch_start_ts.to_rfc3339()
    );
    let complete = if progress.is_complete() {
        progress.batch_complete_ts.to_rfc3339()
    } else {
        "incomplete".to_string()
    };
    println!("{:<20} {}", "Batch complete", complete);
}
