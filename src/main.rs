//! newsloom: command-line entry point for the crawl engine.

use clap::{Parser, Subcommand};
use newsloom::config::load_settings;
use newsloom::crawler::CrawlEngine;
use newsloom::store;
use newsloom::supervisor::{live_status, Supervisor};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "newsloom")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Seed-driven news crawler engine", long_about = None)]
struct Cli {
    /// Path to the bootstrap TOML settings file
    #[arg(short = 'c', long, value_name = "SETTINGS", default_value = "newsloom.toml")]
    settings: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the crawl engine to completion in the foreground
    Run {
        /// Resume a specific run id instead of starting a new one
        #[arg(long)]
        run_id: Option<i64>,
    },
    /// Print the current run status and queue counts
    Status,
    /// Write every stored article to a CSV file
    ExportCsv {
        /// Destination path for the CSV file
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let settings = load_settings(&cli.settings)?;
    let pool = store::connect(&settings.database_url).await?;

    match cli.command {
        Command::Run { run_id } => run(pool, &settings, run_id).await?,
        Command::Status => status(pool).await?,
        Command::ExportCsv { path } => export_csv(pool, &path).await?,
    }

    Ok(())
}

fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("newsloom=info,warn"),
            1 => EnvFilter::new("newsloom=debug,info"),
            2 => EnvFilter::new("newsloom=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(
    pool: store::Pool,
    settings: &newsloom::Settings,
    run_id: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = CrawlEngine::new(pool.clone(), settings.fetch_timeout_seconds, settings.llm_timeout_seconds).await?;
    let existing = match run_id {
        Some(id) => Some(store::runs::get_run(&pool, id).await?),
        None => None,
    };
    let run = engine.run(existing).await?;
    tracing::info!(
        run_id = run.id,
        status = ?run.status(),
        pages_processed = run.pages_processed,
        articles_created = run.articles_created,
        queued_urls = run.queued_urls,
        "run finished"
    );
    Ok(())
}

async fn status(pool: store::Pool) -> Result<(), Box<dyn std::error::Error>> {
    let supervisor = Supervisor::new(pool.clone(), 20, 45);
    let status = live_status(&pool, &supervisor).await?;
    println!("running: {}", status.running);
    if !status.last_error.is_empty() {
        println!("last_error: {}", status.last_error);
    }
    if let Some(run) = status.last_run {
        println!(
            "last_run: id={} status={:?} pages_processed={} articles_created={} queued_urls={}",
            run.id,
            run.status(),
            run.pages_processed,
            run.articles_created,
            run.queued_urls
        );
    }
    println!(
        "queue: pending={} in_progress={} done={} failed={}",
        status.queue.pending, status.queue.in_progress, status.queue.done, status.queue.failed
    );
    Ok(())
}

async fn export_csv(pool: store::Pool, path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path)?;
    let writer = csv::Writer::from_writer(file);
    let count = newsloom::export::write_csv(&pool, writer).await?;
    println!("wrote {count} articles to {}", path.display());
    Ok(())
}
