use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use roster_lite::api::{router, run_api, ApiState};
use roster_lite::cache::ScheduleCache;
use roster_lite::config::{CacheConfig, ServerConfig};
use roster_lite::roster::{RowKind, ScheduleTable};
use roster_lite::service::ScheduleService;
use roster_lite::shutdown::install_shutdown_handler;
use roster_lite::source::FixtureSource;

#[derive(Parser, Debug)]
#[command(name = "roster-lite")]
#[command(version)]
#[command(about = "Schedule table service: hours per position and worker per day")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the schedule table over HTTP
    Serve(ServeArgs),

    /// Print the schedule table once and exit
    Table(TableArgs),
}

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Directory holding positions.json, workers.json, tasks.json and assignments.json
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// IP address to bind (IPv4 or IPv6)
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Allowed CORS origin (repeatable). Any origin when omitted.
    #[arg(long = "allowed-origin")]
    allowed_origins: Vec<String>,

    /// Number of snapshot versions kept in the result cache
    #[arg(long, default_value = "8")]
    cache_entries: usize,
}

impl ServeArgs {
    fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Parser, Debug)]
struct TableArgs {
    /// Directory holding the JSON fixtures
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_service(data_dir: PathBuf, cache: CacheConfig) -> Arc<ScheduleService> {
    Arc::new(ScheduleService::new(
        Arc::new(FixtureSource::new(data_dir)),
        ScheduleCache::new(cache),
    ))
}

// =============================================================================
// Server
// =============================================================================

async fn run_server(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let listen_addr = args.listen_addr();

    let config = ServerConfig {
        listen_addr,
        data_dir: args.data_dir,
        allowed_origins: args.allowed_origins,
        cache: CacheConfig {
            max_entries: args.cache_entries,
        },
    };

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir.display(),
        allowed_origins = ?config.allowed_origins,
        cache_entries = config.cache.max_entries,
        "Starting roster-lite"
    );

    let service = build_service(config.data_dir.clone(), config.cache.clone());

    // Surface fixture problems at startup; requests still report them.
    if let Err(e) = service.schedule_table().await {
        tracing::warn!(error = %e, "Initial schedule build failed");
    }

    let shutdown = install_shutdown_handler()?;
    let app = router(ApiState { service }, &config.allowed_origins);
    run_api(config.listen_addr, app, shutdown).await?;
    Ok(())
}

// =============================================================================
// One-shot table output
// =============================================================================

fn print_table(table: &ScheduleTable) {
    if table.is_empty() {
        println!("No schedule data.");
        return;
    }

    let columns = table.columns();
    let label_width = table
        .rows
        .iter()
        .map(|r| r.label.len() + 2)
        .chain(std::iter::once(columns[0].len()))
        .max()
        .unwrap_or(0);

    let mut header = format!("{:<width$}", columns[0], width = label_width);
    for col in &columns[1..] {
        header.push_str(&format!(" {:>9}", col));
    }
    println!("{}", header);
    println!("{}", "-".repeat(header.len()));

    for row in &table.rows {
        let label = match row.kind {
            RowKind::Position => row.label.clone(),
            RowKind::Worker => format!("  {}", row.label),
        };
        let mut line = format!("{:<width$}", label, width = label_width);
        for date in &table.dates {
            line.push_str(&format!(" {:>9}", row.hours_on(*date)));
        }
        println!("{}", line);
    }
    println!();
    println!(
        "{} rows, {} dates, {} hours total",
        table.rows.len(),
        table.dates.len(),
        table.total_hours()
    );
}

async fn handle_table(args: TableArgs) -> Result<(), Box<dyn std::error::Error>> {
    let service = build_service(args.data_dir, CacheConfig::default());
    let table = service.schedule_table().await?;

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&table.to_view())?);
        }
        OutputFormat::Table => print_table(&table),
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging();

    match args.command {
        Commands::Serve(serve_args) => {
            run_server(serve_args).await?;
        }
        Commands::Table(table_args) => {
            handle_table(table_args).await?;
        }
    }

    Ok(())
}
