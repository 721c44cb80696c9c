//! Barfinder CLI - set up and inspect the bar catalogue database

use barfinder::config::{self, BarfinderConfig};
use barfinder::server::{self, AppState};
use barfinder::storage::Database;
use barfinder::ui;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "barfinder")]
#[command(version)]
#[command(about = "Bar catalogue database - users, bars, sports and streaming services")]
#[command(long_about = r#"
Barfinder owns the catalogue schema: users who follow bars, and the sports
and streaming services each bar offers.

Example usage:
  barfinder init
  barfinder --database data/bars.sqlite stats
  barfinder serve --port 5000
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides BARFINDER_DATABASE and the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create any missing tables
    Init,

    /// Show row counts for every table
    Stats {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP host (cross-origin requests allowed)
    Serve {
        /// Address to bind (defaults to the config file, then 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to the config file, then 5000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a default barfinder.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let loaded = config::load_config(cli.config.as_deref())?;
    let database = config::database_path(cli.database.as_deref(), loaded.as_ref());

    match cli.command {
        Commands::Init => {
            config::ensure_db_dir(&database)?;
            let db = Database::open(&database)?;
            let created = db.init_db()?;

            ui::success("Database initialized!");
            ui::info("Database", &database.display().to_string());
            if created.is_empty() {
                ui::info("Created", "nothing (schema already present)");
            } else {
                ui::info("Created", &created.join(", "));
            }
        }

        Commands::Stats { json } => {
            let db = open_initialized(&database)?;
            let stats = db.stats()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                ui::header(&format!("📊 Barfinder Statistics ({})", database.display()));
                println!("{}", ui::stats_table(&stats));
            }
        }

        Commands::Serve { host, port } => {
            let mut server_config = loaded.map(|c| c.server).unwrap_or_default();
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }

            config::ensure_db_dir(&database)?;
            let db = Database::open(&database)?;
            db.init_db()?;

            let state = AppState::new(database, db);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::start_server(&server_config, state))?;
        }

        Commands::Config { command: ConfigCommand::Init { force } } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            let defaults = BarfinderConfig {
                database: Some(config::default_database_path().display().to_string()),
                ..Default::default()
            };
            config::write_config(&path, &defaults, force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}

/// Open a store that `init` has already been run against
fn open_initialized(database: &std::path::Path) -> anyhow::Result<Database> {
    if !database.exists() {
        anyhow::bail!("no database at {} (run `barfinder init` first)", database.display());
    }
    let db = Database::open(database)?;
    if !db.is_initialized()? {
        anyhow::bail!("{} has no barfinder schema (run `barfinder init` first)", database.display());
    }
    Ok(db)
}
