//! Avance - Self-hosted Fitness Log
//!
//! Command line entry point.

use anyhow::{Context, Result};
use avance::storage::config::load_config;
use avance::App;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "avance", version, about = "Self-hosted fitness log")]
struct Cli {
    /// Database file; defaults to the one in the data directory
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    Register {
        email: String,
        password: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print an overview of an account's training
    Summary { email: String, password: String },
    /// Write an account's data as JSON
    Export {
        email: String,
        password: String,
        /// Output file; standard output when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Avance v{}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = cli.database {
        config.data_dir = path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        config.database_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .context("Database path has no file name")?;
    }

    let app = App::open(config).context("Failed to open database")?;

    match cli.command {
        Command::Register {
            email,
            password,
            name,
        } => {
            let user = app.register(&email, &password, name.as_deref())?;
            println!("Created account {} ({})", user.email, user.uid);
        }
        Command::Summary { email, password } => {
            app.login(&email, &password)?;
            let summary = app.summary()?;
            let units = app.store().get_setting("weightUnit").unwrap_or_default();

            println!("Workouts:          {}", summary.workouts);
            println!("Last 7 days:       {}", summary.workouts_last_7_days);
            println!("Current streak:    {} days", summary.streak_days);
            println!("Average duration:  {} min", summary.average_duration);
            println!("Total volume:      {:.0} {}", summary.total_volume, units);
            println!("Routines:          {}", summary.routines);
            println!("Personal records:  {}", summary.personal_records);
            if let Some(weight) = summary.latest_weight {
                println!("Latest weight:     {:.1} {}", weight, units);
            }
            for (name, volume) in &summary.top_exercises {
                println!("  {:<24} {:.0} {}", name, volume, units);
            }
        }
        Command::Export {
            email,
            password,
            output,
        } => {
            app.login(&email, &password)?;
            let json = app.export_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Export written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    app.logout();
    Ok(())
}
