use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use headtrack::config::Config;
use headtrack::dimension::registry;
use headtrack::models::{AnalyticsConfig, Scope};
use headtrack::storage;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "headtrack-admin")]
#[command(about = "Headtrack analytics settings management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all configured analytics records
    List,
    /// Show one analytics record as JSON
    Show {
        /// Record id
        id: i64,
    },
    /// Enable an analytics record
    Enable {
        /// Record id
        id: i64,
    },
    /// Disable an analytics record
    Disable {
        /// Record id
        id: i64,
    },
    /// Delete an analytics record
    Delete {
        /// Record id
        id: i64,
    },
    /// List the dimension plugins available for a scope (action, visit)
    Options {
        scope: Scope,
    },
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn print_row(config: &AnalyticsConfig) {
    println!(
        "{:<6} {:<12} {:<8} {:<20} {}",
        config.id.map(|id| id.to_string()).unwrap_or_default(),
        config.vendor,
        yes_no(config.enabled),
        config.site_id,
        config.site_url.as_deref().unwrap_or("-")
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Listing plugins does not need the database
    if let Commands::Options { scope } = cli.command {
        for (name, label) in registry().options_for_scope(scope) {
            if !name.is_empty() {
                println!("{:<40} {}", name, label);
            }
        }
        return Ok(());
    }

    let config = Config::from_env()?;
    let storage = storage::connect(&config.database).await?;

    // Ensure database is initialized
    storage.init().await?;

    match cli.command {
        Commands::List => {
            let records = storage.get_all().await?;
            if records.is_empty() {
                println!("No analytics records configured.");
            } else {
                println!(
                    "{:<6} {:<12} {:<8} {:<20} {}",
                    "ID", "Type", "Enabled", "Site ID", "Site URL"
                );
                println!("{}", "-".repeat(80));
                for record in &records {
                    print_row(record);
                }
            }
        }
        Commands::Show { id } => match storage.get(id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => bail!("Analytics record {id} not found"),
        },
        Commands::Enable { id } | Commands::Disable { id } => {
            let enabled = matches!(cli.command, Commands::Enable { .. });
            if storage.set_enabled(id, enabled).await? {
                println!(
                    "✓ Analytics record {} {}",
                    id,
                    if enabled { "enabled" } else { "disabled" }
                );
            } else {
                println!("⚠ Analytics record {} not found", id);
            }
        }
        Commands::Delete { id } => {
            if storage.delete(id).await? {
                println!("✓ Deleted analytics record {}", id);
            } else {
                println!("⚠ Analytics record {} not found", id);
            }
        }
        Commands::Options { .. } => {}
    }

    Ok(())
}
