use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use visitor_counter::config::Config;
use visitor_counter::counter::VisitorCounter;
use visitor_counter::models::format_timestamp;
use visitor_counter::storage::TableConnector;

#[derive(Parser)]
#[command(name = "visitor-admin")]
#[command(about = "Visitor counter admin CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the counter table if it does not exist
    Init,
    /// Print the current counters without recording a visit
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let connector = Arc::new(TableConnector::new(config.store));

    match cli.command {
        Commands::Init => {
            connector
                .table()
                .await
                .context("Failed to open the counter table")?;
            println!("✅ Table '{}' is ready", connector.table_name());
        }
        Commands::Show => {
            let counter = VisitorCounter::new(Arc::clone(&connector));
            match counter
                .current_counts()
                .await
                .context("Failed to read the counter")?
            {
                Some(record) => {
                    println!("Total visitors: {}", record.total_visitors);
                    println!("Visitors today: {}", record.visitors_today);
                    println!("Last visited:   {}", format_timestamp(record.last_visited));
                }
                None => println!("No visits recorded yet"),
            }
        }
    }

    Ok(())
}
