mod hours;
mod seed;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "barhop")]
#[command(about = "BarHop command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the distance between two points
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },
    /// Print each seeded bar's open/closed status
    Hours {
        /// Local time to evaluate at, e.g. 2024-06-03T22:00 (defaults to now)
        #[arg(long, value_parser = parse_local_time)]
        at: Option<NaiveDateTime>,
        /// Seed file to read bars from (defaults to the built-in seed)
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Seed file utilities
    Seed {
        #[command(subcommand)]
        command: SeedCommands,
    },
}

#[derive(Debug, Subcommand)]
enum SeedCommands {
    /// Parse and validate a seed file
    Check {
        /// Seed file to check (defaults to the built-in seed)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn parse_local_time(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM: {e}"))
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        }) => {
            println!("{}", barhop_core::calculate_distance(lat1, lon1, lat2, lon2)?);
        }
        Some(Commands::Hours { at, seed }) => {
            let now = at.unwrap_or_else(|| chrono::Local::now().naive_local());
            hours::run_hours(seed.as_deref(), &now)?;
        }
        Some(Commands::Seed {
            command: SeedCommands::Check { path },
        }) => seed::run_seed_check(path.as_deref())?,
        None => println!("barhop: try --help"),
    }

    Ok(())
}
