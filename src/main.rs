use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tempstat::{config::Config, manager::Manager};

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV file with `city,timestamp,temperature,season` columns.
    #[arg(long)]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the cities present in the data.
    Cities,

    /// Compute rolling means, season baselines and outliers for a city.
    Analyze {
        #[arg(long)]
        city: String,

        /// Write the full report as JSON.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Classify a given temperature against the city's season baseline.
    Check {
        #[arg(long)]
        city: String,

        #[arg(long, allow_negative_numbers = true)]
        temperature: f64,

        /// Reference date (YYYY-MM-DD), today by default.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Fetch the current temperature and classify it.
    Live {
        #[arg(long)]
        city: String,

        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();

    let cfg = match &args.config {
        Some(file) => Config::from_file(file).context("failed to construct cfg")?,
        None => Config::default(),
    };
    log::debug!("{cfg:#?}");

    let mgr = Manager::new(&args.data, cfg);
    let today = Local::now().date_naive();

    match args.command {
        Command::Cities => {
            mgr.show_cities()?;
        }
        Command::Analyze { city, output } => {
            mgr.analyze_city(&city, output.as_deref())?;
        }
        Command::Check {
            city,
            temperature,
            date,
        } => {
            mgr.check_reading(&city, temperature, date.unwrap_or(today))?;
        }
        Command::Live { city, api_key } => {
            mgr.check_live(&city, api_key, today)?;
        }
    }

    Ok(())
}
