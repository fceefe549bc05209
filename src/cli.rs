use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Observer-to-Sun distance at sunrise versus solar noon.
#[derive(Parser)]
#[command(
    name = "solar-distance",
    version,
    about = "Observer-to-Sun distance at sunrise versus solar noon"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Sunrise, solar noon and their distance difference for one day.
    Day(DayArgs),
    /// Daily records for a whole year, as CSV.
    Year(YearArgs),
}

/// Observer coordinates shared by all subcommands.
#[derive(clap::Args)]
pub struct LocationArgs {
    /// Latitude in degrees, north positive.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees, east positive.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,
}

/// Arguments for the `day` subcommand.
#[derive(clap::Args)]
pub struct DayArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Local calendar date (YYYY-MM-DD).
    #[arg(long)]
    pub date: NaiveDate,
}

/// Arguments for the `year` subcommand.
#[derive(clap::Args)]
pub struct YearArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Calendar year (1900-2100).
    #[arg(long)]
    pub year: i32,

    /// Write the CSV here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compute days on a worker pool.
    #[cfg(feature = "parallel")]
    #[arg(long)]
    pub parallel: bool,
}
