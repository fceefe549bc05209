mod cli;
mod logging;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use solar_distance::{report, Config, GeoLocation, Progress, YearReport, YearlyAggregator};

use crate::cli::{Cli, Command, DayArgs, LocationArgs, YearArgs};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Command::Day(args) => day(&config, &args),
        Command::Year(args) => year(&config, &args),
    }
}

fn location(args: &LocationArgs) -> Result<GeoLocation> {
    GeoLocation::new(args.lat, args.lon).context("invalid observer location")
}

fn day(config: &Config, args: &DayArgs) -> Result<()> {
    let location = location(&args.location)?;
    let options = config.search_options().context("invalid [search] settings")?;
    let ephemeris = config.load_ephemeris().context("failed to load ephemeris")?;

    let record =
        solar_distance::distance::compute_day_record_with(&ephemeris, location, args.date, &options)
            .with_context(|| format!("failed to compute {}", args.date))?;

    println!("{location}");
    println!("{record}");
    Ok(())
}

fn year(config: &Config, args: &YearArgs) -> Result<()> {
    let location = location(&args.location)?;
    let options = config.search_options().context("invalid [search] settings")?;
    let ephemeris = config.load_ephemeris().context("failed to load ephemeris")?;
    let aggregator = YearlyAggregator::new(&ephemeris).with_options(options);

    let show = |p: Progress| {
        if p.completed % 10 == 0 || p.completed == p.total {
            eprint!("\r{}/{} days", p.completed, p.total);
        }
    };

    #[cfg(feature = "parallel")]
    let report: YearReport = if args.parallel {
        aggregator.run_parallel(location, args.year, show)
    } else {
        aggregator.run(location, args.year, show)
    }
    .with_context(|| format!("failed to compute year {}", args.year))?;
    #[cfg(not(feature = "parallel"))]
    let report: YearReport = aggregator
        .run(location, args.year, show)
        .with_context(|| format!("failed to compute year {}", args.year))?;
    eprintln!();

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            report::write_csv(&report, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote yearly report");
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            report::write_csv(&report, &mut lock).context("failed to write CSV to stdout")?;
            lock.flush().context("failed to flush stdout")?;
        }
    }

    let summary = report.summary();
    info!(
        year = report.year(),
        days = summary.days,
        anomalies = summary.anomalies,
        mean_d_km = ?summary.mean_d_km,
        "yearly summary"
    );
    eprintln!("{summary}");
    Ok(())
}
