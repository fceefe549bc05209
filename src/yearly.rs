//! Yearly aggregation of daily records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::distance::compute_day_record_with;
use crate::ephemeris::Ephemeris;
use crate::error::check_year;
use crate::types::{DailyRecord, DayClassification, GeoLocation, SearchOptions};
use crate::{Error, Result};

/// Progress of a yearly run, reported once per finished day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Days finished so far, including this one.
    pub completed: usize,
    /// Days in the year.
    pub total: usize,
    /// The day just finished.
    pub date: NaiveDate,
}

/// Cooperative cancellation flag, checked between days.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Checks if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// All calendar days of `year`, in order.
///
/// # Errors
/// Returns `InvalidYear` for years outside 1900..=2100.
pub fn days_of_year(year: i32) -> Result<Vec<NaiveDate>> {
    check_year(year)?;
    let first = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| Error::invalid_year(year))?;
    Ok(first
        .iter_days()
        .take_while(|date| date.year() == year)
        .collect())
}

/// Counts and extremes over a year of records.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSummary {
    /// Number of records.
    pub days: usize,
    /// Days classified `Normal`.
    pub normal_days: usize,
    /// Days classified `PolarDay`.
    pub polar_days: usize,
    /// Days classified `PolarNight`.
    pub polar_nights: usize,
    /// `Normal` days whose events did not both resolve.
    pub anomalies: usize,
    /// Smallest `d` over days with both distances, with its date.
    pub min_d: Option<(NaiveDate, f64)>,
    /// Largest `d` over days with both distances, with its date.
    pub max_d: Option<(NaiveDate, f64)>,
    /// Mean of `d` over days with both distances.
    pub mean_d_km: Option<f64>,
    /// Mean sunrise distance over days with a sunrise sample.
    pub mean_sunrise_distance_km: Option<f64>,
    /// Mean noon distance over days with a transit sample.
    pub mean_noon_distance_km: Option<f64>,
}

impl YearSummary {
    /// Summarises `records`.
    #[must_use]
    pub fn from_records(records: &[DailyRecord]) -> Self {
        let count = |classification| {
            records
                .iter()
                .filter(|record| record.classification() == classification)
                .count()
        };

        let measured: Vec<(NaiveDate, f64)> = records
            .iter()
            .filter(|record| record.sunrise().is_some() && record.transit().is_some())
            .map(|record| (record.date(), record.d_km()))
            .collect();

        Self {
            days: records.len(),
            normal_days: count(DayClassification::Normal),
            polar_days: count(DayClassification::PolarDay),
            polar_nights: count(DayClassification::PolarNight),
            anomalies: records.iter().filter(|r| r.anomaly().is_some()).count(),
            min_d: measured.iter().copied().min_by(|a, b| a.1.total_cmp(&b.1)),
            max_d: measured.iter().copied().max_by(|a, b| a.1.total_cmp(&b.1)),
            mean_d_km: mean(measured.iter().map(|&(_, d)| d)),
            mean_sunrise_distance_km: mean(
                records.iter().filter_map(|r| r.sunrise()).map(|s| s.distance_km()),
            ),
            mean_noon_distance_km: mean(
                records.iter().filter_map(|r| r.transit()).map(|s| s.distance_km()),
            ),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Daily records of one year at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct YearReport {
    location: GeoLocation,
    year: i32,
    records: Vec<DailyRecord>,
    summary: YearSummary,
}

impl YearReport {
    fn new(location: GeoLocation, year: i32, records: Vec<DailyRecord>) -> Self {
        let summary = YearSummary::from_records(&records);
        Self {
            location,
            year,
            records,
            summary,
        }
    }

    /// Gets the observer location.
    #[must_use]
    pub const fn location(&self) -> GeoLocation {
        self.location
    }

    /// Gets the year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Gets the records, one per day in date order.
    #[must_use]
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    /// Gets the summary.
    #[must_use]
    pub const fn summary(&self) -> &YearSummary {
        &self.summary
    }

    /// Consumes the report, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<DailyRecord> {
        self.records
    }
}

/// Runs the daily calculation over every day of a year.
///
/// # Example
/// ```no_run
/// use solar_distance::{yearly::YearlyAggregator, Ephemeris, GeoLocation};
///
/// let ephemeris = Ephemeris::builtin().unwrap();
/// let location = GeoLocation::new(40.0, 116.0).unwrap();
/// let report = YearlyAggregator::new(ephemeris)
///     .run(location, 2024, |p| eprint!("\r{}/{}", p.completed, p.total))
///     .unwrap();
/// assert_eq!(report.records().len(), 366);
/// ```
#[derive(Debug, Clone)]
pub struct YearlyAggregator<'a> {
    ephemeris: &'a Ephemeris,
    options: SearchOptions,
    cancel: Option<CancellationToken>,
}

impl<'a> YearlyAggregator<'a> {
    /// Creates an aggregator with default search options and no cancellation.
    #[must_use]
    pub fn new(ephemeris: &'a Ephemeris) -> Self {
        Self {
            ephemeris,
            options: SearchOptions::default(),
            cancel: None,
        }
    }

    /// Uses `options` for every day.
    #[must_use]
    pub const fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Stops between days once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Computes every day of `year` in order, calling `progress` after each day.
    ///
    /// # Errors
    /// Returns `InvalidYear`, `Cancelled`, or the first validation or ephemeris error of any day.
    /// Resolver anomalies do not stop the run.
    pub fn run<P>(&self, location: GeoLocation, year: i32, mut progress: P) -> Result<YearReport>
    where
        P: FnMut(Progress),
    {
        let dates = days_of_year(year)?;
        let total = dates.len();
        info!(%location, year, days = total, "computing year");

        let mut records = Vec::with_capacity(total);
        for date in dates {
            if self.is_cancelled() {
                return Err(Error::Cancelled {
                    completed: records.len(),
                    total,
                });
            }
            records.push(compute_day_record_with(
                self.ephemeris,
                location,
                date,
                &self.options,
            )?);
            progress(Progress {
                completed: records.len(),
                total,
                date,
            });
        }

        Ok(self.finish(location, year, records))
    }

    /// Computes the days of `year` on the rayon pool and reassembles them in date order.
    ///
    /// `progress` may be called from several threads; `completed` counts finished days
    /// in completion order.
    ///
    /// # Errors
    /// Same as [`run`](Self::run). After a cancellation, `completed` is the number of days
    /// finished when the cancelled day was reached.
    #[cfg(feature = "parallel")]
    pub fn run_parallel<P>(&self, location: GeoLocation, year: i32, progress: P) -> Result<YearReport>
    where
        P: Fn(Progress) + Sync,
    {
        use rayon::prelude::*;
        use std::sync::atomic::AtomicUsize;

        let dates = days_of_year(year)?;
        let total = dates.len();
        let completed = AtomicUsize::new(0);
        info!(%location, year, days = total, "computing year in parallel");

        let records = dates
            .par_iter()
            .map(|&date| {
                if self.is_cancelled() {
                    return Err(Error::Cancelled {
                        completed: completed.load(Ordering::Relaxed),
                        total,
                    });
                }
                let record = compute_day_record_with(self.ephemeris, location, date, &self.options)?;
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                progress(Progress {
                    completed: done,
                    total,
                    date,
                });
                Ok(record)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.finish(location, year, records))
    }

    fn finish(&self, location: GeoLocation, year: i32, records: Vec<DailyRecord>) -> YearReport {
        let report = YearReport::new(location, year, records);
        let summary = report.summary();
        info!(
            %location,
            year,
            normal = summary.normal_days,
            polar_days = summary.polar_days,
            polar_nights = summary.polar_nights,
            anomalies = summary.anomalies,
            "year complete"
        );
        debug!(options = ?self.options, "search options used");
        report
    }
}

/// Computes every day of `year` with the built-in ephemeris and default options.
///
/// # Errors
/// Returns `InvalidYear` or `DataUnavailable`, or the first error of any day.
pub fn compute_year(location: GeoLocation, year: i32) -> Result<YearReport> {
    YearlyAggregator::new(Ephemeris::builtin()?).run(location, year, |_| {})
}
