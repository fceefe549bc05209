//! CSV export of yearly reports.

use core::fmt;
use std::io::Write;

use serde::Serialize;

use crate::types::DailyRecord;
use crate::yearly::{YearReport, YearSummary};
use crate::Result;

#[derive(Serialize)]
struct Row<'a> {
    date: String,
    classification: &'a str,
    sunrise_local: String,
    sunrise_utc: String,
    sunrise_distance_km: f64,
    transit_local: String,
    transit_utc: String,
    noon_distance_km: f64,
    d_km: f64,
    anomaly: String,
}

impl<'a> From<&'a DailyRecord> for Row<'a> {
    fn from(record: &'a DailyRecord) -> Self {
        Self {
            date: record.date().to_string(),
            classification: record.classification().label(),
            sunrise_local: record.sunrise_local_label(),
            sunrise_utc: record.sunrise_utc_label(),
            sunrise_distance_km: record.sunrise_distance_km(),
            transit_local: record.transit_local_label(),
            transit_utc: record.transit_utc_label(),
            noon_distance_km: record.noon_distance_km(),
            d_km: record.d_km(),
            anomaly: record.anomaly().map(|a| a.to_string()).unwrap_or_default(),
        }
    }
}

/// Writes one CSV row per day, with a header.
///
/// Columns: `date, classification, sunrise_local, sunrise_utc, sunrise_distance_km,
/// transit_local, transit_utc, noon_distance_km, d_km, anomaly`. Times are `HH:MM:SS`;
/// local times are local mean solar time.
///
/// # Errors
/// Returns `Report` if writing fails.
pub fn write_csv<W: Write>(report: &YearReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in report.records() {
        csv_writer.serialize(Row::from(record))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

impl fmt::Display for YearSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "days: {} (normal {}, polar day {}, polar night {}, anomalies {})",
            self.days, self.normal_days, self.polar_days, self.polar_nights, self.anomalies
        )?;
        if let (Some((min_date, min)), Some((max_date, max))) = (self.min_d, self.max_d) {
            writeln!(f, "d range: {min:.2} km on {min_date} to {max:.2} km on {max_date}")?;
        }
        if let Some(mean) = self.mean_d_km {
            writeln!(f, "mean d: {mean:.2} km")?;
        }
        if let Some(mean) = self.mean_sunrise_distance_km {
            writeln!(f, "mean sunrise distance: {mean:.2} km")?;
        }
        if let Some(mean) = self.mean_noon_distance_km {
            write!(f, "mean noon distance: {mean:.2} km")?;
        }
        Ok(())
    }
}
