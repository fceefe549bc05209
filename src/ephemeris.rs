//! Earth periodic-term ephemeris.
//!
//! An [`Ephemeris`] holds the L/B/R periodic series for the Earth's heliocentric position.
//! The built-in table is the one tabulated for NREL SPA; alternative tables can be loaded
//! from CSV files with the header `series,order,amplitude,phase,frequency`.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::math::{normalize_degrees_0_to_360, polynomial};
use crate::spa::coefficients::{TERMS_B, TERMS_L, TERMS_R};
use crate::spa::{self, Topocentric};
use crate::types::GeoLocation;
use crate::{Error, Result};

/// First year the ephemeris and ΔT estimate are valid for.
pub const FIRST_COVERED_YEAR: i32 = -2000;

/// Last year the ephemeris and ΔT estimate are valid for.
pub const LAST_COVERED_YEAR: i32 = 3000;

/// Highest power of the time argument a series may carry.
const MAX_ORDER: usize = 5;

static BUILTIN: OnceLock<core::result::Result<Ephemeris, String>> = OnceLock::new();

/// One term `A·cos(B + C·τ)`, τ in Julian millennia from J2000.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicTerm {
    /// Amplitude in units of 1e-8 (radians for L and B, AU for R)
    pub amplitude: f64,
    /// Phase in radians
    pub phase: f64,
    /// Frequency in radians per Julian millennium
    pub frequency: f64,
}

/// Heliocentric ecliptic position of the Earth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heliocentric {
    longitude: f64,
    latitude: f64,
    radius_au: f64,
}

impl Heliocentric {
    /// Heliocentric longitude L in degrees, [0, 360).
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Heliocentric latitude B in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Radius vector R in AU.
    #[must_use]
    pub const fn radius_au(&self) -> f64 {
        self.radius_au
    }
}

/// The three periodic series, indexed by power of τ.
#[derive(Debug, Clone, PartialEq)]
pub struct Ephemeris {
    l: Vec<Vec<PeriodicTerm>>,
    b: Vec<Vec<PeriodicTerm>>,
    r: Vec<Vec<PeriodicTerm>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
enum Series {
    L,
    B,
    R,
}

#[derive(Debug, Deserialize)]
struct TermRow {
    series: Series,
    order: usize,
    amplitude: f64,
    phase: f64,
    frequency: f64,
}

impl Ephemeris {
    /// The built-in table, loaded on first use and shared for the life of the process.
    ///
    /// # Errors
    /// Returns `DataUnavailable` if the table failed validation. The outcome is cached;
    /// later calls return the same error without retrying.
    pub fn builtin() -> Result<&'static Self> {
        BUILTIN
            .get_or_init(|| {
                let loaded = Self::from_tables(TERMS_L, TERMS_B, TERMS_R);
                if let Ok(ephemeris) = &loaded {
                    info!(terms = ephemeris.term_count(), "loaded built-in ephemeris");
                }
                loaded.map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(|reason| Error::data_unavailable(reason.clone()))
    }

    fn from_tables(l: &[&[[f64; 3]]], b: &[&[[f64; 3]]], r: &[&[[f64; 3]]]) -> Result<Self> {
        let convert = |series: &[&[[f64; 3]]]| -> Vec<Vec<PeriodicTerm>> {
            series
                .iter()
                .map(|terms| {
                    terms
                        .iter()
                        .map(|&[amplitude, phase, frequency]| PeriodicTerm {
                            amplitude,
                            phase,
                            frequency,
                        })
                        .collect()
                })
                .collect()
        };
        Self::validated(convert(l), convert(b), convert(r))
    }

    /// Loads a table from a CSV file.
    ///
    /// # Errors
    /// Returns `DataUnavailable` if the file cannot be opened or its content is invalid.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::data_unavailable(format!("cannot open {}: {e}", path.display()))
        })?;
        let ephemeris = Self::from_csv_reader(file)
            .map_err(|e| Error::data_unavailable(format!("{}: {e}", path.display())))?;
        info!(
            path = %path.display(),
            terms = ephemeris.term_count(),
            "loaded ephemeris table"
        );
        Ok(ephemeris)
    }

    /// Loads a table from CSV data.
    ///
    /// # Errors
    /// Returns `DataUnavailable` for malformed rows, orders above 5, non-finite values,
    /// or a missing leading series L0, B0 or R0.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut l = Vec::new();
        let mut b = Vec::new();
        let mut r = Vec::new();

        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        for (index, row) in csv_reader.deserialize::<TermRow>().enumerate() {
            let row = row.map_err(|e| Error::data_unavailable(format!("row {}: {e}", index + 1)))?;
            if row.order > MAX_ORDER {
                return Err(Error::data_unavailable(format!(
                    "row {}: order {} exceeds {MAX_ORDER}",
                    index + 1,
                    row.order
                )));
            }
            let series = match row.series {
                Series::L => &mut l,
                Series::B => &mut b,
                Series::R => &mut r,
            };
            if series.len() <= row.order {
                series.resize_with(row.order + 1, Vec::new);
            }
            series[row.order].push(PeriodicTerm {
                amplitude: row.amplitude,
                phase: row.phase,
                frequency: row.frequency,
            });
        }

        Self::validated(l, b, r)
    }

    fn validated(
        l: Vec<Vec<PeriodicTerm>>,
        b: Vec<Vec<PeriodicTerm>>,
        r: Vec<Vec<PeriodicTerm>>,
    ) -> Result<Self> {
        for (name, series) in [("L", &l), ("B", &b), ("R", &r)] {
            if series.first().is_none_or(Vec::is_empty) {
                return Err(Error::data_unavailable(format!(
                    "series {name}0 has no terms"
                )));
            }
            let finite = series.iter().flatten().all(|term| {
                term.amplitude.is_finite() && term.phase.is_finite() && term.frequency.is_finite()
            });
            if !finite {
                return Err(Error::data_unavailable(format!(
                    "series {name} holds non-finite values"
                )));
            }
        }
        debug!(
            l = l.len(),
            b = b.len(),
            r = r.len(),
            "validated ephemeris series"
        );
        Ok(Self { l, b, r })
    }

    /// Total number of periodic terms in the table.
    #[must_use]
    pub fn term_count(&self) -> usize {
        [&self.l, &self.b, &self.r]
            .into_iter()
            .flatten()
            .map(Vec::len)
            .sum()
    }

    /// Earth's heliocentric position at `jme` Julian ephemeris millennia from J2000.0.
    #[must_use]
    pub fn heliocentric(&self, jme: f64) -> Heliocentric {
        Heliocentric {
            longitude: normalize_degrees_0_to_360(evaluate_series(&self.l, jme).to_degrees()),
            latitude: evaluate_series(&self.b, jme).to_degrees(),
            radius_au: evaluate_series(&self.r, jme),
        }
    }

    /// Checks that an instant lies within the table's coverage.
    ///
    /// # Errors
    /// Returns `DataUnavailable` for instants before year -2000 or after year 3000.
    pub fn check_coverage(&self, instant: DateTime<Utc>) -> Result<()> {
        let year = instant.year();
        if !(FIRST_COVERED_YEAR..=LAST_COVERED_YEAR).contains(&year) {
            return Err(Error::data_unavailable(format!(
                "year {year} is outside the ephemeris coverage \
                 {FIRST_COVERED_YEAR}..={LAST_COVERED_YEAR}"
            )));
        }
        Ok(())
    }

    /// The Sun as seen from `location` at `instant`.
    ///
    /// # Errors
    /// Returns `DataUnavailable` outside the coverage, or `ComputationError` for non-physical results.
    pub fn observe(&self, location: GeoLocation, instant: DateTime<Utc>) -> Result<Topocentric> {
        spa::observe(self, location, instant)
    }

    /// Distance from a sea-level observer to the Sun's centre in kilometers.
    ///
    /// # Errors
    /// Returns `DataUnavailable` outside the coverage, or `ComputationError` for non-physical results.
    pub fn distance_to_sun(&self, location: GeoLocation, instant: DateTime<Utc>) -> Result<f64> {
        self.observe(location, instant).map(|view| view.distance_km())
    }
}

/// Σᵢ (Σ A·cos(B + C·τ))·τⁱ, scaled from 1e-8 units.
fn evaluate_series(series: &[Vec<PeriodicTerm>], jme: f64) -> f64 {
    let mut sums = [0.0; MAX_ORDER + 1];
    for (sum, terms) in sums.iter_mut().zip(series) {
        *sum = terms
            .iter()
            .map(|term| term.amplitude * term.frequency.mul_add(jme, term.phase).cos())
            .sum();
    }
    polynomial(&sums[..series.len().min(MAX_ORDER + 1)], jme) / 1e8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MINIMAL_TABLE: &str = "\
series,order,amplitude,phase,frequency
L,0,175347046,0,0
L,1,628331966747,0,0
B,0,0,0,0
R,0,100000000,0,0
";

    #[test]
    fn test_builtin_is_shared() {
        let first = Ephemeris::builtin().unwrap();
        let second = Ephemeris::builtin().unwrap();
        assert!(core::ptr::eq(first, second));
        assert_eq!(first.term_count(), 64 + 34 + 20 + 7 + 3 + 1 + 5 + 2 + 40 + 10 + 6 + 2 + 1);
    }

    #[test]
    fn test_heliocentric_reference_values() {
        // Reda & Andreas (2003), table A5.1: JME = 0.0037927819916852
        let position = Ephemeris::builtin().unwrap().heliocentric(0.003_792_781_991_685_2);
        assert!((position.longitude() - 24.018_261_691_7).abs() < 1e-6);
        assert!((position.latitude() - -0.000_101_121_9).abs() < 1e-6);
        assert!((position.radius_au() - 0.996_542_297_4).abs() < 1e-8);
    }

    #[test]
    fn test_minimal_csv_table() {
        let ephemeris = Ephemeris::from_csv_reader(MINIMAL_TABLE.as_bytes()).unwrap();
        assert_eq!(ephemeris.term_count(), 4);

        let position = ephemeris.heliocentric(0.0);
        assert_eq!(position.radius_au(), 1.0);
        assert_eq!(position.latitude(), 0.0);
        assert!((position.longitude() - 1.75347046_f64.to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn test_csv_rejections() {
        let missing_radius = "series,order,amplitude,phase,frequency\nL,0,1,0,0\nB,0,0,0,0\n";
        assert!(matches!(
            Ephemeris::from_csv_reader(missing_radius.as_bytes()),
            Err(Error::DataUnavailable { .. })
        ));

        let bad_order = format!("{MINIMAL_TABLE}R,6,1,0,0\n");
        assert!(Ephemeris::from_csv_reader(bad_order.as_bytes()).is_err());

        let bad_series = format!("{MINIMAL_TABLE}Q,0,1,0,0\n");
        assert!(Ephemeris::from_csv_reader(bad_series.as_bytes()).is_err());

        let not_finite = format!("{MINIMAL_TABLE}R,1,NaN,0,0\n");
        assert!(Ephemeris::from_csv_reader(not_finite.as_bytes()).is_err());
    }

    #[test]
    fn test_coverage() {
        let ephemeris = Ephemeris::builtin().unwrap();
        let inside = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let outside = Utc.with_ymd_and_hms(3001, 1, 1, 0, 0, 0).unwrap();

        assert!(ephemeris.check_coverage(inside).is_ok());
        assert!(matches!(
            ephemeris.distance_to_sun(GeoLocation::new(0.0, 0.0).unwrap(), outside),
            Err(Error::DataUnavailable { .. })
        ));
    }
}
