//! # Solar Distance
//!
//! Observer-to-Sun distance at sunrise versus solar noon, day by day.
//!
//! For an observer at sea level, the Sun is slightly farther away at sunrise than at local
//! upper transit: at noon the observer has rotated towards it. This crate finds both events
//! for a local calendar day, evaluates the topocentric distance at each, and reports the
//! difference `d = sunrise distance - noon distance`. A yearly aggregator runs the
//! calculation over every day of a year.
//!
//! Solar positions follow NREL's Solar Position Algorithm (Reda & Andreas 2003), with the
//! Earth's heliocentric position evaluated from a periodic-term [`Ephemeris`].
//! Event times are found by sampling a discrete indicator and bisecting every change
//! (see [`events::find_discrete`]).
//!
//! ## Local time
//!
//! Calendar days are local mean solar time: the UTC offset is `longitude / 15` hours,
//! with no time zones or daylight saving.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use solar_distance::{compute_day_record, DayClassification, GeoLocation};
//!
//! let beijing = GeoLocation::new(40.0, 116.0).unwrap();
//! let solstice = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
//! let record = compute_day_record(beijing, solstice).unwrap();
//!
//! assert_eq!(record.classification(), DayClassification::Normal);
//! println!("sunrise {} ({:.1} km)", record.sunrise_local_label(), record.sunrise_distance_km());
//! println!("noon    {} ({:.1} km)", record.transit_local_label(), record.noon_distance_km());
//! println!("d = {:.2} km", record.d_km());
//! ```
//!
//! Polar days and nights have no sunrise; their `d` is zero by definition:
//!
//! ```rust
//! use chrono::NaiveDate;
//! use solar_distance::{compute_day_record, DayClassification, GeoLocation};
//!
//! let svalbard = GeoLocation::new(78.2, 15.6).unwrap();
//! let record = compute_day_record(svalbard, NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()).unwrap();
//! assert_eq!(record.classification(), DayClassification::PolarDay);
//! assert_eq!(record.d_km(), 0.0);
//! ```
//!
//! ## References
//!
//! - Reda, I.; Andreas, A. (2003). Solar position algorithm for solar radiation applications.
//!   Solar Energy, 76(5), 577-589. DOI: <http://dx.doi.org/10.1016/j.solener.2003.12.003>
//! - Espenak, F.; Meeus, J. Polynomial expressions for Delta T.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery, clippy::cargo, clippy::all)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cargo_common_metadata,
    clippy::multiple_crate_versions, // Acceptable for dev-dependencies
    clippy::float_cmp, // Exact comparisons of sentinel zeros in tests
)]

// Public API exports
pub use crate::config::Config;
pub use crate::distance::{compute_day_record, distance_to_sun};
pub use crate::ephemeris::Ephemeris;
pub use crate::error::{Error, Result};
pub use crate::resolver::resolve_day;
pub use crate::types::{
    DailyRecord, DayClassification, DistanceSample, GeoLocation, Horizon, LocalTimeOffset,
    ResolverAnomaly, SearchOptions, SolarEventResult,
};
pub use crate::yearly::{
    compute_year, CancellationToken, Progress, YearReport, YearSummary, YearlyAggregator,
};

// Pipeline
pub mod distance;
pub mod events;
pub mod resolver;
pub mod yearly;

// Astronomy
pub mod ephemeris;
pub mod spa;
pub mod time;

// Core modules
pub mod config;
pub mod error;
pub mod report;
pub mod types;

// Internal modules
mod math;
