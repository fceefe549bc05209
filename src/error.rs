//! Error types for the solar distance library.

use std::path::PathBuf;

/// Result type alias for operations in this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Earliest year accepted by the daily and yearly calculations.
pub const MIN_YEAR: i32 = 1900;

/// Latest year accepted by the daily and yearly calculations.
pub const MAX_YEAR: i32 = 2100;

/// Errors that can occur while resolving solar events and distances.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid latitude value (must be between -90 and +90 degrees).
    #[error("invalid latitude {value}° (must be between -90° and +90°)")]
    InvalidLatitude {
        /// The invalid latitude value provided.
        value: f64,
    },
    /// Invalid longitude value (must be between -180 and +180 degrees).
    #[error("invalid longitude {value}° (must be between -180° and +180°)")]
    InvalidLongitude {
        /// The invalid longitude value provided.
        value: f64,
    },
    /// Year outside the supported range.
    #[error("invalid year {value} (must be between {min} and {max})", min = MIN_YEAR, max = MAX_YEAR)]
    InvalidYear {
        /// The invalid year provided.
        value: i32,
    },
    /// Invalid date/time component.
    #[error("invalid date/time: {message}")]
    InvalidDateTime {
        /// Description of the date/time constraint violation.
        message: &'static str,
    },
    /// Event search parameters that cannot produce a meaningful search.
    #[error("invalid search options: {message}")]
    InvalidSearchOptions {
        /// Description of the violated constraint.
        message: String,
    },
    /// Configuration file could not be parsed or holds invalid values.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Parser or validation message.
        message: String,
    },
    /// Configuration file could not be read.
    #[error("failed to read configuration {}: {source}", .path.display())]
    ConfigRead {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The ephemeris table failed to load or does not cover the requested instant.
    #[error("ephemeris data unavailable: {reason}")]
    DataUnavailable {
        /// What went wrong.
        reason: String,
    },
    /// Numerical computation error.
    #[error("computation error: {message}")]
    ComputationError {
        /// Description of the computation error.
        message: &'static str,
    },
    /// A yearly run was cancelled between two days.
    #[error("yearly computation cancelled after {completed} of {total} days")]
    Cancelled {
        /// Days finished before cancellation was observed.
        completed: usize,
        /// Days in the requested year.
        total: usize,
    },
    /// Writing a report failed.
    #[error("failed to write report: {0}")]
    Report(#[from] csv::Error),
}

impl Error {
    /// Creates an invalid latitude error.
    #[must_use]
    pub const fn invalid_latitude(value: f64) -> Self {
        Self::InvalidLatitude { value }
    }

    /// Creates an invalid longitude error.
    #[must_use]
    pub const fn invalid_longitude(value: f64) -> Self {
        Self::InvalidLongitude { value }
    }

    /// Creates an invalid year error.
    #[must_use]
    pub const fn invalid_year(value: i32) -> Self {
        Self::InvalidYear { value }
    }

    /// Creates an invalid date/time error.
    #[must_use]
    pub const fn invalid_datetime(message: &'static str) -> Self {
        Self::InvalidDateTime { message }
    }

    /// Creates an invalid search options error.
    pub fn invalid_search_options(message: impl Into<String>) -> Self {
        Self::InvalidSearchOptions {
            message: message.into(),
        }
    }

    /// Creates a data unavailable error.
    pub fn data_unavailable(reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a computation error.
    #[must_use]
    pub const fn computation_error(message: &'static str) -> Self {
        Self::ComputationError { message }
    }

    /// Returns `true` for errors caused by caller input rather than by data or computation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidLatitude { .. }
                | Self::InvalidLongitude { .. }
                | Self::InvalidYear { .. }
                | Self::InvalidDateTime { .. }
                | Self::InvalidSearchOptions { .. }
                | Self::InvalidConfig { .. }
        )
    }
}

/// Validates latitude is within the valid range (-90 to +90 degrees).
///
/// # Errors
/// Returns `InvalidLatitude` if latitude is outside -90 to +90 degrees.
pub fn check_latitude(latitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::invalid_latitude(latitude));
    }
    Ok(())
}

/// Validates longitude is within the valid range (-180 to +180 degrees).
///
/// # Errors
/// Returns `InvalidLongitude` if longitude is outside -180 to +180 degrees.
pub fn check_longitude(longitude: f64) -> Result<()> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(Error::invalid_longitude(longitude));
    }
    Ok(())
}

/// Validates both latitude and longitude are within valid ranges.
///
/// # Errors
/// Returns `InvalidLatitude` or `InvalidLongitude` for out-of-range coordinates.
pub fn check_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    check_latitude(latitude)?;
    check_longitude(longitude)?;
    Ok(())
}

/// Validates a year lies within [`MIN_YEAR`]..=[`MAX_YEAR`].
///
/// # Errors
/// Returns `InvalidYear` otherwise.
pub fn check_year(year: i32) -> Result<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(Error::invalid_year(year));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_validation() {
        assert!(check_latitude(0.0).is_ok());
        assert!(check_latitude(90.0).is_ok());
        assert!(check_latitude(-90.0).is_ok());
        assert!(check_latitude(45.5).is_ok());

        assert!(check_latitude(91.0).is_err());
        assert!(check_latitude(-91.0).is_err());
        assert!(check_latitude(f64::NAN).is_err());
        assert!(check_latitude(f64::INFINITY).is_err());
    }

    #[test]
    fn test_longitude_validation() {
        assert!(check_longitude(0.0).is_ok());
        assert!(check_longitude(180.0).is_ok());
        assert!(check_longitude(-180.0).is_ok());
        assert!(check_longitude(116.0).is_ok());

        assert!(check_longitude(181.0).is_err());
        assert!(check_longitude(-181.0).is_err());
        assert!(check_longitude(f64::NAN).is_err());
    }

    #[test]
    fn test_year_validation() {
        assert!(check_year(1900).is_ok());
        assert!(check_year(2024).is_ok());
        assert!(check_year(2100).is_ok());

        assert!(check_year(1899).is_err());
        assert!(check_year(2101).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = Error::invalid_latitude(95.0);
        assert_eq!(
            err.to_string(),
            "invalid latitude 95° (must be between -90° and +90°)"
        );

        let err = Error::invalid_year(1850);
        assert_eq!(
            err.to_string(),
            "invalid year 1850 (must be between 1900 and 2100)"
        );

        let err = Error::data_unavailable("no such file");
        assert_eq!(err.to_string(), "ephemeris data unavailable: no such file");

        let err = Error::Cancelled {
            completed: 10,
            total: 365,
        };
        assert_eq!(
            err.to_string(),
            "yearly computation cancelled after 10 of 365 days"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(Error::invalid_longitude(200.0).is_validation());
        assert!(Error::invalid_year(3000).is_validation());
        assert!(Error::invalid_search_options("step must be positive").is_validation());
        assert!(!Error::data_unavailable("missing").is_validation());
        assert!(!Error::computation_error("nan").is_validation());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<Error>();
    }
}
