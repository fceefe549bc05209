//! Time scales for solar geometry.
//!
//! UTC instants are converted to Julian dates (treating UTC as UT1, which is good
//! to better than a second) and shifted to Terrestrial Time with an estimated ΔT
//! following the polynomial fits of Espenak & Meeus.

#![allow(clippy::unreadable_literal)]

use chrono::{DateTime, Datelike, Utc};

use crate::math::polynomial;
use crate::{Error, Result};

/// Seconds per day (86,400)
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian Day Number for J2000.0 epoch (2000-01-01 12:00:00 UTC)
const J2000_JDN: f64 = 2_451_545.0;

/// Julian Day Number of the Unix epoch (1970-01-01 00:00:00 UTC)
const UNIX_EPOCH_JDN: f64 = 2_440_587.5;

/// Days per Julian century
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Julian date of an instant together with the ΔT used for the ephemeris time scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JulianDate {
    /// Julian Date (JD) - referenced to UT
    jd: f64,
    /// Delta T in seconds - difference between TT and UT1
    delta_t: f64,
}

impl JulianDate {
    /// Creates a Julian date for a UTC instant with an estimated ΔT.
    ///
    /// # Errors
    /// Returns `InvalidDateTime` if no ΔT estimate exists for the instant's year.
    pub fn from_instant(instant: DateTime<Utc>) -> Result<Self> {
        let delta_t = DeltaT::estimate_for_instant(instant)?;
        Ok(Self::with_delta_t(instant, delta_t))
    }

    /// Creates a Julian date for a UTC instant with an explicit ΔT in seconds.
    ///
    /// # Example
    /// ```
    /// # use solar_distance::time::JulianDate;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
    /// let jd = JulianDate::with_delta_t(j2000, 0.0);
    /// assert_eq!(jd.julian_date(), 2_451_545.0);
    /// ```
    #[must_use]
    pub fn with_delta_t(instant: DateTime<Utc>, delta_t: f64) -> Self {
        let seconds = instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_micros()) / 1e6;
        Self {
            jd: UNIX_EPOCH_JDN + seconds / SECONDS_PER_DAY,
            delta_t,
        }
    }

    /// Gets the Julian Date (JD) value.
    #[must_use]
    pub const fn julian_date(&self) -> f64 {
        self.jd
    }

    /// Gets the ΔT value in seconds.
    #[must_use]
    pub const fn delta_t(&self) -> f64 {
        self.delta_t
    }

    /// Julian Ephemeris Day, JDE = JD + ΔT/86400.
    #[must_use]
    pub fn julian_ephemeris_day(&self) -> f64 {
        self.jd + self.delta_t / SECONDS_PER_DAY
    }

    /// Julian centuries since J2000.0 (UT).
    #[must_use]
    pub fn julian_century(&self) -> f64 {
        (self.jd - J2000_JDN) / DAYS_PER_CENTURY
    }

    /// Julian ephemeris centuries since J2000.0 (TT).
    #[must_use]
    pub fn julian_ephemeris_century(&self) -> f64 {
        (self.julian_ephemeris_day() - J2000_JDN) / DAYS_PER_CENTURY
    }

    /// Julian ephemeris millennia since J2000.0 (TT).
    #[must_use]
    pub fn julian_ephemeris_millennium(&self) -> f64 {
        self.julian_ephemeris_century() / 10.0
    }
}

/// One polynomial piece of the ΔT fit: valid for years below `until`,
/// evaluated in `(year - epoch) / scale`.
struct DeltaTSegment {
    until: f64,
    epoch: f64,
    scale: f64,
    coeffs: &'static [f64],
}

/// Last year with a ΔT estimate.
const DELTA_T_LAST_YEAR: f64 = 3000.0;

/// Espenak & Meeus fits, updated 2014.
/// See: <https://www.eclipsewise.com/help/deltatpoly2014.html>
const DELTA_T_SEGMENTS: &[DeltaTSegment] = &[
    DeltaTSegment { until: -500.0, epoch: 1820.0, scale: 100.0, coeffs: &[-20.0, 0.0, 32.0] },
    DeltaTSegment {
        until: 500.0,
        epoch: 0.0,
        scale: 100.0,
        coeffs: &[10583.6, -1014.41, 33.78311, -5.952053, -0.1798452, 0.022174192, 0.0090316521],
    },
    DeltaTSegment {
        until: 1600.0,
        epoch: 1000.0,
        scale: 100.0,
        coeffs: &[1574.2, -556.01, 71.23472, 0.319781, -0.8503463, -0.005050998, 0.0083572073],
    },
    DeltaTSegment {
        until: 1700.0,
        epoch: 1600.0,
        scale: 1.0,
        coeffs: &[120.0, -0.9808, -0.01532, 1.0 / 7129.0],
    },
    DeltaTSegment {
        until: 1800.0,
        epoch: 1700.0,
        scale: 1.0,
        coeffs: &[8.83, 0.1603, -0.0059285, 0.00013336, -1.0 / 1_174_000.0],
    },
    DeltaTSegment {
        until: 1860.0,
        epoch: 1800.0,
        scale: 1.0,
        coeffs: &[
            13.72,
            -0.332447,
            0.0068612,
            0.0041116,
            -0.00037436,
            0.0000121272,
            -0.0000001699,
            0.000000000875,
        ],
    },
    DeltaTSegment {
        until: 1900.0,
        epoch: 1860.0,
        scale: 1.0,
        coeffs: &[7.62, 0.5737, -0.251754, 0.01680668, -0.0004473624, 1.0 / 233_174.0],
    },
    DeltaTSegment {
        until: 1920.0,
        epoch: 1900.0,
        scale: 1.0,
        coeffs: &[-2.79, 1.494119, -0.0598939, 0.0061966, -0.000197],
    },
    DeltaTSegment {
        until: 1941.0,
        epoch: 1920.0,
        scale: 1.0,
        coeffs: &[21.20, 0.84493, -0.076100, 0.0020936],
    },
    DeltaTSegment {
        until: 1961.0,
        epoch: 1950.0,
        scale: 1.0,
        coeffs: &[29.07, 0.407, -1.0 / 233.0, 1.0 / 2547.0],
    },
    DeltaTSegment {
        until: 1986.0,
        epoch: 1975.0,
        scale: 1.0,
        coeffs: &[45.45, 1.067, -1.0 / 260.0, -1.0 / 718.0],
    },
    DeltaTSegment {
        until: 2005.0,
        epoch: 2000.0,
        scale: 1.0,
        coeffs: &[63.86, 0.3345, -0.060374, 0.0017275, 0.000651814, 0.00002373599],
    },
    DeltaTSegment { until: 2015.0, epoch: 2005.0, scale: 1.0, coeffs: &[64.69, 0.2930] },
    DeltaTSegment {
        until: f64::INFINITY,
        epoch: 2015.0,
        scale: 1.0,
        coeffs: &[67.62, 0.3645, 0.0039755],
    },
];

/// ΔT (Delta T) estimation: TT − UT1 in seconds.
pub struct DeltaT;

impl DeltaT {
    /// Estimates ΔT for a decimal year.
    ///
    /// # Errors
    /// Returns `InvalidDateTime` for non-finite years or years after 3000.
    ///
    /// # Example
    /// ```
    /// # use solar_distance::time::DeltaT;
    /// let delta_t = DeltaT::estimate(2024.0).unwrap();
    /// assert!(delta_t > 60.0 && delta_t < 80.0);
    /// ```
    pub fn estimate(decimal_year: f64) -> Result<f64> {
        if !decimal_year.is_finite() {
            return Err(Error::invalid_datetime("year must be finite"));
        }
        if decimal_year > DELTA_T_LAST_YEAR {
            return Err(Error::invalid_datetime(
                "ΔT estimates not available beyond year 3000",
            ));
        }

        let segment = DELTA_T_SEGMENTS
            .iter()
            .find(|segment| decimal_year < segment.until)
            .ok_or(Error::computation_error("ΔT segment table is incomplete"))?;

        Ok(polynomial(
            segment.coeffs,
            (decimal_year - segment.epoch) / segment.scale,
        ))
    }

    /// Estimates ΔT from year and month, using the middle of the month.
    ///
    /// # Errors
    /// Returns error if month is outside the range 1-12 or the year has no estimate.
    pub fn estimate_from_date(year: i32, month: u32) -> Result<f64> {
        if !(1..=12).contains(&month) {
            return Err(Error::invalid_datetime("month must be between 1 and 12"));
        }

        let decimal_year = f64::from(year) + (f64::from(month) - 0.5) / 12.0;
        Self::estimate(decimal_year)
    }

    /// Estimates ΔT for the month containing `instant`.
    ///
    /// # Errors
    /// Returns error if the instant's year has no estimate.
    pub fn estimate_for_instant(instant: DateTime<Utc>) -> Result<f64> {
        Self::estimate_from_date(instant.year(), instant.month())
    }
}
