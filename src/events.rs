//! Discrete event search over step-valued indicators of time.
//!
//! A window is sampled at a coarse step; every pair of neighbouring samples whose
//! indicator values differ is narrowed by bisection until the bracket is shorter
//! than the tolerance.

use chrono::{DateTime, Utc};

use crate::ephemeris::Ephemeris;
use crate::math::{add_seconds, seconds_between};
use crate::types::{GeoLocation, Horizon};
use crate::{Error, Result};

/// A change of indicator value: the first instant found with the new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscreteEvent<V> {
    /// When the value changed.
    pub instant: DateTime<Utc>,
    /// The value from this instant on.
    pub value: V,
}

/// Whether the Sun is above the search horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizonState {
    /// At or below the horizon.
    Down,
    /// Above the horizon.
    Up,
}

impl HorizonState {
    /// Classifies a topocentric elevation against a horizon.
    #[must_use]
    pub fn from_elevation(elevation_degrees: f64, horizon: Horizon) -> Self {
        if elevation_degrees > horizon.elevation_angle() {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// Which side of the upper meridian passage the Sun is on.
///
/// `BeforeUpper → AfterUpper` is an upper transit (solar noon), `AfterUpper → BeforeUpper`
/// a lower transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeridianSide {
    /// Hour angle in [180°, 360°): east of the meridian, rising towards noon.
    BeforeUpper,
    /// Hour angle in [0°, 180°): west of the meridian, past noon.
    AfterUpper,
}

impl MeridianSide {
    /// Classifies a topocentric hour angle in degrees.
    #[must_use]
    pub fn from_hour_angle(hour_angle_degrees: f64) -> Self {
        if hour_angle_degrees.rem_euclid(360.0) < 180.0 {
            Self::AfterUpper
        } else {
            Self::BeforeUpper
        }
    }
}

/// Indicator of the Sun being above `horizon` at `location`.
pub fn horizon_indicator(
    ephemeris: &Ephemeris,
    location: GeoLocation,
    horizon: Horizon,
) -> impl Fn(DateTime<Utc>) -> Result<HorizonState> + '_ {
    move |instant| {
        let view = ephemeris.observe(location, instant)?;
        Ok(HorizonState::from_elevation(view.elevation_angle(), horizon))
    }
}

/// Indicator of the Sun being past its upper meridian passage at `location`.
pub fn meridian_indicator(
    ephemeris: &Ephemeris,
    location: GeoLocation,
) -> impl Fn(DateTime<Utc>) -> Result<MeridianSide> + '_ {
    move |instant| {
        let view = ephemeris.observe(location, instant)?;
        Ok(MeridianSide::from_hour_angle(view.hour_angle()))
    }
}

/// Finds every change of `indicator` within `[start, end]`, in chronological order.
///
/// Changes closer together than `step_seconds` may be missed, as may pairs of changes that
/// cancel out between two samples.
///
/// # Errors
/// Returns `InvalidSearchOptions` for a non-positive step or tolerance, `ComputationError`
/// if `end` precedes `start`, and any error raised by the indicator.
///
/// # Example
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use solar_distance::events::find_discrete;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let switch = start + TimeDelta::seconds(5000);
/// let events = find_discrete(start, start + TimeDelta::hours(3), 600.0, 0.01, |t| {
///     Ok(t >= switch)
/// })
/// .unwrap();
///
/// assert_eq!(events.len(), 1);
/// assert!(events[0].value);
/// assert!((events[0].instant - switch).num_milliseconds().abs() <= 10);
/// ```
pub fn find_discrete<V, F>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step_seconds: f64,
    tolerance_seconds: f64,
    mut indicator: F,
) -> Result<Vec<DiscreteEvent<V>>>
where
    V: Copy + PartialEq,
    F: FnMut(DateTime<Utc>) -> Result<V>,
{
    if !(step_seconds.is_finite() && step_seconds > 0.0) {
        return Err(Error::invalid_search_options("step must be positive"));
    }
    if !(tolerance_seconds.is_finite() && tolerance_seconds > 0.0) {
        return Err(Error::invalid_search_options("tolerance must be positive"));
    }
    if end < start {
        return Err(Error::computation_error("search window ends before it starts"));
    }

    let span = seconds_between(start, end);
    if span == 0.0 {
        return Ok(Vec::new());
    }

    let intervals = (span / step_seconds).ceil().max(1.0) as usize;
    let offset_at = |i: usize| span * i as f64 / intervals as f64;

    let mut events = Vec::new();
    let mut previous = indicator(start)?;
    let mut previous_offset = 0.0;

    for i in 1..=intervals {
        let offset = offset_at(i);
        let value = indicator(add_seconds(start, offset))?;
        if value != previous {
            events.push(bisect(
                start,
                (previous_offset, previous),
                (offset, value),
                tolerance_seconds,
                &mut indicator,
            )?);
        }
        previous = value;
        previous_offset = offset;
    }

    Ok(events)
}

/// Narrows a bracket whose endpoints disagree down to `tolerance_seconds`.
fn bisect<V, F>(
    origin: DateTime<Utc>,
    (mut lo, lo_value): (f64, V),
    (mut hi, mut hi_value): (f64, V),
    tolerance_seconds: f64,
    indicator: &mut F,
) -> Result<DiscreteEvent<V>>
where
    V: Copy + PartialEq,
    F: FnMut(DateTime<Utc>) -> Result<V>,
{
    while hi - lo > tolerance_seconds {
        let mid = lo + (hi - lo) / 2.0;
        let mid_value = indicator(add_seconds(origin, mid))?;
        if mid_value == lo_value {
            lo = mid;
        } else {
            hi = mid;
            hi_value = mid_value;
        }
    }

    Ok(DiscreteEvent {
        instant: add_seconds(origin, hi),
        value: hi_value,
    })
}
