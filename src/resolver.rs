//! Daily solar-event resolver.
//!
//! A local calendar day is shifted into UTC by the longitude-derived mean-solar-time
//! offset. Sunrise is the first horizon crossing from down to up in that window; the
//! transit is searched in the same window with a margin trimmed from both ends, so
//! that the lower transit near local midnight stays outside.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::ephemeris::Ephemeris;
use crate::error::check_year;
use crate::events::{
    find_discrete, horizon_indicator, meridian_indicator, HorizonState, MeridianSide,
};
use crate::math::add_seconds;
use crate::types::{DayClassification, GeoLocation, SearchOptions, SolarEventResult};
use crate::{Error, Result};

/// UTC bounds of a local mean-solar-time calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    /// Local 00:00:00 in UTC.
    pub start: DateTime<Utc>,
    /// Local 23:59:59 in UTC.
    pub end: DateTime<Utc>,
}

impl SearchWindow {
    /// The window with `margin_hours` removed from each end.
    ///
    /// # Errors
    /// Returns `InvalidSearchOptions` if nothing would remain.
    pub fn narrowed(&self, margin_hours: f64) -> Result<Self> {
        let start = add_seconds(self.start, margin_hours * 3600.0);
        let end = add_seconds(self.end, -margin_hours * 3600.0);
        if end <= start {
            return Err(Error::invalid_search_options(format!(
                "a transit margin of {margin_hours} h leaves no search window"
            )));
        }
        Ok(Self { start, end })
    }

    /// Checks if `instant` lies within the window, bounds included.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        (self.start..=self.end).contains(&instant)
    }
}

/// UTC window covering `date` in the local mean solar time of `location`.
///
/// # Example
/// ```
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use solar_distance::{resolver::search_window, GeoLocation};
///
/// let location = GeoLocation::new(40.0, 120.0).unwrap();
/// let window = search_window(location, NaiveDate::from_ymd_opt(2024, 6, 21).unwrap());
/// assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 6, 20, 16, 0, 0).unwrap());
/// assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 6, 21, 15, 59, 59).unwrap());
/// ```
#[must_use]
pub fn search_window(location: GeoLocation, date: NaiveDate) -> SearchWindow {
    let offset = location.local_time_offset();
    let day_end = NaiveTime::MIN + TimeDelta::seconds(86_399);
    SearchWindow {
        start: offset.to_utc(date.and_time(NaiveTime::MIN)),
        end: offset.to_utc(date.and_time(day_end)),
    }
}

/// Resolves sunrise and upper transit for `date` with the built-in ephemeris and default options.
///
/// # Errors
/// Returns `InvalidYear` for years outside 1900..=2100 and `DataUnavailable` if the
/// ephemeris cannot be loaded.
pub fn resolve_day(location: GeoLocation, date: NaiveDate) -> Result<SolarEventResult> {
    resolve_day_with(Ephemeris::builtin()?, location, date, &SearchOptions::default())
}

/// Resolves sunrise and upper transit for `date` with an explicit ephemeris and options.
///
/// # Errors
/// Returns `InvalidYear` for years outside 1900..=2100, `InvalidSearchOptions` if the
/// transit margin swallows the window, and ephemeris errors from the searches.
pub fn resolve_day_with(
    ephemeris: &Ephemeris,
    location: GeoLocation,
    date: NaiveDate,
    options: &SearchOptions,
) -> Result<SolarEventResult> {
    check_year(date.year())?;

    let window = search_window(location, date);
    let transit_window = window.narrowed(options.transit_margin_hours())?;

    let is_up = horizon_indicator(ephemeris, location, options.horizon());
    let horizon_events = find_discrete(
        window.start,
        window.end,
        options.step_seconds(),
        options.tolerance_seconds(),
        &is_up,
    )?;
    let sunrise = horizon_events
        .iter()
        .find(|event| event.value == HorizonState::Up)
        .map(|event| event.instant);

    let classification = if sunrise.is_some() {
        DayClassification::Normal
    } else if is_up(window.start)? == HorizonState::Up {
        DayClassification::PolarDay
    } else {
        DayClassification::PolarNight
    };

    let meridian_events = find_discrete(
        transit_window.start,
        transit_window.end,
        options.step_seconds(),
        options.tolerance_seconds(),
        meridian_indicator(ephemeris, location),
    )?;
    let transit = meridian_events.first().map(|event| {
        if event.value == MeridianSide::BeforeUpper {
            warn!(
                %date,
                %location,
                instant = %event.instant,
                "first meridian event in the narrowed window is a lower transit"
            );
        }
        event.instant
    });

    debug!(
        %date,
        %location,
        ?classification,
        sunrise = ?sunrise,
        transit = ?transit,
        horizon_events = horizon_events.len(),
        meridian_events = meridian_events.len(),
        "resolved day"
    );

    Ok(SolarEventResult::new(sunrise, transit, classification))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_search_window_shifts_by_longitude() {
        let west = GeoLocation::new(10.0, -90.0).unwrap();
        let window = search_window(west, date(2024, 1, 1));
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 2, 5, 59, 59).unwrap());

        let narrowed = window.narrowed(7.0).unwrap();
        assert_eq!(narrowed.start, Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap());
        assert_eq!(narrowed.end, Utc.with_ymd_and_hms(2024, 1, 1, 22, 59, 59).unwrap());
        assert!(narrowed.contains(Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap()));
        assert!(!narrowed.contains(window.start));

        assert!(window.narrowed(11.9999).is_err());
    }

    #[test]
    fn test_equator_equinox_day() {
        let location = GeoLocation::new(0.0, 0.0).unwrap();
        let result = resolve_day(location, date(2024, 3, 20)).unwrap();

        assert_eq!(result.classification(), DayClassification::Normal);
        let sunrise = result.sunrise().unwrap();
        let transit = result.transit().unwrap();
        assert!(sunrise < transit);
        // Sunrise a little after 06:00, noon a little after 12:00 (equation of time ≈ −7.5 min)
        assert!(sunrise > Utc.with_ymd_and_hms(2024, 3, 20, 5, 55, 0).unwrap());
        assert!(sunrise < Utc.with_ymd_and_hms(2024, 3, 20, 6, 15, 0).unwrap());
        assert!(transit > Utc.with_ymd_and_hms(2024, 3, 20, 12, 5, 0).unwrap());
        assert!(transit < Utc.with_ymd_and_hms(2024, 3, 20, 12, 10, 0).unwrap());
    }

    #[test]
    fn test_polar_classification() {
        let arctic = GeoLocation::new(80.0, 20.0).unwrap();

        let summer = resolve_day(arctic, date(2024, 6, 21)).unwrap();
        assert_eq!(summer.classification(), DayClassification::PolarDay);
        assert_eq!(summer.sunrise(), None);
        assert!(summer.transit().is_some());

        let winter = resolve_day(arctic, date(2024, 12, 21)).unwrap();
        assert_eq!(winter.classification(), DayClassification::PolarNight);
        assert_eq!(winter.sunrise(), None);
        assert!(winter.transit().is_some());
    }

    #[test]
    fn test_year_bounds() {
        let location = GeoLocation::new(0.0, 0.0).unwrap();
        assert!(matches!(
            resolve_day(location, date(1899, 12, 31)),
            Err(Error::InvalidYear { value: 1899 })
        ));
        assert!(resolve_day(location, date(2101, 1, 1)).is_err());
        assert!(resolve_day(location, date(1900, 1, 1)).is_ok());
    }

    #[test]
    fn test_twilight_horizon_rises_earlier() {
        let ephemeris = Ephemeris::builtin().unwrap();
        let location = GeoLocation::new(45.0, 7.0).unwrap();
        let day = date(2024, 9, 1);

        let defaults = SearchOptions::default();
        let civil = defaults.with_horizon(crate::Horizon::CivilTwilight);

        let sunrise = resolve_day_with(ephemeris, location, day, &defaults).unwrap();
        let dawn = resolve_day_with(ephemeris, location, day, &civil).unwrap();
        assert!(dawn.sunrise().unwrap() < sunrise.sunrise().unwrap());
        assert_eq!(dawn.transit(), sunrise.transit());
    }
}
