//! Distance-difference calculator.
//!
//! Turns a resolved day into a [`DailyRecord`]: distances at sunrise and at upper transit,
//! and their difference `d`. Polar days and nights get `d = 0` by definition; `Normal` days
//! missing an event get `d = 0` as well but carry a [`ResolverAnomaly`].

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

use crate::ephemeris::Ephemeris;
use crate::resolver::resolve_day_with;
use crate::types::{
    DailyRecord, DayClassification, DistanceSample, GeoLocation, ResolverAnomaly, SearchOptions,
    SolarEventResult,
};
use crate::Result;

/// Distance from a sea-level observer to the Sun's centre in kilometers, using the built-in ephemeris.
///
/// # Errors
/// Returns `DataUnavailable` if the ephemeris cannot be loaded or does not cover `instant`.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use solar_distance::{distance_to_sun, GeoLocation};
///
/// let location = GeoLocation::new(40.0, 116.0).unwrap();
/// let instant = Utc.with_ymd_and_hms(2024, 1, 3, 4, 0, 0).unwrap();
/// let km = distance_to_sun(location, instant).unwrap();
/// // Perihelion is about 147.1 million km
/// assert!((km - 1.471e8).abs() < 2e5);
/// ```
pub fn distance_to_sun(location: GeoLocation, instant: DateTime<Utc>) -> Result<f64> {
    Ephemeris::builtin()?.distance_to_sun(location, instant)
}

/// Daily record for `date` with the built-in ephemeris and default search options.
///
/// # Errors
/// Returns validation errors for the year, or `DataUnavailable` for ephemeris failures.
pub fn compute_day_record(location: GeoLocation, date: NaiveDate) -> Result<DailyRecord> {
    compute_day_record_with(Ephemeris::builtin()?, location, date, &SearchOptions::default())
}

/// Daily record for `date` with an explicit ephemeris and search options.
///
/// # Errors
/// Returns validation errors for the year or options, or ephemeris failures.
pub fn compute_day_record_with(
    ephemeris: &Ephemeris,
    location: GeoLocation,
    date: NaiveDate,
    options: &SearchOptions,
) -> Result<DailyRecord> {
    let events = resolve_day_with(ephemeris, location, date, options)?;
    record_from_events(ephemeris, location, date, events)
}

/// Applies the distance policy to already resolved events.
///
/// # Errors
/// Returns ephemeris errors from the distance evaluations.
pub fn record_from_events(
    ephemeris: &Ephemeris,
    location: GeoLocation,
    date: NaiveDate,
    events: SolarEventResult,
) -> Result<DailyRecord> {
    let sample = |instant: DateTime<Utc>| -> Result<DistanceSample> {
        DistanceSample::new(instant, ephemeris.distance_to_sun(location, instant)?)
    };
    let offset = location.local_time_offset();

    let record = match (events.classification(), events.sunrise(), events.transit()) {
        (DayClassification::PolarDay | DayClassification::PolarNight, _, transit) => {
            if transit.is_none() {
                warn!(%date, %location, "no transit found on a polar day");
            }
            let transit = transit.map(sample).transpose()?;
            DailyRecord::new(date, offset, events, None, transit, 0.0, None)
        }
        (DayClassification::Normal, Some(sunrise), Some(transit)) => {
            let sunrise = sample(sunrise)?;
            let transit = sample(transit)?;
            let d_km = sunrise.distance_km() - transit.distance_km();
            DailyRecord::new(date, offset, events, Some(sunrise), Some(transit), d_km, None)
        }
        (DayClassification::Normal, sunrise, _) => {
            let anomaly = if sunrise.is_none() {
                ResolverAnomaly::MissingSunrise
            } else {
                ResolverAnomaly::MissingTransit
            };
            warn!(%date, %location, %anomaly, "resolver anomaly; recording d = 0");
            DailyRecord::new(date, offset, events, None, None, 0.0, Some(anomaly))
        }
    };

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn beijing() -> GeoLocation {
        GeoLocation::new(40.0, 116.0).unwrap()
    }

    fn solstice() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()
    }

    #[test]
    fn test_normal_day_difference() {
        let record = compute_day_record(beijing(), solstice()).unwrap();

        assert_eq!(record.classification(), DayClassification::Normal);
        assert_eq!(record.anomaly(), None);
        let expected = record.sunrise_distance_km() - record.noon_distance_km();
        assert_eq!(record.d_km(), expected);
        assert!(record.d_km() > 0.0);
    }

    #[test]
    fn test_missing_transit_is_an_anomaly() {
        let ephemeris = Ephemeris::builtin().unwrap();
        let sunrise = Utc.with_ymd_and_hms(2024, 6, 20, 20, 45, 0).unwrap();
        let events = SolarEventResult::new(Some(sunrise), None, DayClassification::Normal);

        let record = record_from_events(ephemeris, beijing(), solstice(), events).unwrap();
        assert_eq!(record.anomaly(), Some(ResolverAnomaly::MissingTransit));
        assert_eq!(record.d_km(), 0.0);
        assert_eq!(record.sunrise_distance_km(), 0.0);
        assert_eq!(record.noon_distance_km(), 0.0);
        assert_eq!(record.sunrise_local_label(), "04:29:00");
        assert_eq!(record.transit_local_label(), "no transit");
    }

    #[test]
    fn test_polar_day_without_transit() {
        let ephemeris = Ephemeris::builtin().unwrap();
        let events = SolarEventResult::new(None, None, DayClassification::PolarNight);

        let record = record_from_events(ephemeris, beijing(), solstice(), events).unwrap();
        assert_eq!(record.anomaly(), None);
        assert_eq!(record.d_km(), 0.0);
        assert_eq!(record.noon_distance_km(), 0.0);
        assert_eq!(record.sunrise_local_label(), "polar night");
    }

    #[test]
    fn test_distance_to_sun_within_one_earth_radius_of_geocentre() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 21, 4, 0, 0).unwrap();
        let ephemeris = Ephemeris::builtin().unwrap();
        let jd = crate::time::JulianDate::from_instant(instant).unwrap();
        let radius = crate::spa::sun_geometry(ephemeris, &jd).unwrap().radius_km();

        for (lat, lon) in [(0.0, 0.0), (40.0, 116.0), (-33.9, 151.2), (89.0, -45.0)] {
            let location = GeoLocation::new(lat, lon).unwrap();
            let km = distance_to_sun(location, instant).unwrap();
            assert!((km - radius).abs() <= crate::spa::EARTH_RADIUS_KM + 1e-6);
        }
    }
}
