//! Core data types for solar event and distance calculations.

use core::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::error::{check_latitude, check_longitude};
use crate::{Error, Result};

/// An observer on the Earth's surface at sea level.
///
/// # Example
/// ```
/// # use solar_distance::GeoLocation;
/// let beijing = GeoLocation::new(40.0, 116.0).unwrap();
/// assert_eq!(beijing.latitude(), 40.0);
/// assert!(GeoLocation::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    /// Latitude in degrees (-90 to +90, north positive)
    latitude: f64,
    /// Longitude in degrees (-180 to +180, east positive)
    longitude: f64,
}

impl GeoLocation {
    /// Creates a validated location.
    ///
    /// # Errors
    /// Returns `InvalidLatitude` or `InvalidLongitude` for out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        check_latitude(latitude)?;
        check_longitude(longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Gets the latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Gets the longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Mean-solar-time offset derived from the longitude.
    #[must_use]
    pub fn local_time_offset(&self) -> LocalTimeOffset {
        LocalTimeOffset::from_longitude(self.longitude)
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}°, {:.4}°)", self.latitude, self.longitude)
    }
}

/// Offset of local mean solar time from UTC: longitude / 15 hours.
///
/// Political time zones are ignored. The offset is held to the microsecond.
///
/// # Example
/// ```
/// # use solar_distance::LocalTimeOffset;
/// let offset = LocalTimeOffset::from_longitude(116.0);
/// assert!((offset.hours() - 7.733_333).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalTimeOffset {
    micros: i64,
}

impl LocalTimeOffset {
    /// Offset for a longitude in degrees east.
    #[must_use]
    pub fn from_longitude(longitude: f64) -> Self {
        Self {
            micros: (longitude / 15.0 * 3_600_000_000.0).round() as i64,
        }
    }

    /// Offset in hours.
    #[must_use]
    pub fn hours(&self) -> f64 {
        self.micros as f64 / 3_600_000_000.0
    }

    /// Offset as a signed duration.
    #[must_use]
    pub const fn as_duration(&self) -> TimeDelta {
        TimeDelta::microseconds(self.micros)
    }

    /// Local mean solar time of a UTC instant.
    #[must_use]
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.naive_utc() + self.as_duration()
    }

    /// UTC instant of a local mean solar time.
    #[must_use]
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - self.as_duration()).and_utc()
    }
}

/// Predefined elevation angles for sunrise/sunset calculations.
///
/// Configuration files name a horizon either by its elevation angle in degrees or as one of
/// `"sunrise-sunset"`, `"civil"`, `"nautical"` and `"astronomical"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(try_from = "HorizonSetting")]
pub enum Horizon {
    /// Standard sunrise/sunset (sun's upper limb touches horizon, accounting for refraction)
    #[default]
    SunriseSunset,
    /// Civil twilight (sun is 6° below horizon)
    CivilTwilight,
    /// Nautical twilight (sun is 12° below horizon)
    NauticalTwilight,
    /// Astronomical twilight (sun is 18° below horizon)
    AstronomicalTwilight,
    /// Custom elevation angle
    Custom(f64),
}

impl Horizon {
    /// Gets the elevation angle in degrees for this horizon definition.
    ///
    /// Negative values indicate the sun is below the horizon.
    #[must_use]
    pub const fn elevation_angle(&self) -> f64 {
        match self {
            Self::SunriseSunset => -0.83337, // Accounts for refraction and sun's radius
            Self::CivilTwilight => -6.0,
            Self::NauticalTwilight => -12.0,
            Self::AstronomicalTwilight => -18.0,
            Self::Custom(angle) => *angle,
        }
    }

    /// Creates a custom horizon with the specified elevation angle.
    ///
    /// # Errors
    /// Returns `InvalidSearchOptions` if elevation is outside -90 to +90 degrees.
    pub fn custom(elevation_degrees: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&elevation_degrees) {
            return Err(Error::invalid_search_options(format!(
                "horizon elevation {elevation_degrees}° is outside -90°..=90°"
            )));
        }
        Ok(Self::Custom(elevation_degrees))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HorizonSetting {
    Angle(f64),
    Named(String),
}

impl TryFrom<HorizonSetting> for Horizon {
    type Error = Error;

    fn try_from(setting: HorizonSetting) -> Result<Self> {
        match setting {
            HorizonSetting::Angle(angle) => Self::custom(angle),
            HorizonSetting::Named(name) => match name.as_str() {
                "sunrise-sunset" => Ok(Self::SunriseSunset),
                "civil" => Ok(Self::CivilTwilight),
                "nautical" => Ok(Self::NauticalTwilight),
                "astronomical" => Ok(Self::AstronomicalTwilight),
                other => Err(Error::invalid_search_options(format!(
                    "unknown horizon `{other}`"
                ))),
            },
        }
    }
}

/// Tuning of the event searches behind the daily resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    horizon: Horizon,
    step_seconds: f64,
    tolerance_seconds: f64,
    transit_margin_hours: f64,
}

impl SearchOptions {
    /// Coarse sampling step of the event finder.
    pub const DEFAULT_STEP_SECONDS: f64 = 1800.0;
    /// Bisection stops once a bracket is narrower than this.
    pub const DEFAULT_TOLERANCE_SECONDS: f64 = 0.01;
    /// Hours trimmed from each end of the day window before the transit search.
    pub const DEFAULT_TRANSIT_MARGIN_HOURS: f64 = 7.0;

    /// Creates validated search options.
    ///
    /// # Errors
    /// Returns `InvalidSearchOptions` unless `step_seconds > 0`, `0 < tolerance_seconds < step_seconds`
    /// and `0 <= transit_margin_hours < 12`.
    pub fn new(
        horizon: Horizon,
        step_seconds: f64,
        tolerance_seconds: f64,
        transit_margin_hours: f64,
    ) -> Result<Self> {
        if !(step_seconds.is_finite() && step_seconds > 0.0) {
            return Err(Error::invalid_search_options(format!(
                "step of {step_seconds} s must be positive"
            )));
        }
        if !(tolerance_seconds.is_finite()
            && tolerance_seconds > 0.0
            && tolerance_seconds < step_seconds)
        {
            return Err(Error::invalid_search_options(format!(
                "tolerance of {tolerance_seconds} s must be positive and below the step"
            )));
        }
        if !(0.0..12.0).contains(&transit_margin_hours) {
            return Err(Error::invalid_search_options(format!(
                "transit margin of {transit_margin_hours} h must be within 0..12 h"
            )));
        }
        Ok(Self {
            horizon,
            step_seconds,
            tolerance_seconds,
            transit_margin_hours,
        })
    }

    /// Same options with a different horizon.
    #[must_use]
    pub const fn with_horizon(self, horizon: Horizon) -> Self {
        Self { horizon, ..self }
    }

    /// Horizon used to decide whether the Sun is up.
    #[must_use]
    pub const fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Coarse sampling step in seconds.
    #[must_use]
    pub const fn step_seconds(&self) -> f64 {
        self.step_seconds
    }

    /// Bisection tolerance in seconds.
    #[must_use]
    pub const fn tolerance_seconds(&self) -> f64 {
        self.tolerance_seconds
    }

    /// Hours trimmed from each end of the day window for the transit search.
    #[must_use]
    pub const fn transit_margin_hours(&self) -> f64 {
        self.transit_margin_hours
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            horizon: Horizon::SunriseSunset,
            step_seconds: Self::DEFAULT_STEP_SECONDS,
            tolerance_seconds: Self::DEFAULT_TOLERANCE_SECONDS,
            transit_margin_hours: Self::DEFAULT_TRANSIT_MARGIN_HOURS,
        }
    }
}

/// How the Sun behaves over one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayClassification {
    /// The Sun rises within the day.
    Normal,
    /// No sunrise, and the Sun is up at the start of the day.
    PolarDay,
    /// No sunrise, and the Sun is down at the start of the day.
    PolarNight,
}

impl DayClassification {
    /// Checks if this is a polar day or polar night.
    #[must_use]
    pub const fn is_polar(&self) -> bool {
        matches!(self, Self::PolarDay | Self::PolarNight)
    }

    /// Lowercase label used in reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::PolarDay => "polar day",
            Self::PolarNight => "polar night",
        }
    }
}

impl fmt::Display for DayClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sunrise and upper transit of one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarEventResult {
    sunrise: Option<DateTime<Utc>>,
    transit: Option<DateTime<Utc>>,
    classification: DayClassification,
}

impl SolarEventResult {
    /// Assembles a result; any sunrise is dropped unless the day is `Normal`.
    #[must_use]
    pub fn new(
        sunrise: Option<DateTime<Utc>>,
        transit: Option<DateTime<Utc>>,
        classification: DayClassification,
    ) -> Self {
        Self {
            sunrise: sunrise.filter(|_| classification == DayClassification::Normal),
            transit,
            classification,
        }
    }

    /// Gets the sunrise instant, present only on `Normal` days.
    #[must_use]
    pub const fn sunrise(&self) -> Option<DateTime<Utc>> {
        self.sunrise
    }

    /// Gets the upper transit (solar noon) instant, if one was found.
    #[must_use]
    pub const fn transit(&self) -> Option<DateTime<Utc>> {
        self.transit
    }

    /// Gets the day classification.
    #[must_use]
    pub const fn classification(&self) -> DayClassification {
        self.classification
    }
}

/// Observer-to-Sun distance at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSample {
    instant: DateTime<Utc>,
    distance_km: f64,
}

impl DistanceSample {
    /// Creates a sample.
    ///
    /// # Errors
    /// Returns `ComputationError` if the distance is not a positive finite number.
    pub fn new(instant: DateTime<Utc>, distance_km: f64) -> Result<Self> {
        if !(distance_km.is_finite() && distance_km > 0.0) {
            return Err(Error::computation_error(
                "distance must be a positive finite number",
            ));
        }
        Ok(Self {
            instant,
            distance_km,
        })
    }

    /// Gets the UTC instant.
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Gets the distance in kilometers.
    #[must_use]
    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }
}

/// A `Normal` day whose events did not both resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverAnomaly {
    /// No sunrise instant despite a `Normal` classification.
    MissingSunrise,
    /// No transit inside the narrowed search window.
    MissingTransit,
}

impl fmt::Display for ResolverAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingSunrise => "missing sunrise",
            Self::MissingTransit => "missing transit",
        })
    }
}

/// Sunrise and noon distances of one calendar day and their difference `d`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    date: NaiveDate,
    offset: LocalTimeOffset,
    events: SolarEventResult,
    sunrise: Option<DistanceSample>,
    transit: Option<DistanceSample>,
    d_km: f64,
    anomaly: Option<ResolverAnomaly>,
}

impl DailyRecord {
    pub(crate) const fn new(
        date: NaiveDate,
        offset: LocalTimeOffset,
        events: SolarEventResult,
        sunrise: Option<DistanceSample>,
        transit: Option<DistanceSample>,
        d_km: f64,
        anomaly: Option<ResolverAnomaly>,
    ) -> Self {
        Self {
            date,
            offset,
            events,
            sunrise,
            transit,
            d_km,
            anomaly,
        }
    }

    /// Gets the local calendar date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Gets the offset used for local times.
    #[must_use]
    pub const fn offset(&self) -> LocalTimeOffset {
        self.offset
    }

    /// Gets the resolved events behind this record.
    #[must_use]
    pub const fn events(&self) -> &SolarEventResult {
        &self.events
    }

    /// Gets the day classification.
    #[must_use]
    pub const fn classification(&self) -> DayClassification {
        self.events.classification()
    }

    /// Gets the sunrise sample, absent on polar and anomalous days.
    #[must_use]
    pub const fn sunrise(&self) -> Option<&DistanceSample> {
        self.sunrise.as_ref()
    }

    /// Gets the transit sample, absent when no transit was used.
    #[must_use]
    pub const fn transit(&self) -> Option<&DistanceSample> {
        self.transit.as_ref()
    }

    /// Distance at sunrise in kilometers, 0 when there is no sample.
    #[must_use]
    pub fn sunrise_distance_km(&self) -> f64 {
        self.sunrise.map_or(0.0, |sample| sample.distance_km())
    }

    /// Distance at upper transit in kilometers, 0 when there is no sample.
    #[must_use]
    pub fn noon_distance_km(&self) -> f64 {
        self.transit.map_or(0.0, |sample| sample.distance_km())
    }

    /// Sunrise distance minus noon distance in kilometers; 0 on polar and anomalous days.
    #[must_use]
    pub const fn d_km(&self) -> f64 {
        self.d_km
    }

    /// Gets the resolver anomaly, if any.
    #[must_use]
    pub const fn anomaly(&self) -> Option<ResolverAnomaly> {
        self.anomaly
    }

    /// Sunrise in local mean time as `HH:MM:SS`, or a label when there is none.
    #[must_use]
    pub fn sunrise_local_label(&self) -> String {
        self.event_label(self.events.sunrise(), true, "no sunrise")
    }

    /// Sunrise in UTC as `HH:MM:SS`, or a label when there is none.
    #[must_use]
    pub fn sunrise_utc_label(&self) -> String {
        self.event_label(self.events.sunrise(), false, "no sunrise")
    }

    /// Transit in local mean time as `HH:MM:SS`, or `no transit`.
    #[must_use]
    pub fn transit_local_label(&self) -> String {
        self.event_label(self.events.transit(), true, "no transit")
    }

    /// Transit in UTC as `HH:MM:SS`, or `no transit`.
    #[must_use]
    pub fn transit_utc_label(&self) -> String {
        self.event_label(self.events.transit(), false, "no transit")
    }

    fn event_label(&self, instant: Option<DateTime<Utc>>, local: bool, missing: &str) -> String {
        match instant {
            Some(instant) if local => self.offset.to_local(instant).format("%H:%M:%S").to_string(),
            Some(instant) => instant.format("%H:%M:%S").to_string(),
            None if missing == "no sunrise" && self.classification().is_polar() => {
                self.classification().label().to_string()
            }
            None => missing.to_string(),
        }
    }
}

impl fmt::Display for DailyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "date:                 {}", self.date)?;
        writeln!(f, "classification:       {}", self.classification())?;
        writeln!(f, "sunrise (local mean): {}", self.sunrise_local_label())?;
        writeln!(f, "sunrise (UTC):        {}", self.sunrise_utc_label())?;
        writeln!(f, "transit (local mean): {}", self.transit_local_label())?;
        writeln!(f, "transit (UTC):        {}", self.transit_utc_label())?;
        writeln!(f, "sunrise distance:     {:.2} km", self.sunrise_distance_km())?;
        writeln!(f, "noon distance:        {:.2} km", self.noon_distance_km())?;
        write!(f, "d:                    {:.2} km", self.d_km)?;
        if let Some(anomaly) = self.anomaly {
            write!(f, "\nanomaly:              {anomaly}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    #[test]
    fn test_geo_location_validation() {
        assert!(GeoLocation::new(90.0, 180.0).is_ok());
        assert!(GeoLocation::new(-90.0, -180.0).is_ok());
        assert!(matches!(
            GeoLocation::new(90.5, 0.0),
            Err(Error::InvalidLatitude { .. })
        ));
        assert!(matches!(
            GeoLocation::new(0.0, -180.5),
            Err(Error::InvalidLongitude { .. })
        ));
        assert!(GeoLocation::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_local_time_offset() {
        let offset = LocalTimeOffset::from_longitude(-90.0);
        assert_eq!(offset.hours(), -6.0);
        assert_eq!(offset.as_duration(), TimeDelta::hours(-6));

        let offset = LocalTimeOffset::from_longitude(116.0);
        // 7 h 44 min exactly
        assert_eq!(offset.as_duration(), TimeDelta::minutes(464));

        let instant = Utc.with_ymd_and_hms(2024, 6, 20, 20, 30, 0).unwrap();
        let local = offset.to_local(instant);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2024, 6, 21).unwrap());
        assert_eq!(local.time(), NaiveTime::from_hms_opt(4, 14, 0).unwrap());
        assert_eq!(offset.to_utc(local), instant);
    }

    #[test]
    fn test_horizon_elevation_angles() {
        assert_eq!(Horizon::SunriseSunset.elevation_angle(), -0.83337);
        assert_eq!(Horizon::CivilTwilight.elevation_angle(), -6.0);
        assert_eq!(Horizon::NauticalTwilight.elevation_angle(), -12.0);
        assert_eq!(Horizon::AstronomicalTwilight.elevation_angle(), -18.0);
        assert_eq!(Horizon::default(), Horizon::SunriseSunset);

        assert_eq!(Horizon::custom(-3.0).unwrap().elevation_angle(), -3.0);
        assert!(Horizon::custom(-95.0).is_err());
        assert!(Horizon::custom(f64::NAN).is_err());
    }

    #[test]
    fn test_horizon_settings() {
        #[derive(Deserialize)]
        struct Wrapper {
            horizon: Horizon,
        }

        let parse = |text: &str| toml::from_str::<Wrapper>(text).map(|w| w.horizon);
        assert_eq!(parse("horizon = \"civil\"").unwrap(), Horizon::CivilTwilight);
        assert_eq!(parse("horizon = -2.5").unwrap(), Horizon::Custom(-2.5));
        assert!(parse("horizon = \"dusk\"").is_err());
        assert!(parse("horizon = 120.0").is_err());
    }

    #[test]
    fn test_search_options_validation() {
        let defaults = SearchOptions::default();
        assert_eq!(defaults.step_seconds(), 1800.0);
        assert_eq!(defaults.tolerance_seconds(), 0.01);
        assert_eq!(defaults.transit_margin_hours(), 7.0);
        assert_eq!(
            SearchOptions::new(Horizon::SunriseSunset, 1800.0, 0.01, 7.0).unwrap(),
            defaults
        );

        assert!(SearchOptions::new(Horizon::SunriseSunset, 0.0, 0.01, 7.0).is_err());
        assert!(SearchOptions::new(Horizon::SunriseSunset, 60.0, 60.0, 7.0).is_err());
        assert!(SearchOptions::new(Horizon::SunriseSunset, 60.0, 1.0, 12.0).is_err());
        assert!(SearchOptions::new(Horizon::SunriseSunset, 60.0, 1.0, -1.0).is_err());

        let civil = defaults.with_horizon(Horizon::CivilTwilight);
        assert_eq!(civil.horizon(), Horizon::CivilTwilight);
        assert_eq!(civil.step_seconds(), defaults.step_seconds());
    }

    #[test]
    fn test_solar_event_result_drops_polar_sunrise() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 21, 4, 0, 0).unwrap();
        let result = SolarEventResult::new(Some(instant), Some(instant), DayClassification::PolarDay);
        assert_eq!(result.sunrise(), None);
        assert_eq!(result.transit(), Some(instant));
        assert!(result.classification().is_polar());
    }

    #[test]
    fn test_distance_sample_rejects_non_physical_distances() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(DistanceSample::new(instant, 1.47e8).is_ok());
        assert!(DistanceSample::new(instant, 0.0).is_err());
        assert!(DistanceSample::new(instant, f64::NAN).is_err());
    }

    #[test]
    fn test_daily_record_labels() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let offset = LocalTimeOffset::from_longitude(15.0);
        let transit = Utc.with_ymd_and_hms(2024, 6, 21, 11, 0, 30).unwrap();
        let events = SolarEventResult::new(None, Some(transit), DayClassification::PolarDay);
        let sample = DistanceSample::new(transit, 1.52e8).unwrap();

        let record = DailyRecord::new(date, offset, events, None, Some(sample), 0.0, None);
        assert_eq!(record.sunrise_local_label(), "polar day");
        assert_eq!(record.sunrise_utc_label(), "polar day");
        assert_eq!(record.transit_local_label(), "12:00:30");
        assert_eq!(record.transit_utc_label(), "11:00:30");
        assert_eq!(record.sunrise_distance_km(), 0.0);
        assert_eq!(record.noon_distance_km(), 1.52e8);

        let summary = record.to_string();
        assert!(summary.contains("classification:       polar day"));
        assert!(!summary.contains("anomaly"));

        let events = SolarEventResult::new(Some(transit), None, DayClassification::Normal);
        let record = DailyRecord::new(
            date,
            offset,
            events,
            None,
            None,
            0.0,
            Some(ResolverAnomaly::MissingTransit),
        );
        assert_eq!(record.transit_local_label(), "no transit");
        assert!(record.to_string().ends_with("anomaly:              missing transit"));
    }
}
