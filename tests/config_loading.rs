//! Configuration files driving the day and year calculations.

use std::fs;

use chrono::NaiveDate;
use solar_distance::distance::compute_day_record_with;
use solar_distance::{compute_day_record, Config, Error, GeoLocation, Horizon, YearlyAggregator};
use tempfile::NamedTempFile;

fn write_config(text: &str) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), text).unwrap();
    file
}

#[test]
fn default_config_matches_convenience_api() {
    let file = write_config("");
    let config = Config::from_path(file.path()).unwrap();
    let ephemeris = config.load_ephemeris().unwrap();
    let options = config.search_options().unwrap();

    let location = GeoLocation::new(48.2, 16.4).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 10, 3).unwrap();
    assert_eq!(
        compute_day_record_with(&ephemeris, location, date, &options).unwrap(),
        compute_day_record(location, date).unwrap()
    );
}

#[test]
fn civil_twilight_moves_sunrise_earlier() {
    let file = write_config(
        r#"
        [search]
        horizon = "civil"
        step_seconds = 900.0
        "#,
    );
    let config = Config::from_path(file.path()).unwrap();
    let options = config.search_options().unwrap();
    assert_eq!(options.horizon(), Horizon::CivilTwilight);

    let ephemeris = config.load_ephemeris().unwrap();
    let location = GeoLocation::new(48.2, 16.4).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 10, 3).unwrap();

    let dawn = compute_day_record_with(&ephemeris, location, date, &options).unwrap();
    let sunrise = compute_day_record(location, date).unwrap();
    assert!(dawn.sunrise().unwrap().instant() < sunrise.sunrise().unwrap().instant());
    // Farther below the horizon, so farther away
    assert!(dawn.d_km() > sunrise.d_km());
}

#[test]
fn configured_options_reach_the_aggregator() {
    let file = write_config("[search]\nhorizon = -6.0\n");
    let config = Config::from_path(file.path()).unwrap();
    let ephemeris = config.load_ephemeris().unwrap();
    let options = config.search_options().unwrap();

    let location = GeoLocation::new(48.2, 16.4).unwrap();
    let report = YearlyAggregator::new(&ephemeris)
        .with_options(options)
        .run(location, 2023, |_| {})
        .unwrap();
    let date = NaiveDate::from_ymd_opt(2023, 10, 3).unwrap();
    let single = compute_day_record_with(&ephemeris, location, date, &options).unwrap();
    assert_eq!(report.records()[275], single);
}

#[test]
fn invalid_values_are_reported() {
    let file = write_config("[search]\ntransit_margin_hours = 12.5\n");
    let config = Config::from_path(file.path()).unwrap();
    assert!(matches!(
        config.search_options(),
        Err(Error::InvalidSearchOptions { .. })
    ));

    let file = write_config("[search]\nstep = 10\n");
    assert!(matches!(
        Config::from_path(file.path()),
        Err(Error::InvalidConfig { .. })
    ));
}

#[test]
fn missing_ephemeris_table_surfaces_on_load() {
    let file = write_config("[ephemeris]\npath = \"/nonexistent/earth.csv\"\n");
    let config = Config::from_path(file.path()).unwrap();
    assert!(matches!(
        config.load_ephemeris(),
        Err(Error::DataUnavailable { .. })
    ));
}
