//! Loading periodic-term tables from CSV files.

use std::fmt::Write as _;
use std::fs;

use chrono::{NaiveDate, TimeZone, Utc};
use solar_distance::distance::compute_day_record_with;
use solar_distance::spa::coefficients::{TERMS_B, TERMS_L, TERMS_R};
use solar_distance::{Config, Ephemeris, Error, GeoLocation, SearchOptions};
use tempfile::TempDir;

fn builtin_as_csv() -> String {
    let mut csv = String::from("series,order,amplitude,phase,frequency\n");
    for (name, series) in [("L", TERMS_L), ("B", TERMS_B), ("R", TERMS_R)] {
        for (order, terms) in series.iter().enumerate() {
            for [amplitude, phase, frequency] in terms.iter() {
                writeln!(csv, "{name},{order},{amplitude},{phase},{frequency}").unwrap();
            }
        }
    }
    csv
}

#[test]
fn csv_copy_of_builtin_table_is_identical() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("earth.csv");
    fs::write(&path, builtin_as_csv()).unwrap();

    let loaded = Ephemeris::from_csv_path(&path).unwrap();
    let builtin = Ephemeris::builtin().unwrap();
    assert_eq!(&loaded, builtin);
    assert_eq!(loaded.term_count(), builtin.term_count());

    let location = GeoLocation::new(51.5, -0.1).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let options = SearchOptions::default();
    assert_eq!(
        compute_day_record_with(&loaded, location, date, &options).unwrap(),
        compute_day_record_with(builtin, location, date, &options).unwrap()
    );
}

#[test]
fn truncated_table_stays_close() {
    // Only the leading terms of each order
    let mut csv = String::from("series,order,amplitude,phase,frequency\n");
    for (name, series) in [("L", TERMS_L), ("B", TERMS_B), ("R", TERMS_R)] {
        for (order, terms) in series.iter().enumerate() {
            for [amplitude, phase, frequency] in terms.iter().take(5) {
                writeln!(csv, "{name},{order},{amplitude},{phase},{frequency}").unwrap();
            }
        }
    }
    let truncated = Ephemeris::from_csv_reader(csv.as_bytes()).unwrap();
    let builtin = Ephemeris::builtin().unwrap();
    assert!(truncated.term_count() < builtin.term_count());

    let location = GeoLocation::new(0.0, 0.0).unwrap();
    let instant = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
    let full = builtin.distance_to_sun(location, instant).unwrap();
    let approx = truncated.distance_to_sun(location, instant).unwrap();
    assert!((full - approx).abs() < 20_000.0, "{full} vs {approx}");
}

#[test]
fn missing_file_is_data_unavailable() {
    let dir = TempDir::new().unwrap();
    let result = Ephemeris::from_csv_path(dir.path().join("absent.csv"));
    assert!(matches!(result, Err(Error::DataUnavailable { .. })));
}

#[test]
fn malformed_table_is_data_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.csv");
    fs::write(
        &path,
        "series,order,amplitude,phase,frequency\nL,0,175347046,0,0\nL,zero,1,2,3\n",
    )
    .unwrap();

    let err = Ephemeris::from_csv_path(&path).unwrap_err();
    assert!(matches!(err, Error::DataUnavailable { .. }));
    assert!(err.to_string().contains("broken.csv"));
}

#[test]
fn config_points_at_table_relative_to_itself() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("tables")).unwrap();
    fs::write(dir.path().join("tables/earth.csv"), builtin_as_csv()).unwrap();
    let config_path = dir.path().join("solar.toml");
    fs::write(&config_path, "[ephemeris]\npath = \"tables/earth.csv\"\n").unwrap();

    let config = Config::from_path(&config_path).unwrap();
    assert_eq!(
        config.ephemeris.path.as_deref(),
        Some(dir.path().join("tables/earth.csv").as_path())
    );
    let ephemeris = config.load_ephemeris().unwrap();
    assert_eq!(&*ephemeris, Ephemeris::builtin().unwrap());
}

#[test]
fn instants_outside_coverage_are_rejected() {
    let builtin = Ephemeris::builtin().unwrap();
    let location = GeoLocation::new(0.0, 0.0).unwrap();
    let far_future = Utc.with_ymd_and_hms(3500, 1, 1, 0, 0, 0).unwrap();
    assert!(matches!(
        builtin.distance_to_sun(location, far_future),
        Err(Error::DataUnavailable { .. })
    ));
}
