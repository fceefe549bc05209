//! Apparent solar geometry.
//!
//! Follows the NREL algorithm by Reda & Andreas (2003) from the Earth's heliocentric
//! position through nutation, aberration and sidereal time to the Sun's topocentric
//! elevation and hour angle. The same quantities also give the observer-to-Sun
//! distance, with the observer placed on the WGS84 ellipsoid at sea level.
//!
//! Reference: Reda, I.; Andreas, A. (2003). Solar position algorithm for solar radiation applications.
//! Solar Energy, 76(5), 577-589. DOI: <http://dx.doi.org/10.1016/j.solener.2003.12.003>

#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::unreadable_literal)]

use crate::ephemeris::Ephemeris;
use crate::math::{normalize_degrees_0_to_360, polynomial};
use crate::time::JulianDate;
use crate::types::GeoLocation;
use crate::{Error, Result};

pub mod coefficients;
use coefficients::{NUTATION_COEFFS, OBLIQUITY_COEFFS, TERMS_PE, TERMS_Y};

/// Aberration constant in arcseconds.
const ABERRATION_CONSTANT: f64 = -20.4898;

/// Ratio of polar to equatorial Earth radius (WGS84).
const EARTH_FLATTENING_FACTOR: f64 = 0.99664719;

/// Equatorial Earth radius in kilometers (WGS84).
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Astronomical unit in kilometers (IAU 2012).
pub const AU_KM: f64 = 149_597_870.7;

/// Seconds per hour conversion factor.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Location-independent geometry of the Sun at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunGeometry {
    /// Earth radius vector (AU)
    radius_au: f64,
    /// Geocentric sun right ascension (degrees)
    alpha_degrees: f64,
    /// Geocentric sun declination (degrees)
    delta_degrees: f64,
    /// Apparent sidereal time at Greenwich (degrees)
    nu_degrees: f64,
}

impl SunGeometry {
    /// Earth–Sun distance in AU.
    #[must_use]
    pub const fn radius_au(&self) -> f64 {
        self.radius_au
    }

    /// Earth–Sun distance in kilometers.
    #[must_use]
    pub fn radius_km(&self) -> f64 {
        self.radius_au * AU_KM
    }

    /// Apparent geocentric right ascension in degrees.
    #[must_use]
    pub const fn right_ascension(&self) -> f64 {
        self.alpha_degrees
    }

    /// Apparent geocentric declination in degrees.
    #[must_use]
    pub const fn declination(&self) -> f64 {
        self.delta_degrees
    }

    /// Apparent sidereal time at Greenwich in degrees.
    #[must_use]
    pub const fn sidereal_time(&self) -> f64 {
        self.nu_degrees
    }
}

/// The Sun as seen by a sea-level observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Topocentric {
    elevation_degrees: f64,
    hour_angle_degrees: f64,
    distance_km: f64,
}

impl Topocentric {
    /// Topocentric elevation of the Sun's centre without refraction, in degrees.
    #[must_use]
    pub const fn elevation_angle(&self) -> f64 {
        self.elevation_degrees
    }

    /// Topocentric local hour angle in degrees, [0, 360).
    ///
    /// Zero at upper transit, 180 at lower transit.
    #[must_use]
    pub const fn hour_angle(&self) -> f64 {
        self.hour_angle_degrees
    }

    /// Distance from the observer to the Sun's centre in kilometers.
    #[must_use]
    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }
}

#[derive(Debug, Clone, Copy)]
struct DeltaPsiEpsilon {
    delta_psi: f64,
    delta_epsilon: f64,
}

/// Computes the Sun's apparent geocentric position for a Julian date.
///
/// # Errors
/// Returns `ComputationError` if the ephemeris yields a non-physical radius vector.
pub fn sun_geometry(ephemeris: &Ephemeris, jd: &JulianDate) -> Result<SunGeometry> {
    let jme = jd.julian_ephemeris_millennium();
    let jce = jd.julian_ephemeris_century();

    // 3.2. Earth heliocentric longitude, latitude and radius vector
    let heliocentric = ephemeris.heliocentric(jme);
    let r = heliocentric.radius_au();
    if !(r.is_finite() && r > 0.0) {
        return Err(Error::computation_error(
            "Earth radius vector is not a positive finite number",
        ));
    }

    // 3.2.5-3.2.6. Geocentric longitude and latitude
    let theta_degrees = normalize_degrees_0_to_360(heliocentric.longitude() + 180.0);
    let beta_degrees = -heliocentric.latitude();

    // 3.3. Nutation in longitude and obliquity
    let x_terms = calculate_nutation_terms(jce);
    let delta_psi_epsilon = calculate_delta_psi_epsilon(jce, &x_terms);

    // 3.4. True obliquity of the ecliptic
    let epsilon_degrees =
        calculate_true_obliquity_of_ecliptic(jd, delta_psi_epsilon.delta_epsilon);

    // 3.5-3.6. Aberration and apparent sun longitude
    let delta_tau = ABERRATION_CONSTANT / (SECONDS_PER_HOUR * r);
    let lambda_degrees = theta_degrees + delta_psi_epsilon.delta_psi + delta_tau;

    // 3.7. Apparent sidereal time at Greenwich
    let nu_degrees = calculate_apparent_sidereal_time_at_greenwich(
        jd,
        delta_psi_epsilon.delta_psi,
        epsilon_degrees,
    );

    // 3.8. Geocentric right ascension and declination
    let beta = beta_degrees.to_radians();
    let epsilon = epsilon_degrees.to_radians();
    let lambda = lambda_degrees.to_radians();
    let alpha_degrees = calculate_geocentric_sun_right_ascension(beta, epsilon, lambda);
    let delta_degrees = calculate_geocentric_sun_declination(beta, epsilon, lambda).to_degrees();

    Ok(SunGeometry {
        radius_au: r,
        alpha_degrees,
        delta_degrees,
        nu_degrees,
    })
}

/// Places the Sun relative to a sea-level observer.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use solar_distance::{spa, time::JulianDate, Ephemeris, GeoLocation};
///
/// let ephemeris = Ephemeris::builtin().unwrap();
/// let noon = Utc.with_ymd_and_hms(2024, 3, 20, 12, 7, 0).unwrap();
/// let jd = JulianDate::from_instant(noon).unwrap();
/// let sun = spa::sun_geometry(ephemeris, &jd).unwrap();
///
/// let greenwich = GeoLocation::new(51.48, 0.0).unwrap();
/// let view = spa::topocentric(greenwich, &sun);
/// assert!((view.elevation_angle() - (90.0 - 51.48)).abs() < 1.0);
/// ```
#[must_use]
pub fn topocentric(location: GeoLocation, sun: &SunGeometry) -> Topocentric {
    let latitude = location.latitude();

    // 3.9. Observer local hour angle
    let h_degrees =
        normalize_degrees_0_to_360(sun.nu_degrees + location.longitude() - sun.alpha_degrees);
    let h = h_degrees.to_radians();

    // 3.10. Equatorial horizontal parallax and observer terms at zero elevation
    let xi = (8.794 / (SECONDS_PER_HOUR * sun.radius_au)).to_radians();
    let phi = latitude.to_radians();
    let delta = sun.delta_degrees.to_radians();

    let u = (EARTH_FLATTENING_FACTOR * phi.tan()).atan();
    let x = u.cos();
    let y = EARTH_FLATTENING_FACTOR * u.sin();

    // 3.11. Parallax in right ascension and topocentric declination
    let denominator = (x * xi.sin()).mul_add(-h.cos(), delta.cos());
    let delta_alpha = (-x * xi.sin() * h.sin()).atan2(denominator);
    let delta_prime = (y.mul_add(-xi.sin(), delta.sin()) * delta_alpha.cos()).atan2(denominator);

    // 3.12. Topocentric local hour angle
    let h_prime_degrees = normalize_degrees_0_to_360(h_degrees - delta_alpha.to_degrees());
    let h_prime = h_prime_degrees.to_radians();

    // 3.13. Topocentric elevation angle without refraction
    let elevation_degrees = phi
        .sin()
        .mul_add(delta_prime.sin(), phi.cos() * delta_prime.cos() * h_prime.cos())
        .clamp(-1.0, 1.0)
        .asin()
        .to_degrees();

    Topocentric {
        elevation_degrees,
        hour_angle_degrees: h_prime_degrees,
        distance_km: observer_distance_km(sun.radius_km(), x, y, delta, h),
    }
}

/// Distance between the observer at `a·(x cos θ, x sin θ, y)` and the Sun at
/// `R·(cos δ cos α, cos δ sin α, sin δ)`, with θ − α = H.
fn observer_distance_km(radius_km: f64, x: f64, y: f64, delta: f64, h: f64) -> f64 {
    let a = EARTH_RADIUS_KM;
    let projection = x * delta.cos() * h.cos() + y * delta.sin();
    let squared = (2.0 * radius_km * a).mul_add(
        -projection,
        radius_km.mul_add(radius_km, a * a * x.mul_add(x, y * y)),
    );
    squared.sqrt()
}

/// Calculate nutation terms (X values).
fn calculate_nutation_terms(jce: f64) -> [f64; 5] {
    NUTATION_COEFFS.map(|coeffs| polynomial(coeffs, jce))
}

/// Calculate nutation in longitude and obliquity, in degrees.
fn calculate_delta_psi_epsilon(jce: f64, x: &[f64; 5]) -> DeltaPsiEpsilon {
    let (delta_psi, delta_epsilon) = TERMS_PE.iter().zip(TERMS_Y).fold(
        (0.0, 0.0),
        |(psi, eps), (pe_term, y_term)| {
            let argument: f64 = x
                .iter()
                .zip(y_term)
                .map(|(&x_val, &multiple)| x_val * f64::from(multiple))
                .sum();
            let argument = argument.to_radians();
            (
                pe_term[1].mul_add(jce, pe_term[0]).mul_add(argument.sin(), psi),
                pe_term[3].mul_add(jce, pe_term[2]).mul_add(argument.cos(), eps),
            )
        },
    );

    DeltaPsiEpsilon {
        delta_psi: delta_psi / 36_000_000.0,
        delta_epsilon: delta_epsilon / 36_000_000.0,
    }
}

/// Calculate true obliquity of the ecliptic.
fn calculate_true_obliquity_of_ecliptic(jd: &JulianDate, delta_epsilon: f64) -> f64 {
    let epsilon0 = polynomial(OBLIQUITY_COEFFS, jd.julian_ephemeris_millennium() / 10.0);
    epsilon0 / 3600.0 + delta_epsilon
}

/// Calculate apparent sidereal time at Greenwich.
fn calculate_apparent_sidereal_time_at_greenwich(
    jd: &JulianDate,
    delta_psi: f64,
    epsilon_degrees: f64,
) -> f64 {
    let jc = jd.julian_century();
    let nu0_degrees = normalize_degrees_0_to_360(jc.powi(2).mul_add(
        0.000387933 - jc / 38710000.0,
        360.98564736629f64.mul_add(jd.julian_date() - 2451545.0, 280.46061837),
    ));

    delta_psi.mul_add(epsilon_degrees.to_radians().cos(), nu0_degrees)
}

/// Calculate geocentric sun right ascension in degrees.
fn calculate_geocentric_sun_right_ascension(beta: f64, epsilon: f64, lambda: f64) -> f64 {
    let alpha = lambda
        .sin()
        .mul_add(epsilon.cos(), -(beta.tan() * epsilon.sin()))
        .atan2(lambda.cos());
    normalize_degrees_0_to_360(alpha.to_degrees())
}

/// Calculate geocentric sun declination in radians.
fn calculate_geocentric_sun_declination(beta: f64, epsilon: f64, lambda: f64) -> f64 {
    beta.sin()
        .mul_add(epsilon.cos(), beta.cos() * epsilon.sin() * lambda.sin())
        .asin()
}

/// Computes the Sun's topocentric view for an observer at a UTC instant.
///
/// # Errors
/// Returns `DataUnavailable` if the instant is outside the ephemeris coverage.
pub fn observe(
    ephemeris: &Ephemeris,
    location: GeoLocation,
    instant: chrono::DateTime<chrono::Utc>,
) -> Result<Topocentric> {
    ephemeris.check_coverage(instant)?;
    let jd = JulianDate::from_instant(instant)?;
    let sun = sun_geometry(ephemeris, &jd)?;
    Ok(topocentric(location, &sun))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn builtin() -> &'static Ephemeris {
        Ephemeris::builtin().unwrap()
    }

    #[test]
    fn test_reda_andreas_reference_geometry() {
        // Reda & Andreas (2003), table A5.1: 2003-10-17 12:30:30 LST-7, ΔT = 67 s
        let instant = Utc.with_ymd_and_hms(2003, 10, 17, 19, 30, 30).unwrap();
        let jd = JulianDate::with_delta_t(instant, 67.0);
        let sun = sun_geometry(builtin(), &jd).unwrap();

        assert!((sun.radius_au() - 0.996_542_6).abs() < 1e-6);
        assert!((sun.right_ascension() - 202.227_41).abs() < 1e-3);
        assert!((sun.declination() - -9.314_34).abs() < 1e-3);
        assert!((sun.sidereal_time() - 318.511_92).abs() < 1e-3);
    }

    #[test]
    fn test_reda_andreas_reference_observer() {
        let instant = Utc.with_ymd_and_hms(2003, 10, 17, 19, 30, 30).unwrap();
        let jd = JulianDate::with_delta_t(instant, 67.0);
        let sun = sun_geometry(builtin(), &jd).unwrap();
        let golden = GeoLocation::new(39.742476, -105.1786).unwrap();

        let view = topocentric(golden, &sun);
        // Published topocentric elevation e0 = 39.872046° before refraction
        assert!((view.elevation_angle() - 39.872046).abs() < 1e-3);
        // Published topocentric hour angle 11.10629°
        assert!((view.hour_angle() - 11.10629).abs() < 1e-3);
    }

    #[test]
    fn test_distance_near_noon_is_shorter_than_radius_vector() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        let jd = JulianDate::from_instant(instant).unwrap();
        let sun = sun_geometry(builtin(), &jd).unwrap();

        // Sun close to overhead at the subsolar point
        let subsolar = GeoLocation::new(23.44, 0.0).unwrap();
        let near = topocentric(subsolar, &sun);
        assert!(near.elevation_angle() > 85.0);
        assert!((sun.radius_km() - near.distance_km() - EARTH_RADIUS_KM).abs() < 50.0);

        // Antipode sees the Sun through the Earth
        let antipode = GeoLocation::new(-23.44, 180.0).unwrap();
        let far = topocentric(antipode, &sun);
        assert!(far.elevation_angle() < -85.0);
        assert!((far.distance_km() - sun.radius_km() - EARTH_RADIUS_KM).abs() < 50.0);
    }

    #[test]
    fn test_hour_angle_range_and_poles() {
        let instant = Utc.with_ymd_and_hms(2024, 12, 21, 0, 0, 0).unwrap();
        let jd = JulianDate::from_instant(instant).unwrap();
        let sun = sun_geometry(builtin(), &jd).unwrap();

        for (lat, lon) in [(90.0, 0.0), (-90.0, 0.0), (0.0, -180.0), (45.0, 179.9)] {
            let view = topocentric(GeoLocation::new(lat, lon).unwrap(), &sun);
            assert!((0.0..360.0).contains(&view.hour_angle()));
            assert!(view.distance_km() > 0.0);
            assert!(view.elevation_angle().is_finite());
        }
    }

    #[test]
    fn test_observe_matches_manual_steps() {
        let instant = Utc.with_ymd_and_hms(2020, 3, 1, 6, 0, 0).unwrap();
        let location = GeoLocation::new(-33.9, 18.4).unwrap();

        let jd = JulianDate::from_instant(instant).unwrap();
        let manual = topocentric(location, &sun_geometry(builtin(), &jd).unwrap());
        assert_eq!(observe(builtin(), location, instant).unwrap(), manual);
    }
}
