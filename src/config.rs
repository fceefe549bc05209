//! TOML configuration.
//!
//! ```toml
//! [search]
//! horizon = "civil"            # or an elevation angle in degrees
//! step_seconds = 1800.0
//! tolerance_seconds = 0.01
//! transit_margin_hours = 7.0
//!
//! [ephemeris]
//! path = "earth_terms.csv"     # relative to the configuration file
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::ephemeris::Ephemeris;
use crate::types::{Horizon, SearchOptions};
use crate::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Event search settings.
    #[serde(default)]
    pub search: SearchToml,

    /// Ephemeris table settings.
    #[serde(default)]
    pub ephemeris: EphemerisToml,
}

/// `[search]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchToml {
    /// Horizon the Sun must clear to count as up.
    #[serde(default)]
    pub horizon: Horizon,
    /// Coarse sampling step in seconds.
    #[serde(default = "default_step_seconds")]
    pub step_seconds: f64,
    /// Bisection tolerance in seconds.
    #[serde(default = "default_tolerance_seconds")]
    pub tolerance_seconds: f64,
    /// Hours trimmed from each end of the day before the transit search.
    #[serde(default = "default_transit_margin_hours")]
    pub transit_margin_hours: f64,
}

const fn default_step_seconds() -> f64 {
    SearchOptions::DEFAULT_STEP_SECONDS
}

const fn default_tolerance_seconds() -> f64 {
    SearchOptions::DEFAULT_TOLERANCE_SECONDS
}

const fn default_transit_margin_hours() -> f64 {
    SearchOptions::DEFAULT_TRANSIT_MARGIN_HOURS
}

impl Default for SearchToml {
    fn default() -> Self {
        Self {
            horizon: Horizon::default(),
            step_seconds: default_step_seconds(),
            tolerance_seconds: default_tolerance_seconds(),
            transit_margin_hours: default_transit_margin_hours(),
        }
    }
}

/// `[ephemeris]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EphemerisToml {
    /// CSV table to use instead of the built-in one.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Reads a configuration file.
    ///
    /// A relative `[ephemeris] path` is resolved against the directory of `path`.
    ///
    /// # Errors
    /// Returns `ConfigRead` if the file cannot be read and `InvalidConfig` if it does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;

        if let (Some(table), Some(dir)) = (config.ephemeris.path.as_mut(), path.parent()) {
            if table.is_relative() {
                *table = dir.join(&*table);
            }
        }
        debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Parses configuration text.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for syntax errors, unknown keys or bad horizon values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::InvalidConfig {
            message: e.message().to_string(),
        })
    }

    /// Validated search options.
    ///
    /// # Errors
    /// Returns `InvalidSearchOptions` if the `[search]` values are inconsistent.
    pub fn search_options(&self) -> Result<SearchOptions> {
        let search = &self.search;
        SearchOptions::new(
            search.horizon,
            search.step_seconds,
            search.tolerance_seconds,
            search.transit_margin_hours,
        )
    }

    /// The configured ephemeris table, or the built-in one.
    ///
    /// # Errors
    /// Returns `DataUnavailable` if the table cannot be loaded.
    pub fn load_ephemeris(&self) -> Result<Cow<'static, Ephemeris>> {
        match &self.ephemeris.path {
            Some(path) => Ephemeris::from_csv_path(path).map(Cow::Owned),
            None => Ephemeris::builtin().map(Cow::Borrowed),
        }
    }
}
