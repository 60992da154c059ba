//! Configuration management for fleetwatch.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "fleetwatch";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "FLEETWATCH_";

/// Highest speed any vehicle may reach, in km/h.
pub const SPEED_LIMIT: u32 = 110;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLEETWATCH_`, sections split by `__`)
/// 2. TOML config file at `~/.config/fleetwatch/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fleet size, seeding and timer intervals.
    pub simulation: SimulationConfig,
    /// Random-walk parameters for the fleet generator.
    pub generator: GeneratorConfig,
    /// Thresholds used by the metrics pipeline.
    pub thresholds: Thresholds,
    /// Map viewport used to project vehicle positions.
    pub map: MapConfig,
}

/// Simulation host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of vehicles in the fleet. Fixed for the process lifetime.
    pub fleet_size: usize,
    /// Seed for the random source. Unseeded (entropy) when absent.
    pub seed: Option<u64>,
    /// Interval between fleet ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Interval between display clock updates in milliseconds.
    pub clock_interval_ms: u64,
}

/// Parameters of the fleet random walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// South-west corner latitude of the spawn box.
    pub origin_lat: f64,
    /// South-west corner longitude of the spawn box.
    pub origin_lng: f64,
    /// Side length of the spawn box in degrees.
    pub spawn_span: f64,
    /// Initial speeds are drawn from `0..initial_speed_max`.
    pub initial_speed_max: u32,
    /// Lowest initial fuel level.
    pub initial_fuel_min: f64,
    /// Initial fuel is drawn from `initial_fuel_min..initial_fuel_min + initial_fuel_span`.
    pub initial_fuel_span: f64,
    /// Full width of the per-tick position delta (half on either side of zero).
    pub position_jitter: f64,
    /// Full width of the per-tick speed delta (half on either side of zero).
    pub speed_jitter: u32,
    /// Upper speed bound in km/h.
    pub max_speed: u32,
    /// Maximum fuel burned per tick while moving.
    pub moving_fuel_burn: f64,
    /// Maximum fuel burned per tick while stopped.
    pub idle_fuel_burn: f64,
}

/// Thresholds for statistics, congestion and alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Fuel below this raises a maintenance alert.
    pub low_fuel_alert: f64,
    /// Fuel below this counts as low in the statistics and the fleet table.
    pub low_fuel_warning: f64,
    /// Vehicles below this speed count as slow for congestion.
    pub slow_speed: u32,
    /// Slow-vehicle percentage at or above which congestion is Medium.
    pub congestion_medium_pct: u32,
    /// Slow-vehicle percentage at or above which congestion is High.
    pub congestion_high_pct: u32,
    /// Maximum number of alerts reported.
    pub max_alerts: usize,
}

/// Map viewport configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Latitude at the top edge of the viewport.
    pub origin_lat: f64,
    /// Longitude at the left edge of the viewport.
    pub origin_lng: f64,
    /// Side length of the viewport in degrees.
    pub span: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fleet_size: 10,
            seed: None,
            tick_interval_ms: 3000,
            clock_interval_ms: 1000,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            origin_lat: 17.385,
            origin_lng: 78.486,
            spawn_span: 0.08,
            initial_speed_max: 90,
            initial_fuel_min: 40.0,
            initial_fuel_span: 60.0,
            position_jitter: 0.01,
            speed_jitter: 20,
            max_speed: 110,
            moving_fuel_burn: 2.0,
            idle_fuel_burn: 0.4,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_fuel_alert: 15.0,
            low_fuel_warning: 20.0,
            slow_speed: 30,
            congestion_medium_pct: 30,
            congestion_high_pct: 60,
            max_alerts: 5,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            origin_lat: 17.36,
            origin_lng: 78.46,
            span: 0.12,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file is missing, otherwise the
    /// same errors as [`Config::load_from`].
    pub fn load_existing(config_path: &Path) -> Result<Self> {
        if !config_path.is_file() {
            return Err(Error::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }
        Self::load_from(Some(config_path.to_path_buf()))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.tick_interval_ms == 0 {
            return Err(Error::invalid_config(
                "tick_interval_ms must be greater than 0",
            ));
        }
        if sim.clock_interval_ms == 0 {
            return Err(Error::invalid_config(
                "clock_interval_ms must be greater than 0",
            ));
        }

        let motion = &self.generator;
        for (name, value) in [
            ("spawn_span", motion.spawn_span),
            ("initial_fuel_min", motion.initial_fuel_min),
            ("initial_fuel_span", motion.initial_fuel_span),
            ("position_jitter", motion.position_jitter),
            ("moving_fuel_burn", motion.moving_fuel_burn),
            ("idle_fuel_burn", motion.idle_fuel_burn),
        ] {
            ensure_non_negative(name, value)?;
        }
        if motion.initial_fuel_min + motion.initial_fuel_span > 100.0 {
            return Err(Error::invalid_config(format!(
                "initial fuel range ({} + {}) exceeds 100",
                motion.initial_fuel_min, motion.initial_fuel_span
            )));
        }
        if motion.max_speed > SPEED_LIMIT {
            return Err(Error::invalid_config(format!(
                "max_speed ({}) cannot exceed {SPEED_LIMIT}",
                motion.max_speed
            )));
        }
        if motion.initial_speed_max > motion.max_speed {
            return Err(Error::invalid_config(format!(
                "initial_speed_max ({}) cannot be greater than max_speed ({})",
                motion.initial_speed_max, motion.max_speed
            )));
        }

        let th = &self.thresholds;
        for (name, value) in [
            ("low_fuel_alert", th.low_fuel_alert),
            ("low_fuel_warning", th.low_fuel_warning),
        ] {
            ensure_non_negative(name, value)?;
            if value > 100.0 {
                return Err(Error::invalid_config(format!(
                    "{name} ({value}) cannot exceed 100"
                )));
            }
        }
        if th.congestion_medium_pct > th.congestion_high_pct {
            return Err(Error::invalid_config(format!(
                "congestion_medium_pct ({}) cannot be greater than congestion_high_pct ({})",
                th.congestion_medium_pct, th.congestion_high_pct
            )));
        }
        if th.congestion_high_pct > 100 {
            return Err(Error::invalid_config(format!(
                "congestion_high_pct ({}) cannot exceed 100",
                th.congestion_high_pct
            )));
        }

        if self.map.span.is_nan() || self.map.span <= 0.0 {
            return Err(Error::invalid_config("map span must be greater than 0"));
        }

        Ok(())
    }

    /// Get the fleet tick interval as a Duration.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.simulation.tick_interval_ms)
    }

    /// Get the display clock interval as a Duration.
    #[must_use]
    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.simulation.clock_interval_ms)
    }
}

fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}
