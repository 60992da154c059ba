//! Core vehicle types for fleetwatch.
//!
//! This module defines the per-vehicle telemetry record and the small value
//! types hanging off it (position, zone, display status, map projection).

use serde::{Deserialize, Serialize};

use crate::config::{MapConfig, Thresholds};

/// Identifier of a tracked vehicle. Assigned once, never reused.
pub type VehicleId = u32;

/// The fixed set of zones a vehicle can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Highway corridor.
    #[serde(rename = "Highway")]
    Highway,
    /// Downtown streets.
    #[serde(rename = "City Center")]
    CityCenter,
    /// Industrial estate.
    #[serde(rename = "Industrial Area")]
    IndustrialArea,
    /// Outer ring road.
    #[serde(rename = "Ring Road")]
    RingRoad,
}

impl Zone {
    /// All zones, in assignment order.
    pub const ALL: [Zone; 4] = [
        Zone::Highway,
        Zone::CityCenter,
        Zone::IndustrialArea,
        Zone::RingRoad,
    ];

    /// Zone for the vehicle at `index` in the fleet (cycles through [`Zone::ALL`]).
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Highway => "Highway",
            Self::CityCenter => "City Center",
            Self::IndustrialArea => "Industrial Area",
            Self::RingRoad => "Ring Road",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Return this position shifted by the given deltas.
    #[must_use]
    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            lat: self.lat + d_lat,
            lng: self.lng + d_lng,
        }
    }

    /// Project onto the map viewport as percentages of its width and height.
    ///
    /// Points outside the viewport yield values outside `0..=100`; callers
    /// decide whether to clip.
    #[must_use]
    pub fn project(self, map: &MapConfig) -> MapPoint {
        MapPoint {
            x: (self.lng - map.origin_lng) / map.span * 100.0,
            y: (self.lat - map.origin_lat) / map.span * 100.0,
        }
    }
}

/// A position projected onto the map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPoint {
    /// Horizontal offset in percent.
    pub x: f64,
    /// Vertical offset in percent.
    pub y: f64,
}

/// Display status of a single vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    /// Running normally.
    Normal,
    /// Fuel below the warning threshold.
    LowFuel,
    /// Not moving.
    Stopped,
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::LowFuel => write!(f, "Low Fuel"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Telemetry for one tracked vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Unique identifier, stable for the record's lifetime.
    pub id: VehicleId,

    /// Current position.
    pub position: Position,

    /// Speed in km/h.
    pub speed: u32,

    /// Remaining fuel in percent, `0.0..=100.0`.
    pub fuel_level: f64,

    /// Zone assigned at creation.
    pub zone: Zone,
}

impl VehicleRecord {
    /// Whether the vehicle is moving.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.speed > 0
    }

    /// Fuel rounded to a whole percentage, for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn fuel_percent(&self) -> u32 {
        self.fuel_level.round().max(0.0) as u32
    }

    /// Status for the fleet table. A stopped vehicle reports `Stopped` even
    /// when it is also low on fuel.
    #[must_use]
    pub fn status(&self, thresholds: &Thresholds) -> VehicleStatus {
        if self.speed == 0 {
            VehicleStatus::Stopped
        } else if self.fuel_level < thresholds.low_fuel_warning {
            VehicleStatus::LowFuel
        } else {
            VehicleStatus::Normal
        }
    }

    /// Case-insensitive substring match against the id or the zone label.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.id.to_string().contains(needle)
            || self.zone.label().to_lowercase().contains(needle)
    }
}
