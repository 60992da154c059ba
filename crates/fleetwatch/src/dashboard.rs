//! Read-only dashboard data handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{MapConfig, Thresholds};
use crate::fleet::FleetSnapshot;
use crate::metrics::DerivedMetrics;
use crate::vehicle::{MapPoint, VehicleRecord, VehicleStatus};

/// Overall system status shown in the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    /// The monitor is ticking and nothing needs attention.
    Running,
    /// The monitor is ticking and at least one alert is outstanding.
    Warning,
    /// The monitor is not ticking.
    Stopped,
}

impl SystemStatus {
    /// Status for a view, given whether the monitor producing it is live.
    #[must_use]
    pub fn for_view(view: &DashboardView, running: bool) -> Self {
        if !running {
            Self::Stopped
        } else if view.metrics.has_alerts() {
            Self::Warning
        } else {
            Self::Running
        }
    }
}

impl std::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Warning => write!(f, "Warning"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// One fleet-table row: the record plus its per-vehicle derived values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRow {
    /// The vehicle record.
    #[serde(flatten)]
    pub vehicle: VehicleRecord,
    /// Display status.
    pub status: VehicleStatus,
    /// Position projected onto the map viewport.
    pub map: MapPoint,
}

/// Everything the presentation layer needs for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Tick of the underlying snapshot.
    pub tick: u64,
    /// When the view was built.
    pub generated_at: DateTime<Utc>,
    /// Aggregates, congestion and alerts.
    pub metrics: DerivedMetrics,
    /// Fleet table, in fleet order.
    pub vehicles: Vec<VehicleRow>,
}

impl DashboardView {
    /// Derive a view from a snapshot.
    #[must_use]
    pub fn build(
        snapshot: &FleetSnapshot,
        thresholds: &Thresholds,
        map: &MapConfig,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let vehicles = snapshot
            .iter()
            .map(|vehicle| VehicleRow {
                status: vehicle.status(thresholds),
                map: vehicle.position.project(map),
                vehicle: vehicle.clone(),
            })
            .collect();

        Self {
            tick: snapshot.tick(),
            generated_at,
            metrics: DerivedMetrics::compute(snapshot, thresholds),
            vehicles,
        }
    }

    /// Rows matching `query` by id or zone, ignoring case. Empty matches all.
    #[must_use]
    pub fn filtered(&self, query: &str) -> Vec<&VehicleRow> {
        let needle = query.to_lowercase();
        self.vehicles
            .iter()
            .filter(|row| row.vehicle.matches_lowercase(&needle))
            .collect()
    }
}
