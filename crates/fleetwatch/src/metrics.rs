//! Derived metrics pipeline.
//!
//! Everything here is a pure function of a fleet snapshot and a set of
//! [`Thresholds`]: aggregate statistics, the congestion classification, the
//! maintenance alert list and the search filter. Nothing is cached; callers
//! recompute after every tick.

use serde::Serialize;

use crate::config::Thresholds;
use crate::fleet::FleetSnapshot;
use crate::vehicle::{VehicleId, VehicleRecord};

/// Aggregate fleet statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FleetStats {
    /// Number of vehicles.
    pub total: usize,
    /// Vehicles with non-zero speed.
    pub active: usize,
    /// Vehicles below the low-fuel warning threshold.
    pub low_fuel: usize,
    /// Mean speed rounded to the nearest km/h; 0 for an empty fleet.
    pub average_speed: u32,
}

/// Three-tier congestion classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CongestionLevel {
    /// Traffic flowing.
    Low,
    /// A noticeable share of the fleet is slow.
    Medium,
    /// Most of the fleet is slow or stopped.
    High,
}

impl CongestionLevel {
    /// Classify a slow-vehicle percentage. Boundaries are inclusive.
    #[must_use]
    pub fn from_percent(percent: u32, thresholds: &Thresholds) -> Self {
        if percent >= thresholds.congestion_high_pct {
            Self::High
        } else if percent >= thresholds.congestion_medium_pct {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Expected impact on arrival times.
    #[must_use]
    pub fn eta_risk(self) -> &'static str {
        match self {
            Self::High => "Delays likely",
            Self::Medium => "Monitor ETAs",
            Self::Low => "On time",
        }
    }

    /// Recommended dispatcher action.
    #[must_use]
    pub fn suggested_action(self) -> &'static str {
        match self {
            Self::High => "Reroute through alternate corridors. Defer non-urgent trips.",
            Self::Medium => "Proactively optimize routes for affected vehicles.",
            Self::Low => "Maintain current routes; continue monitoring.",
        }
    }
}

impl std::fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Congestion derived from the share of slow vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Congestion {
    /// Vehicles below the slow-speed threshold (stopped ones included).
    pub slow: usize,
    /// `slow` as a rounded percentage of the fleet.
    pub percent: u32,
    /// Classification of `percent`.
    pub level: CongestionLevel,
}

/// Why a vehicle was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    /// Fuel below the alert threshold.
    LowFuel,
    /// Speed is zero.
    Stopped,
}

/// A vehicle flagged for maintenance attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// The flagged vehicle.
    pub id: VehicleId,
    /// Why it was flagged.
    pub reason: AlertReason,
    /// Display label, e.g. `Low Fuel (<15%)`.
    pub label: String,
    /// Fuel rounded to a whole percentage.
    pub fuel: u32,
    /// Speed in km/h.
    pub speed: u32,
}

/// All derived values for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedMetrics {
    /// Aggregate statistics.
    pub stats: FleetStats,
    /// Congestion classification.
    pub congestion: Congestion,
    /// Maintenance alerts, at most `max_alerts`.
    pub alerts: Vec<Alert>,
}

impl DerivedMetrics {
    /// Run the whole pipeline over a snapshot.
    #[must_use]
    pub fn compute(fleet: &FleetSnapshot, thresholds: &Thresholds) -> Self {
        let vehicles = fleet.vehicles();
        Self {
            stats: compute_stats(vehicles, thresholds),
            congestion: compute_congestion(vehicles, thresholds),
            alerts: compute_alerts(vehicles, thresholds),
        }
    }

    /// Whether any alert is outstanding.
    #[must_use]
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

/// Count total, active and low-fuel vehicles and the rounded mean speed.
#[must_use]
pub fn compute_stats(fleet: &[VehicleRecord], thresholds: &Thresholds) -> FleetStats {
    let total = fleet.len();
    let active = fleet.iter().filter(|v| v.is_active()).count();
    let low_fuel = fleet
        .iter()
        .filter(|v| v.fuel_level < thresholds.low_fuel_warning)
        .count();
    let speed_sum: u64 = fleet.iter().map(|v| u64::from(v.speed)).sum();

    FleetStats {
        total,
        active,
        low_fuel,
        average_speed: rounded_ratio(speed_sum, total, 1.0),
    }
}

/// Share of vehicles below the slow-speed threshold and its classification.
#[must_use]
pub fn compute_congestion(fleet: &[VehicleRecord], thresholds: &Thresholds) -> Congestion {
    let slow = fleet
        .iter()
        .filter(|v| v.speed < thresholds.slow_speed)
        .count();
    let percent = rounded_ratio(slow as u64, fleet.len().max(1), 100.0);

    Congestion {
        slow,
        percent,
        level: CongestionLevel::from_percent(percent, thresholds),
    }
}

/// The first `max_alerts` vehicles, in fleet order, that are low on fuel or
/// stopped. When both apply the fuel reason wins.
#[must_use]
pub fn compute_alerts(fleet: &[VehicleRecord], thresholds: &Thresholds) -> Vec<Alert> {
    let low_fuel_label = format!("Low Fuel (<{}%)", thresholds.low_fuel_alert);

    fleet
        .iter()
        .filter_map(|v| {
            let reason = if v.fuel_level < thresholds.low_fuel_alert {
                AlertReason::LowFuel
            } else if v.speed == 0 {
                AlertReason::Stopped
            } else {
                return None;
            };
            let label = match reason {
                AlertReason::LowFuel => low_fuel_label.clone(),
                AlertReason::Stopped => "Stopped".to_string(),
            };
            Some(Alert {
                id: v.id,
                reason,
                label,
                fuel: v.fuel_percent(),
                speed: v.speed,
            })
        })
        .take(thresholds.max_alerts)
        .collect()
}

/// Vehicles whose id or zone contains `query`, ignoring case.
///
/// An empty query returns the whole fleet. Order is preserved.
#[must_use]
pub fn filter<'a>(fleet: &'a [VehicleRecord], query: &str) -> Vec<&'a VehicleRecord> {
    let needle = query.to_lowercase();
    fleet
        .iter()
        .filter(|v| v.matches_lowercase(&needle))
        .collect()
}

/// `round(numerator / denominator * scale)`, or 0 when `denominator` is zero.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn rounded_ratio(numerator: u64, denominator: usize, scale: f64) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (numerator as f64 / denominator as f64 * scale).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{Position, Zone};

    fn vehicle(id: VehicleId, speed: u32, fuel_level: f64) -> VehicleRecord {
        VehicleRecord {
            id,
            position: Position::new(17.4, 78.5),
            speed,
            fuel_level,
            zone: Zone::for_index(id as usize - 1),
        }
    }

    fn with_speeds(speeds: &[u32]) -> Vec<VehicleRecord> {
        speeds
            .iter()
            .zip(1..)
            .map(|(&speed, id)| vehicle(id, speed, 80.0))
            .collect()
    }

    #[test]
    fn test_stats_empty_fleet() {
        let stats = compute_stats(&[], &Thresholds::default());
        assert_eq!(stats, FleetStats::default());
        assert_eq!(stats.average_speed, 0);
    }

    #[test]
    fn test_stats_counts() {
        let fleet = vec![
            vehicle(1, 0, 50.0),
            vehicle(2, 40, 19.9),
            vehicle(3, 55, 20.0),
            vehicle(4, 0, 10.0),
        ];
        let stats = compute_stats(&fleet, &Thresholds::default());

        assert_eq!(stats.total, 4);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.low_fuel, 2);
        // (0 + 40 + 55 + 0) / 4 = 23.75
        assert_eq!(stats.average_speed, 24);
    }

    #[test]
    fn test_stats_average_rounds_half_up() {
        let fleet = with_speeds(&[10, 11]);
        assert_eq!(compute_stats(&fleet, &Thresholds::default()).average_speed, 11);
    }

    #[test]
    fn test_congestion_example() {
        let fleet = with_speeds(&[10, 40, 90]);
        let congestion = compute_congestion(&fleet, &Thresholds::default());

        assert_eq!(congestion.slow, 1);
        assert_eq!(congestion.percent, 33);
        assert_eq!(congestion.level, CongestionLevel::Medium);
    }

    #[test]
    fn test_congestion_empty_fleet() {
        let congestion = compute_congestion(&[], &Thresholds::default());
        assert_eq!(congestion.slow, 0);
        assert_eq!(congestion.percent, 0);
        assert_eq!(congestion.level, CongestionLevel::Low);
    }

    #[test]
    fn test_congestion_boundaries_inclusive() {
        let th = Thresholds::default();
        assert_eq!(CongestionLevel::from_percent(29, &th), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_percent(30, &th), CongestionLevel::Medium);
        assert_eq!(CongestionLevel::from_percent(59, &th), CongestionLevel::Medium);
        assert_eq!(CongestionLevel::from_percent(60, &th), CongestionLevel::High);
        assert_eq!(CongestionLevel::from_percent(100, &th), CongestionLevel::High);
    }

    #[test]
    fn test_congestion_high() {
        // 3 of 5 below 30 km/h -> 60%.
        let fleet = with_speeds(&[0, 29, 12, 30, 100]);
        let congestion = compute_congestion(&fleet, &Thresholds::default());
        assert_eq!(congestion.slow, 3);
        assert_eq!(congestion.percent, 60);
        assert_eq!(congestion.level, CongestionLevel::High);
    }

    #[test]
    fn test_congestion_custom_thresholds() {
        let th = Thresholds {
            slow_speed: 50,
            congestion_medium_pct: 10,
            congestion_high_pct: 90,
            ..Thresholds::default()
        };
        let fleet = with_speeds(&[10, 40, 90]);
        let congestion = compute_congestion(&fleet, &th);
        assert_eq!(congestion.slow, 2);
        assert_eq!(congestion.percent, 67);
        assert_eq!(congestion.level, CongestionLevel::Medium);
    }

    #[test]
    fn test_level_advisories() {
        assert_eq!(CongestionLevel::High.eta_risk(), "Delays likely");
        assert_eq!(CongestionLevel::Medium.eta_risk(), "Monitor ETAs");
        assert_eq!(CongestionLevel::Low.eta_risk(), "On time");
        assert!(CongestionLevel::High.suggested_action().starts_with("Reroute"));
        assert_eq!(CongestionLevel::Medium.to_string(), "Medium");
    }

    #[test]
    fn test_alert_fuel_takes_precedence() {
        let fleet = vec![vehicle(1, 0, 10.0)];
        let alerts = compute_alerts(&fleet, &Thresholds::default());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].reason, AlertReason::LowFuel);
        assert_eq!(alerts[0].label, "Low Fuel (<15%)");
        assert_eq!(alerts[0].fuel, 10);
        assert_eq!(alerts[0].speed, 0);
    }

    #[test]
    fn test_alert_stopped() {
        let fleet = vec![vehicle(1, 0, 50.0), vehicle(2, 30, 50.0)];
        let alerts = compute_alerts(&fleet, &Thresholds::default());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, 1);
        assert_eq!(alerts[0].reason, AlertReason::Stopped);
        assert_eq!(alerts[0].label, "Stopped");
    }

    #[test]
    fn test_alerts_capped_in_fleet_order() {
        let fleet: Vec<VehicleRecord> = (1..=8).map(|id| vehicle(id, 0, 50.0)).collect();
        let alerts = compute_alerts(&fleet, &Thresholds::default());

        assert_eq!(alerts.len(), 5);
        let ids: Vec<VehicleId> = alerts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_alerts_skip_healthy_vehicles() {
        let fleet = vec![
            vehicle(1, 40, 80.0),
            vehicle(2, 40, 14.6),
            vehicle(3, 40, 15.0),
            vehicle(4, 0, 90.0),
        ];
        let alerts = compute_alerts(&fleet, &Thresholds::default());
        let ids: Vec<VehicleId> = alerts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(alerts[0].fuel, 15);
    }

    #[test]
    fn test_alert_label_follows_threshold() {
        let th = Thresholds {
            low_fuel_alert: 12.5,
            ..Thresholds::default()
        };
        let alerts = compute_alerts(&[vehicle(1, 20, 5.0)], &th);
        assert_eq!(alerts[0].label, "Low Fuel (<12.5%)");
    }

    #[test]
    fn test_filter_empty_query_returns_all() {
        let fleet = with_speeds(&[1, 2, 3, 4, 5]);
        let matched = filter(&fleet, "");
        assert_eq!(matched.len(), 5);
        let ids: Vec<VehicleId> = matched.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_filter_by_id() {
        let fleet: Vec<VehicleRecord> = (1..=13).map(|id| vehicle(id, 10, 50.0)).collect();
        let ids: Vec<VehicleId> = filter(&fleet, "3").iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![3, 13]);
    }

    #[test]
    fn test_filter_by_zone_case_insensitive() {
        let fleet: Vec<VehicleRecord> = (1..=8).map(|id| vehicle(id, 10, 50.0)).collect();
        let ids: Vec<VehicleId> = filter(&fleet, "CITY").iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![2, 6]);

        let ids: Vec<VehicleId> = filter(&fleet, "road").iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![4, 8]);
    }

    #[test]
    fn test_filter_no_match() {
        let fleet = with_speeds(&[10, 20]);
        assert!(filter(&fleet, "airport").is_empty());
    }

    #[test]
    fn test_compute_is_idempotent() {
        let snapshot = FleetSnapshot::new(
            4,
            vec![vehicle(1, 0, 10.0), vehicle(2, 25, 18.0), vehicle(3, 80, 70.0)],
        );
        let th = Thresholds::default();
        let first = DerivedMetrics::compute(&snapshot, &th);
        let second = DerivedMetrics::compute(&snapshot, &th);

        assert_eq!(first, second);
        assert_eq!(first.stats.total, 3);
        assert_eq!(first.stats.low_fuel, 2);
        assert_eq!(first.congestion.slow, 2);
        assert_eq!(first.congestion.level, CongestionLevel::High);
        assert!(first.has_alerts());
    }
}
