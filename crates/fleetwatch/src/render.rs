//! Terminal and JSON rendering of a [`DashboardView`].

use std::fmt;
use std::io::{self, Write as _};

use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::dashboard::{DashboardView, SystemStatus, VehicleRow};
use crate::error::Result;
use crate::metrics::{DerivedMetrics, FleetStats};

/// Dashboard title.
pub const TITLE: &str = "Smart Traffic & Fleet Monitoring";

/// Output format for dashboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text dashboard
    #[default]
    Plain,
    /// JSON, one document per view
    Json,
}

/// JSON payload: the view with the fleet table narrowed to the query.
#[derive(Debug, Serialize)]
struct FilteredView<'a> {
    status: SystemStatus,
    tick: u64,
    generated_at: DateTime<Utc>,
    query: &'a str,
    metrics: &'a DerivedMetrics,
    vehicles: Vec<&'a VehicleRow>,
}

/// Render a view as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn json(view: &DashboardView, status: SystemStatus, query: &str) -> Result<String> {
    let payload = FilteredView {
        status,
        tick: view.tick,
        generated_at: view.generated_at,
        query,
        metrics: &view.metrics,
        vehicles: view.filtered(query),
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Render a view as a plain-text dashboard.
///
/// `clock` is the latest display-clock reading; the view's own timestamp is
/// used when absent.
#[must_use]
pub fn plain(
    view: &DashboardView,
    status: SystemStatus,
    query: &str,
    clock: Option<DateTime<Utc>>,
) -> String {
    PlainDashboard {
        view,
        status,
        query,
        clock,
    }
    .to_string()
}

/// Render a view in `format` and write it to `out`, followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write<W: io::Write>(
    out: &mut W,
    view: &DashboardView,
    status: SystemStatus,
    query: &str,
    format: OutputFormat,
    clock: Option<DateTime<Utc>>,
) -> Result<()> {
    let text = match format {
        OutputFormat::Plain => plain(view, status, query, clock),
        OutputFormat::Json => json(view, status, query)?,
    };
    writeln!(out, "{text}")?;
    out.flush()?;
    Ok(())
}

struct PlainDashboard<'a> {
    view: &'a DashboardView,
    status: SystemStatus,
    query: &'a str,
    clock: Option<DateTime<Utc>>,
}

impl fmt::Display for PlainDashboard<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            view,
            status,
            query,
            clock,
        } = *self;
        let now = clock.unwrap_or(view.generated_at).with_timezone(&Local);
        let metrics = &view.metrics;
        let FleetStats {
            total,
            active,
            low_fuel,
            average_speed,
        } = metrics.stats;
        let congestion = metrics.congestion;

        writeln!(out, "{TITLE}  [{status}]  {}", now.format("%Y-%m-%d | %H:%M:%S"))?;
        writeln!(out, "{}", "=".repeat(TITLE.len()))?;
        writeln!(out, "Tick {}", view.tick)?;
        writeln!(out)?;

        writeln!(out, "Total Vehicles: {total:>4}   ({active} active)")?;
        writeln!(out, "Average Speed:  {average_speed:>4} km/h")?;
        writeln!(
            out,
            "Low Fuel:       {low_fuel:>4}   ({})",
            if low_fuel > 0 { "Refuel needed" } else { "All good" }
        )?;
        writeln!(
            out,
            "Congestion:     {:>6} ({}% slow/stopped)",
            congestion.level.to_string(),
            congestion.percent
        )?;
        writeln!(out)?;

        writeln!(out, "[Traffic Insights]")?;
        writeln!(
            out,
            "  Congestion Level: {} ({}% of vehicles slow)",
            congestion.level, congestion.percent
        )?;
        writeln!(out, "  ETA Risk:         {}", congestion.level.eta_risk())?;
        writeln!(
            out,
            "  Suggested Action: {}",
            congestion.level.suggested_action()
        )?;
        writeln!(out)?;

        writeln!(out, "[Maintenance Alerts]")?;
        if metrics.alerts.is_empty() {
            writeln!(out, "  No maintenance alerts right now.")?;
        } else {
            writeln!(out, "  {:<8} {:<18} {:>5} {:>10}", "Vehicle", "Reason", "Fuel", "Speed")?;
            for alert in &metrics.alerts {
                writeln!(
                    out,
                    "  {:<8} {:<18} {:>4}% {:>5} km/h",
                    format!("V{}", alert.id),
                    alert.label,
                    alert.fuel,
                    alert.speed
                )?;
            }
        }
        writeln!(out)?;

        let rows = view.filtered(query);
        if query.is_empty() {
            writeln!(out, "[Fleet Details]")?;
        } else {
            writeln!(
                out,
                "[Fleet Details] {} of {} matching \"{query}\"",
                rows.len(),
                view.vehicles.len()
            )?;
        }
        writeln!(
            out,
            "  {:<6} {:<16} {:>6} {:>5} {:>9} {:>9}  {}",
            "ID", "Location", "Speed", "Fuel", "Lat", "Lng", "Status"
        )?;
        for row in rows {
            let v = &row.vehicle;
            writeln!(
                out,
                "  {:<6} {:<16} {:>6} {:>5} {:>9.4} {:>9.4}  {}",
                format!("V{}", v.id),
                v.zone.label(),
                v.speed,
                v.fuel_percent(),
                v.position.lat,
                v.position.lng,
                row.status
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapConfig, Thresholds};
    use crate::fleet::FleetSnapshot;
    use crate::vehicle::{Position, VehicleRecord, Zone};
    use chrono::TimeZone;

    fn view() -> DashboardView {
        let vehicles = vec![
            VehicleRecord {
                id: 1,
                position: Position::new(17.40, 78.50),
                speed: 0,
                fuel_level: 10.2,
                zone: Zone::Highway,
            },
            VehicleRecord {
                id: 2,
                position: Position::new(17.41, 78.51),
                speed: 64,
                fuel_level: 77.0,
                zone: Zone::CityCenter,
            },
        ];
        DashboardView::build(
            &FleetSnapshot::new(2, vehicles),
            &Thresholds::default(),
            &MapConfig::default(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_plain_sections() {
        let text = plain(&view(), SystemStatus::Warning, "", None);

        assert!(text.starts_with(TITLE));
        assert!(text.contains("[Warning]"));
        assert!(text.contains("Tick 2"));
        assert!(text.contains("(1 active)"));
        assert!(text.contains("Average Speed:    32 km/h"));
        assert!(text.contains("Refuel needed"));
        assert!(text.contains("Low Fuel (<15%)"));
        assert!(text.contains("Congestion:     Medium (50% slow/stopped)"));
        assert!(text.contains("ETA Risk:         Monitor ETAs"));
        assert!(text.contains("City Center"));
        assert!(text.contains("17.4000"));
    }

    #[test]
    fn test_plain_filter() {
        let text = plain(&view(), SystemStatus::Running, "city", None);
        assert!(text.contains("1 of 2 matching \"city\""));
        assert!(text.contains("City Center"));
        assert!(!text.contains("Highway"));
    }

    #[test]
    fn test_plain_no_alerts() {
        let empty = DashboardView::build(
            &FleetSnapshot::empty(),
            &Thresholds::default(),
            &MapConfig::default(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        );
        let text = plain(&empty, SystemStatus::Running, "", None);
        assert!(text.contains("No maintenance alerts right now."));
        assert!(text.contains("All good"));
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_write_plain_ends_with_newline() {
        let mut out = Vec::new();
        write(&mut out, &view(), SystemStatus::Running, "", OutputFormat::Plain, None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(TITLE));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_write_json_is_one_document() {
        let mut out = Vec::new();
        write(&mut out, &view(), SystemStatus::Warning, "", OutputFormat::Json, None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["status"], "warning");
    }

    #[test]
    fn test_write_reports_io_failure() {
        struct Closed;
        impl io::Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let result = write(&mut Closed, &view(), SystemStatus::Running, "", OutputFormat::Plain, None);
        assert!(matches!(result, Err(crate::error::Error::Io(_))));
    }

    #[test]
    fn test_json_filtered() {
        let out = json(&view(), SystemStatus::Running, "2").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["status"], "running");
        assert_eq!(value["tick"], 2);
        assert_eq!(value["query"], "2");
        assert_eq!(value["vehicles"].as_array().unwrap().len(), 1);
        assert_eq!(value["vehicles"][0]["id"], 2);
        assert_eq!(value["metrics"]["stats"]["total"], 2);
        assert_eq!(value["metrics"]["alerts"][0]["reason"], "low_fuel");
    }
}
