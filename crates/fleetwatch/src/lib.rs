//! `fleetwatch` - Simulated fleet telemetry and traffic monitoring
//!
//! This library generates a synthetic fleet of vehicles, advances it on a
//! timer, and derives the aggregates, congestion estimate and maintenance
//! alerts a traffic dashboard shows for each snapshot.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fleet;
pub mod generator;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod random;
pub mod render;
pub mod simulation;
pub mod vehicle;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use dashboard::{DashboardView, SystemStatus};
pub use error::{Error, Result};
pub use fleet::FleetSnapshot;
pub use generator::FleetGenerator;
pub use logging::init_logging;
pub use metrics::{Alert, CongestionLevel, DerivedMetrics, FleetStats};
pub use monitor::{FleetMonitor, MonitorConfig, MonitorEvent, MonitorHandle};
pub use random::{RandomSource, SequenceRandom, SimRng};
pub use simulation::Simulation;
pub use vehicle::{Position, VehicleId, VehicleRecord, VehicleStatus, Zone};
