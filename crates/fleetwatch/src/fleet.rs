//! Fleet snapshots.

use serde::Serialize;

use crate::vehicle::VehicleRecord;

/// An immutable collection of vehicle records at one instant.
///
/// Snapshots are never edited. Each tick produces a fresh one and the owner
/// swaps it in whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSnapshot {
    tick: u64,
    vehicles: Vec<VehicleRecord>,
}

impl FleetSnapshot {
    /// Wrap a set of records produced at `tick`.
    #[must_use]
    pub fn new(tick: u64, vehicles: Vec<VehicleRecord>) -> Self {
        Self { tick, vehicles }
    }

    /// An empty fleet at tick zero.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    /// Number of ticks applied since initialization.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The records, in fleet order.
    #[must_use]
    pub fn vehicles(&self) -> &[VehicleRecord] {
        &self.vehicles
    }

    /// Iterate the records in fleet order.
    pub fn iter(&self) -> std::slice::Iter<'_, VehicleRecord> {
        self.vehicles.iter()
    }

    /// Number of vehicles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether the fleet has no vehicles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

impl<'a> IntoIterator for &'a FleetSnapshot {
    type Item = &'a VehicleRecord;
    type IntoIter = std::slice::Iter<'a, VehicleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
