//! Fleet state generator.
//!
//! Builds the initial fleet and derives each next snapshot from the previous
//! one with bounded random-walk deltas:
//!
//! - **Position** moves by a symmetric uniform delta of at most half the
//!   configured jitter on each axis.
//! - **Speed** moves by `floor((r - 0.5) * speed_jitter)` and is clamped to
//!   `0..=max_speed`, never above [`SPEED_LIMIT`].
//! - **Fuel** only ever drops, by up to `moving_fuel_burn` when the new speed is
//!   non-zero and by up to `idle_fuel_burn` otherwise, and never below zero.
//!
//! Draws are taken per vehicle in the order latitude, longitude, speed, fuel,
//! so a scripted [`RandomSource`](crate::random::RandomSource) can pin any of
//! them.

use tracing::trace;

use crate::config::{GeneratorConfig, SPEED_LIMIT};
use crate::fleet::FleetSnapshot;
use crate::random::RandomSource;
use crate::vehicle::{Position, VehicleId, VehicleRecord, Zone};

/// Upper fuel bound in percent.
const MAX_FUEL: f64 = 100.0;

/// Produces fleet snapshots from a [`GeneratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct FleetGenerator {
    config: GeneratorConfig,
}

impl FleetGenerator {
    /// Create a generator with the given random-walk parameters.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// The random-walk parameters.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build the initial fleet of `count` vehicles with ids `1..=count`.
    #[must_use]
    pub fn initialize<R: RandomSource + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> FleetSnapshot {
        let cfg = &self.config;
        let top_speed = self.top_speed();
        let vehicles = (0..count)
            .zip(1..=VehicleId::MAX)
            .map(|(index, id)| {
                let lat = cfg.origin_lat + rng.next_unit() * cfg.spawn_span;
                let lng = cfg.origin_lng + rng.next_unit() * cfg.spawn_span;
                let speed = floor_to_u32(rng.next_unit() * f64::from(cfg.initial_speed_max));
                let fuel_level = (cfg.initial_fuel_min + rng.next_unit() * cfg.initial_fuel_span)
                    .floor()
                    .clamp(0.0, MAX_FUEL);
                VehicleRecord {
                    id,
                    position: Position::new(lat, lng),
                    speed: speed.min(top_speed),
                    fuel_level,
                    zone: Zone::for_index(index),
                }
            })
            .collect();

        FleetSnapshot::new(0, vehicles)
    }

    /// Derive the next snapshot. The input is left untouched.
    #[must_use]
    pub fn tick<R: RandomSource + ?Sized>(
        &self,
        fleet: &FleetSnapshot,
        rng: &mut R,
    ) -> FleetSnapshot {
        let vehicles = fleet
            .iter()
            .map(|vehicle| self.step_vehicle(vehicle, rng))
            .collect();
        FleetSnapshot::new(fleet.tick() + 1, vehicles)
    }

    fn top_speed(&self) -> u32 {
        self.config.max_speed.min(SPEED_LIMIT)
    }

    fn step_vehicle<R: RandomSource + ?Sized>(
        &self,
        vehicle: &VehicleRecord,
        rng: &mut R,
    ) -> VehicleRecord {
        let cfg = &self.config;

        let d_lat = (rng.next_unit() - 0.5) * cfg.position_jitter;
        let d_lng = (rng.next_unit() - 0.5) * cfg.position_jitter;

        #[allow(clippy::cast_possible_truncation)]
        let speed_delta = ((rng.next_unit() - 0.5) * f64::from(cfg.speed_jitter)).floor() as i64;
        let speed = clamp_speed(i64::from(vehicle.speed) + speed_delta, self.top_speed());

        let max_burn = if speed > 0 {
            cfg.moving_fuel_burn
        } else {
            cfg.idle_fuel_burn
        };
        let fuel_level = (vehicle.fuel_level - rng.next_unit() * max_burn).clamp(0.0, MAX_FUEL);

        trace!(id = vehicle.id, speed, fuel = fuel_level, "vehicle stepped");

        VehicleRecord {
            position: vehicle.position.offset(d_lat, d_lng),
            speed,
            fuel_level,
            ..vehicle.clone()
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor_to_u32(value: f64) -> u32 {
    value.floor().max(0.0) as u32
}

fn clamp_speed(speed: i64, max_speed: u32) -> u32 {
    u32::try_from(speed.clamp(0, i64::from(max_speed))).unwrap_or(max_speed)
}
