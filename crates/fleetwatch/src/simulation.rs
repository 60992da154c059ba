//! Owned simulation state.
//!
//! A [`Simulation`] is the single owner of the current fleet snapshot. Each
//! [`advance`](Simulation::advance) asks the generator for the next snapshot and
//! swaps it in whole; nothing else holds a mutable reference to the fleet.

use tracing::debug;

use crate::config::Config;
use crate::fleet::FleetSnapshot;
use crate::generator::FleetGenerator;
use crate::random::{RandomSource, SimRng};

/// The generator, its random source and the current snapshot.
#[derive(Debug)]
pub struct Simulation<R: RandomSource = SimRng> {
    generator: FleetGenerator,
    rng: R,
    current: FleetSnapshot,
}

impl Simulation<SimRng> {
    /// Build a simulation from loaded configuration.
    ///
    /// Uses the configured seed when present, otherwise entropy.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FleetGenerator::new(config.generator.clone()),
            config.simulation.fleet_size,
            SimRng::from_optional_seed(config.simulation.seed),
        )
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Create a simulation with a fleet of `fleet_size` vehicles.
    #[must_use]
    pub fn new(generator: FleetGenerator, fleet_size: usize, mut rng: R) -> Self {
        let current = generator.initialize(fleet_size, &mut rng);
        debug!(vehicles = current.len(), "Fleet initialized");
        Self {
            generator,
            rng,
            current,
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &FleetSnapshot {
        &self.current
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.current.tick()
    }

    /// Apply one tick and return the new snapshot.
    pub fn advance(&mut self) -> &FleetSnapshot {
        let next = self.generator.tick(&self.current, &mut self.rng);
        self.current = next;
        debug!(tick = self.current.tick(), "Fleet advanced");
        &self.current
    }

    /// Apply `ticks` ticks and return the resulting snapshot.
    pub fn advance_by(&mut self, ticks: u64) -> &FleetSnapshot {
        for _ in 0..ticks {
            self.advance();
        }
        &self.current
    }
}
