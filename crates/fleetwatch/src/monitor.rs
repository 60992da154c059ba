//! Timer-driven fleet monitor.
//!
//! The monitor owns a [`Simulation`] and drives it from two periodic
//! triggers inside a single task:
//!
//! - the **fleet timer** advances the simulation and emits a fresh
//!   [`DashboardView`];
//! - the **clock timer** only emits the current display time and never
//!   touches fleet state.
//!
//! Every tick runs to completion before the next trigger is polled, so there
//! is nothing to drain on shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{mpsc, Notify};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::{Config, MapConfig, Thresholds};
use crate::dashboard::{DashboardView, SystemStatus};
use crate::error::Result;
use crate::random::RandomSource;
use crate::simulation::Simulation;

/// Errors that can occur while running the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A timer interval was zero.
    #[error("{name} must be greater than zero")]
    ZeroInterval {
        /// Which interval.
        name: &'static str,
    },
}

/// Something the monitor publishes to the presentation layer.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// A new fleet snapshot and its derived metrics.
    Fleet(Box<DashboardView>),
    /// A display clock update.
    Clock(DateTime<Utc>),
}

/// Timer configuration for the monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between fleet ticks.
    pub tick_interval: Duration,

    /// Interval between display clock updates.
    pub clock_interval: Duration,

    /// Stop after this many fleet ticks. Runs until stopped when `None`.
    pub max_ticks: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(3),
            clock_interval: Duration::from_secs(1),
            max_ticks: None,
        }
    }
}

impl MonitorConfig {
    /// Timer settings from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            clock_interval: config.clock_interval(),
            max_ticks: None,
        }
    }

    /// Set the tick limit.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

/// A handle to control a monitor from other tasks.
///
/// This is a lightweight, cloneable handle; all clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MonitorHandle {
    stop_signal: Arc<AtomicBool>,
    stop_notify: Arc<Notify>,
    running: Arc<AtomicBool>,
}

impl MonitorHandle {
    /// Create a new monitor handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the monitor to stop. A running loop wakes immediately rather
    /// than at its next timer.
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        self.stop_notify.notify_one();
    }

    /// Check if the stop signal has been sent.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }

    /// Reset the stop signal. Called at the start of every run.
    pub fn reset(&self) {
        self.stop_signal.store(false, Ordering::SeqCst);
    }

    /// Check if the monitor loop is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Marks a monitor as running for as long as it is alive, including when the
/// `run` future is dropped mid-flight.
struct RunningGuard(Arc<AtomicBool>);

impl RunningGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives a [`Simulation`] from periodic timers.
#[derive(Debug)]
pub struct FleetMonitor<R: RandomSource, C: Clock> {
    simulation: Simulation<R>,
    clock: C,
    config: MonitorConfig,
    thresholds: Thresholds,
    map: MapConfig,
    handle: MonitorHandle,
    latest: Option<DashboardView>,
}

impl<R: RandomSource, C: Clock> FleetMonitor<R, C> {
    /// Create a monitor around an initialized simulation.
    #[must_use]
    pub fn new(
        simulation: Simulation<R>,
        clock: C,
        config: MonitorConfig,
        thresholds: Thresholds,
        map: MapConfig,
    ) -> Self {
        Self {
            simulation,
            clock,
            config,
            thresholds,
            map,
            handle: MonitorHandle::new(),
            latest: None,
        }
    }

    /// A handle that can stop this monitor from another task.
    #[must_use]
    pub fn handle(&self) -> MonitorHandle {
        self.handle.clone()
    }

    /// The simulation being driven.
    #[must_use]
    pub fn simulation(&self) -> &Simulation<R> {
        &self.simulation
    }

    /// The most recently published view, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&DashboardView> {
        self.latest.as_ref()
    }

    /// Current system status.
    #[must_use]
    pub fn status(&self) -> SystemStatus {
        match &self.latest {
            Some(view) => SystemStatus::for_view(view, self.handle.is_running()),
            None if self.handle.is_running() => SystemStatus::Running,
            None => SystemStatus::Stopped,
        }
    }

    /// Run until stopped, the receiver is dropped, or the tick limit is hit.
    ///
    /// Publishes the initial view immediately, then one view per fleet tick
    /// and one clock reading per clock tick. Returns the number of fleet
    /// ticks applied.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ZeroInterval`] if an interval is zero.
    pub async fn run(&mut self, tx: mpsc::Sender<MonitorEvent>) -> Result<u64> {
        if self.config.tick_interval.is_zero() {
            return Err(MonitorError::ZeroInterval {
                name: "tick interval",
            }
            .into());
        }
        if self.config.clock_interval.is_zero() {
            return Err(MonitorError::ZeroInterval {
                name: "clock interval",
            }
            .into());
        }
        // A stop from a previous run must not end this one.
        self.handle.reset();
        let _running = RunningGuard::engage(&self.handle.running);

        info!(
            vehicles = self.simulation.snapshot().len(),
            tick_ms = self.config.tick_interval.as_millis(),
            clock_ms = self.config.clock_interval.as_millis(),
            "Starting fleet monitor"
        );

        let ticks = self.run_loop(&tx).await;

        info!(ticks, "Fleet monitor stopped");
        Ok(ticks)
    }

    async fn run_loop(&mut self, tx: &mpsc::Sender<MonitorEvent>) -> u64 {
        let tick_every = self.config.tick_interval;
        let mut fleet_timer = interval_at(Instant::now() + tick_every, tick_every);
        fleet_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut clock_timer = interval(self.config.clock_interval);
        clock_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let stop = Arc::clone(&self.handle.stop_notify);
        let mut ticks = 0u64;

        if !self.publish_view(tx).await {
            return ticks;
        }

        loop {
            if self.handle.should_stop() {
                debug!("Stop signal received");
                break;
            }
            if self.config.max_ticks.is_some_and(|max| ticks >= max) {
                debug!(ticks, "Tick limit reached");
                break;
            }

            tokio::select! {
                _ = fleet_timer.tick() => {
                    self.simulation.advance();
                    ticks += 1;
                    if !self.publish_view(tx).await {
                        break;
                    }
                }
                _ = clock_timer.tick() => {
                    let now = self.clock.now();
                    if tx.send(MonitorEvent::Clock(now)).await.is_err() {
                        debug!("Event channel closed, stopping monitor");
                        break;
                    }
                }
                () = tx.closed() => {
                    debug!("Event channel closed, stopping monitor");
                    break;
                }
                // The loop head sees the flag.
                () = stop.notified() => {}
            }
        }

        ticks
    }

    /// Build a view of the current snapshot and send it. Returns `false` once
    /// the receiver is gone.
    async fn publish_view(&mut self, tx: &mpsc::Sender<MonitorEvent>) -> bool {
        let view = DashboardView::build(
            self.simulation.snapshot(),
            &self.thresholds,
            &self.map,
            self.clock.now(),
        );

        let stats = view.metrics.stats;
        debug!(
            tick = view.tick,
            active = stats.active,
            average_speed = stats.average_speed,
            congestion = %view.metrics.congestion.level,
            alerts = view.metrics.alerts.len(),
            "Fleet view published"
        );
        let newly_alerting = view.metrics.has_alerts()
            && !self.latest.as_ref().is_some_and(|prev| prev.metrics.has_alerts());
        if newly_alerting {
            warn!(alerts = view.metrics.alerts.len(), "Maintenance alerts raised");
        }

        self.latest = Some(view.clone());
        if tx.send(MonitorEvent::Fleet(Box::new(view))).await.is_err() {
            debug!("Event channel closed, stopping monitor");
            return false;
        }
        true
    }
}
