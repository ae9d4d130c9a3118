//! Background beacon timers.
//!
//! Two timers drive the shared [`BeaconSignal`]:
//! - the period timer raises it every `beacon.interval_secs`
//! - the duration timer clears it `beacon.duration_secs` after the control
//!   loop enters `Beacon`
//!
//! Neither timer touches GPIO. Both watch the shutdown channel at every
//! sleep so they end with the control loop.

use crate::config::BeaconConfig;
use repeater_core::BeaconSignal;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Spawn the period timer.
///
/// The first beacon comes due one full `period` after spawning. A period
/// too large to schedule logs an error and ends the task without raising.
pub fn spawn_period_task(
    signal: BeaconSignal,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if *shutdown.borrow() {
            return;
        }

        let Some(first) = Instant::now().checked_add(period) else {
            tracing::error!(
                "Beacon interval {}s is out of range; beacon disabled",
                period.as_secs()
            );
            return;
        };

        tracing::info!("Beacon timer started (interval: {}s)", period.as_secs());

        let mut timer = interval_at(first, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    signal.raise();
                    tracing::debug!("Beacon due");
                }
                _ = shutdown.changed() => {
                    tracing::debug!("Beacon timer stopped");
                    return;
                }
            }
        }
    })
}

/// Spawn a one-shot duration timer that clears the beacon flag.
pub fn spawn_duration_timer(
    signal: BeaconSignal,
    duration: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {
                signal.clear();
                tracing::debug!("Beacon finished after {}s", duration.as_secs());
            }
            _ = shutdown.changed() => {}
        }
    })
}

/// Owns the beacon timers for one controller run.
#[derive(Debug)]
pub struct BeaconScheduler {
    signal: BeaconSignal,
    config: BeaconConfig,
    shutdown: watch::Receiver<bool>,
    period: Option<JoinHandle<()>>,
    duration: Option<JoinHandle<()>>,
}

impl BeaconScheduler {
    /// Create a scheduler. Nothing runs until [`start`](Self::start).
    pub fn new(
        signal: BeaconSignal,
        config: BeaconConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            signal,
            config,
            shutdown,
            period: None,
            duration: None,
        }
    }

    /// Start the period timer, unless beacons are disabled.
    pub fn start(&mut self) {
        if !self.config.enabled {
            tracing::info!("Beacon disabled");
            return;
        }

        if self.period.is_none() {
            self.period = Some(spawn_period_task(
                self.signal.clone(),
                self.config.interval(),
                self.shutdown.clone(),
            ));
        }
    }

    /// Start a fresh duration timer, replacing any still running.
    ///
    /// Called by the control loop on the cycle it enters `Beacon`.
    pub fn start_duration_timer(&mut self) {
        if let Some(previous) = self.duration.take() {
            previous.abort();
        }

        self.duration = Some(spawn_duration_timer(
            self.signal.clone(),
            self.config.duration(),
            self.shutdown.clone(),
        ));
    }

    /// Whether the period timer is running.
    pub fn is_running(&self) -> bool {
        self.period.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop both timers and wait for them to exit.
    pub async fn stop(mut self) {
        for handle in [self.period.take(), self.duration.take()].into_iter().flatten() {
            handle.abort();
            match handle.await {
                Err(e) if e.is_panic() => tracing::error!("Beacon timer panicked: {}", e),
                _ => {}
            }
        }
    }
}
