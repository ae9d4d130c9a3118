//! The control loop.
//!
//! [`Controller`] owns the GPIO port, the state machine and the tail hold.
//! Each tick it:
//!
//! 1. samples both receivers
//! 2. advances the state machine with the beacon flag
//! 3. derives the transmit intents
//! 4. starts the beacon duration timer if `Beacon` was just entered
//! 5. drives the local transmitter through the tail hold
//! 6. drives the remote transmitter directly
//! 7. prints the status line
//!
//! Any GPIO failure stops the loop. Guessing a receiver is idle after a
//! failed read could key a transmitter nobody asked for.

use crate::beacon::BeaconScheduler;
use crate::config::{BeaconConfig, Config};
use crate::error::Result;
use crate::status::StatusLine;
use repeater_core::{
    BeaconSignal, Line, Polarity, ReceiveSnapshot, RepeaterState, TailHold, TransmitIntent,
};
use repeater_gpio::{PinMode, Port, Pull};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Everything that happened in one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    /// Receive activity sampled at the start of the cycle.
    pub rx: ReceiveSnapshot,
    /// State before the cycle.
    pub previous: RepeaterState,
    /// State after the cycle.
    pub state: RepeaterState,
    /// Logical transmit intents for `state`.
    pub intent: TransmitIntent,
    /// Local transmitter as driven (after tail hold).
    pub local_tx: bool,
    /// Remote transmitter as driven.
    pub remote_tx: bool,
    /// Beacon flag as seen by the state machine.
    pub beacon_due: bool,
    /// This cycle moved the machine into `Beacon`.
    pub beacon_entered: bool,
}

/// Repeater controller bound to a GPIO port.
#[derive(Debug)]
pub struct Controller<P: Port> {
    port: P,
    state: RepeaterState,
    tail: TailHold,
    signal: BeaconSignal,
    rx_polarity: Polarity,
    tx_polarity: Polarity,
    poll_interval: Duration,
    beacon: BeaconConfig,
    status_enabled: bool,
}

impl<P: Port> Controller<P> {
    /// Configure all four lines and return a controller in `Init`.
    ///
    /// # Errors
    ///
    /// Fails on the first line that cannot be configured. The controller
    /// never runs with a partially configured port.
    pub fn new(mut port: P, config: &Config) -> Result<Self> {
        let rx_polarity = config.polarity.rx;
        let tx_polarity = config.polarity.tx;

        // Pull inputs towards their idle level
        let rx_pull = match rx_polarity {
            Polarity::ActiveLow => Pull::Up,
            Polarity::ActiveHigh => Pull::Down,
        };

        tracing::info!("GPIO configuration");
        for line in Line::ALL {
            if line.is_input() {
                port.configure(line, PinMode::Input, rx_pull, false)?;
            } else {
                port.configure(line, PinMode::Output, Pull::None, tx_polarity.level(false))?;
            }
        }

        Ok(Self {
            port,
            state: RepeaterState::Init,
            tail: TailHold::new(config.timing.tail_hold()),
            signal: BeaconSignal::new(),
            rx_polarity,
            tx_polarity,
            poll_interval: config.timing.poll_interval(),
            beacon: config.beacon,
            status_enabled: config.status.enabled,
        })
    }

    /// Current state.
    pub fn state(&self) -> RepeaterState {
        self.state
    }

    /// Handle to the beacon flag this controller reads.
    pub fn beacon_signal(&self) -> BeaconSignal {
        self.signal.clone()
    }

    /// The underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Run one control cycle at time `now`.
    ///
    /// Does not start the beacon duration timer; the caller does that when
    /// [`Cycle::beacon_entered`] is set.
    pub fn tick(&mut self, now: Instant) -> Result<Cycle> {
        let rx = self.sample()?;
        let beacon_due = self.signal.is_due();

        let previous = self.state;
        self.state = previous.advance(rx, beacon_due);
        let intent = self.state.outputs();
        let beacon_entered = RepeaterState::entered_beacon(previous, self.state);

        if previous != self.state {
            tracing::info!("State: {} -> {}", previous, self.state);
        }

        let local_tx = self.tail.apply(intent.local, now);
        self.drive(Line::LocalTx, local_tx)?;
        self.drive(Line::RemoteTx, intent.remote)?;

        tracing::trace!(
            "rx={:?} beacon_due={} intent={:?} local_tx={} remote_tx={}",
            rx,
            beacon_due,
            intent,
            local_tx,
            intent.remote
        );

        Ok(Cycle {
            rx,
            previous,
            state: self.state,
            intent,
            local_tx,
            remote_tx: intent.remote,
            beacon_due,
            beacon_entered,
        })
    }

    /// Unkey both transmitters immediately, skipping the tail hold.
    pub fn release(&mut self) -> Result<()> {
        self.tail.release();
        self.drive(Line::LocalTx, false)?;
        self.drive(Line::RemoteTx, false)?;
        Ok(())
    }

    /// Run the control loop until `shutdown` flips or a GPIO error occurs.
    ///
    /// The beacon timers live exactly as long as this call. On the way out
    /// both transmitters are unkeyed.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut beacon =
            BeaconScheduler::new(self.signal.clone(), self.beacon, shutdown.clone());
        beacon.start();

        let status = self
            .status_enabled
            .then(|| StatusLine::new(tokio::time::Instant::now().into_std()));

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Repeater running (poll: {}ms, tail: {}ms)",
            self.poll_interval.as_millis(),
            self.tail.hold().as_millis()
        );

        let result = loop {
            if *shutdown.borrow() {
                break Ok(());
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break Ok(()),
            }

            let now = tokio::time::Instant::now().into_std();
            match self.tick(now) {
                Ok(cycle) => {
                    if cycle.beacon_entered {
                        beacon.start_duration_timer();
                    }
                    if let Some(status) = &status {
                        status.print(now, &cycle);
                    }
                }
                Err(e) => {
                    tracing::error!("Control loop stopped: {}", e);
                    break Err(e);
                }
            }
        };

        beacon.stop().await;

        match self.release() {
            Ok(()) => {
                tracing::info!("Transmitters released");
                result
            }
            Err(e) => {
                tracing::error!("Failed to release transmitters: {}", e);
                result.and(Err(e))
            }
        }
    }

    /// Read both receivers and apply the input polarity.
    fn sample(&self) -> Result<ReceiveSnapshot> {
        let local = self.port.read(Line::LocalRx)?;
        let remote = self.port.read(Line::RemoteRx)?;
        Ok(ReceiveSnapshot::new(
            self.rx_polarity.is_active(local),
            self.rx_polarity.is_active(remote),
        ))
    }

    /// Drive an output, skipping the write if it already reads back right.
    fn drive(&mut self, line: Line, active: bool) -> Result<()> {
        let level = self.tx_polarity.level(active);
        if self.port.read(line)? != level {
            self.port.write(line, level)?;
        }
        Ok(())
    }
}
