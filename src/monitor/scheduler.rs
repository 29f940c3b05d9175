// src/monitor/scheduler.rs
// =============================================================================
// Runs passes on a timer.
//
// States:
// - Idle: no timer
// - Running: one timer task ticking every `interval`
//
// start_monitoring(minutes) clamps the interval to 1..=60 minutes, runs a
// pass right away and then one every interval (measured from pass start).
// Calling it while Running swaps the old timer for a new one.
//
// stop_monitoring() only cancels the timer. A pass already under way keeps
// going until it is done, because every pass runs as its own task;
// wait_for_scheduled_pass() lets a caller that is about to exit wait for it.
//
// A scheduled tick that lands while the previous scheduled pass is still
// running is skipped rather than starting a second, overlapping pass.
// Manual checks (check_all_links) ignore all of this and always run.
// =============================================================================

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::events::MonitorEvent;
use super::pass::{MonitorError, PassRunner, PassSummary};
use crate::checker::Probe;
use crate::link::{Link, LinkId};
use crate::store::LinkStore;

pub const MIN_INTERVAL_MINUTES: u32 = 1;
pub const MAX_INTERVAL_MINUTES: u32 = 60;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub user_id: String,
    /// Pause between two links of the same pass
    pub link_delay: Duration,
}

// The running timer. Only start_monitoring / stop_monitoring touch it.
#[derive(Debug)]
pub struct SchedulerHandle {
    interval: Duration,
    timer: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn cancel(self) {
        self.timer.abort();
    }
}

pub struct Monitor<S, P> {
    runner: Arc<PassRunner<S, P>>,
    // true while a scheduled pass is running
    scheduled_in_flight: Arc<watch::Sender<bool>>,
    handle: Mutex<Option<SchedulerHandle>>,
}

// Keeps an interval inside 1..=60 minutes
pub fn clamp_interval(minutes: u32) -> u32 {
    minutes.clamp(MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES)
}

impl<S: LinkStore, P: Probe> Monitor<S, P> {
    pub fn new(store: Arc<S>, prober: Arc<P>, settings: MonitorSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Monitor {
            runner: Arc::new(PassRunner::new(
                store,
                prober,
                settings.user_id,
                settings.link_delay,
                events,
            )),
            scheduled_in_flight: Arc::new(watch::Sender::new(false)),
            handle: Mutex::new(None),
        }
    }

    // Listen for notifications and failed passes
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.runner.subscribe()
    }

    // Starts (or restarts) the recurring checks; returns the interval used
    //
    // Must be called from inside a tokio runtime.
    pub fn start_monitoring(&self, interval_minutes: u32) -> Duration {
        let minutes = clamp_interval(interval_minutes);
        if minutes != interval_minutes {
            warn!(
                requested = interval_minutes,
                used = minutes,
                "Monitoring interval must be between {} and {} minutes",
                MIN_INTERVAL_MINUTES,
                MAX_INTERVAL_MINUTES
            );
        }
        let interval = Duration::from_secs(u64::from(minutes) * 60);

        let mut slot = self.handle.lock();
        if let Some(previous) = slot.take() {
            info!(old_interval_secs = previous.interval.as_secs(), "Replacing running monitor timer");
            previous.cancel();
        }

        let timer = tokio::spawn(run_timer(
            Arc::clone(&self.runner),
            Arc::clone(&self.scheduled_in_flight),
            interval,
        ));
        *slot = Some(SchedulerHandle { interval, timer });

        info!(interval_minutes = minutes, "Monitoring started");
        interval
    }

    // Cancels the recurring checks. Returns false when nothing was running.
    pub fn stop_monitoring(&self) -> bool {
        match self.handle.lock().take() {
            Some(handle) => {
                handle.cancel();
                info!("Monitoring stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.handle.lock().is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.handle.lock().as_ref().map(SchedulerHandle::interval)
    }

    // One pass right now, whatever the scheduler is doing
    pub async fn check_all_links(&self) -> Result<PassSummary, MonitorError> {
        self.runner.run().await
    }

    // Checks one of the user's links right now and returns it as saved
    pub async fn check_link(&self, link_id: LinkId) -> Result<Link, MonitorError> {
        self.runner.check_link(link_id).await
    }

    // Resolves once no scheduled pass is running (immediately if none is)
    pub async fn wait_for_scheduled_pass(&self) {
        let mut busy = self.scheduled_in_flight.subscribe();
        // The sender lives in self, so this can't fail
        let _ = busy.wait_for(|running| !*running).await;
    }
}

impl<S, P> Drop for Monitor<S, P> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.cancel();
        }
    }
}

async fn run_timer<S: LinkStore, P: Probe>(
    runner: Arc<PassRunner<S, P>>,
    in_flight: Arc<watch::Sender<bool>>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        // The first tick completes immediately
        ticker.tick().await;

        if in_flight.send_replace(true) {
            debug!("Previous scheduled pass still running, skipping this tick");
            continue;
        }

        let runner = Arc::clone(&runner);
        let guard = InFlight(Arc::clone(&in_flight));
        tokio::spawn(async move {
            let _guard = guard;
            // Failures are already logged and broadcast by the pass
            let _ = runner.run().await;
        });
    }
}

// Clears the in-flight flag when the pass task ends, even by panic
struct InFlight(Arc<watch::Sender<bool>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}
