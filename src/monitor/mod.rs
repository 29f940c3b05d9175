// src/monitor/mod.rs
// =============================================================================
// This module keeps links under watch.
//
// Submodules:
// - pass: one sweep over all of a user's links
// - scheduler: start / stop / restart the recurring sweeps
// - events: notifications sent to whoever is listening
//
// Typical use:
//   let monitor = Monitor::new(store, prober, settings);
//   let mut events = monitor.subscribe();
//   monitor.start_monitoring(5);
//   while let Ok(event) = events.recv().await { ... }
// =============================================================================

mod events;
mod pass;
mod scheduler;

pub use events::{transition, MonitorEvent, Notification, NotificationKind};
pub use pass::{MonitorError, PassSummary, DEFAULT_LINK_DELAY};
pub use scheduler::{
    clamp_interval, Monitor, MonitorSettings, SchedulerHandle, MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES,
};
