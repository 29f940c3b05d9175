// src/monitor/events.rs
// =============================================================================
// What the monitor tells the outside world.
//
// Events travel over a tokio broadcast channel: any number of listeners
// (the terminal printer, a test) can subscribe, and a listener that falls
// behind simply misses old events. Nothing is stored or replayed.
// =============================================================================

use serde::Serialize;

use crate::link::LinkStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Was online, now answers with a failure
    Offline,
    /// Was offline, now online again
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub link_name: String,
    pub link_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    Notification(Notification),
    /// The link list couldn't be read, so the whole pass was dropped
    PassFailed { reason: String },
}

// Decides whether a status change deserves a notification
//
// Only the online <-> offline edges count. Steady states, and anything
// going through error or pending, stay quiet.
pub fn transition(previous: LinkStatus, current: LinkStatus) -> Option<NotificationKind> {
    use LinkStatus::*;

    match (previous, current) {
        (Online, Offline) => Some(NotificationKind::Offline),
        (Offline, Online) => Some(NotificationKind::Recovered),
        (Online | Offline | Error | Pending, Online | Offline | Error | Pending) => None,
    }
}
