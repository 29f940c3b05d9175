// src/monitor/pass.rs
// =============================================================================
// One monitoring pass: probe every link a user owns, one after another.
// A single link can also be checked on its own with the same steps (2a-d).
//
// How it works:
// 1. Read all of the user's links in one go (if this fails, the pass is over)
// 2. For each link, in the order the store returned them:
//    a. remember the status it had before this pass
//    b. probe its URL
//    c. write status / response time / check time back to the store
//    d. notify if it went online -> offline or offline -> online
//    e. wait a little before the next link
// 3. A link whose write fails is logged and skipped; the pass goes on
//
// Politeness:
// - Links are checked sequentially with a fixed pause in between, so a
//   pass never fires a burst of requests at the network or at the hosts
// =============================================================================

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::events::{transition, MonitorEvent, Notification, NotificationKind};
use crate::checker::Probe;
use crate::link::{Link, LinkId, StatusUpdate};
use crate::store::{LinkStore, StoreError};

pub const DEFAULT_LINK_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("could not load links: {0}")]
    FetchLinks(#[source] StoreError),
    #[error("could not load link: {0}")]
    FetchLink(#[source] StoreError),
    #[error("could not save check result: {0}")]
    SaveResult(#[source] StoreError),
}

// What a finished pass did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    /// Links probed and written back
    pub checked: usize,
    /// Links probed but whose result could not be saved
    pub write_failures: usize,
    pub notifications: usize,
}

pub(crate) struct PassRunner<S, P> {
    store: Arc<S>,
    prober: Arc<P>,
    user_id: String,
    link_delay: Duration,
    events: broadcast::Sender<MonitorEvent>,
}

impl<S: LinkStore, P: Probe> PassRunner<S, P> {
    pub(crate) fn new(
        store: Arc<S>,
        prober: Arc<P>,
        user_id: String,
        link_delay: Duration,
        events: broadcast::Sender<MonitorEvent>,
    ) -> Self {
        PassRunner {
            store,
            prober,
            user_id,
            link_delay,
            events,
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub(crate) async fn run(&self) -> Result<PassSummary, MonitorError> {
        let links = match self.store.list_links(&self.user_id).await {
            Ok(links) => links,
            Err(e) => {
                error!(user_id = %self.user_id, error = %e, "Could not load links, skipping this pass");
                self.emit(MonitorEvent::PassFailed {
                    reason: e.to_string(),
                });
                return Err(MonitorError::FetchLinks(e));
            }
        };

        info!(user_id = %self.user_id, links = links.len(), "Checking all links");
        let mut summary = PassSummary::default();

        for (index, link) in links.iter().enumerate() {
            if index > 0 && !self.link_delay.is_zero() {
                tokio::time::sleep(self.link_delay).await;
            }

            match self.check_one(link).await {
                Ok((_, notified)) => {
                    summary.checked += 1;
                    if notified {
                        summary.notifications += 1;
                    }
                }
                Err(e) => {
                    warn!(link_id = %link.id, url = %link.url, error = %e, "Could not save check result");
                    summary.write_failures += 1;
                }
            }
        }

        info!(
            checked = summary.checked,
            write_failures = summary.write_failures,
            notifications = summary.notifications,
            "Finished checking all links"
        );
        Ok(summary)
    }

    // Checks a single link outside of any pass
    pub(crate) async fn check_link(&self, link_id: LinkId) -> Result<Link, MonitorError> {
        let link = self
            .store
            .find_link(&self.user_id, link_id)
            .await
            .map_err(MonitorError::FetchLink)?;
        let (updated, _) = self.check_one(&link).await.map_err(MonitorError::SaveResult)?;
        Ok(updated)
    }

    // Probes one link, saves the result and notifies on a transition.
    // Returns the saved link and whether a notification went out.
    async fn check_one(&self, link: &Link) -> Result<(Link, bool), StoreError> {
        // The status as fetched before the check, not re-read
        let previous = link.status;
        let result = self.prober.probe(&link.url).await;

        let update = StatusUpdate {
            status: result.status,
            response_time: Some(result.response_time_ms),
            last_checked: Utc::now(),
        };
        let saved = self.store.update_link_status(link.id, update).await?;

        debug!(
            link_id = %link.id,
            %previous,
            current = %result.status,
            response_time_ms = result.response_time_ms,
            "Link checked"
        );

        let Some(kind) = transition(previous, result.status) else {
            return Ok((saved, false));
        };
        match kind {
            NotificationKind::Offline => warn!(name = %link.name, url = %link.url, "Link went offline"),
            NotificationKind::Recovered => info!(name = %link.name, url = %link.url, "Link is back online"),
        }
        self.emit(MonitorEvent::Notification(Notification {
            kind,
            link_name: link.name.clone(),
            link_url: link.url.clone(),
        }));
        Ok((saved, true))
    }

    // Best effort: having no subscribers is fine
    fn emit(&self, event: MonitorEvent) {
        if self.events.send(event).is_err() {
            debug!("No one is listening for monitor events");
        }
    }
}
