// src/stats.rs
// =============================================================================
// Dashboard numbers folded out of a list of links.
//
// Everything here is a pure function: no I/O, no caching. The whole list is
// re-counted every time, which is cheap next to how often anyone looks.
//
// Average response time only counts links that are currently online and
// have a recorded time. Offline/error times measure how long it took to
// fail, which would drag the "how fast are my sites" number around.
// =============================================================================

use serde::Serialize;

use crate::link::{Company, Link, LinkStatus};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub online: usize,
    pub offline: usize,
    pub error: usize,
    pub pending: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.online + self.offline + self.error + self.pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_companies: usize,
    pub total_links: usize,
    pub online_links: usize,
    pub offline_links: usize,
    pub error_links: usize,
    pub pending_links: usize,
    /// Whole milliseconds
    pub average_response_time: u64,
    pub uptime_ratio: f64,
}

impl DashboardStats {
    pub fn compute(companies: &[Company], links: &[Link]) -> Self {
        let counts = count_by_status(links);
        DashboardStats {
            total_companies: companies.len(),
            total_links: links.len(),
            online_links: counts.online,
            offline_links: counts.offline,
            error_links: counts.error,
            pending_links: counts.pending,
            average_response_time: average_response_time(links).round() as u64,
            uptime_ratio: uptime_ratio(&counts),
        }
    }
}

// Puts every link into exactly one bucket
pub fn count_by_status(links: &[Link]) -> StatusCounts {
    links.iter().fold(StatusCounts::default(), |mut counts, link| {
        match link.status {
            LinkStatus::Online => counts.online += 1,
            LinkStatus::Offline => counts.offline += 1,
            LinkStatus::Error => counts.error += 1,
            LinkStatus::Pending => counts.pending += 1,
        }
        counts
    })
}

// Mean response time of online links that have one; 0.0 when none do
pub fn average_response_time(links: &[Link]) -> f64 {
    let times: Vec<u64> = links
        .iter()
        .filter(|l| l.status == LinkStatus::Online)
        .filter_map(|l| l.response_time)
        .collect();

    if times.is_empty() {
        return 0.0;
    }
    times.iter().sum::<u64>() as f64 / times.len() as f64
}

// Share of links that are online, in 0.0..=1.0
pub fn uptime_ratio(counts: &StatusCounts) -> f64 {
    match counts.total() {
        0 => 0.0,
        total => counts.online as f64 / total as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn link(status: LinkStatus, response_time: Option<u64>) -> Link {
        Link {
            id: Uuid::new_v4(),
            url: "https://example.com/".to_string(),
            name: "example".to_string(),
            description: None,
            company_id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            status,
            response_time,
            last_checked: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_counts_and_uptime() {
        let links = vec![
            link(LinkStatus::Online, Some(100)),
            link(LinkStatus::Online, Some(200)),
            link(LinkStatus::Offline, Some(50)),
            link(LinkStatus::Error, None),
            link(LinkStatus::Pending, None),
        ];

        let counts = count_by_status(&links);
        assert_eq!(
            counts,
            StatusCounts {
                online: 2,
                offline: 1,
                error: 1,
                pending: 1
            }
        );
        assert!((uptime_ratio(&counts) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_ignores_links_that_are_not_online() {
        let links = vec![
            link(LinkStatus::Online, Some(100)),
            link(LinkStatus::Online, Some(301)),
            link(LinkStatus::Online, None),
            link(LinkStatus::Offline, Some(9_000)),
            link(LinkStatus::Error, Some(10_000)),
        ];
        assert!((average_response_time(&links) - 200.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_collection() {
        let counts = count_by_status(&[]);
        assert_eq!(counts.total(), 0);
        assert_eq!(uptime_ratio(&counts), 0.0);
        assert_eq!(average_response_time(&[]), 0.0);
    }

    #[test]
    fn test_dashboard_stats() {
        let company = Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            description: None,
            user_id: "alice".to_string(),
            created_at: Utc::now(),
        };
        let links = vec![
            link(LinkStatus::Online, Some(100)),
            link(LinkStatus::Online, Some(301)),
            link(LinkStatus::Pending, None),
            link(LinkStatus::Offline, Some(12)),
        ];

        let stats = DashboardStats::compute(&[company], &links);

        assert_eq!(stats.total_companies, 1);
        assert_eq!(stats.total_links, 4);
        assert_eq!(stats.online_links, 2);
        assert_eq!(stats.pending_links, 1);
        assert_eq!(stats.average_response_time, 201);
        assert!((stats.uptime_ratio - 0.5).abs() < f64::EPSILON);
    }
}
