// src/link.rs
// =============================================================================
// The data model: links, the companies that group them, and the status
// fields the monitor writes back after every check.
//
// Also holds the small URL helpers used when a link is created or shown:
// - normalize_url: adds http:// when the user typed "example.com"
// - validate_url: only http:// and https:// are accepted
// - format_url_for_display / format_duration: for the terminal output
//
// Rust concepts:
// - Enums: LinkStatus is a closed set, so `match` must cover every case
// - serde: The same structs are written to the JSON store and --json output
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

pub type LinkId = Uuid;
pub type CompanyId = Uuid;

// The reachability of a link as last recorded
//
// "checking" is only ever shown while a probe is running, it is never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    /// Never checked yet
    #[default]
    Pending,
    /// Answered with a success response
    Online,
    /// Answered, but with a failure response
    Offline,
    /// No answer at all (timeout, DNS, connection refused...)
    Error,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Pending => "pending",
            LinkStatus::Online => "online",
            LinkStatus::Offline => "offline",
            LinkStatus::Error => "error",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub url: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub company_id: CompanyId,
    pub user_id: String,
    #[serde(default)]
    pub status: LinkStatus,
    /// Milliseconds taken by the last check
    #[serde(default)]
    pub response_time: Option<u64>,
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// What a user supplies when registering a link
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user_id: String,
    pub company_id: CompanyId,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
}

// The field group written after every check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: LinkStatus,
    pub response_time: Option<u64>,
    pub last_checked: DateTime<Utc>,
}

// A user edit to an existing link; `None` leaves the field as it is.
//
// An empty description clears it. Status fields can't be edited, they
// belong to the monitor.
#[derive(Debug, Clone, Default)]
pub struct LinkEdit {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub company_id: Option<CompanyId>,
}

#[derive(Debug, Clone, Default)]
pub struct CompanyEdit {
    pub name: Option<String>,
    pub description: Option<String>,
}

// Empty text means "remove the description"
fn edited_description(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

impl Company {
    pub fn apply_edit(&mut self, edit: CompanyEdit) {
        if let Some(name) = edit.name {
            self.name = name;
        }
        if let Some(description) = edit.description {
            self.description = edited_description(description);
        }
    }
}

impl Link {
    // Builds a freshly registered link: pending, never checked
    pub fn from_new(new: NewLink, url: Url) -> Self {
        Link {
            id: Uuid::new_v4(),
            url: url.to_string(),
            name: new.name,
            description: new.description,
            company_id: new.company_id,
            user_id: new.user_id,
            status: LinkStatus::Pending,
            response_time: None,
            last_checked: None,
            created_at: Utc::now(),
        }
    }

    // Writes the result of a check into this link.
    //
    // last_checked only moves forward: when two checks of the same link
    // overlap, the one that finishes last does not get to stamp an older time.
    pub fn apply_status(&mut self, update: StatusUpdate) {
        self.status = update.status;
        self.response_time = update.response_time;
        self.last_checked = match self.last_checked {
            Some(previous) if previous > update.last_checked => Some(previous),
            _ => Some(update.last_checked),
        };
    }

    // Applies a user edit whose URL (if any) has already been validated.
    // status, response_time and last_checked are left untouched.
    pub fn apply_edit(&mut self, edit: LinkEdit, url: Option<Url>) {
        if let Some(name) = edit.name {
            self.name = name;
        }
        if let Some(url) = url {
            self.url = url.to_string();
        }
        if let Some(description) = edit.description {
            self.description = edited_description(description);
        }
        if let Some(company_id) = edit.company_id {
            self.company_id = company_id;
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL cannot be empty")]
    Empty,
    #[error("invalid URL '{url}': {reason}")]
    Invalid { url: String, reason: String },
    #[error("unsupported scheme '{0}': only http and https links can be monitored")]
    UnsupportedScheme(String),
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

// Adds http:// in front of inputs like "example.com/path"
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

// True for inputs shaped like "letters://..."
fn has_scheme(input: &str) -> bool {
    match input.split_once("://") {
        Some((scheme, _)) => !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()),
        None => false,
    }
}

// Validates a user-entered URL, returning the parsed form
//
// Examples:
//   "example.com"        -> Ok(http://example.com/)
//   "https://a.io/x"     -> Ok(https://a.io/x)
//   "ftp://files.io"     -> Err(UnsupportedScheme)
pub fn validate_url(input: &str) -> Result<Url, UrlError> {
    if input.trim().is_empty() {
        return Err(UrlError::Empty);
    }

    let normalized = normalize_url(input);
    let parsed = Url::parse(&normalized).map_err(|e| UrlError::Invalid {
        url: normalized.clone(),
        reason: e.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(parsed.scheme().to_string()));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(normalized));
    }

    Ok(parsed)
}

// "https://example.com:8080/status" -> "example.com:8080/status"
pub fn format_url_for_display(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            match parsed.port() {
                Some(port) => format!("{}:{}{}", host, port, parsed.path()),
                None => format!("{}{}", host, parsed.path()),
            }
        }
        Err(_) => url.to_string(),
    }
}

// Turns a millisecond span into the largest whole unit
pub fn format_duration(milliseconds: u64) -> String {
    const MINUTE: u64 = 60_000;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let (value, unit) = if milliseconds < MINUTE {
        (milliseconds / 1000, "second")
    } else if milliseconds < HOUR {
        (milliseconds / MINUTE, "minute")
    } else if milliseconds < DAY {
        (milliseconds / HOUR, "hour")
    } else {
        (milliseconds / DAY, "day")
    };

    if value == 1 {
        format!("{} {}", value, unit)
    } else {
        format!("{} {}s", value, unit)
    }
}
