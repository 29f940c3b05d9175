// src/checker/mod.rs
// =============================================================================
// This module contains the link probing logic.
//
// Submodules:
// - http: Makes one bounded HTTP HEAD request and classifies the outcome
//
// The monitor depends only on the `Probe` trait re-exported here, never on
// reqwest directly.
// =============================================================================

mod http;

pub use http::{HttpProber, Probe, ProbeOutcome, ProbeResult, DEFAULT_PROBE_TIMEOUT};
