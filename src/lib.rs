// src/lib.rs
// =============================================================================
// link-sentinel as a library.
//
// The binary in main.rs is one front end; anything else that wants to show
// link health (a web dashboard, a tray icon) can build a `Monitor` over its
// own `LinkStore` and subscribe to its events the same way.
// =============================================================================

pub mod checker;   // probing one URL
pub mod config;    // TOML settings
pub mod link;      // data model and URL helpers
pub mod logging;   // tracing setup
pub mod monitor;   // passes, scheduling, notifications
pub mod stats;     // dashboard numbers
pub mod store;     // persistence
