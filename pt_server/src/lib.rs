//! Tournament server library: HTTP API, configuration, logging and
//! metrics. The binary in `main.rs` wires these together.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
