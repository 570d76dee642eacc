//! Supervision core for the platform's child processes.
//!
//! Builds launch commands for the search engine, web server and compute
//! engine processes, and decides when a launched process is operational.

pub mod constants;
pub mod domain;
pub mod infrastructure;
