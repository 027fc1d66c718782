//! LogiTrack core: warehouse process records and operator productivity.
//!
//! Data flows one way: the store feeds the workspace, the workspace feeds
//! the aggregation engine, and dashboards and audits read its output.

pub mod audit;
pub mod coerce;
pub mod compliance;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod model;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod types;
pub mod workspace;
