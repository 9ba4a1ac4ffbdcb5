//! Aggregation and state-reconciliation core for the research-corpus
//! analytics dashboard.

pub mod config;
pub mod coordinator;
pub mod dashboard;
pub mod fallback;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod report;
pub mod snapshot;
pub mod store;
