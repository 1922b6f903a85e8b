//! churn-core — validation, cleaning, join and metrics for the subscription
//! churn dataset.
//!
//! The pipeline reconciles three relations keyed on a shared user id:
//! accounts (one per customer), activity events and support tickets (many
//! rows per user). It produces one merged row per account plus a small set
//! of descriptive metrics.
//!
//! [`pipeline::run_pipeline`] is the only entry point. Loading this crate
//! runs nothing; callers pass relations in and get the output relation back.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod join;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod relation;
pub mod types;
pub mod validate;
