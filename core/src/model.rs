//! Typed records produced by the normalizer, plus the joined output row.
//!
//! NAMING: both raw exports carry a column called `state`. On accounts it
//! is a US state, on tickets it is a 0/1 status flag. The two are kept as
//! `us_state` and `ticket_status` here so they can never be conflated.

use crate::types::UserId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subscription plan catalog. Values outside the catalog normalize to an
/// absent plan; the validator reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl Plan {
    pub const ALL: [Plan; 4] = [Plan::Free, Plan::Basic, Plan::Pro, Plan::Enterprise];

    pub fn parse(raw: &str) -> Option<Plan> {
        match raw {
            "Free" => Some(Plan::Free),
            "Basic" => Some(Plan::Basic),
            "Pro" => Some(Plan::Pro),
            "Enterprise" => Some(Plan::Enterprise),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Basic => "Basic",
            Plan::Pro => "Pro",
            Plan::Enterprise => "Enterprise",
        }
    }
}

/// One account per customer. `user_id` is the parsed numeric form of
/// `customer_id` and is the join key for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub customer_id: String,
    pub email: Option<String>,
    pub us_state: Option<String>,
    pub plan: Option<Plan>,
    pub plan_list_price: Option<f64>,
    pub churn_status: Option<String>,
    pub churned: bool,
}

/// One activity event. A `None` user id makes the row an orphan: it is
/// excluded from aggregation. A `None` event time still counts toward
/// `event_count`; only time-range statistics skip it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub user_id: Option<UserId>,
    pub event_time: Option<NaiveDateTime>,
    pub event_type: Option<String>,
}

/// One support ticket. `ticket_status` is the 0/1 flag the export calls
/// `state`; see the module note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicket {
    pub user_id: Option<UserId>,
    pub ticket_time: Option<NaiveDateTime>,
    pub channel: Option<String>,
    pub topic: Option<String>,
    pub resolution_time_hours: Option<f64>,
    pub ticket_status: Option<i64>,
    pub comments: Option<String>,
}

/// The merged output row: one per account, account fields plus the two
/// aggregate blocks. Fan-out counts are maps keyed by the observed category
/// value, so the output schema can grow with the data without any code
/// change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRow {
    pub user_id: UserId,
    pub customer_id: String,
    pub email: Option<String>,
    pub us_state: Option<String>,
    pub plan: Option<Plan>,
    pub plan_list_price: Option<f64>,
    pub churn_status: Option<String>,
    pub churned: bool,

    // Activity block
    pub event_count: u64,
    /// Distinct event types for this user, sorted and comma-joined.
    pub event_types: String,
    pub event_type_counts: BTreeMap<String, u64>,

    // Support block
    pub ticket_count: u64,
    pub total_resolution_hours: f64,
    /// `None` means undefined (no tickets, or no ticket carried a
    /// duration). Never zero-filled: zero is a real average.
    pub avg_resolution_hours: Option<f64>,
    pub topic_counts: BTreeMap<String, u64>,
}
