//! Per-identifier aggregation with categorical fan-out.
//!
//! Each aggregate produces:
//!   1. One summary per distinct user id present in the input.
//!   2. The set of category values observed across the WHOLE input (not
//!      per group). Fan-out columns are derived from this set, so the
//!      output schema is data-dependent and every row carries the same
//!      columns.
//!   3. A count of orphan rows (null user id) that were dropped. Dropping
//!      them is deliberate (an orphan event belongs to no customer), but
//!      the loss is surfaced in the counter and the log.

use crate::{
    model::{ActivityEvent, SupportTicket},
    types::UserId,
};
use std::collections::{BTreeMap, BTreeSet};

/// Prefix for per-event-type fan-out columns (`count_watch_video`).
pub const EVENT_TYPE_PREFIX: &str = "count_";
/// Prefix for per-topic fan-out columns (`tickets_billing`).
pub const TOPIC_PREFIX: &str = "tickets_";

// ── Activity ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ActivitySummary {
    /// Every event row counts, including rows whose timestamp failed to
    /// parse. Only rows without an event type skip the fan-out map.
    pub event_count: u64,
    pub type_counts: BTreeMap<String, u64>,
}

impl ActivitySummary {
    /// Distinct event types, sorted and comma-joined (a BTreeMap already
    /// iterates in sorted order).
    pub fn event_types(&self) -> String {
        self.type_counts
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityAggregates {
    pub groups: BTreeMap<UserId, ActivitySummary>,
    pub observed_types: BTreeSet<String>,
    pub orphans_dropped: u64,
}

impl ActivityAggregates {
    pub fn aggregate(events: &[ActivityEvent]) -> Self {
        let mut agg = ActivityAggregates::default();

        for event in events {
            let Some(user_id) = event.user_id else {
                agg.orphans_dropped += 1;
                continue;
            };

            let summary = agg.groups.entry(user_id).or_default();
            summary.event_count += 1;

            if let Some(event_type) = &event.event_type {
                *summary.type_counts.entry(event_type.clone()).or_insert(0) += 1;
                agg.observed_types.insert(event_type.clone());
            }
        }

        if agg.orphans_dropped > 0 {
            log::warn!(
                "aggregate: dropped {} activity rows with no user id",
                agg.orphans_dropped
            );
        }
        log::info!(
            "aggregate: {} users with activity, {} event types observed",
            agg.groups.len(),
            agg.observed_types.len()
        );
        agg
    }
}

// ── Support ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SupportSummary {
    /// Every ticket row counts, even without a timestamp or duration.
    pub ticket_count: u64,
    resolved_hours_sum: f64,
    resolved_hours_n: u64,
    pub topic_counts: BTreeMap<String, u64>,
}

impl SupportSummary {
    /// Sum over the durations that were present. Zero when none were.
    pub fn total_resolution_hours(&self) -> f64 {
        self.resolved_hours_sum
    }

    /// Mean over the durations that were present. `None`, not zero, when
    /// the group carried no durations at all: an undefined average must
    /// stay distinguishable from a fast one.
    pub fn avg_resolution_hours(&self) -> Option<f64> {
        if self.resolved_hours_n == 0 {
            None
        } else {
            Some(self.resolved_hours_sum / self.resolved_hours_n as f64)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SupportAggregates {
    pub groups: BTreeMap<UserId, SupportSummary>,
    pub observed_topics: BTreeSet<String>,
    pub orphans_dropped: u64,
}

impl SupportAggregates {
    pub fn aggregate(tickets: &[SupportTicket]) -> Self {
        let mut agg = SupportAggregates::default();

        for ticket in tickets {
            let Some(user_id) = ticket.user_id else {
                agg.orphans_dropped += 1;
                continue;
            };

            let summary = agg.groups.entry(user_id).or_default();
            summary.ticket_count += 1;

            if let Some(hours) = ticket.resolution_time_hours {
                summary.resolved_hours_sum += hours;
                summary.resolved_hours_n += 1;
            }

            if let Some(topic) = &ticket.topic {
                *summary.topic_counts.entry(topic.clone()).or_insert(0) += 1;
                agg.observed_topics.insert(topic.clone());
            }
        }

        if agg.orphans_dropped > 0 {
            log::warn!(
                "aggregate: dropped {} support rows with no user id",
                agg.orphans_dropped
            );
        }
        log::info!(
            "aggregate: {} users with tickets, {} topics observed",
            agg.groups.len(),
            agg.observed_topics.len()
        );
        agg
    }
}
