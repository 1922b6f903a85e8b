//! Descriptive churn metrics over the joined dataset.
//!
//! All rates are simple ratios over the total row count. Conditional means
//! are arithmetic means over the matching subset and are `None` when the
//! subset is empty: an empty cohort has no average, and reporting 0.0 (or
//! a NaN that later compares false everywhere) would silently poison any
//! consumer.

use crate::model::AggregateRow;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct ChurnMetrics {
    pub accounts: u64,
    pub churned: u64,
    pub churn_rate_pct: f64,
    pub with_activity: u64,
    pub engagement_rate_pct: f64,
    pub mean_events_active: Option<f64>,
    pub mean_events_churned: Option<f64>,
    pub mean_events_retained: Option<f64>,
    pub mean_tickets: Option<f64>,
    pub mean_tickets_churned: Option<f64>,
    pub mean_tickets_retained: Option<f64>,
    /// Churn rate per plan, over rows that carry a valid plan.
    pub churn_rate_by_plan_pct: BTreeMap<String, f64>,
}

/// Mean of `value` over the rows matching `subset`; `None` for an empty
/// subset.
fn conditional_mean(
    rows: &[AggregateRow],
    subset: impl Fn(&AggregateRow) -> bool,
    value: impl Fn(&AggregateRow) -> f64,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0u64;
    for row in rows.iter().filter(|r| subset(r)) {
        sum += value(row);
        n += 1;
    }
    (n > 0).then(|| sum / n as f64)
}

pub fn compute_metrics(rows: &[AggregateRow]) -> ChurnMetrics {
    let accounts = rows.len() as u64;
    let churned = rows.iter().filter(|r| r.churned).count() as u64;
    let with_activity = rows.iter().filter(|r| r.event_count > 0).count() as u64;

    let rate = |part: u64| {
        if accounts == 0 {
            0.0
        } else {
            part as f64 / accounts as f64 * 100.0
        }
    };

    let mut churn_rate_by_plan_pct = BTreeMap::new();
    let mut by_plan: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for row in rows {
        if let Some(plan) = row.plan {
            let entry = by_plan.entry(plan.as_str()).or_insert((0, 0));
            entry.0 += 1;
            if row.churned {
                entry.1 += 1;
            }
        }
    }
    for (plan, (total, churned)) in by_plan {
        churn_rate_by_plan_pct.insert(plan.to_string(), churned as f64 / total as f64 * 100.0);
    }

    ChurnMetrics {
        accounts,
        churned,
        churn_rate_pct: rate(churned),
        with_activity,
        engagement_rate_pct: rate(with_activity),
        mean_events_active: conditional_mean(rows, |r| r.event_count > 0, |r| {
            r.event_count as f64
        }),
        mean_events_churned: conditional_mean(rows, |r| r.churned, |r| r.event_count as f64),
        mean_events_retained: conditional_mean(rows, |r| !r.churned, |r| r.event_count as f64),
        mean_tickets: conditional_mean(rows, |_| true, |r| r.ticket_count as f64),
        mean_tickets_churned: conditional_mean(rows, |r| r.churned, |r| r.ticket_count as f64),
        mean_tickets_retained: conditional_mean(rows, |r| !r.churned, |r| r.ticket_count as f64),
        churn_rate_by_plan_pct,
    }
}
