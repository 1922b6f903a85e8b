//! Left join of accounts against the two aggregates.
//!
//! Join policy ("left join with zero-fill"):
//!   - Every account produces exactly one output row, in account order.
//!     The join never drops or duplicates base rows, since each aggregate
//!     holds one summary per user id.
//!   - Count-type fields and every fan-out entry are zero-filled when no
//!     rows matched, so "no activity" reads as an explicit zero.
//!   - `avg_resolution_hours` is the one exception: it stays `None` when
//!     undefined. Zero is a real (very fast) average; conflating the two
//!     would corrupt downstream means.

use crate::{
    aggregate::{ActivityAggregates, SupportAggregates},
    model::{Account, AggregateRow},
};
use std::collections::{BTreeMap, BTreeSet};

/// The observed category set, zero-filled, with the group's own counts
/// overlaid. Every output row carries the full set.
fn zero_filled(
    observed: &BTreeSet<String>,
    counts: Option<&BTreeMap<String, u64>>,
) -> BTreeMap<String, u64> {
    let mut filled: BTreeMap<String, u64> =
        observed.iter().map(|category| (category.clone(), 0)).collect();
    if let Some(counts) = counts {
        for (category, n) in counts {
            filled.insert(category.clone(), *n);
        }
    }
    filled
}

pub fn join_accounts(
    accounts: &[Account],
    activity: &ActivityAggregates,
    support: &SupportAggregates,
) -> Vec<AggregateRow> {
    let mut rows = Vec::with_capacity(accounts.len());

    for account in accounts {
        let act = activity.groups.get(&account.user_id);
        let sup = support.groups.get(&account.user_id);

        rows.push(AggregateRow {
            user_id: account.user_id,
            customer_id: account.customer_id.clone(),
            email: account.email.clone(),
            us_state: account.us_state.clone(),
            plan: account.plan,
            plan_list_price: account.plan_list_price,
            churn_status: account.churn_status.clone(),
            churned: account.churned,

            event_count: act.map_or(0, |s| s.event_count),
            event_types: act.map_or_else(String::new, |s| s.event_types()),
            event_type_counts: zero_filled(
                &activity.observed_types,
                act.map(|s| &s.type_counts),
            ),

            ticket_count: sup.map_or(0, |s| s.ticket_count),
            total_resolution_hours: sup.map_or(0.0, |s| s.total_resolution_hours()),
            avg_resolution_hours: sup.and_then(|s| s.avg_resolution_hours()),
            topic_counts: zero_filled(&support.observed_topics, sup.map(|s| &s.topic_counts)),
        });
    }

    log::info!(
        "join: {} accounts -> {} merged rows ({} with activity, {} with tickets)",
        accounts.len(),
        rows.len(),
        rows.iter().filter(|r| r.event_count > 0).count(),
        rows.iter().filter(|r| r.ticket_count > 0).count(),
    );
    rows
}
