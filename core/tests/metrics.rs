use churn_core::{
    metrics::compute_metrics,
    model::{AggregateRow, Plan},
    types::UserId,
};
use std::collections::BTreeMap;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn row(user_id: UserId, churned: bool, event_count: u64, ticket_count: u64) -> AggregateRow {
    AggregateRow {
        user_id,
        customer_id: format!("C{user_id:05}"),
        email: None,
        us_state: None,
        plan: Some(Plan::Free),
        plan_list_price: Some(0.0),
        churn_status: churned.then(|| "Y".to_string()),
        churned,
        event_count,
        event_types: String::new(),
        event_type_counts: BTreeMap::new(),
        ticket_count,
        total_resolution_hours: 0.0,
        avg_resolution_hours: None,
        topic_counts: BTreeMap::new(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The two-row reference scenario: one churned user with 2 events, one
/// retained user with 1 ticket. Churn rate and engagement rate are both
/// exactly 50%.
#[test]
fn reference_scenario_rates() {
    let rows = vec![row(1, true, 2, 0), row(2, false, 0, 1)];
    let m = compute_metrics(&rows);

    assert_eq!(m.accounts, 2);
    assert_eq!(m.churned, 1);
    assert_eq!(m.churn_rate_pct, 50.0);
    assert_eq!(m.with_activity, 1);
    assert_eq!(m.engagement_rate_pct, 50.0);
    assert_eq!(m.mean_events_churned, Some(2.0));
    assert_eq!(m.mean_events_retained, Some(0.0));
    assert_eq!(m.mean_tickets_churned, Some(0.0));
    assert_eq!(m.mean_tickets_retained, Some(1.0));
}

/// Conditional means over an empty cohort are None: a distinguishable
/// "no data" result, not 0 and not NaN.
#[test]
fn empty_cohorts_report_no_data() {
    let rows = vec![row(1, false, 0, 0), row(2, false, 0, 2)];
    let m = compute_metrics(&rows);

    assert_eq!(m.churned, 0);
    assert_eq!(m.mean_events_churned, None);
    assert_eq!(m.mean_tickets_churned, None);
    // No row has activity either.
    assert_eq!(m.mean_events_active, None);
    // The retained cohort exists and has a real mean.
    assert_eq!(m.mean_tickets_retained, Some(1.0));
}

/// Mean events conditioned on having any activity averages over that
/// subset only.
#[test]
fn mean_events_active_conditions_on_nonzero_activity() {
    let rows = vec![row(1, false, 4, 0), row(2, false, 2, 0), row(3, false, 0, 0)];
    let m = compute_metrics(&rows);

    assert_eq!(m.with_activity, 2);
    assert_eq!(m.mean_events_active, Some(3.0));
}

/// An empty dataset yields zero rates and all-None means rather than a
/// division by zero.
#[test]
fn empty_dataset_is_well_defined() {
    let m = compute_metrics(&[]);

    assert_eq!(m.accounts, 0);
    assert_eq!(m.churn_rate_pct, 0.0);
    assert_eq!(m.engagement_rate_pct, 0.0);
    assert_eq!(m.mean_tickets, None);
    assert!(m.churn_rate_by_plan_pct.is_empty());
}

/// Per-plan churn rates cover rows with a valid plan and stay consistent
/// with the global churned count.
#[test]
fn churn_rate_by_plan() {
    let mut rows = vec![
        row(1, true, 0, 0),
        row(2, false, 0, 0),
        row(3, true, 0, 0),
        row(4, false, 0, 0),
    ];
    rows[2].plan = Some(Plan::Pro);
    rows[3].plan = Some(Plan::Pro);

    let m = compute_metrics(&rows);
    assert_eq!(m.churn_rate_by_plan_pct.get("Free"), Some(&50.0));
    assert_eq!(m.churn_rate_by_plan_pct.get("Pro"), Some(&50.0));
    assert_eq!(m.churned, 2);
}
