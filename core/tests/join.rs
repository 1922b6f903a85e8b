use churn_core::{
    aggregate::{ActivityAggregates, SupportAggregates},
    join::join_accounts,
    model::{Account, ActivityEvent, Plan, SupportTicket},
    types::UserId,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn account(user_id: UserId, churned: bool) -> Account {
    Account {
        user_id,
        customer_id: format!("C{user_id:05}"),
        email: None,
        us_state: None,
        plan: Some(Plan::Basic),
        plan_list_price: Some(9.0),
        churn_status: churned.then(|| "Y".to_string()),
        churned,
    }
}

fn event(user_id: UserId, event_type: &str) -> ActivityEvent {
    ActivityEvent {
        user_id: Some(user_id),
        event_time: None,
        event_type: Some(event_type.to_string()),
    }
}

fn ticket(user_id: UserId, topic: &str, hours: Option<f64>) -> SupportTicket {
    SupportTicket {
        user_id: Some(user_id),
        ticket_time: None,
        channel: None,
        topic: Some(topic.to_string()),
        resolution_time_hours: hours,
        ticket_status: Some(0),
        comments: None,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Left join preserves base cardinality exactly: one output row per
/// account, in account order, regardless of how sparse the aggregates are.
#[test]
fn output_cardinality_equals_account_cardinality() {
    let accounts: Vec<Account> = (1..=5).map(|id| account(id, false)).collect();
    let activity = ActivityAggregates::aggregate(&[event(3, "login")]);
    let support = SupportAggregates::aggregate(&[ticket(9, "billing", Some(1.0))]); // id 9 has no account

    let rows = join_accounts(&accounts, &activity, &support);

    assert_eq!(rows.len(), accounts.len());
    let ids: Vec<UserId> = rows.iter().map(|r| r.user_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

/// Accounts with no matching activity get explicit zeros, not absent
/// fields: event_count == 0 and a zero entry for every observed type.
#[test]
fn unmatched_accounts_are_zero_filled() {
    let accounts = vec![account(1, false), account(2, false)];
    let activity = ActivityAggregates::aggregate(&[event(1, "watch_video")]);
    let support = SupportAggregates::aggregate(&[]);

    let rows = join_accounts(&accounts, &activity, &support);

    let no_activity = &rows[1];
    assert_eq!(no_activity.event_count, 0);
    assert_eq!(no_activity.event_types, "");
    assert_eq!(no_activity.event_type_counts.get("watch_video"), Some(&0));
    assert_eq!(no_activity.ticket_count, 0);
    assert_eq!(no_activity.total_resolution_hours, 0.0);
}

/// The one exception to zero-fill: an undefined mean resolution survives
/// the join as None for 100% of zero-ticket rows.
#[test]
fn undefined_mean_resolution_is_not_zero_filled() {
    let accounts = vec![account(1, false), account(2, false)];
    let activity = ActivityAggregates::aggregate(&[]);
    let support = SupportAggregates::aggregate(&[ticket(2, "billing", Some(3.5))]);

    let rows = join_accounts(&accounts, &activity, &support);

    assert_eq!(rows[0].ticket_count, 0);
    assert_eq!(rows[0].avg_resolution_hours, None);
    assert_eq!(rows[1].avg_resolution_hours, Some(3.5));
}

/// Every joined row carries the full observed category set, whatever mix
/// of categories its own rows had: the output schema is uniform within a
/// run even though it is data-dependent across runs.
#[test]
fn join_is_schema_tolerant_to_data_dependent_fan_out() {
    let accounts = vec![account(1, false), account(2, false)];
    let activity = ActivityAggregates::aggregate(&[
        event(1, "watch_video"),
        event(2, "track_workout"),
        event(2, "login"),
    ]);
    let support = SupportAggregates::aggregate(&[
        ticket(1, "billing", None),
        ticket(2, "cancellation", None),
    ]);

    let rows = join_accounts(&accounts, &activity, &support);

    for row in &rows {
        assert_eq!(row.event_type_counts.len(), 3);
        assert_eq!(row.topic_counts.len(), 2);
    }
    assert_eq!(rows[0].event_type_counts["watch_video"], 1);
    assert_eq!(rows[0].event_type_counts["login"], 0);
    assert_eq!(rows[1].topic_counts["cancellation"], 1);
    assert_eq!(rows[1].topic_counts["billing"], 0);
}

/// Aggregate rows keyed to users without an account are simply not joined;
/// they cannot invent base rows.
#[test]
fn aggregates_without_base_rows_are_ignored() {
    let accounts = vec![account(1, false)];
    let activity = ActivityAggregates::aggregate(&[event(1, "login"), event(42, "login")]);
    let support = SupportAggregates::aggregate(&[]);

    let rows = join_accounts(&accounts, &activity, &support);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_id, 1);
}
