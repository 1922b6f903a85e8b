use churn_core::{config::PipelineConfig, pipeline::run_pipeline, relation::Relation};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn some(v: &str) -> Option<String> {
    Some(v.to_string())
}

/// Two accounts: C00001 (Free, churned) and C00002 (Pro, active).
fn account_relation() -> Relation {
    Relation::new("account")
        .with_column("customer_id", vec![some("C00001"), some("C00002")])
        .unwrap()
        .with_column("email", vec![some("a@fit.ly"), some("b@fit.ly")])
        .unwrap()
        .with_column("state", vec![some("WA"), None])
        .unwrap()
        .with_column("plan", vec![some("Free"), some("Pro")])
        .unwrap()
        .with_column("plan_list_price", vec![some("0"), some("49")])
        .unwrap()
        .with_column("churn_status", vec![some("Y"), some("")])
        .unwrap()
}

/// User 1 watched two videos; one extra event has no user id (orphan).
fn activity_relation() -> Relation {
    Relation::new("activity")
        .with_column("user_id", vec![some("1"), some("1"), None])
        .unwrap()
        .with_column(
            "event_time",
            vec![
                some("2024-03-01 10:00:00"),
                some("not a timestamp"),
                some("2024-03-02 09:00:00"),
            ],
        )
        .unwrap()
        .with_column(
            "event_type",
            vec![some("watch_video"), some("watch_video"), some("login")],
        )
        .unwrap()
}

/// User 2 filed one billing ticket, resolved in 3.5 hours.
fn support_relation() -> Relation {
    Relation::new("support")
        .with_column("user_id", vec![some("2")])
        .unwrap()
        .with_column("ticket_time", vec![some("2024-03-05 14:00:00")])
        .unwrap()
        .with_column("channel", vec![some("email")])
        .unwrap()
        .with_column("topic", vec![some("billing")])
        .unwrap()
        .with_column("resolution_time_hours", vec![some("3.5")])
        .unwrap()
        .with_column("state", vec![some("1")])
        .unwrap()
        .with_column("comments", vec![None])
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The reference end-to-end scenario: two accounts, sparse activity and
/// support, one orphan event. Checks the merged rows field by field.
#[test]
fn end_to_end_reference_scenario() {
    let run = run_pipeline(
        &account_relation(),
        &activity_relation(),
        &support_relation(),
        &PipelineConfig::default(),
    )
    .unwrap();

    assert_eq!(run.rows.len(), 2);
    assert_eq!(run.orphan_events, 1);
    assert_eq!(run.orphan_tickets, 0);

    let user1 = &run.rows[0];
    assert_eq!(user1.user_id, 1);
    assert_eq!(user1.customer_id, "C00001");
    assert!(user1.churned);
    // Both events count, including the one with the unparsable timestamp.
    assert_eq!(user1.event_count, 2);
    assert_eq!(user1.event_type_counts["watch_video"], 2);
    assert_eq!(user1.event_types, "watch_video");
    assert_eq!(user1.ticket_count, 0);
    assert_eq!(user1.total_resolution_hours, 0.0);
    assert_eq!(user1.avg_resolution_hours, None);
    assert_eq!(user1.topic_counts["billing"], 0);

    let user2 = &run.rows[1];
    assert_eq!(user2.user_id, 2);
    assert!(!user2.churned); // churn_status was blank
    assert_eq!(user2.event_count, 0);
    assert_eq!(user2.event_type_counts["watch_video"], 0);
    assert_eq!(user2.ticket_count, 1);
    assert_eq!(user2.avg_resolution_hours, Some(3.5));
    assert_eq!(user2.topic_counts["billing"], 1);
}

/// Metrics over the same scenario: both rates land at exactly 50%.
#[test]
fn end_to_end_reference_metrics() {
    let run = run_pipeline(
        &account_relation(),
        &activity_relation(),
        &support_relation(),
        &PipelineConfig::default(),
    )
    .unwrap();

    let m = &run.metrics;
    assert_eq!(m.accounts, 2);
    assert_eq!(m.churn_rate_pct, 50.0);
    assert_eq!(m.engagement_rate_pct, 50.0);
    assert_eq!(m.mean_events_churned, Some(2.0));
    assert_eq!(m.mean_tickets_retained, Some(1.0));
}

/// Orphan-record conservation: events attributed across all merged rows
/// plus the orphan counter equal the activity input row count.
#[test]
fn orphan_events_are_conserved() {
    let activity = activity_relation();
    let run = run_pipeline(
        &account_relation(),
        &activity,
        &support_relation(),
        &PipelineConfig::default(),
    )
    .unwrap();

    let attributed: u64 = run.rows.iter().map(|r| r.event_count).sum();
    assert_eq!(attributed + run.orphan_events, activity.rows() as u64);
}

/// The validation report covers all three relations and flags the things
/// an analyst would look for, without mutating anything.
#[test]
fn validation_report_covers_all_relations() {
    let run = run_pipeline(
        &account_relation(),
        &activity_relation(),
        &support_relation(),
        &PipelineConfig::default(),
    )
    .unwrap();

    let rendered = run.report.render();
    assert!(rendered.contains("=== ACCOUNT INFO ==="));
    assert!(rendered.contains("=== USER ACTIVITY ==="));
    assert!(rendered.contains("=== CUSTOMER SUPPORT ==="));
    assert!(rendered.contains("Within catalog: true"));
    assert!(rendered.contains("Invalid datetime: 1"));
    assert!(rendered.contains("ticket status, not US state"));
}

/// A missing column fails the run up front instead of producing a partial
/// dataset.
#[test]
fn missing_column_fails_fast() {
    let broken = Relation::new("account")
        .with_column("customer_id", vec![some("C00001")])
        .unwrap();

    let err = run_pipeline(
        &broken,
        &activity_relation(),
        &support_relation(),
        &PipelineConfig::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("no column"));
}
