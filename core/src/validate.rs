//! Schema validation findings over the raw relations.
//!
//! Pure inspection, no mutation: each column is checked for nullability,
//! cardinality and value-domain conformance, and the observations go into
//! a human-readable report. Nothing downstream consumes the report; it
//! exists so an analyst can sign off on the inputs before trusting the
//! merged output.

use crate::{
    config::PipelineConfig,
    error::PipelineResult,
    normalize::parse_timestamp,
    relation::{cell, Relation},
};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    findings: Vec<String>,
}

impl ValidationReport {
    pub fn findings(&self) -> &[String] {
        &self.findings
    }

    fn push(&mut self, finding: impl Into<String>) {
        self.findings.push(finding.into());
    }

    pub fn render(&self) -> String {
        let mut out = String::from("DATA VALIDATION - subscription churn\n");
        out.push_str(&"=".repeat(50));
        out.push_str("\n\n");
        out.push_str(&self.findings.join("\n"));
        out.push('\n');
        out
    }
}

// ── Column helpers ───────────────────────────────────────────────────────────

fn non_null(col: &[Option<String>]) -> usize {
    (0..col.len()).filter(|&i| cell(col, i).is_some()).count()
}

fn distinct(col: &[Option<String>]) -> usize {
    (0..col.len())
        .filter_map(|i| cell(col, i))
        .collect::<BTreeSet<_>>()
        .len()
}

fn value_counts(col: &[Option<String>]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for i in 0..col.len() {
        if let Some(v) = cell(col, i) {
            *counts.entry(v.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

fn numeric_bounds(col: &[Option<String>]) -> Option<(f64, f64)> {
    let mut bounds: Option<(f64, f64)> = None;
    for i in 0..col.len() {
        if let Some(v) = cell(col, i).and_then(|s| s.parse::<f64>().ok()) {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
    }
    bounds
}

struct TimeStats {
    nulls: usize,
    invalid: usize,
    range: Option<(NaiveDateTime, NaiveDateTime)>,
}

fn time_stats(col: &[Option<String>], formats: &[String]) -> TimeStats {
    let mut stats = TimeStats {
        nulls: 0,
        invalid: 0,
        range: None,
    };
    for i in 0..col.len() {
        match cell(col, i) {
            None => stats.nulls += 1,
            Some(raw) => match parse_timestamp(raw, formats) {
                None => stats.invalid += 1,
                Some(t) => {
                    stats.range = Some(match stats.range {
                        Some((lo, hi)) => (lo.min(t), hi.max(t)),
                        None => (t, t),
                    });
                }
            },
        }
    }
    stats
}

fn format_counts(counts: &BTreeMap<String, usize>) -> String {
    counts
        .iter()
        .map(|(v, n)| format!("{v}: {n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Per-relation checks ──────────────────────────────────────────────────────

fn validate_account(
    rel: &Relation,
    config: &PipelineConfig,
    report: &mut ValidationReport,
) -> PipelineResult<()> {
    report.push("=== ACCOUNT INFO ===");

    let ids = rel.column("customer_id")?;
    let id_distinct = distinct(ids);
    report.push(format!(
        "  customer_id: {} rows, {} distinct. Format {}xxxxx.",
        rel.rows(),
        id_distinct,
        config.id_prefix
    ));
    report.push(format!("    Duplicates: {}", non_null(ids) - id_distinct));

    let email = rel.column("email")?;
    report.push(format!(
        "  email: {} non-null, {} distinct.",
        non_null(email),
        distinct(email)
    ));

    let us_state = rel.column("state")?;
    report.push(format!(
        "  state: {} distinct (US states). Null: {}",
        distinct(us_state),
        rel.rows() - non_null(us_state)
    ));

    let plan = rel.column("plan")?;
    let plan_values: BTreeSet<String> = value_counts(plan).into_keys().collect();
    let expected: BTreeSet<String> = config.expected_plans.iter().cloned().collect();
    report.push(format!(
        "  plan: values {:?}. Within catalog: {}",
        plan_values,
        plan_values.is_subset(&expected)
    ));

    let price = rel.column("plan_list_price")?;
    match numeric_bounds(price) {
        Some((lo, hi)) => report.push(format!(
            "  plan_list_price: min={lo}, max={hi}. Null: {}",
            rel.rows() - non_null(price)
        )),
        None => report.push("  plan_list_price: no numeric values."),
    }
    let zero_priced = value_counts(price)
        .iter()
        .filter(|(v, _)| v.parse::<f64>().map(|f| f == 0.0).unwrap_or(false))
        .map(|(_, n)| n)
        .sum::<usize>();
    report.push(format!("    Zero-priced (Free plan): {zero_priced} rows."));

    let churn_status = rel.column("churn_status")?;
    report.push(format!(
        "  churn_status: values {:?} ({} = churned). Blank = active. Null: {}",
        value_counts(churn_status).into_keys().collect::<Vec<_>>(),
        config.churn_marker,
        rel.rows() - non_null(churn_status)
    ));

    Ok(())
}

fn validate_activity(
    rel: &Relation,
    config: &PipelineConfig,
    report: &mut ValidationReport,
) -> PipelineResult<()> {
    report.push("");
    report.push("=== USER ACTIVITY ===");

    let event_time = rel.column("event_time")?;
    let stats = time_stats(event_time, &config.timestamp_formats);
    report.push(format!(
        "  event_time: Null: {}. Invalid datetime: {}",
        stats.nulls, stats.invalid
    ));
    if let Some((lo, hi)) = stats.range {
        report.push(format!("    Range: {lo} to {hi}"));
    }

    let user_id = rel.column("user_id")?;
    report.push(format!(
        "  user_id: {} distinct users. Null: {}",
        distinct(user_id),
        rel.rows() - non_null(user_id)
    ));

    let event_type = rel.column("event_type")?;
    report.push(format!(
        "  event_type: {{{}}}",
        format_counts(&value_counts(event_type))
    ));

    Ok(())
}

fn validate_support(
    rel: &Relation,
    config: &PipelineConfig,
    report: &mut ValidationReport,
) -> PipelineResult<()> {
    report.push("");
    report.push("=== CUSTOMER SUPPORT ===");

    let ticket_time = rel.column("ticket_time")?;
    let stats = time_stats(ticket_time, &config.timestamp_formats);
    report.push(format!(
        "  ticket_time: Null: {}. Invalid datetime: {}",
        stats.nulls, stats.invalid
    ));

    let user_id = rel.column("user_id")?;
    report.push(format!(
        "  user_id: {} distinct. Null: {}",
        distinct(user_id),
        rel.rows() - non_null(user_id)
    ));

    let channel = rel.column("channel")?;
    let channel_counts = value_counts(channel);
    let unknown = channel_counts
        .get(&config.unknown_channel)
        .copied()
        .unwrap_or(0);
    report.push(format!(
        "  channel: {{{}}}. Unknown ('{}'): {}",
        format_counts(&channel_counts),
        config.unknown_channel,
        unknown
    ));

    let topic = rel.column("topic")?;
    report.push(format!(
        "  topic: {{{}}}",
        format_counts(&value_counts(topic))
    ));

    let resolution = rel.column("resolution_time_hours")?;
    match numeric_bounds(resolution) {
        Some((lo, hi)) => report.push(format!(
            "  resolution_time_hours: min={lo:.2}, max={hi:.2}. Null: {}",
            rel.rows() - non_null(resolution)
        )),
        None => report.push("  resolution_time_hours: no numeric values."),
    }

    let ticket_status = rel.column("state")?;
    report.push(format!(
        "  state: values {:?} (0/1 - ticket status, not US state). Null: {}",
        value_counts(ticket_status).into_keys().collect::<Vec<_>>(),
        rel.rows() - non_null(ticket_status)
    ));

    let comments = rel.column("comments")?;
    report.push(format!("  comments: non-empty {}.", non_null(comments)));

    Ok(())
}

/// Inspect all three raw relations and collect the findings.
pub fn validate_relations(
    account: &Relation,
    activity: &Relation,
    support: &Relation,
    config: &PipelineConfig,
) -> PipelineResult<ValidationReport> {
    let mut report = ValidationReport::default();
    validate_account(account, config, &mut report)?;
    validate_activity(activity, config, &mut report)?;
    validate_support(support, config, &mut report)?;
    log::info!("validate: {} findings recorded", report.findings().len());
    Ok(report)
}
