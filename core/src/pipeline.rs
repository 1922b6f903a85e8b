//! The pipeline entry point.
//!
//! STAGE ORDER (fixed, documented, never reordered):
//!   1. Validate  — findings over the raw relations, no mutation
//!   2. Normalize — typed records, fail-fast on malformed account ids
//!   3. Aggregate — per-user activity and support summaries with fan-out
//!   4. Join      — one AggregateRow per account, zero-filled
//!   5. Metrics   — descriptive rates and conditional means
//!
//! RULES:
//!   - One synchronous pass; every stage consumes the prior stage's
//!     complete output.
//!   - Deterministic and stateless: same relations in, same rows out.
//!   - Any error aborts the run; there is no partial output to recover.

use crate::{
    aggregate::{ActivityAggregates, SupportAggregates},
    config::PipelineConfig,
    error::PipelineResult,
    join::join_accounts,
    metrics::{compute_metrics, ChurnMetrics},
    model::AggregateRow,
    normalize::{normalize_accounts, normalize_activity, normalize_support},
    relation::Relation,
    validate::{validate_relations, ValidationReport},
};

/// Everything one run produces. The merged rows are the primary output;
/// the report and metrics are auxiliary artifacts.
#[derive(Debug)]
pub struct PipelineRun {
    pub report: ValidationReport,
    pub rows: Vec<AggregateRow>,
    pub metrics: ChurnMetrics,
    /// Activity rows dropped because they carried no user id.
    pub orphan_events: u64,
    /// Support rows dropped because they carried no user id.
    pub orphan_tickets: u64,
}

/// Run the whole pipeline over three parsed relations.
pub fn run_pipeline(
    account: &Relation,
    activity: &Relation,
    support: &Relation,
    config: &PipelineConfig,
) -> PipelineResult<PipelineRun> {
    let report = validate_relations(account, activity, support, config)?;

    let accounts = normalize_accounts(account, config)?;
    let events = normalize_activity(activity, config)?;
    let tickets = normalize_support(support, config)?;

    let activity_agg = ActivityAggregates::aggregate(&events);
    let support_agg = SupportAggregates::aggregate(&tickets);

    let rows = join_accounts(&accounts, &activity_agg, &support_agg);
    let metrics = compute_metrics(&rows);

    log::info!(
        "pipeline: complete, {} rows, churn rate {:.1}%",
        metrics.accounts,
        metrics.churn_rate_pct
    );

    Ok(PipelineRun {
        report,
        rows,
        metrics,
        orphan_events: activity_agg.orphans_dropped,
        orphan_tickets: support_agg.orphans_dropped,
    })
}
