//! churn-runner: batch runner for the subscription churn pipeline.
//!
//! Usage:
//!   churn-runner --account data/account_info.csv \
//!                --activity data/user_activity.csv \
//!                --support data/customer_support.csv \
//!                --out merged.csv --report validation_report.txt
//!
//! Reads the three delimited inputs, runs the core pipeline once, writes
//! the merged dataset, the validation report and (optionally) a JSON
//! metrics file, then prints a run summary. No other side effects.

use anyhow::{Context, Result};
use churn_core::{config::PipelineConfig, metrics::ChurnMetrics, pipeline::run_pipeline};
use std::env;
use std::fs;
use std::path::Path;

mod tabfile;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let account_path = required_arg(&args, "--account")?;
    let activity_path = required_arg(&args, "--activity")?;
    let support_path = required_arg(&args, "--support")?;
    let out_path = arg(&args, "--out").unwrap_or("merged.csv");
    let report_path = arg(&args, "--report").unwrap_or("validation_report.txt");
    let metrics_path = arg(&args, "--metrics");
    let in_delim = delimiter_arg(&args, "--delimiter", ',')?;
    let out_delim = delimiter_arg(&args, "--out-delimiter", ';')?;

    let config = match arg(&args, "--config") {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config from {path}"))?;
            serde_json::from_str::<PipelineConfig>(&raw)
                .with_context(|| format!("parsing config from {path}"))?
        }
        None => PipelineConfig::default(),
    };

    let account = tabfile::read_relation(Path::new(account_path), "account", in_delim)?;
    let activity = tabfile::read_relation(Path::new(activity_path), "activity", in_delim)?;
    let support = tabfile::read_relation(Path::new(support_path), "support", in_delim)?;

    let run = run_pipeline(&account, &activity, &support, &config)?;

    fs::write(report_path, run.report.render())
        .with_context(|| format!("writing validation report to {report_path}"))?;
    tabfile::write_merged(Path::new(out_path), &run.rows, out_delim)?;
    if let Some(path) = metrics_path {
        fs::write(path, serde_json::to_string_pretty(&run.metrics)?)
            .with_context(|| format!("writing metrics to {path}"))?;
    }

    log::info!(
        "run complete: {} merged rows written to {out_path}",
        run.rows.len()
    );
    print_summary(&run.metrics, run.orphan_events, run.orphan_tickets, out_path, report_path);
    Ok(())
}

fn print_summary(
    metrics: &ChurnMetrics,
    orphan_events: u64,
    orphan_tickets: u64,
    out_path: &str,
    report_path: &str,
) {
    println!("=== JOIN SUMMARY ===");
    println!("  accounts (base):      {}", metrics.accounts);
    println!("  with >=1 activity:    {}", metrics.with_activity);
    println!("  churned:              {}", metrics.churned);
    println!("  orphan events:        {orphan_events}");
    println!("  orphan tickets:       {orphan_tickets}");
    println!("  merged dataset:       {out_path}");
    println!("  validation report:    {report_path}");

    println!();
    println!("=== METRIC ESTIMATES ===");
    println!(
        "  churn rate:           {:.1}% ({}/{})",
        metrics.churn_rate_pct, metrics.churned, metrics.accounts
    );
    println!(
        "  engagement rate:      {:.1}% (>=1 event)",
        metrics.engagement_rate_pct
    );
    println!(
        "  mean events:          retained {} | churned {}",
        fmt_mean(metrics.mean_events_retained),
        fmt_mean(metrics.mean_events_churned)
    );
    println!(
        "  mean tickets:         retained {} | churned {}",
        fmt_mean(metrics.mean_tickets_retained),
        fmt_mean(metrics.mean_tickets_churned)
    );
    for (plan, rate) in &metrics.churn_rate_by_plan_pct {
        println!("  churn rate ({plan}): {rate:.1}%");
    }
}

/// "n/a" for an empty cohort; never prints a made-up zero.
fn fmt_mean(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".to_string())
}

fn arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn required_arg<'a>(args: &'a [String], flag: &str) -> Result<&'a str> {
    arg(args, flag).with_context(|| format!("missing required flag {flag} <path>"))
}

fn delimiter_arg(args: &[String], flag: &str, default: char) -> Result<char> {
    match arg(args, flag) {
        None => Ok(default),
        Some(raw) => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => anyhow::bail!("{flag} must be a single character, got '{raw}'"),
            }
        }
    }
}
