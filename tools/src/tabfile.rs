//! Delimited-text reader/writer for the pipeline's tabular files.
//!
//! Header row required. Fields may be quoted; a doubled quote inside a
//! quoted field escapes it, and quoted fields may contain the delimiter or
//! newlines (the support export quotes free-text comments). Blank cells
//! load as `None` so missing-value semantics reach the core untouched.

use anyhow::{bail, Context, Result};
use churn_core::{
    aggregate::{EVENT_TYPE_PREFIX, TOPIC_PREFIX},
    model::AggregateRow,
    relation::Relation,
};
use std::fs;
use std::path::Path;

// ── Reading ──────────────────────────────────────────────────────────────────

/// Split the whole file into records of raw fields.
fn parse_records(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
        } else if c == '"' && field.is_empty() {
            in_quotes = true;
        } else if c == delimiter {
            record.push(std::mem::take(&mut field));
        } else if c == '\n' {
            if field.ends_with('\r') {
                field.pop();
            }
            record.push(std::mem::take(&mut field));
            records.push(std::mem::take(&mut record));
        } else {
            field.push(c);
        }
    }

    // Final record without a trailing newline.
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

/// Read one delimited file into a column-oriented relation.
pub fn read_relation(path: &Path, name: &str, delimiter: char) -> Result<Relation> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {} from {}", name, path.display()))?;
    let mut records = parse_records(&text, delimiter).into_iter();

    let Some(header) = records.next() else {
        bail!("{}: file {} is empty (no header row)", name, path.display());
    };

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
    for (line, record) in records.enumerate() {
        if record.len() != header.len() {
            bail!(
                "{}: row {} has {} fields, header has {}",
                name,
                line + 2,
                record.len(),
                header.len()
            );
        }
        for (j, raw) in record.into_iter().enumerate() {
            let trimmed = raw.trim();
            columns[j].push((!trimmed.is_empty()).then(|| trimmed.to_string()));
        }
    }

    let mut rel = Relation::new(name);
    for (column, cells) in header.into_iter().zip(columns) {
        rel.push_column(column, cells)?;
    }
    Ok(rel)
}

// ── Writing ──────────────────────────────────────────────────────────────────

fn escape(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_f64(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Output header: account columns, then the activity block, then the
/// support block. Fan-out columns come from the first row; after the
/// zero-fill every row carries the identical observed set, so the header
/// is data-dependent but consistent within a run.
pub fn merged_header(rows: &[AggregateRow]) -> Vec<String> {
    let mut header: Vec<String> = [
        "user_id",
        "customer_id",
        "email",
        "state",
        "plan",
        "plan_list_price",
        "churn_status",
        "churned",
        "event_count",
        "event_types",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();

    if let Some(first) = rows.first() {
        for event_type in first.event_type_counts.keys() {
            header.push(format!("{EVENT_TYPE_PREFIX}{event_type}"));
        }
    }
    header.extend([
        "ticket_count".to_string(),
        "total_resolution_hours".to_string(),
        "avg_resolution_hours".to_string(),
    ]);
    if let Some(first) = rows.first() {
        for topic in first.topic_counts.keys() {
            header.push(format!("{TOPIC_PREFIX}{topic}"));
        }
    }
    header
}

fn merged_record(row: &AggregateRow) -> Vec<String> {
    let mut record = vec![
        row.user_id.to_string(),
        row.customer_id.clone(),
        opt_str(&row.email),
        opt_str(&row.us_state),
        row.plan.map(|p| p.as_str().to_string()).unwrap_or_default(),
        opt_f64(row.plan_list_price),
        opt_str(&row.churn_status),
        u64::from(row.churned).to_string(),
        row.event_count.to_string(),
        row.event_types.clone(),
    ];
    record.extend(row.event_type_counts.values().map(|n| n.to_string()));
    record.push(row.ticket_count.to_string());
    record.push(row.total_resolution_hours.to_string());
    record.push(opt_f64(row.avg_resolution_hours));
    record.extend(row.topic_counts.values().map(|n| n.to_string()));
    record
}

/// Write the merged dataset. An undefined average renders as an empty
/// field, never as zero.
pub fn write_merged(path: &Path, rows: &[AggregateRow], delimiter: char) -> Result<()> {
    let mut out = String::new();
    let header = merged_header(rows);
    out.push_str(
        &header
            .iter()
            .map(|c| escape(c, delimiter))
            .collect::<Vec<_>>()
            .join(&delimiter.to_string()),
    );
    out.push('\n');

    for row in rows {
        let record = merged_record(row);
        debug_assert_eq!(record.len(), header.len());
        out.push_str(
            &record
                .iter()
                .map(|f| escape(f, delimiter))
                .collect::<Vec<_>>()
                .join(&delimiter.to_string()),
        );
        out.push('\n');
    }

    fs::write(path, out).with_context(|| format!("writing merged output to {}", path.display()))
}

// ── Tests ────────────────────────────────────────────────────────────────────
