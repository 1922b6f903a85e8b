//! Relation → typed-record coercion.
//!
//! Rules, in order of strictness:
//!   1. Account ids: strip the configured prefix, parse the rest as an
//!      integer. Anything else is `MalformedIdentifier`: fatal, the run
//!      aborts with no partial output.
//!   2. Foreign keys on activity/support rows: blank → `None` (orphan,
//!      dropped later by the aggregator); non-blank garbage is fatal.
//!   3. Timestamps: best-effort parse against the configured formats;
//!      failure becomes an absent value, counted and logged, never an
//!      error.
//!   4. Churn flag: strict equality against the marker. `"y"` is not
//!      `"Y"`; blank and null are active.
//!
//! Pure transformation: the source relations are never mutated.

use crate::{
    config::PipelineConfig,
    error::{PipelineError, PipelineResult},
    model::{Account, ActivityEvent, Plan, SupportTicket},
    relation::{cell, Relation},
    types::UserId,
};
use chrono::{NaiveDate, NaiveDateTime};

/// Parse a prefixed account id ("C00042" → 42).
pub fn parse_customer_id(raw: &str, prefix: char) -> PipelineResult<UserId> {
    raw.strip_prefix(prefix)
        .and_then(|digits| digits.parse::<UserId>().ok())
        .ok_or_else(|| PipelineError::MalformedIdentifier {
            relation: "account",
            raw: raw.to_string(),
        })
}

/// Churn flag derivation: true iff the raw status equals the marker
/// exactly. This is a strict equality check, not a truthiness heuristic.
pub fn derive_churn_flag(raw: Option<&str>, marker: &str) -> bool {
    raw.unwrap_or("") == marker
}

/// Try each configured format in order; date-only formats parse to
/// midnight. `None` on failure; the caller decides whether that matters.
pub fn parse_timestamp(raw: &str, formats: &[String]) -> Option<NaiveDateTime> {
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Bare numeric foreign key. The exports write these as integers, but a
/// column that ever held a null round-trips through floats ("42.0").
fn parse_foreign_key(raw: &str, relation: &'static str) -> PipelineResult<UserId> {
    if let Ok(id) = raw.parse::<UserId>() {
        return Ok(id);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.fract() == 0.0 {
            return Ok(f as UserId);
        }
    }
    Err(PipelineError::MalformedIdentifier {
        relation,
        raw: raw.to_string(),
    })
}

fn parse_float(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.parse::<f64>().ok())
}

/// Lenient integer parse for the 0/1 ticket status flag.
fn parse_flag(raw: &str) -> Option<i64> {
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

pub fn normalize_accounts(
    rel: &Relation,
    config: &PipelineConfig,
) -> PipelineResult<Vec<Account>> {
    let customer_id = rel.column("customer_id")?;
    let email = rel.column("email")?;
    let us_state = rel.column("state")?;
    let plan = rel.column("plan")?;
    let price = rel.column("plan_list_price")?;
    let churn_status = rel.column("churn_status")?;

    let mut accounts = Vec::with_capacity(rel.rows());
    for i in 0..rel.rows() {
        let raw_id = cell(customer_id, i).unwrap_or("");
        let user_id = parse_customer_id(raw_id, config.id_prefix)?;
        let status = cell(churn_status, i);

        accounts.push(Account {
            user_id,
            customer_id: raw_id.to_string(),
            email: cell(email, i).map(str::to_string),
            us_state: cell(us_state, i).map(str::to_string),
            plan: cell(plan, i).and_then(Plan::parse),
            plan_list_price: parse_float(cell(price, i)),
            churn_status: status.map(str::to_string),
            churned: derive_churn_flag(status, &config.churn_marker),
        });
    }

    log::info!("normalize: {} accounts", accounts.len());
    Ok(accounts)
}

pub fn normalize_activity(
    rel: &Relation,
    config: &PipelineConfig,
) -> PipelineResult<Vec<ActivityEvent>> {
    let user_id = rel.column("user_id")?;
    let event_time = rel.column("event_time")?;
    let event_type = rel.column("event_type")?;

    let mut events = Vec::with_capacity(rel.rows());
    let mut unparsable_times = 0u64;
    for i in 0..rel.rows() {
        let parsed_time = match cell(event_time, i) {
            Some(raw) => {
                let t = parse_timestamp(raw, &config.timestamp_formats);
                if t.is_none() {
                    unparsable_times += 1;
                }
                t
            }
            None => None,
        };

        events.push(ActivityEvent {
            user_id: cell(user_id, i)
                .map(|raw| parse_foreign_key(raw, "activity"))
                .transpose()?,
            event_time: parsed_time,
            event_type: cell(event_type, i).map(str::to_string),
        });
    }

    if unparsable_times > 0 {
        log::info!("normalize: {unparsable_times} activity event_time values did not parse");
    }
    log::info!("normalize: {} activity events", events.len());
    Ok(events)
}

pub fn normalize_support(
    rel: &Relation,
    config: &PipelineConfig,
) -> PipelineResult<Vec<SupportTicket>> {
    let user_id = rel.column("user_id")?;
    let ticket_time = rel.column("ticket_time")?;
    let channel = rel.column("channel")?;
    let topic = rel.column("topic")?;
    let resolution = rel.column("resolution_time_hours")?;
    let ticket_status = rel.column("state")?; // 0/1 flag, not a US state
    let comments = rel.column("comments")?;

    let mut tickets = Vec::with_capacity(rel.rows());
    let mut unparsable_times = 0u64;
    for i in 0..rel.rows() {
        let parsed_time = match cell(ticket_time, i) {
            Some(raw) => {
                let t = parse_timestamp(raw, &config.timestamp_formats);
                if t.is_none() {
                    unparsable_times += 1;
                }
                t
            }
            None => None,
        };

        tickets.push(SupportTicket {
            user_id: cell(user_id, i)
                .map(|raw| parse_foreign_key(raw, "support"))
                .transpose()?,
            ticket_time: parsed_time,
            channel: cell(channel, i).map(str::to_string),
            topic: cell(topic, i).map(str::to_string),
            resolution_time_hours: parse_float(cell(resolution, i)),
            ticket_status: cell(ticket_status, i).and_then(parse_flag),
            comments: cell(comments, i).map(str::to_string),
        });
    }

    if unparsable_times > 0 {
        log::info!("normalize: {unparsable_times} support ticket_time values did not parse");
    }
    log::info!("normalize: {} support tickets", tickets.len());
    Ok(tickets)
}
