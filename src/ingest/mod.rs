//! Normalization of raw archive records into the flat conversation table.
//!
//! `normalize` is a pure function: one output row per input record, in input
//! order, with missing or damaged fields downgraded to null/zero rather than
//! dropping the row.

use crate::models::{NormalizedRow, RawRecord};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Flatten raw records into normalized rows.
///
/// The output has exactly one row per record, in input order. No row is
/// dropped: a record with every field missing still yields a row of nulls
/// and zeros, and downstream aggregates tolerate it.
pub fn normalize(records: Vec<RawRecord>) -> Vec<NormalizedRow> {
    records.into_iter().map(normalize_record).collect()
}

fn normalize_record(record: RawRecord) -> NormalizedRow {
    let message_count = record
        .mapping
        .as_ref()
        .and_then(Value::as_object)
        .map_or(0, |mapping| mapping.len());

    NormalizedRow {
        conversation_id: record.conversation_id,
        title: record.title,
        create_time: record.create_time.and_then(timestamp_from_epoch),
        model_slug: record.default_model_slug,
        has_voice: record.voice.is_some_and(|v| !v.is_null()),
        message_count,
    }
}

/// Convert Unix epoch seconds (fractional allowed) to a UTC timestamp.
///
/// Non-finite or out-of-range values yield `None`; a conversion failure
/// downgrades to null rather than aborting the batch.
fn timestamp_from_epoch(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }

    let millis = (secs * 1000.0).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }

    DateTime::from_timestamp_millis(millis as i64)
}
