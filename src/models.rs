//! Data models for the archive statistics engine.
//!
//! This module contains all the core data structures used throughout
//! the application for representing records, rows, and summary tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One conversation entry as it appears in the exported archive.
///
/// Every field is optional and damage-tolerant: a field holding a value of
/// the wrong JSON type deserializes to `None` instead of failing the record.
/// Only a top-level element that is not an object at all is a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    /// Opaque conversation identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub conversation_id: Option<String>,
    /// Free-text conversation title.
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    /// Creation time as Unix epoch seconds (fractional allowed).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub create_time: Option<f64>,
    /// Model label the conversation defaulted to.
    #[serde(default, deserialize_with = "lenient_string")]
    pub default_model_slug: Option<String>,
    /// Present (any non-null value) iff the conversation used voice mode.
    #[serde(default)]
    pub voice: Option<Value>,
    /// Keyed collection of message nodes; its key count is the message count.
    #[serde(default)]
    pub mapping: Option<Value>,
}

/// Keep only JSON strings, downgrading any other value to `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    }))
}

/// Keep only JSON numbers, downgrading any other value to `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

/// One normalized row of the conversation table, immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Conversation identifier, if the record carried one.
    pub conversation_id: Option<String>,
    /// Conversation title, if the record carried one.
    pub title: Option<String>,
    /// Creation timestamp; `None` when absent or unparseable in the source.
    pub create_time: Option<DateTime<Utc>>,
    /// Model label, if the record carried one.
    pub model_slug: Option<String>,
    /// Whether the conversation used voice mode.
    pub has_voice: bool,
    /// Number of message nodes in the conversation.
    pub message_count: usize,
}

/// A half-open UTC time range `[start, end)` used to scope aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive start of the window.
    pub start: DateTime<Utc>,
    /// Exclusive end of the window.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window from explicit bounds.
    #[allow(dead_code)] // Constructor for ad-hoc windows
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window covering one calendar year in UTC.
    ///
    /// Returns `None` for years outside chrono's supported range.
    pub fn calendar_year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?
            .and_hms_opt(0, 0, 0)?
            .and_utc();
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?
            .and_hms_opt(0, 0, 0)?
            .and_utc();
        Some(Self { start, end })
    }

    /// Whether a timestamp falls inside the window.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

/// Key performance indicators for one time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Distinct conversations with a timestamp inside the window.
    pub total_conversations: usize,
    /// Mean message count over the windowed rows; 0 for an empty window.
    pub avg_messages: f64,
    /// Windowed rows that used voice mode.
    pub voice_count: usize,
}

/// KPIs for the scope window next to the baseline window, with signed
/// percentage deltas.
///
/// Deltas follow the saturating-zero convention of
/// [`percentage_change`](crate::analysis::percentage_change): a zero baseline
/// yields a delta of 0, so renderers should check the baseline KPI before
/// displaying a delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiComparison {
    /// KPIs for the scope window.
    pub current: Kpis,
    /// KPIs for the baseline window.
    pub previous: Kpis,
    /// Signed percentage delta in total conversations.
    pub total_conversations_change: f64,
    /// Signed percentage delta in average messages per conversation.
    pub avg_messages_change: f64,
    /// Signed percentage delta in voice conversations.
    pub voice_count_change: f64,
}

/// Distinct-conversation count for one month, optionally split by model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// Canonical `YYYY-MM` month key.
    pub month: String,
    /// Model label; absent when counts are not split by model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Distinct conversations in the month.
    pub conversations: usize,
}

/// Share of conversations attributed to one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelShare {
    /// Model label, with missing values normalized to `"Unknown"`.
    pub model: String,
    /// Number of conversations using the model.
    pub conversations: usize,
    /// Share of all conversations, rounded to one decimal.
    pub percentage: f64,
}

/// Occurrence count for one lowercased title word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCount {
    /// The lowercased word.
    pub word: String,
    /// Number of occurrences across all titles in scope.
    pub count: usize,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the archive that was ingested.
    pub archive: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Calendar year the KPI and daily sections cover.
    pub scope_year: i32,
    /// Total records in the archive.
    pub records_total: usize,
    /// Records that carried a parseable timestamp.
    pub records_dated: usize,
    /// Wall-clock duration of the full pipeline in seconds.
    pub duration_seconds: f64,
}

/// The complete statistics report handed to a renderer.
///
/// Every table is recomputed from the normalized row table; empty tables
/// mean the corresponding section was disabled or had no data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// Scope-year KPIs against the previous year.
    pub kpis: KpiComparison,
    /// Distinct conversations per month, all years.
    pub monthly: Vec<MonthlyCount>,
    /// Conversations per calendar date within the scope year.
    pub daily: BTreeMap<NaiveDate, usize>,
    /// Conversation share per model over the whole archive.
    pub models: Vec<ModelShare>,
    /// Most frequent title words.
    pub words: Vec<WordCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_lenient_fields() {
        let record: RawRecord = serde_json::from_str(
            r#"{
                "conversation_id": 42,
                "title": "Trip planning",
                "create_time": "not a number",
                "default_model_slug": null,
                "voice": true,
                "mapping": {"1": {}, "2": {}}
            }"#,
        )
        .unwrap();

        assert_eq!(record.conversation_id, None);
        assert_eq!(record.title.as_deref(), Some("Trip planning"));
        assert_eq!(record.create_time, None);
        assert_eq!(record.default_model_slug, None);
        assert!(record.voice.is_some());
        assert!(record.mapping.is_some());
    }

    #[test]
    fn test_raw_record_missing_fields() {
        let record: RawRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.conversation_id, None);
        assert_eq!(record.create_time, None);
        assert!(record.voice.is_none());
        assert!(record.mapping.is_none());
    }

    #[test]
    fn test_calendar_year_bounds() {
        let window = TimeWindow::calendar_year(2024).unwrap();

        let jan_first = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let dec_last = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc();
        let next_jan = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();

        assert!(window.contains(jan_first));
        assert!(window.contains(dec_last));
        assert!(!window.contains(next_jan));
    }

    #[test]
    fn test_calendar_year_out_of_range() {
        assert!(TimeWindow::calendar_year(400_000).is_none());
    }
}
