//! Conversation aggregation and statistics.
//!
//! This module provides the pure summary functions over the normalized row
//! table: windowed KPIs, monthly and daily counts, model share, and title
//! word frequencies. Every function tolerates empty input and returns a
//! zero-valued or empty summary instead of failing.

use crate::models::{
    KpiComparison, Kpis, ModelShare, MonthlyCount, NormalizedRow, TimeWindow, WordCount,
};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sentinel label substituted for a missing model slug.
pub const UNKNOWN_MODEL: &str = "Unknown";

/// Compute KPIs over the rows whose timestamp falls in the window.
///
/// Rows with a null timestamp are excluded from every windowed aggregate.
/// `total_conversations` counts distinct non-null conversation ids;
/// `avg_messages` is 0 (not NaN) for an empty subset.
pub fn kpis(rows: &[NormalizedRow], window: &TimeWindow) -> Kpis {
    let mut ids: HashSet<&str> = HashSet::new();
    let mut rows_in_window = 0usize;
    let mut message_total = 0usize;
    let mut voice_count = 0usize;

    for row in rows {
        let Some(ts) = row.create_time else { continue };
        if !window.contains(ts) {
            continue;
        }

        rows_in_window += 1;
        message_total += row.message_count;
        if row.has_voice {
            voice_count += 1;
        }
        if let Some(id) = &row.conversation_id {
            ids.insert(id.as_str());
        }
    }

    let avg_messages = if rows_in_window == 0 {
        0.0
    } else {
        message_total as f64 / rows_in_window as f64
    };

    Kpis {
        total_conversations: ids.len(),
        avg_messages,
        voice_count,
    }
}

/// Signed percentage change from `previous` to `current`.
///
/// Saturating-zero convention: a zero baseline returns 0 rather than an
/// undefined or infinite value. This is deliberately not a true percentage
/// when the baseline is zero; renderers that care should check the baseline
/// themselves and display "n/a" instead of a misleading 0%.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// KPIs for a scope window next to a baseline window, with deltas.
pub fn kpi_comparison(
    rows: &[NormalizedRow],
    window: &TimeWindow,
    baseline: &TimeWindow,
) -> KpiComparison {
    let current = kpis(rows, window);
    let previous = kpis(rows, baseline);

    KpiComparison {
        total_conversations_change: percentage_change(
            current.total_conversations as f64,
            previous.total_conversations as f64,
        ),
        avg_messages_change: percentage_change(current.avg_messages, previous.avg_messages),
        voice_count_change: percentage_change(
            current.voice_count as f64,
            previous.voice_count as f64,
        ),
        current,
        previous,
    }
}

/// Distinct conversations per month, optionally split by model.
///
/// Months are `YYYY-MM` keys, ordered ascending, then by model label. Rows
/// with a null timestamp are skipped (they have no month); rows with a null
/// model slug fall under the `"Unknown"` sentinel rather than being dropped.
/// Counting is by distinct conversation id, so duplicate rows for one
/// conversation never double count.
pub fn monthly_counts(rows: &[NormalizedRow], group_by_model: bool) -> Vec<MonthlyCount> {
    let mut groups: BTreeMap<(String, Option<String>), HashSet<&str>> = BTreeMap::new();

    for row in rows {
        let Some(ts) = row.create_time else { continue };

        let month = ts.format("%Y-%m").to_string();
        let model = group_by_model.then(|| {
            row.model_slug
                .clone()
                .unwrap_or_else(|| UNKNOWN_MODEL.to_string())
        });

        let ids = groups.entry((month, model)).or_default();
        if let Some(id) = &row.conversation_id {
            ids.insert(id.as_str());
        }
    }

    groups
        .into_iter()
        .map(|((month, model), ids)| MonthlyCount {
            month,
            model,
            conversations: ids.len(),
        })
        .collect()
}

/// Conversations per calendar date within one year.
///
/// Dates with zero conversations are absent from the map; callers needing a
/// dense calendar must fill the gaps themselves.
pub fn daily_counts(rows: &[NormalizedRow], year: i32) -> BTreeMap<NaiveDate, usize> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for row in rows {
        let Some(ts) = row.create_time else { continue };
        if ts.year() != year {
            continue;
        }
        *days.entry(ts.date_naive()).or_insert(0) += 1;
    }

    days
}

/// Share of conversations per model over all rows.
///
/// Missing slugs map to `"Unknown"`. Percentages are rounded to one decimal
/// and sum to 100 up to rounding. Ordering is descending by count with ties
/// broken by first appearance in the table.
pub fn model_distribution(rows: &[NormalizedRow]) -> Vec<ModelShare> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let model = row.model_slug.as_deref().unwrap_or(UNKNOWN_MODEL);
        match counts.get_mut(model) {
            Some(count) => *count += 1,
            None => {
                counts.insert(model.to_string(), 1);
                order.push(model.to_string());
            }
        }
    }

    let total = rows.len();
    let mut shares: Vec<ModelShare> = order
        .into_iter()
        .map(|model| {
            let conversations = counts[&model];
            ModelShare {
                percentage: round_one_decimal(conversations as f64 / total as f64 * 100.0),
                model,
                conversations,
            }
        })
        .collect();

    // Stable sort keeps first-seen order within equal counts
    shares.sort_by_key(|share| std::cmp::Reverse(share.conversations));
    shares
}

/// Occurrence counts for lowercased title words.
///
/// Titles are lowercased and split on whitespace; tokens shorter than
/// `min_length` characters are dropped. Ordering is descending by count with
/// ties broken by first occurrence.
pub fn word_frequencies(titles: &[&str], min_length: usize) -> Vec<WordCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for title in titles {
        for token in title.to_lowercase().split_whitespace() {
            if token.chars().count() < min_length {
                continue;
            }
            match counts.get_mut(token) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(token.to_string(), 1);
                    order.push(token.to_string());
                }
            }
        }
    }

    let mut words: Vec<WordCount> = order
        .into_iter()
        .map(|word| {
            let count = counts[&word];
            WordCount { word, count }
        })
        .collect();

    words.sort_by_key(|word| std::cmp::Reverse(word.count));
    words
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
