//! Markdown report generation.
//!
//! This module renders the aggregated summary tables as a Markdown report.
//! Presentation decisions live here: signed deltas map to up/down markers,
//! zero baselines render as "n/a", and empty tables render as "no data"
//! wording instead of empty sections.

use crate::models::{Kpis, MonthlyCount, ModelShare, Report, ReportMetadata, WordCount};
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Conversation Archive Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_kpi_section(report));
    output.push_str(&generate_monthly_section(
        &report.monthly,
        report.metadata.scope_year,
    ));
    output.push_str(&generate_daily_section(
        &report.daily,
        report.metadata.scope_year,
    ));
    output.push_str(&generate_model_section(&report.models));
    output.push_str(&generate_words_section(&report.words));
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Archive:** {}\n", metadata.archive));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Scope Year:** {}\n", metadata.scope_year));
    section.push_str(&format!(
        "- **Records:** {} ({} dated, {} undated)\n",
        metadata.records_total,
        metadata.records_dated,
        metadata.records_total - metadata.records_dated
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the year-in-review KPI section.
fn generate_kpi_section(report: &Report) -> String {
    let mut section = String::new();

    let scope = report.metadata.scope_year;
    let comparison = &report.kpis;
    let current = &comparison.current;
    let previous = &comparison.previous;

    section.push_str(&format!("## {} Year in Review\n\n", scope));

    if kpis_are_empty(current) {
        section.push_str(&format!("_No conversations recorded in {}._\n\n", scope));
    }

    section.push_str(&format!("| KPI | {} | {} | Change |\n", scope, scope - 1));
    section.push_str("|:---|---:|---:|---:|\n");
    section.push_str(&format!(
        "| Total conversations | {} | {} | {} |\n",
        current.total_conversations,
        previous.total_conversations,
        format_change(
            comparison.total_conversations_change,
            previous.total_conversations == 0,
        )
    ));
    section.push_str(&format!(
        "| Avg messages per conversation | {:.1} | {:.1} | {} |\n",
        current.avg_messages,
        previous.avg_messages,
        format_change(comparison.avg_messages_change, previous.avg_messages == 0.0)
    ));
    section.push_str(&format!(
        "| Voice conversations | {} | {} | {} |\n\n",
        current.voice_count,
        previous.voice_count,
        format_change(comparison.voice_count_change, previous.voice_count == 0)
    ));

    section
}

fn kpis_are_empty(kpis: &Kpis) -> bool {
    kpis.total_conversations == 0 && kpis.avg_messages == 0.0 && kpis.voice_count == 0
}

/// Map a signed delta to an up/down marker, or "n/a" for a zero baseline.
///
/// The core reports a saturating 0% for zero baselines; rendering that as a
/// change would mislead, so the marker is suppressed here.
fn format_change(change: f64, baseline_is_zero: bool) -> String {
    if baseline_is_zero {
        return "n/a".to_string();
    }
    if change > 0.0 {
        format!("▲ {:.1}%", change)
    } else if change < 0.0 {
        format!("▼ {:.1}%", change.abs())
    } else {
        "0.0%".to_string()
    }
}

/// Generate the month-by-month section for the scope year and the year before.
fn generate_monthly_section(monthly: &[MonthlyCount], scope_year: i32) -> String {
    let mut section = String::new();

    section.push_str("## Conversations by Month\n\n");

    let previous_year = scope_year - 1;
    let in_scope: Vec<&MonthlyCount> = monthly
        .iter()
        .filter(|count| {
            month_year(&count.month) == Some(scope_year)
                || month_year(&count.month) == Some(previous_year)
        })
        .collect();

    if in_scope.is_empty() {
        section.push_str(&format!(
            "_No dated conversations in {} or {}._\n\n",
            previous_year, scope_year
        ));
        return section;
    }

    if in_scope.iter().any(|count| count.model.is_some()) {
        // split by model: flat table
        section.push_str("| Month | Model | Conversations |\n");
        section.push_str("|:---|:---|---:|\n");
        for count in &in_scope {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                count.month,
                count.model.as_deref().unwrap_or(""),
                count.conversations
            ));
        }
        section.push('\n');
        return section;
    }

    // side-by-side year comparison
    let totals: HashMap<&str, usize> = in_scope
        .iter()
        .map(|count| (count.month.as_str(), count.conversations))
        .collect();

    section.push_str(&format!(
        "| Month | {} | {} |\n",
        previous_year, scope_year
    ));
    section.push_str("|:---|---:|---:|\n");

    for (index, name) in MONTH_NAMES.iter().enumerate() {
        let previous_key = format!("{}-{:02}", previous_year, index + 1);
        let scope_key = format!("{}-{:02}", scope_year, index + 1);
        let previous = totals.get(previous_key.as_str()).copied().unwrap_or(0);
        let current = totals.get(scope_key.as_str()).copied().unwrap_or(0);

        if previous == 0 && current == 0 {
            continue;
        }
        section.push_str(&format!("| {} | {} | {} |\n", name, previous, current));
    }
    section.push('\n');

    section
}

fn month_year(month_key: &str) -> Option<i32> {
    month_key.split('-').next()?.parse().ok()
}

/// Generate the daily-activity section.
fn generate_daily_section(daily: &BTreeMap<NaiveDate, usize>, scope_year: i32) -> String {
    if daily.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Daily Activity\n\n");
    let total: usize = daily.values().sum();
    section.push_str(&format!(
        "{} conversations across {} active days in {}.\n\n",
        total,
        daily.len(),
        scope_year
    ));

    let mut busiest: Vec<(&NaiveDate, &usize)> = daily.iter().collect();
    busiest.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    busiest.truncate(5);

    section.push_str("### Busiest Days\n\n");
    section.push_str("| Date | Conversations |\n");
    section.push_str("|:---|---:|\n");
    for (date, count) in busiest {
        section.push_str(&format!("| {} | {} |\n", date, count));
    }
    section.push('\n');

    section
}

/// Generate the model-usage section.
fn generate_model_section(models: &[ModelShare]) -> String {
    if models.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Model Usage\n\n");
    section.push_str("| Model | Conversations | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for share in models {
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            share.model, share.conversations, share.percentage
        ));
    }
    section.push('\n');

    section
}

/// Generate the title-words section.
fn generate_words_section(words: &[WordCount]) -> String {
    if words.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Top Title Words\n\n");
    section.push_str("| Word | Count |\n");
    section.push_str("|:---|---:|\n");
    for word in words {
        section.push_str(&format!("| {} | {} |\n", word.word, word.count));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Report generated by chatstats v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KpiComparison;
    use chrono::Utc;

    fn sample_report() -> Report {
        let current = Kpis {
            total_conversations: 10,
            avg_messages: 14.24,
            voice_count: 2,
        };
        let previous = Kpis {
            total_conversations: 8,
            avg_messages: 15.0,
            voice_count: 0,
        };

        let mut daily = BTreeMap::new();
        daily.insert(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(), 4);
        daily.insert(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), 6);

        Report {
            metadata: ReportMetadata {
                archive: "conversations.json".to_string(),
                generated_at: Utc::now(),
                scope_year: 2024,
                records_total: 12,
                records_dated: 10,
                duration_seconds: 0.2,
            },
            kpis: KpiComparison {
                current,
                previous,
                total_conversations_change: 25.0,
                avg_messages_change: -5.0,
                voice_count_change: 0.0,
            },
            monthly: vec![
                MonthlyCount {
                    month: "2023-12".to_string(),
                    model: None,
                    conversations: 8,
                },
                MonthlyCount {
                    month: "2024-03".to_string(),
                    model: None,
                    conversations: 10,
                },
            ],
            daily,
            models: vec![ModelShare {
                model: "gpt-4".to_string(),
                conversations: 12,
                percentage: 100.0,
            }],
            words: vec![WordCount {
                word: "trip".to_string(),
                count: 3,
            }],
        }
    }

    #[test]
    fn test_markdown_report_sections() {
        let markdown = generate_markdown_report(&sample_report());

        assert!(markdown.contains("# Conversation Archive Report"));
        assert!(markdown.contains("## 2024 Year in Review"));
        assert!(markdown.contains("| Total conversations | 10 | 8 | ▲ 25.0% |"));
        assert!(markdown.contains("| Avg messages per conversation | 14.2 | 15.0 | ▼ 5.0% |"));
        assert!(markdown.contains("## Conversations by Month"));
        assert!(markdown.contains("| December | 8 | 0 |"));
        assert!(markdown.contains("| March | 0 | 10 |"));
        assert!(markdown.contains("## Daily Activity"));
        assert!(markdown.contains("| 2024-03-04 | 6 |"));
        assert!(markdown.contains("## Model Usage"));
        assert!(markdown.contains("| gpt-4 | 12 | 100.0% |"));
        assert!(markdown.contains("## Top Title Words"));
        assert!(markdown.contains("| trip | 3 |"));
    }

    #[test]
    fn test_zero_baseline_renders_na() {
        let markdown = generate_markdown_report(&sample_report());
        // voice baseline is zero, so the saturating 0% must not be shown
        assert!(markdown.contains("| Voice conversations | 2 | 0 | n/a |"));
    }

    #[test]
    fn test_empty_tables_skip_sections() {
        let mut report = sample_report();
        report.daily.clear();
        report.models.clear();
        report.words.clear();

        let markdown = generate_markdown_report(&report);
        assert!(!markdown.contains("## Daily Activity"));
        assert!(!markdown.contains("## Model Usage"));
        assert!(!markdown.contains("## Top Title Words"));
    }

    #[test]
    fn test_no_data_wording() {
        let mut report = sample_report();
        report.kpis.current = Kpis::default();
        report.monthly.clear();

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("_No conversations recorded in 2024._"));
        assert!(markdown.contains("_No dated conversations in 2023 or 2024._"));
    }

    #[test]
    fn test_monthly_section_grouped_by_model() {
        let mut report = sample_report();
        report.monthly = vec![MonthlyCount {
            month: "2024-03".to_string(),
            model: Some("gpt-4".to_string()),
            conversations: 7,
        }];

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("| Month | Model | Conversations |"));
        assert!(markdown.contains("| 2024-03 | gpt-4 | 7 |"));
    }

    #[test]
    fn test_json_report() {
        let json = generate_json_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["scope_year"], 2024);
        assert_eq!(value["kpis"]["current"]["total_conversations"], 10);
        assert_eq!(value["daily"]["2024-03-04"], 6);
        // ungrouped monthly rows carry no model key
        assert!(value["monthly"][0].get("model").is_none());
    }
}
