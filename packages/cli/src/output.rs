//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use enforceiq_analytics::executor::QueryReport;
use enforceiq_analytics_models::{KeyMetrics, QueryResult};
use enforceiq_catalog_models::QueryTier;
use enforceiq_stop_models::{StopColumn, StopRecord};

/// Renders rows as a left-aligned text table with a header rule.
#[must_use]
pub fn render_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, columns, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut out, &rule, &widths);
    for row in rows {
        write_row(&mut out, row, &widths);
    }
    out
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    writeln!(out, "{}", line.join("  ").trim_end()).unwrap();
}

/// Numbered catalog labels under the tier heading.
#[must_use]
pub fn render_labels(tier: QueryTier, labels: &[&str]) -> String {
    let mut out = String::new();
    writeln!(out, "{}", tier.title()).unwrap();
    for label in labels {
        writeln!(out, "  {label}").unwrap();
    }
    out
}

/// The rows of a query run, or its message when there are none.
#[must_use]
pub fn render_report(report: &QueryReport) -> String {
    let mut out = String::new();
    writeln!(out, "{}", report.definition.label()).unwrap();
    writeln!(out).unwrap();

    match &report.result {
        QueryResult::Rows(table) => {
            let rows: Vec<Vec<String>> = table
                .rows()
                .iter()
                .map(|row| row.values().map(ToString::to_string).collect())
                .collect();
            out.push_str(&render_table(table.columns(), &rows));
        }
        QueryResult::NoRows => {
            let message = report
                .message
                .as_deref()
                .unwrap_or(enforceiq_analytics::executor::NO_DATA_MESSAGE);
            writeln!(out, "{message}").unwrap();
        }
    }
    out
}

/// Headline numbers followed by the per-violation counts.
#[must_use]
pub fn render_metrics(metrics: &KeyMetrics) -> String {
    let mut out = String::new();
    writeln!(out, "Total Stops:         {}", metrics.total_stops).unwrap();
    writeln!(out, "Total Arrests:       {}", metrics.total_arrests).unwrap();
    writeln!(out, "Distinct Outcomes:   {}", metrics.distinct_outcomes).unwrap();
    writeln!(out, "Distinct Violations: {}", metrics.distinct_violations).unwrap();
    writeln!(
        out,
        "Most Common Outcome: {}",
        metrics.top_outcome.as_deref().unwrap_or("-")
    )
    .unwrap();

    if !metrics.violation_counts.is_empty() {
        writeln!(out).unwrap();
        let rows: Vec<Vec<String>> = metrics
            .violation_counts
            .iter()
            .map(|v| vec![v.violation.clone(), v.count.to_string()])
            .collect();
        out.push_str(&render_table(
            &["violation".to_string(), "count".to_string()],
            &rows,
        ));
    }
    out
}

/// Matched stops, restricted to the columns the dataset kept.
#[must_use]
pub fn render_records(columns: &[StopColumn], records: &[&StopRecord]) -> String {
    let header: Vec<String> = columns.iter().map(ToString::to_string).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.cell(*column).to_string())
                .collect()
        })
        .collect();
    render_table(&header, &rows)
}

#[cfg(test)]
mod tests {
    use enforceiq_analytics_models::{ResultTable, ViolationCount};
    use enforceiq_catalog_models::QueryDefinition;
    use enforceiq_stop_models::{CellValue, RawTable};

    use super::*;

    #[test]
    fn pads_columns_to_widest_cell() {
        let out = render_table(
            &["violation".to_string(), "n".to_string()],
            &[
                vec!["DUI".to_string(), "2".to_string()],
                vec!["Speeding".to_string(), "10".to_string()],
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "violation  n");
        assert_eq!(lines[1], "---------  --");
        assert_eq!(lines[2], "DUI        2");
        assert_eq!(lines[3], "Speeding   10");
    }

    #[test]
    fn labels_are_listed_under_tier_title() {
        let out = render_labels(QueryTier::Advanced, &["1. a", "2. b"]);
        assert_eq!(out, "Complex Queries\n  1. a\n  2. b\n");
    }

    #[test]
    fn report_without_rows_shows_message() {
        let report = QueryReport {
            definition: QueryDefinition::new(QueryTier::Standard, "q", "select 1"),
            result: QueryResult::NoRows,
            message: Some("No data found for the selected query.".to_string()),
        };
        let out = render_report(&report);
        assert!(out.starts_with("q\n\n"));
        assert!(out.ends_with("No data found for the selected query.\n"));
    }

    #[test]
    fn report_rows_keep_select_order() {
        let mut raw = RawTable::new(vec!["vehicle_number".to_string(), "search_count".to_string()]);
        raw.push_row(vec![CellValue::Text("AB1".to_string()), CellValue::Int(2)])
            .unwrap();
        let report = QueryReport {
            definition: QueryDefinition::new(QueryTier::Standard, "q", "select 1"),
            result: QueryResult::from_table(ResultTable::from(raw)),
            message: None,
        };
        let out = render_report(&report);
        assert!(out.contains("vehicle_number  search_count"));
        assert!(out.contains("AB1             2"));
    }

    #[test]
    fn metrics_without_stops_have_no_violation_table() {
        let out = render_metrics(&KeyMetrics::default());
        assert!(out.contains("Total Stops:         0"));
        assert!(out.contains("Most Common Outcome: -"));
        assert!(!out.contains("violation"));
    }

    #[test]
    fn metrics_list_violations() {
        let metrics = KeyMetrics {
            total_stops: 3,
            violation_counts: vec![ViolationCount {
                violation: "Speeding".to_string(),
                count: 3,
            }],
            ..KeyMetrics::default()
        };
        assert!(render_metrics(&metrics).contains("Speeding   3"));
    }

    #[test]
    fn records_render_selected_columns() {
        let record = StopRecord {
            driver_gender: Some("M".to_string()),
            driver_age: Some(30),
            search_conducted: Some(true),
            ..StopRecord::default()
        };
        let out = render_records(
            &[
                StopColumn::DriverGender,
                StopColumn::DriverAge,
                StopColumn::SearchConducted,
            ],
            &[&record],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "driver_gender  driver_age  search_conducted");
        assert_eq!(lines[2], "M              30          true");
    }
}
