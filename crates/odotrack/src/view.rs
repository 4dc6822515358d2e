//! Derived views over the reading collection.
//!
//! [`project`] turns the stored readings into the chronological sequence the
//! table and chart show, optionally rebased so the earliest reading reads 0.
//! It is a pure function of its inputs and is recomputed on every change;
//! nothing here is persisted.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::reading::Reading;

/// Chart label in absolute mode.
pub const ODOMETER_LABEL: &str = "Odometer Reading";

/// Chart label in zero-based mode.
pub const DISTANCE_LABEL: &str = "Distance Traveled";

/// A reading as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayReading {
    /// Id of the underlying reading.
    pub id: String,
    /// The recorded odometer value.
    pub value: u32,
    /// When the reading was captured.
    pub date: DateTime<Utc>,
    /// The value to show: absolute, or relative to the earliest reading.
    pub display_value: i64,
}

/// Which presentation is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Rows of date and value.
    #[default]
    Table,
    /// A line of values over time.
    Chart,
}

impl ViewMode {
    /// The other mode.
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Table => Self::Chart,
            Self::Chart => Self::Table,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Chart => write!(f, "chart"),
        }
    }
}

/// Project readings into display order.
///
/// Readings are stably sorted by capture time, so readings with equal
/// timestamps keep their stored order. In zero mode every value is reported
/// relative to the earliest reading; a later reading that is lower than the
/// first yields a negative display value.
#[must_use]
pub fn project(readings: &[Reading], zero_mode: bool) -> Vec<DisplayReading> {
    let mut sorted: Vec<&Reading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let base = match (zero_mode, sorted.first()) {
        (true, Some(first)) => i64::from(first.value),
        _ => 0,
    };

    sorted
        .into_iter()
        .map(|r| DisplayReading {
            id: r.id.clone(),
            value: r.value,
            date: r.date,
            display_value: i64::from(r.value) - base,
        })
        .collect()
}

/// The dataset label for the chart.
#[must_use]
pub fn dataset_label(zero_mode: bool) -> &'static str {
    if zero_mode {
        DISTANCE_LABEL
    } else {
        ODOMETER_LABEL
    }
}

/// One row of the table view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Formatted capture time.
    pub date: String,
    /// Displayed value.
    pub value: i64,
}

/// The chart's data set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    /// Dataset label.
    pub label: &'static str,
    /// `(label, value)` points in chronological order.
    pub points: Vec<(String, i64)>,
}

/// Table rows for a projected view, with dates in local time.
#[must_use]
pub fn table_rows(view: &[DisplayReading], date_format: &str) -> Vec<TableRow> {
    view.iter()
        .map(|r| TableRow {
            date: format_local(r.date, date_format),
            value: r.display_value,
        })
        .collect()
}

/// Chart series for a projected view, with labels in local time.
#[must_use]
pub fn chart_series(view: &[DisplayReading], zero_mode: bool, label_format: &str) -> ChartSeries {
    ChartSeries {
        label: dataset_label(zero_mode),
        points: view
            .iter()
            .map(|r| (format_local(r.date, label_format), r.display_value))
            .collect(),
    }
}

fn format_local(date: DateTime<Utc>, format: &str) -> String {
    date.with_timezone(&Local).format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn reading(id: &str, value: u32, hours: i64) -> Reading {
        Reading {
            id: id.to_string(),
            value,
            date: base() + Duration::hours(hours),
        }
    }

    fn sample() -> Vec<Reading> {
        vec![
            reading("c", 10_500, 48),
            reading("a", 10_000, 0),
            reading("b", 10_200, 24),
        ]
    }

    #[test]
    fn test_project_empty() {
        assert!(project(&[], false).is_empty());
        assert!(project(&[], true).is_empty());
    }

    #[test]
    fn test_project_sorts_by_date() {
        let view = project(&sample(), false);
        let ids: Vec<&str> = view.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let values: Vec<i64> = view.iter().map(|r| r.display_value).collect();
        assert_eq!(values, vec![10_000, 10_200, 10_500]);
    }

    #[test]
    fn test_project_zero_mode() {
        let view = project(&sample(), true);
        let values: Vec<i64> = view.iter().map(|r| r.display_value).collect();
        assert_eq!(values, vec![0, 200, 500]);
        assert_eq!(view[2].value, 10_500);
    }

    #[test]
    fn test_project_zero_mode_first_is_zero() {
        for readings in [sample(), vec![reading("x", 123_456, 0)]] {
            assert_eq!(project(&readings, true)[0].display_value, 0);
        }
    }

    #[test]
    fn test_project_is_stable_for_equal_dates() {
        let readings = vec![reading("first", 300, 0), reading("second", 100, 0)];

        let view = project(&readings, true);
        assert_eq!(view[0].id, "first");
        assert_eq!(view[1].display_value, -200);
    }

    #[test]
    fn test_project_is_deterministic() {
        let readings = sample();
        for zero_mode in [false, true] {
            assert_eq!(project(&readings, zero_mode), project(&readings, zero_mode));
        }
    }

    #[test]
    fn test_project_does_not_mutate_input() {
        let readings = sample();
        let before = readings.clone();
        let _ = project(&readings, true);
        assert_eq!(readings, before);
    }

    #[test]
    fn test_dataset_label() {
        assert_eq!(dataset_label(false), "Odometer Reading");
        assert_eq!(dataset_label(true), "Distance Traveled");
    }

    #[test]
    fn test_view_mode_toggle() {
        assert_eq!(ViewMode::Table.toggle(), ViewMode::Chart);
        assert_eq!(ViewMode::Chart.toggle(), ViewMode::Table);
        assert_eq!(ViewMode::default(), ViewMode::Table);
        assert_eq!(ViewMode::Chart.to_string(), "chart");
    }

    #[test]
    fn test_table_rows_follow_view() {
        let view = project(&sample(), true);
        let rows = table_rows(&view, "%Y");

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].value, 0);
        assert_eq!(rows[2].value, 500);
        assert!(rows.iter().all(|row| row.date == "2024"));
    }

    #[test]
    fn test_chart_series_label_and_points() {
        let view = project(&sample(), false);
        let series = chart_series(&view, false, "%Y");

        assert_eq!(series.label, ODOMETER_LABEL);
        assert_eq!(series.points.len(), 3);
        assert_eq!(series.points[0].1, 10_000);

        let zeroed = chart_series(&project(&sample(), true), true, "%Y");
        assert_eq!(zeroed.label, DISTANCE_LABEL);
        assert_eq!(zeroed.points[0].1, 0);
    }

    #[test]
    fn test_display_reading_serializes_camel_case() {
        let view = project(&[reading("a", 5, 0)], false);
        let json = serde_json::to_value(&view[0]).unwrap();
        assert_eq!(json["displayValue"], 5);
    }
}
