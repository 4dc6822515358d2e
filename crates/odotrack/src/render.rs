//! Terminal renderers for the table and chart views.
//!
//! Both consume a [`Snapshot`] and write plain text; neither holds any state
//! of its own, so the chart is rebuilt from scratch on every call.

use std::io::{self, Write};

use crate::app::Snapshot;
use crate::config::DisplayConfig;
use crate::view::{self, ViewMode};

const EMPTY_HINT: &str = "No readings yet. Add one with `odotrack add <IMAGE>`.";

/// Render the snapshot in its active view.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render(out: &mut impl Write, snapshot: &Snapshot, display: &DisplayConfig) -> io::Result<()> {
    match snapshot.view_mode {
        ViewMode::Table => table(out, snapshot, display),
        ViewMode::Chart => chart(out, snapshot, display),
    }
}

/// Render rows of date and value.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn table(out: &mut impl Write, snapshot: &Snapshot, display: &DisplayConfig) -> io::Result<()> {
    if snapshot.readings.is_empty() {
        return writeln!(out, "{EMPTY_HINT}");
    }

    let rows = view::table_rows(&snapshot.readings, &display.date_format);
    let header = ("Date", snapshot.label);
    let date_width = rows
        .iter()
        .map(|r| r.date.chars().count())
        .chain(std::iter::once(header.0.len()))
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|r| r.value.to_string().len())
        .chain(std::iter::once(header.1.len()))
        .max()
        .unwrap_or(0);

    writeln!(out, "{:<date_width$}  {:>value_width$}", header.0, header.1)?;
    writeln!(out, "{}  {}", "-".repeat(date_width), "-".repeat(value_width))?;
    for row in &rows {
        writeln!(out, "{:<date_width$}  {:>value_width$}", row.date, row.value)?;
    }
    Ok(())
}

/// Render a horizontal bar chart, one bar per reading in date order.
///
/// Bars are scaled so the largest value spans `chart_width` columns; zero or
/// negative values get no bar.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn chart(out: &mut impl Write, snapshot: &Snapshot, display: &DisplayConfig) -> io::Result<()> {
    if snapshot.readings.is_empty() {
        return writeln!(out, "{EMPTY_HINT}");
    }

    let series = view::chart_series(&snapshot.readings, snapshot.zero_mode, &display.label_format);
    let label_width = series
        .points
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let max = series.points.iter().map(|(_, v)| *v).max().unwrap_or(0);

    writeln!(out, "{}", series.label)?;
    for (label, value) in &series.points {
        let bar = "#".repeat(bar_len(*value, max, display.chart_width));
        writeln!(out, "{label:<label_width$} | {bar} {value}")?;
    }
    Ok(())
}

fn bar_len(value: i64, max: i64, width: usize) -> usize {
    if value <= 0 || max <= 0 {
        return 0;
    }
    let width = i128::try_from(width).unwrap_or(i128::MAX);
    let len = i128::from(value) * width / i128::from(max);
    usize::try_from(len).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineState;
    use crate::reading::Reading;
    use crate::view::project;
    use chrono::{Duration, TimeZone, Utc};

    fn snapshot(values: &[u32], view_mode: ViewMode, zero_mode: bool) -> Snapshot {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let readings: Vec<Reading> = values
            .iter()
            .enumerate()
            .map(|(i, v)| Reading::at(*v, base + Duration::days(i64::try_from(i).unwrap())))
            .collect();
        let storage = crate::storage::Storage::open_in_memory().unwrap();
        let mut store = crate::store::ReadingStore::load(storage, "k").unwrap();
        for r in &readings {
            store.append(r.clone()).unwrap();
        }
        Snapshot {
            readings: project(&readings, zero_mode),
            view_mode,
            zero_mode,
            label: view::dataset_label(zero_mode),
            message: None,
            pipeline: PipelineState::Idle,
            stats: store.stats(),
        }
    }

    fn rendered(snapshot: &Snapshot) -> String {
        let mut out = Vec::new();
        render(&mut out, snapshot, &DisplayConfig::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_hint() {
        for mode in [ViewMode::Table, ViewMode::Chart] {
            assert!(rendered(&snapshot(&[], mode, false)).contains("No readings yet"));
        }
    }

    #[test]
    fn test_table_lists_rows_in_order() {
        let text = rendered(&snapshot(&[10_000, 10_250], ViewMode::Table, false));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Odometer Reading"));
        assert!(lines[2].ends_with("10000"));
        assert!(lines[3].ends_with("10250"));
    }

    #[test]
    fn test_table_zero_mode() {
        let text = rendered(&snapshot(&[10_000, 10_250], ViewMode::Table, true));
        assert!(text.contains("Distance Traveled"));
        assert!(text.lines().nth(2).unwrap().ends_with(" 0"));
        assert!(text.lines().nth(3).unwrap().ends_with("250"));
    }

    #[test]
    fn test_chart_scales_bars() {
        let text = rendered(&snapshot(&[100, 200], ViewMode::Chart, false));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Odometer Reading");
        assert_eq!(lines[1].matches('#').count(), 20);
        assert_eq!(lines[2].matches('#').count(), 40);
    }

    #[test]
    fn test_chart_zero_mode_first_bar_empty() {
        let text = rendered(&snapshot(&[500, 600], ViewMode::Chart, true));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Distance Traveled");
        assert_eq!(lines[1].matches('#').count(), 0);
        assert!(lines[1].ends_with(" 0"));
        assert_eq!(lines[2].matches('#').count(), 40);
    }

    #[test]
    fn test_bar_len() {
        assert_eq!(bar_len(0, 100, 40), 0);
        assert_eq!(bar_len(-5, 100, 40), 0);
        assert_eq!(bar_len(50, 100, 40), 20);
        assert_eq!(bar_len(100, 0, 40), 0);
    }
}
