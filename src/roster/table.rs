use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header of the label column in the tabular view.
pub const NAME_COLUMN: &str = "Name";

/// `15 Jan 25`
const DATE_HEADER_FORMAT: &str = "%d %b %y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Position,
    Worker,
}

/// One labelled row of the schedule: hours per date for a position or worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub label: String,
    pub kind: RowKind,
    pub hours: BTreeMap<NaiveDate, u64>,
}

impl ScheduleRow {
    pub fn hours_on(&self, date: NaiveDate) -> u64 {
        self.hours.get(&date).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.hours.values().sum()
    }
}

/// Ordered schedule rows over a fixed, ascending set of date columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTable {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<ScheduleRow>,
}

/// The `{"columns": [...], "rows": [[label, h1, h2, ...]]}` document served
/// to the frontend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

pub fn format_date_header(date: NaiveDate) -> String {
    date.format(DATE_HEADER_FORMAT).to_string()
}

impl ScheduleTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column headers: the name column followed by one header per date.
    /// Empty when the table has no rows.
    pub fn columns(&self) -> Vec<String> {
        if self.rows.is_empty() {
            return Vec::new();
        }
        std::iter::once(NAME_COLUMN.to_string())
            .chain(self.dates.iter().map(|d| format_date_header(*d)))
            .collect()
    }

    pub fn to_view(&self) -> TableView {
        let rows: Vec<Vec<Value>> = self
            .rows
            .iter()
            .map(|row| {
                std::iter::once(Value::from(row.label.clone()))
                    .chain(self.dates.iter().map(|d| Value::from(row.hours_on(*d))))
                    .collect()
            })
            .collect();

        TableView {
            columns: self.columns(),
            rows,
        }
    }

    pub fn position_rows(&self) -> impl Iterator<Item = &ScheduleRow> {
        self.rows.iter().filter(|r| r.kind == RowKind::Position)
    }

    pub fn worker_rows(&self) -> impl Iterator<Item = &ScheduleRow> {
        self.rows.iter().filter(|r| r.kind == RowKind::Worker)
    }

    /// Sum of hours across all position rows.
    pub fn total_hours(&self) -> u64 {
        self.position_rows().map(ScheduleRow::total).sum()
    }

    pub fn row(&self, label: &str) -> Option<&ScheduleRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample() -> ScheduleTable {
        let d1 = date("2025-01-15");
        let d2 = date("2025-01-16");
        ScheduleTable {
            dates: vec![d1, d2],
            rows: vec![
                ScheduleRow {
                    label: "Developer".to_string(),
                    kind: RowKind::Position,
                    hours: BTreeMap::from([(d1, 6), (d2, 3)]),
                },
                ScheduleRow {
                    label: "Bob".to_string(),
                    kind: RowKind::Worker,
                    hours: BTreeMap::from([(d1, 6), (d2, 0)]),
                },
                ScheduleRow {
                    label: "Carol".to_string(),
                    kind: RowKind::Worker,
                    hours: BTreeMap::from([(d1, 0), (d2, 3)]),
                },
            ],
        }
    }

    #[test]
    fn date_header_format() {
        assert_eq!(format_date_header(date("2025-01-15")), "15 Jan 25");
        assert_eq!(format_date_header(date("2024-03-02")), "02 Mar 24");
    }

    #[test]
    fn columns_lead_with_name() {
        assert_eq!(sample().columns(), vec!["Name", "15 Jan 25", "16 Jan 25"]);
    }

    #[test]
    fn empty_table_has_no_columns() {
        assert!(ScheduleTable::default().columns().is_empty());
    }

    #[test]
    fn view_rows_start_with_label() {
        let view = sample().to_view();
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.rows[0], vec![json!("Developer"), json!(6), json!(3)]);
        assert_eq!(view.rows[2], vec![json!("Carol"), json!(0), json!(3)]);
    }

    #[test]
    fn total_hours_counts_positions_only() {
        assert_eq!(sample().total_hours(), 9);
    }
}
