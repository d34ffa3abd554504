//! CSV export of closed-day history.
//!
//! Writes one row per closed record so the ledger can be reviewed or
//! charted outside the app. The export is a full rewrite each time, so
//! re-running it is idempotent.

use crate::{DailyRecord, RecordStore, Result};
use chrono::NaiveDate;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    calorie_goal: u32,
    calorie_intake: i32,
    water_intake: f64,
    water_unit: String,
    water_goal: f64,
    weigh_in_kg: f64,
    outcome: String,
}

impl From<&DailyRecord> for CsvRow {
    fn from(record: &DailyRecord) -> Self {
        CsvRow {
            date: record.date.to_string(),
            calorie_goal: record.calorie_goal,
            calorie_intake: record.calorie_intake,
            water_intake: record.water_intake,
            water_unit: record.water_unit.label().to_string(),
            water_goal: record.water_goal,
            weigh_in_kg: record.weigh_in_kg,
            outcome: if record.pass_fail { "pass" } else { "fail" }.to_string(),
        }
    }
}

/// Export every closed record in `[from, to]` to a CSV file
///
/// Open records are skipped; their totals are still moving. Returns the
/// number of rows written.
pub fn export_history(
    store: &impl RecordStore,
    from: NaiveDate,
    to: NaiveDate,
    csv_path: &Path,
) -> Result<usize> {
    let records = store.load_daily_records(from, to)?;
    let closed: Vec<&DailyRecord> = records.iter().filter(|r| r.closed).collect();

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(csv_path)?;
    for record in &closed {
        writer.serialize(CsvRow::from(*record))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} closed days to {:?}", closed.len(), csv_path);
    Ok(closed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, WaterUnit};

    fn closed_day(d: u32, pass: bool) -> DailyRecord {
        let mut record = DailyRecord::new(
            NaiveDate::from_ymd_opt(2025, 3, d).unwrap(),
            2000,
            64.0,
            WaterUnit::FluidOunces,
        );
        record.calorie_intake = 1800;
        record.pass_fail = pass;
        record.closed = true;
        record
    }

    fn full_range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
    }

    #[test]
    fn test_export_writes_closed_days_only() {
        let mut store = MemoryStore::new();
        store.save_daily_record(&closed_day(1, true)).unwrap();
        store.save_daily_record(&closed_day(2, false)).unwrap();

        let mut open = closed_day(3, true);
        open.closed = false;
        store.save_daily_record(&open).unwrap();

        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("history.csv");
        let (from, to) = full_range();

        let count = export_history(&store, from, to, &csv_path).unwrap();
        assert_eq!(count, 2);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(contents.contains("2025-03-01"));
        assert!(contents.contains("2025-03-02"));
        assert!(!contents.contains("2025-03-03"));
        assert!(contents.contains("pass"));
        assert!(contents.contains("fail"));
    }

    #[test]
    fn test_export_rewrite_is_idempotent() {
        let mut store = MemoryStore::new();
        store.save_daily_record(&closed_day(1, true)).unwrap();

        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("history.csv");
        let (from, to) = full_range();

        export_history(&store, from, to, &csv_path).unwrap();
        export_history(&store, from, to, &csv_path).unwrap();

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 1);
    }

    #[test]
    fn test_export_empty_history() {
        let store = MemoryStore::new();
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("history.csv");
        let (from, to) = full_range();

        let count = export_history(&store, from, to, &csv_path).unwrap();
        assert_eq!(count, 0);
        assert!(csv_path.exists());
    }
}
