//! Document persistence with file locking.
//!
//! The ledger talks to a `RecordStore`: one profile document plus one
//! document per calendar day. The JSON implementation writes atomically
//! (temp file, sync, rename) under fs2 locks; a corrupt document is
//! logged and treated as absent rather than failing the caller.

use crate::{DailyRecord, Error, Profile, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The document-store collaborator consumed by the ledger
pub trait RecordStore {
    fn load_profile(&self) -> Result<Option<Profile>>;
    fn save_profile(&mut self, profile: &Profile) -> Result<()>;
    fn load_daily_record(&self, date: NaiveDate) -> Result<Option<DailyRecord>>;
    /// All records with `from <= date <= to`, sorted by date
    fn load_daily_records(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyRecord>>;
    /// The most recent record strictly before `date`, if any
    fn load_latest_before(&self, date: NaiveDate) -> Result<Option<DailyRecord>>;
    fn save_daily_record(&mut self, record: &DailyRecord) -> Result<()>;
}

// ============================================================================
// JSON file store
// ============================================================================

/// File-backed store: `profile.json` plus `days/YYYY-MM-DD.json`
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn profile_path(&self) -> PathBuf {
        self.data_dir.join("profile.json")
    }

    fn days_dir(&self) -> PathBuf {
        self.data_dir.join("days")
    }

    fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.days_dir().join(format!("{}.json", date))
    }

    /// Dates of every persisted day document, sorted ascending
    fn day_dates(&self) -> Result<Vec<NaiveDate>> {
        let dir = self.days_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut dates = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let stem = path.file_stem().and_then(|s| s.to_str());
            match stem.and_then(|s| s.parse::<NaiveDate>().ok()) {
                Some(date) => dates.push(date),
                None => {
                    tracing::warn!("Ignoring unrecognized file in days dir: {:?}", path);
                }
            }
        }
        dates.sort();
        Ok(dates)
    }

    /// Read and parse a locked JSON document; corrupt or unreadable
    /// documents are logged and reported as absent
    fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open {:?}: {}. Treating as absent.", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock {:?}: {}. Treating as absent.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;

        if let Err(e) = read_result {
            tracing::warn!("Failed to read {:?}: {}. Treating as absent.", path, e);
            return Ok(None);
        }

        match serde_json::from_str::<T>(&contents) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Failed to parse {:?}: {}. Treating as absent.", path, e);
                Ok(None)
            }
        }
    }

    /// Atomically write a JSON document: temp file, exclusive lock,
    /// fsync, rename over the original
    fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "document path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(value)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl RecordStore for JsonStore {
    fn load_profile(&self) -> Result<Option<Profile>> {
        Self::read_document(&self.profile_path())
    }

    fn save_profile(&mut self, profile: &Profile) -> Result<()> {
        Self::write_document(&self.profile_path(), profile)?;
        tracing::debug!("Saved profile to {:?}", self.profile_path());
        Ok(())
    }

    fn load_daily_record(&self, date: NaiveDate) -> Result<Option<DailyRecord>> {
        Self::read_document(&self.day_path(date))
    }

    fn load_daily_records(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyRecord>> {
        let mut records = Vec::new();
        for date in self.day_dates()? {
            if date < from || date > to {
                continue;
            }
            if let Some(record) = self.load_daily_record(date)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn load_latest_before(&self, date: NaiveDate) -> Result<Option<DailyRecord>> {
        let prior = self
            .day_dates()?
            .into_iter()
            .filter(|d| *d < date)
            .next_back();
        match prior {
            Some(d) => self.load_daily_record(d),
            None => Ok(None),
        }
    }

    fn save_daily_record(&mut self, record: &DailyRecord) -> Result<()> {
        Self::write_document(&self.day_path(record.date), record)?;
        tracing::debug!("Saved daily record for {}", record.date);
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// HashMap-backed store for deterministic engine tests
#[derive(Default)]
pub struct MemoryStore {
    profile: Option<Profile>,
    days: BTreeMap<NaiveDate, DailyRecord>,
    /// When set, every save fails; exercises persistence-failure paths
    pub fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn load_profile(&self) -> Result<Option<Profile>> {
        Ok(self.profile.clone())
    }

    fn save_profile(&mut self, profile: &Profile) -> Result<()> {
        if self.fail_saves {
            return Err(Error::Other("simulated save failure".into()));
        }
        self.profile = Some(profile.clone());
        Ok(())
    }

    fn load_daily_record(&self, date: NaiveDate) -> Result<Option<DailyRecord>> {
        Ok(self.days.get(&date).cloned())
    }

    fn load_daily_records(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyRecord>> {
        Ok(self
            .days
            .range(from..=to)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn load_latest_before(&self, date: NaiveDate) -> Result<Option<DailyRecord>> {
        Ok(self
            .days
            .range(..date)
            .next_back()
            .map(|(_, record)| record.clone()))
    }

    fn save_daily_record(&mut self, record: &DailyRecord) -> Result<()> {
        if self.fail_saves {
            return Err(Error::Other("simulated save failure".into()));
        }
        self.days.insert(record.date, record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActivityLevel, GoalStrategy, Sex, WaterUnit};

    fn test_profile() -> Profile {
        Profile::new(
            "Sam",
            Sex::Male,
            NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
            80.0,
            180.0,
            ActivityLevel::Sedentary,
            true,
            GoalStrategy::Maintain,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        )
    }

    fn record_for(y: i32, m: u32, d: u32) -> DailyRecord {
        DailyRecord::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            2000,
            64.0,
            WaterUnit::FluidOunces,
        )
    }

    #[test]
    fn test_profile_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path());

        assert!(store.load_profile().unwrap().is_none());

        let profile = test_profile();
        store.save_profile(&profile).unwrap();

        let loaded = store.load_profile().unwrap().unwrap();
        assert_eq!(loaded.name, "Sam");
        assert_eq!(loaded.current_weight_kg, 80.0);
    }

    #[test]
    fn test_daily_record_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path());

        let record = record_for(2025, 3, 1);
        store.save_daily_record(&record).unwrap();

        let loaded = store
            .load_daily_record(record.date)
            .unwrap()
            .expect("record should exist");
        assert_eq!(loaded.calorie_goal, 2000);
        assert_eq!(loaded.water_goal, 64.0);
    }

    #[test]
    fn test_load_range_sorted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path());

        store.save_daily_record(&record_for(2025, 3, 3)).unwrap();
        store.save_daily_record(&record_for(2025, 3, 1)).unwrap();
        store.save_daily_record(&record_for(2025, 3, 2)).unwrap();

        let records = store
            .load_daily_records(
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            )
            .unwrap();
        let dates: Vec<_> = records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-03-01", "2025-03-02"]);
    }

    #[test]
    fn test_latest_before_skips_gaps() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path());

        store.save_daily_record(&record_for(2025, 3, 1)).unwrap();
        store.save_daily_record(&record_for(2025, 3, 5)).unwrap();

        let latest = store
            .load_latest_before(NaiveDate::from_ymd_opt(2025, 3, 8).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(latest.date, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());

        let none = store
            .load_latest_before(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_corrupt_document_treated_as_absent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path());

        let record = record_for(2025, 3, 1);
        store.save_daily_record(&record).unwrap();
        std::fs::write(store.day_path(record.date), "{ not json }").unwrap();

        assert!(store.load_daily_record(record.date).unwrap().is_none());
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path());

        store.save_profile(&test_profile()).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "profile.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only profile.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_memory_store_range_and_latest() {
        let mut store = MemoryStore::new();
        store.save_daily_record(&record_for(2025, 3, 1)).unwrap();
        store.save_daily_record(&record_for(2025, 3, 4)).unwrap();

        let all = store
            .load_daily_records(
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            )
            .unwrap();
        assert_eq!(all.len(), 2);

        let latest = store
            .load_latest_before(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(latest.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }
}
