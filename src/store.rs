use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::core::record::DailyRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("no record saved for {0}")]
    NotFound(NaiveDate),
    #[error("{} holds the record for {found}, expected {expected}", .path.display())]
    DateMismatch {
        path: PathBuf,
        expected: NaiveDate,
        found: NaiveDate,
    },
}

/// Keeps one JSON file per calendar day under a records directory.
///
/// Saving the same date twice replaces the earlier file. By default the file
/// is overwritten in place; with atomic writes the record goes to a sibling
/// temp file first and is renamed over the target.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
    atomic: bool,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            atomic: false,
        }
    }

    pub fn with_atomic_writes(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("scrum_{}.json", date.format("%Y-%m-%d")))
    }

    /// Create the records directory if it is not there yet.
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Write `record` under its date and return the file path.
    pub fn save(&self, record: &DailyRecord) -> Result<PathBuf, StoreError> {
        self.ensure_dir()?;

        let mut json = serde_json::to_string_pretty(record).map_err(StoreError::Serialize)?;
        json.push('\n');

        let path = self.path_for(record.date);
        if self.atomic {
            write_atomic(&path, json.as_bytes())?;
        } else {
            std::fs::write(&path, json).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        }

        log::info!("Saved scrum record to {}", path.display());
        Ok(path)
    }

    pub fn load(&self, date: NaiveDate) -> Result<DailyRecord, StoreError> {
        let path = self.path_for(date);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(date));
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let record: DailyRecord = serde_json::from_str(&content)
            .map_err(|source| StoreError::Parse { path: path.clone(), source })?;
        if record.date != date {
            log::warn!("{} is dated {}, not {}", path.display(), record.date, date);
            return Err(StoreError::DateMismatch {
                path,
                expected: date,
                found: record.date,
            });
        }
        log::debug!("Loaded scrum record from {}", path.display());
        Ok(record)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    let tmp_err = |source: std::io::Error| StoreError::Io { path: tmp.clone(), source };

    let mut file = std::fs::File::create(&tmp).map_err(tmp_err)?;
    file.write_all(bytes).map_err(tmp_err)?;
    file.sync_all().map_err(tmp_err)?;
    drop(file);

    std::fs::rename(&tmp, path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::core::record::EntryStatus;

    fn record() -> DailyRecord {
        let mut entries = BTreeMap::new();
        entries.insert(
            "更新 Sprint Goal 進度".to_string(),
            EntryStatus { done: true, detail: "看板已更新 ✅".to_string() },
        );
        entries.insert("Open PR".to_string(), EntryStatus::default());
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            goal: "完成 v2 發佈".to_string(),
            entries,
            notes: "line one\nline two".to_string(),
        }
    }

    #[test]
    fn file_name_uses_date() {
        let store = RecordStore::new("/tmp/logs");
        let path = store.path_for(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(path, PathBuf::from("/tmp/logs/scrum_2024-03-01.json"));
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("scrum_daily_logs"));
        let record = record();

        let path = store.save(&record).unwrap();
        assert!(path.exists());
        assert_eq!(store.load(record.date).unwrap(), record);
    }

    #[test]
    fn non_ascii_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let path = store.save(&record()).unwrap();

        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.contains("完成 v2 發佈"));
        assert!(raw.contains("✅"));
        assert!(!raw.contains("\\u"));
    }

    #[test]
    fn second_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let mut record = record();
        store.save(&record).unwrap();
        store.save(&record).unwrap();
        assert_eq!(store.load(record.date).unwrap(), record);

        record.goal = "changed".to_string();
        store.save(&record).unwrap();
        assert_eq!(store.load(record.date).unwrap().goal, "changed");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn atomic_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path()).with_atomic_writes(true);
        let record = record();
        store.save(&record).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["scrum_2024-03-01.json".to_string()]);
        assert_eq!(store.load(record.date).unwrap(), record);
    }

    #[test]
    fn missing_day_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(store.load(date), Err(StoreError::NotFound(d)) if d == date));
    }

    #[test]
    fn hand_edited_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        std::fs::write(store.path_for(date), "{ not json").unwrap();
        assert!(matches!(store.load(date), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn file_moved_to_another_day_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let record = record();
        let saved = store.save(&record).unwrap();

        let other_day = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        std::fs::rename(&saved, store.path_for(other_day)).unwrap();

        match store.load(other_day) {
            Err(StoreError::DateMismatch { expected, found, .. }) => {
                assert_eq!(expected, other_day);
                assert_eq!(found, record.date);
            }
            other => panic!("expected DateMismatch, got {:?}", other),
        }
    }

    #[test]
    fn unwritable_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let store = RecordStore::new(blocker.join("logs"));
        assert!(matches!(store.save(&record()), Err(StoreError::Io { .. })));
    }
}
