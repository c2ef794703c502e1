use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schema::ChecklistSchema;

/// Retrospective prompt used for the notes when the form leaves them empty.
pub const DEFAULT_NOTES_TEMPLATE: &str = "\
1. What went well today:
2. What could be improved:
3. Blockers:
4. Action items for tomorrow:";

/// Completion state of one checklist item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredStatus")]
pub struct EntryStatus {
    pub done: bool,
    pub detail: String,
}

impl EntryStatus {
    pub fn has_detail(&self) -> bool {
        !self.detail.is_empty()
    }
}

/// On-disk shapes accepted for an entry. Early records stored a bare
/// `"OK"` / `"--"` marker instead of an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredStatus {
    Full {
        done: bool,
        #[serde(default)]
        detail: String,
    },
    Marker(String),
}

impl TryFrom<StoredStatus> for EntryStatus {
    type Error = String;

    fn try_from(stored: StoredStatus) -> Result<Self, Self::Error> {
        match stored {
            StoredStatus::Full { done, detail } => Ok(Self { done, detail }),
            StoredStatus::Marker(marker) => match marker.as_str() {
                "OK" => Ok(Self { done: true, detail: String::new() }),
                "--" => Ok(Self { done: false, detail: String::new() }),
                other => Err(format!("unknown status marker '{}'", other)),
            },
        }
    }
}

/// Snapshot of one day's checklist, written once and never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub goal: String,
    #[serde(alias = "checklist")]
    pub entries: BTreeMap<String, EntryStatus>,
    pub notes: String,
}

/// Raw checkbox state for one item as the form hands it over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryInput {
    pub checked: bool,
    pub detail: Option<String>,
}

impl EntryInput {
    pub fn checked() -> Self {
        Self { checked: true, detail: None }
    }

    pub fn with_detail(checked: bool, detail: impl Into<String>) -> Self {
        Self { checked, detail: Some(detail.into()) }
    }
}

/// Assembles a [`DailyRecord`] from form values.
///
/// Entries come only from the form inputs; an item the form did not hand over
/// is absent from the record. Items outside the schema are kept as given, since
/// the schema only describes the form and old records may carry stale names.
#[derive(Debug, Clone, Copy)]
pub struct RecordBuilder<'a> {
    schema: &'a ChecklistSchema,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(schema: &'a ChecklistSchema) -> Self {
        Self { schema }
    }

    pub fn build<I, K>(&self, date: NaiveDate, goal: &str, inputs: I, notes: &str) -> DailyRecord
    where
        I: IntoIterator<Item = (K, EntryInput)>,
        K: Into<String>,
    {
        let mut entries = BTreeMap::new();

        for (item, input) in inputs {
            let item = item.into();
            if !self.schema.contains(&item) {
                log::debug!("Keeping checklist entry outside the schema: {}", item);
            }
            entries.insert(
                item,
                EntryStatus {
                    done: input.checked,
                    detail: input.detail.unwrap_or_default(),
                },
            );
        }

        DailyRecord {
            date,
            goal: goal.to_string(),
            entries,
            notes: notes.to_string(),
        }
    }
}
