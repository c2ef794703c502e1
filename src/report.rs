use serde::{Deserialize, Serialize};

use crate::core::record::{DailyRecord, EntryStatus};
use crate::core::schema::ChecklistSchema;

/// How checklist lines are marked in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusStyle {
    /// `[DONE]` / `[TODO]` with the detail appended.
    #[default]
    Detailed,
    /// `[OK]` / `[--]`, details left out.
    Collapsed,
}

impl StatusStyle {
    pub fn marker(self, done: bool) -> &'static str {
        match (self, done) {
            (StatusStyle::Detailed, true) => "DONE",
            (StatusStyle::Detailed, false) => "TODO",
            (StatusStyle::Collapsed, true) => "OK",
            (StatusStyle::Collapsed, false) => "--",
        }
    }
}

/// Formats a record into the plaintext body that gets mailed.
///
/// Checklist lines follow schema order; entries the schema does not know come
/// last, in the record's own (sorted) order.
pub struct ReportRenderer<'a> {
    schema: &'a ChecklistSchema,
    style: StatusStyle,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(schema: &'a ChecklistSchema, style: StatusStyle) -> Self {
        Self { schema, style }
    }

    pub fn render(&self, record: &DailyRecord) -> String {
        let mut out = String::new();
        out.push_str(&format!("Sprint Goal: {}\n", record.goal));
        out.push('\n');

        out.push_str("=== CHECKLIST ===\n");
        let known = self
            .schema
            .items()
            .filter_map(|item| record.entries.get_key_value(item));
        let unknown = record
            .entries
            .iter()
            .filter(|(item, _)| !self.schema.contains(item));
        for (item, status) in known.chain(unknown) {
            out.push_str(&self.checklist_line(item, status));
            out.push('\n');
        }
        out.push('\n');

        out.push_str("=== RETROSPECTIVE ===\n");
        out.push_str(&record.notes);
        out.push('\n');

        out
    }

    fn checklist_line(&self, item: &str, status: &EntryStatus) -> String {
        let mut line = format!("[{}] {}", self.style.marker(status.done), item);
        if self.style == StatusStyle::Detailed && status.has_detail() {
            line.push_str(&format!(" -> ({})", status.detail));
        }
        line
    }
}

/// Mail subject for a record: `"<prefix> <YYYY-MM-DD>"`.
pub fn subject_for(prefix: &str, record: &DailyRecord) -> String {
    format!("{} {}", prefix, record.date.format("%Y-%m-%d"))
}
