use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A titled group of checklist items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub items: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>, items: &[&str]) -> Self {
        Self {
            title: title.into(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("checklist item '{0}' appears more than once")]
    DuplicateItem(String),
    #[error("checklist section #{0} has an empty title")]
    EmptyTitle(usize),
}

/// Ordered sections of checklist items. Item names are unique across the
/// whole schema since records key their entries by item name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistSchema {
    sections: Vec<Section>,
}

static DEFAULT_SCHEMA: Lazy<ChecklistSchema> = Lazy::new(|| ChecklistSchema {
    sections: vec![
        Section::new(
            "Daily Scrum",
            &[
                "Daily Scrum 參加 (15m)",
                "更新 Sprint Goal 進度",
                "列出今日 1-3 項重點",
                "排除或提出 Blocker",
            ],
        ),
        Section::new(
            "Development",
            &["保持 Git Main 最新", "完成小功能開 PR", "更新 Jira / 看板"],
        ),
    ],
});

impl ChecklistSchema {
    pub fn new(sections: Vec<Section>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for (idx, section) in sections.iter().enumerate() {
            if section.title.trim().is_empty() {
                return Err(SchemaError::EmptyTitle(idx));
            }
            for item in &section.items {
                if !seen.insert(item.as_str()) {
                    return Err(SchemaError::DuplicateItem(item.clone()));
                }
            }
        }
        Ok(Self { sections })
    }

    /// The built-in checklist used when no custom sections are configured.
    pub fn builtin() -> Self {
        DEFAULT_SCHEMA.clone()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All item names in schema order.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter().map(String::as_str))
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items().any(|i| i == item)
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ChecklistSchema {
    fn default() -> Self {
        Self::builtin()
    }
}
