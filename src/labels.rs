use crate::core::{Record, RecordId, Result};
use crate::kind::RecordKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    /// Records of the requested kind the label is applied to.
    #[serde(default)]
    pub is_applied: Vec<RecordId>,
}

fn default_color() -> String {
    "gray".to_string()
}

impl Label {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: default_color(),
            is_applied: Vec::new(),
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn applied_to(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.is_applied.extend(ids);
        self
    }

    pub fn is_applied_to(&self, id: RecordId) -> bool {
        self.is_applied.contains(&id)
    }
}

/// Labels loaded for one detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    pub fn all(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn applied_to(&self, id: RecordId) -> Vec<&Label> {
        self.labels
            .iter()
            .filter(|label| label.is_applied_to(id))
            .collect()
    }
}

/// Supplies labels for a record. Read once when a session opens.
#[async_trait]
pub trait LabelProvider: Send + Sync {
    async fn labels(&self, kind: &RecordKind, record: &Record) -> Result<LabelSet>;
}

/// Organization labels kept in memory, keyed by item type.
#[derive(Debug, Clone, Default)]
pub struct StaticLabels {
    by_kind: HashMap<&'static str, Vec<Label>>,
}

impl StaticLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(mut self, kind: &RecordKind, labels: Vec<Label>) -> Self {
        self.by_kind.entry(kind.item_type).or_default().extend(labels);
        self
    }
}

#[async_trait]
impl LabelProvider for StaticLabels {
    async fn labels(&self, kind: &RecordKind, _record: &Record) -> Result<LabelSet> {
        Ok(LabelSet::new(
            self.by_kind.get(kind.item_type).cloned().unwrap_or_default(),
        ))
    }
}
