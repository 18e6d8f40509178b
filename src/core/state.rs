//! Field-state map of a record.
//!
//! A state is a JSON object. Its top-level keys fall into three groups:
//!
//! - system keys ([`SYSTEM_FIELDS`]) owned by the store, never edited by a session,
//! - fixed columns of the record kind (see [`RecordKind::fixed_fields`]),
//! - anything else, passed through untouched.
//!
//! Organization-specific columns live in the nested [`EXTRA_DATA_KEY`] object, whose
//! keys are free-form.

use super::error::{DetailError, Result};
use crate::kind::RecordKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub const EXTRA_DATA_KEY: &str = "extra_data";

/// Keys maintained by the store. A save must send them back unchanged.
pub const SYSTEM_FIELDS: &[&str] = &[
    "id",
    "organization_id",
    "import_file_id",
    "source_type",
    "data_state",
    "merge_state",
    "hash_object",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordState {
    fields: Map<String, JsonValue>,
}

impl RecordState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, JsonValue>) -> Self {
        Self { fields }
    }

    pub fn from_json(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(fields) => Ok(Self { fields }),
            other => Err(DetailError::InvalidPayload(format!(
                "record state must be a JSON object, got {other}"
            ))),
        }
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, JsonValue> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        self.fields.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<JsonValue> {
        self.fields.remove(name)
    }

    pub fn extra_data(&self) -> Option<&Map<String, JsonValue>> {
        self.fields.get(EXTRA_DATA_KEY).and_then(JsonValue::as_object)
    }

    pub fn extra(&self, name: &str) -> Option<&JsonValue> {
        self.extra_data().and_then(|extra| extra.get(name))
    }

    /// Inserts into `extra_data`, creating the object when the key is absent or null.
    pub fn set_extra(
        &mut self,
        name: impl Into<String>,
        value: JsonValue,
    ) -> Result<Option<JsonValue>> {
        let slot = self
            .fields
            .entry(EXTRA_DATA_KEY)
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if slot.is_null() {
            *slot = JsonValue::Object(Map::new());
        }
        match slot {
            JsonValue::Object(extra) => Ok(extra.insert(name.into(), value)),
            _ => Err(DetailError::reserved(
                EXTRA_DATA_KEY,
                "must be a JSON object",
            )),
        }
    }

    /// Reads a column value, from `extra_data` when the column is an extra-data column.
    pub fn lookup(&self, name: &str, in_extra_data: bool) -> Option<&JsonValue> {
        if in_extra_data {
            self.extra(name)
        } else {
            self.get(name)
        }
    }

    /// Mutable access to a top-level field. `extra_data` itself is not returned.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut JsonValue> {
        if name == EXTRA_DATA_KEY {
            return None;
        }
        self.fields.get_mut(name)
    }

    /// Mutable access to a key inside `extra_data`.
    pub fn extra_mut(&mut self, name: &str) -> Option<&mut JsonValue> {
        self.fields
            .get_mut(EXTRA_DATA_KEY)
            .and_then(JsonValue::as_object_mut)
            .and_then(|extra| extra.get_mut(name))
    }

    /// Checks the reserved keys of an edited state against the state it was edited from.
    ///
    /// Keys that are neither system keys nor fixed columns of `kind` are not inspected.
    pub fn validate_reserved(&self, kind: &RecordKind, original: &RecordState) -> Result<()> {
        for field in SYSTEM_FIELDS {
            if self.get(field) != original.get(field) {
                return Err(DetailError::reserved(*field, "is maintained by the store"));
            }
        }

        match self.get(EXTRA_DATA_KEY) {
            None | Some(JsonValue::Null) | Some(JsonValue::Object(_)) => {}
            Some(_) => {
                return Err(DetailError::reserved(
                    EXTRA_DATA_KEY,
                    "must be a JSON object",
                ));
            }
        }

        for field in kind.fixed_fields {
            if let Some(value) = self.get(field) {
                if value.is_array() || value.is_object() {
                    return Err(DetailError::reserved(
                        *field,
                        "must hold a scalar value",
                    ));
                }
            }
        }

        Ok(())
    }
}

impl From<Map<String, JsonValue>> for RecordState {
    fn from(fields: Map<String, JsonValue>) -> Self {
        Self::from_map(fields)
    }
}
