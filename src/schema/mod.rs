//! Column metadata for a record kind.
//!
//! - `ColumnDescriptor` - one column (name, label, type, extra-data flag)
//! - `ColumnSchema` - the ordered columns plus the default-visible subset
//! - `ColumnSchemaProvider` - where schemas come from

use crate::core::{DetailError, Result};
use crate::kind::RecordKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnDataType {
    #[default]
    String,
    Integer,
    Float,
    Date,
    Datetime,
    Boolean,
    #[serde(other)]
    Unknown,
}

impl ColumnDataType {
    pub fn is_date(self) -> bool {
        matches!(self, Self::Date | Self::Datetime)
    }
}

impl fmt::Display for ColumnDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Boolean => "boolean",
            Self::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    #[serde(alias = "column_name")]
    pub name: String,
    #[serde(default, alias = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub data_type: ColumnDataType,
    #[serde(default)]
    pub is_extra_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            data_type: ColumnDataType::String,
            is_extra_data: false,
            table: None,
        }
    }

    pub fn data_type(mut self, data_type: ColumnDataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn extra_data(mut self) -> Self {
        self.is_extra_data = true;
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn is_date(&self) -> bool {
        self.data_type.is_date()
    }

    /// Label for rendering; falls back to the column name.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// Ordered columns of a record kind and the names shown by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    default_columns: Vec<String>,
}

impl ColumnSchema {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            default_columns: Vec::new(),
        }
    }

    pub fn with_defaults<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_columns = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let schema: ColumnSchema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Column names must be unique within a schema.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<(&str, bool), usize> = HashMap::new();
        for (idx, column) in self.columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(DetailError::InvalidPayload(format!(
                    "column #{idx} has an empty name"
                )));
            }
            if let Some(first) = seen.insert((column.name.as_str(), column.is_extra_data), idx) {
                return Err(DetailError::InvalidPayload(format!(
                    "column '{}' declared twice (#{first} and #{idx})",
                    column.name
                )));
            }
        }
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// First column called `name`. A fixed column comes before its extra-data twin only
    /// if the schema lists it first; use [`ColumnSchema::get_column`] to pick one.
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn get_column(&self, name: &str, is_extra_data: bool) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|column| column.name == name && column.is_extra_data == is_extra_data)
    }

    pub fn default_column_names(&self) -> &[String] {
        &self.default_columns
    }

    /// Default-visible columns in default order; every column when no defaults are set.
    /// Names unknown to the schema are skipped.
    pub fn default_columns(&self) -> Vec<ColumnDescriptor> {
        if self.default_columns.is_empty() {
            return self.columns.clone();
        }
        self.subset(&self.default_columns)
    }

    /// Columns matching `names`, in the order of `names`. A name shared by a fixed and
    /// an extra-data column selects both, in schema order.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> Vec<ColumnDescriptor> {
        names
            .iter()
            .flat_map(|name| {
                let name = name.as_ref();
                self.columns.iter().filter(move |column| column.name == name)
            })
            .cloned()
            .collect()
    }

    pub fn date_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| column.is_date())
            .map(|column| column.name.clone())
            .collect()
    }
}

/// Supplies the column schema of a kind. Read once when a session opens.
#[async_trait]
pub trait ColumnSchemaProvider: Send + Sync {
    async fn column_schema(&self, kind: &RecordKind) -> Result<ColumnSchema>;
}

/// Fixed schemas keyed by item type.
#[derive(Debug, Clone, Default)]
pub struct StaticColumnSchema {
    schemas: HashMap<&'static str, ColumnSchema>,
}

impl StaticColumnSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, kind: &RecordKind, schema: ColumnSchema) -> Self {
        self.schemas.insert(kind.item_type, schema);
        self
    }
}

#[async_trait]
impl ColumnSchemaProvider for StaticColumnSchema {
    async fn column_schema(&self, kind: &RecordKind) -> Result<ColumnSchema> {
        self.schemas.get(kind.item_type).cloned().ok_or_else(|| {
            DetailError::Config(format!("no column schema registered for {kind}"))
        })
    }
}
