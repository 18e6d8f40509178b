use crate::core::RecordState;
use crate::schema::ColumnDescriptor;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

/// Value shown for a column. `Empty` stands in for absent and null fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Empty,
    Value(JsonValue),
}

impl DisplayValue {
    pub fn from_field(value: Option<&JsonValue>) -> Self {
        match value {
            None | Some(JsonValue::Null) => Self::Empty,
            Some(value) => Self::Value(value.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Empty => None,
            Self::Value(value) => Some(value),
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Value(JsonValue::String(s)) => write!(f, "{s}"),
            Self::Value(other) => write!(f, "{other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayField {
    pub column: ColumnDescriptor,
    pub value: DisplayValue,
}

/// One field per column, in column order, read from `state`.
pub fn derive_display_fields(
    state: &RecordState,
    columns: &[ColumnDescriptor],
) -> Vec<DisplayField> {
    columns
        .iter()
        .map(|column| DisplayField {
            value: DisplayValue::from_field(state.lookup(&column.name, column.is_extra_data)),
            column: column.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDataType;
    use serde_json::json;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("year_built", "Year Built").data_type(ColumnDataType::Integer),
            ColumnDescriptor::new("address_1", "Address"),
            ColumnDescriptor::new("zoning", "Zoning").extra_data(),
            ColumnDescriptor::new("district", "District"),
        ]
    }

    #[test]
    fn test_fields_follow_column_order() {
        let state = RecordState::from_json(json!({
            "address_1": "123 Main",
            "year_built": 1990,
            "district": null,
            "extra_data": {"zoning": "R-2"}
        }))
        .unwrap();

        let fields = derive_display_fields(&state, &columns());
        let names: Vec<_> = fields.iter().map(|f| f.column.name.as_str()).collect();
        assert_eq!(names, vec!["year_built", "address_1", "zoning", "district"]);
        assert_eq!(fields[0].value, DisplayValue::Value(json!(1990)));
        assert_eq!(fields[1].value, DisplayValue::Value(json!("123 Main")));
        assert_eq!(fields[2].value, DisplayValue::Value(json!("R-2")));
        assert!(fields[3].value.is_empty());
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let fields = derive_display_fields(&RecordState::new(), &columns());
        assert_eq!(fields.len(), 4);
        assert!(fields.iter().all(|f| f.value.is_empty()));
    }

    #[test]
    fn test_empty_column_list() {
        let state = RecordState::from_json(json!({"a": 1})).unwrap();
        assert!(derive_display_fields(&state, &[]).is_empty());
    }

    #[test]
    fn test_display_rendering() {
        assert_eq!(DisplayValue::Empty.to_string(), "");
        assert_eq!(DisplayValue::Value(json!("Oak")).to_string(), "Oak");
        assert_eq!(DisplayValue::Value(json!(12.5)).to_string(), "12.5");
        assert_eq!(serde_json::to_value(DisplayValue::Empty).unwrap(), json!(null));
    }
}
