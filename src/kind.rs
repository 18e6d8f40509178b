use std::fmt;

/// Configuration that distinguishes one detail page from another.
///
/// Tax lots and properties share the whole edit/save/restore workflow; they only
/// differ in the values below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKind {
    /// Item type used in logs and store keys (`taxlot`, `property`).
    pub item_type: &'static str,
    /// Title shown at the top of the detail page.
    pub page_title: &'static str,
    /// REST resource name of the kind.
    pub resource: &'static str,
    /// Field whose value identifies the record to a human.
    pub identity_field: &'static str,
    /// Columns that belong to the kind's fixed schema.
    pub fixed_fields: &'static [&'static str],
    /// Fields that always carry dates, whatever the column schema says.
    pub date_columns: &'static [&'static str],
}

impl RecordKind {
    pub const TAX_LOT: RecordKind = RecordKind {
        item_type: "taxlot",
        page_title: "Tax Lot",
        resource: "taxlots",
        identity_field: "jurisdiction_tax_lot_id",
        fixed_fields: &[
            "jurisdiction_tax_lot_id",
            "custom_id_1",
            "block_number",
            "district",
            "address_line_1",
            "address_line_2",
            "normalized_address",
            "city",
            "state",
            "postal_code",
            "number_properties",
        ],
        date_columns: &["generation_date", "release_date"],
    };

    pub const PROPERTY: RecordKind = RecordKind {
        item_type: "property",
        page_title: "Property",
        resource: "properties",
        identity_field: "address_line_1",
        fixed_fields: &[
            "pm_property_id",
            "pm_parent_property_id",
            "custom_id_1",
            "property_name",
            "address_line_1",
            "address_line_2",
            "normalized_address",
            "city",
            "state",
            "postal_code",
            "lot_number",
            "property_notes",
            "property_type",
            "use_description",
            "year_built",
            "building_count",
            "gross_floor_area",
            "conditioned_floor_area",
            "occupied_floor_area",
            "site_eui",
            "site_eui_weather_normalized",
            "source_eui",
            "source_eui_weather_normalized",
            "energy_score",
            "energy_alerts",
            "space_alerts",
            "building_certification",
            "generation_date",
            "release_date",
            "recent_sale_date",
            "year_ending",
        ],
        date_columns: &[
            "generation_date",
            "release_date",
            "recent_sale_date",
            "year_ending",
            "record_year_ending",
        ],
    };

    pub const ALL: [RecordKind; 2] = [Self::TAX_LOT, Self::PROPERTY];

    /// Resolves `taxlot`, `tax_lot`, `property` and the plural resource names.
    pub fn parse(value: &str) -> Option<RecordKind> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|kind| {
            normalized == kind.item_type
                || normalized == kind.resource
                || normalized.replace('_', "") == kind.item_type
        })
    }

    pub fn is_fixed_field(&self, name: &str) -> bool {
        self.fixed_fields.iter().any(|field| *field == name)
    }

    pub fn is_date_column(&self, name: &str) -> bool {
        self.date_columns.iter().any(|field| *field == name)
    }

    /// Detail endpoint for one record in a cycle.
    pub fn detail_path(&self, id: i64, cycle_id: i64) -> String {
        format!("/api/v2/{}/{}/?cycle_id={}", self.resource, id, cycle_id)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.item_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(RecordKind::parse("taxlot"), Some(RecordKind::TAX_LOT));
        assert_eq!(RecordKind::parse("Tax Lot"), Some(RecordKind::TAX_LOT));
        assert_eq!(RecordKind::parse("tax-lot"), Some(RecordKind::TAX_LOT));
        assert_eq!(RecordKind::parse("taxlots"), Some(RecordKind::TAX_LOT));
        assert_eq!(RecordKind::parse("properties"), Some(RecordKind::PROPERTY));
        assert_eq!(RecordKind::parse("meter"), None);
    }

    #[test]
    fn test_field_membership() {
        assert!(RecordKind::TAX_LOT.is_fixed_field("block_number"));
        assert!(!RecordKind::TAX_LOT.is_fixed_field("year_built"));
        assert!(RecordKind::PROPERTY.is_fixed_field("year_built"));
        assert!(RecordKind::PROPERTY.is_date_column("recent_sale_date"));
        assert!(!RecordKind::TAX_LOT.is_date_column("year_built"));
    }

    #[test]
    fn test_detail_path() {
        assert_eq!(
            RecordKind::TAX_LOT.detail_path(12, 3),
            "/api/v2/taxlots/12/?cycle_id=3"
        );
    }
}
