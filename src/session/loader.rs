use super::RecordDetailSession;
use crate::config::SessionConfig;
use crate::core::{CycleId, RecordId, Result};
use crate::kind::RecordKind;
use crate::labels::{LabelProvider, LabelSet};
use crate::schema::{ColumnSchema, ColumnSchemaProvider};
use crate::store::RecordStore;
use std::sync::Arc;
use tracing::{Instrument, info_span};

/// Opens detail sessions by fetching the record, its column schema and its labels.
#[derive(Clone)]
pub struct SessionLoader {
    store: Arc<dyn RecordStore>,
    columns: Arc<dyn ColumnSchemaProvider>,
    labels: Option<Arc<dyn LabelProvider>>,
    config: SessionConfig,
}

impl SessionLoader {
    pub fn new(store: Arc<dyn RecordStore>, columns: Arc<dyn ColumnSchemaProvider>) -> Self {
        Self {
            store,
            columns,
            labels: None,
            config: SessionConfig::default(),
        }
    }

    pub fn labels(mut self, provider: Arc<dyn LabelProvider>) -> Self {
        self.labels = Some(provider);
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn open(
        &self,
        kind: RecordKind,
        id: RecordId,
        cycle_id: CycleId,
    ) -> Result<RecordDetailSession> {
        self.config.validate()?;
        let span = info_span!("record_detail.open", kind = %kind, id = %id, cycle = %cycle_id);

        async {
            let record = self.store.fetch(&kind, id, cycle_id).await?;
            let schema = self.columns.column_schema(&kind).await?;
            schema.validate()?;
            let labels = match &self.labels {
                Some(provider) => provider.labels(&kind, &record).await?,
                None => LabelSet::default(),
            };
            let date_columns = date_columns_for(&kind, &schema);

            Ok(RecordDetailSession::initialize(
                kind,
                record,
                schema,
                &date_columns,
                self.store.clone(),
                self.config.clone(),
            )
            .with_labels(labels))
        }
        .instrument(span)
        .await
    }
}

/// Built-in date columns of the kind followed by the schema's date-typed columns.
pub fn date_columns_for(kind: &RecordKind, schema: &ColumnSchema) -> Vec<String> {
    let mut columns: Vec<String> = kind.date_columns.iter().map(|c| c.to_string()).collect();
    for name in schema.date_column_names() {
        if !columns.contains(&name) {
            columns.push(name);
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDataType, ColumnDescriptor};

    #[test]
    fn test_date_columns_merge_without_duplicates() {
        let schema = ColumnSchema::new(vec![
            ColumnDescriptor::new("release_date", "Release Date").data_type(ColumnDataType::Date),
            ColumnDescriptor::new("Permit Issued", "")
                .data_type(ColumnDataType::Datetime)
                .extra_data(),
            ColumnDescriptor::new("city", "City"),
        ]);
        assert_eq!(
            date_columns_for(&RecordKind::TAX_LOT, &schema),
            vec!["generation_date", "release_date", "Permit Issued"]
        );
    }
}
