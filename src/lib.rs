// ============================================================================
// record_detail Library
// ============================================================================

//! Detail-page session for tax lot and property records.
//!
//! A [`RecordDetailSession`] holds one record, derives display fields from a column
//! schema, normalizes date columns, and runs the edit / cancel / save lifecycle
//! against a [`RecordStore`].
//!
//! # Examples
//!
//! ```
//! use record_detail::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryRecordStore::new());
//! let record = Record::new(
//!     1,
//!     Cycle::new(9),
//!     4,
//!     RecordState::from_json(json!({"address_line_1": "123 Main", "year_built": 1990}))?,
//! );
//! store.insert(&RecordKind::TAX_LOT, record.clone()).await;
//!
//! let schema = ColumnSchema::new(vec![ColumnDescriptor::new("address_line_1", "Address")]);
//! let mut session = RecordDetailSession::initialize(
//!     RecordKind::TAX_LOT,
//!     record,
//!     schema,
//!     RecordKind::TAX_LOT.date_columns,
//!     store,
//!     SessionConfig::default(),
//! );
//!
//! session.enter_edit()?;
//! session.set_field("address_line_1", json!("456 Oak"))?;
//! assert!(session.save().await.is_saved());
//! assert_eq!(session.display_fields()[0].value.to_string(), "456 Oak");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod display;
pub mod format;
pub mod kind;
pub mod labels;
pub mod prelude;
pub mod schema;
pub mod session;
pub mod signals;
pub mod store;

// Re-export main types for convenience
pub use config::SessionConfig;
pub use crate::core::{
    Cycle, CycleId, DetailError, OrgId, Record, RecordId, RecordState, Result, UserRole,
};
pub use display::{DisplayField, DisplayValue, derive_display_fields};
pub use format::DateFormatter;
pub use kind::RecordKind;
pub use labels::{Label, LabelProvider, LabelSet, StaticLabels};
pub use schema::{
    ColumnDataType, ColumnDescriptor, ColumnSchema, ColumnSchemaProvider, StaticColumnSchema,
};
pub use session::{
    RecordDetailSession, SaveOutcome, SessionLoader, SessionMode, Transition, date_columns_for,
};
pub use signals::{SessionSignal, SignalBus};
pub use store::{InMemoryRecordStore, RecordStore, UpdateRequest};
