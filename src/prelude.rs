//! Everything a detail page needs, in one import.
//!
//! ```
//! use record_detail::prelude::*;
//! ```

pub use crate::{
    ColumnDataType, ColumnDescriptor, ColumnSchema, ColumnSchemaProvider, Cycle, CycleId,
    DetailError, DisplayField, DisplayValue, InMemoryRecordStore, Label, LabelProvider, LabelSet,
    OrgId, Record, RecordDetailSession, RecordId, RecordKind, RecordState, RecordStore,
    SaveOutcome, SessionConfig, SessionLoader, SessionMode, SessionSignal, StaticColumnSchema,
    StaticLabels, Transition, UpdateRequest, UserRole,
};
