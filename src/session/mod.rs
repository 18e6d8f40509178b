//! Edit/save/restore lifecycle of one record's detail page.
//!
//! A session starts in view mode. `enter_edit` snapshots the record, `cancel` puts the
//! snapshot back, `save` sends the edited state to the [`RecordStore`]:
//!
//! ```text
//! view --enter_edit--> edit
//! edit --cancel------> view
//! edit --save [ok]---> view
//! edit --save [err]--> edit   (edits kept)
//! ```
//!
//! `save` takes `&mut self`, so a session never has two updates in flight.

mod loader;

pub use loader::{SessionLoader, date_columns_for};

use crate::config::SessionConfig;
use crate::core::{DetailError, Record, RecordState, Result};
use crate::display::{DisplayField, derive_display_fields};
use crate::format::DateFormatter;
use crate::kind::RecordKind;
use crate::labels::{Label, LabelSet};
use crate::schema::{ColumnDescriptor, ColumnSchema};
use crate::signals::{SessionSignal, SignalBus};
use crate::store::{RecordStore, UpdateRequest};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{Instrument, Level, event, info_span};
use uuid::Uuid;

/// Edit mode owns the snapshot, so there is no edit mode without one.
#[derive(Debug, Clone)]
enum Mode {
    View,
    Edit { original: Box<Record> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    View,
    Edit,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View => write!(f, "view"),
            Self::Edit => write!(f, "edit"),
        }
    }
}

/// Result of a mode change request. `Ignored` means the session was already in the
/// target mode, or the request does not apply to the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The store accepted the update; the session is back in view mode.
    Saved,
    /// Validation or the store failed; the session is still editing with edits intact.
    Failed(DetailError),
    /// `save` was called in view mode. Nothing was sent and no signal was emitted.
    NotEditing,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }

    pub fn error(&self) -> Option<&DetailError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

pub struct RecordDetailSession {
    id: Uuid,
    kind: RecordKind,
    record: Record,
    schema: ColumnSchema,
    visible: Vec<ColumnDescriptor>,
    date_columns: Vec<String>,
    labels: LabelSet,
    mode: Mode,
    store: Arc<dyn RecordStore>,
    signals: SignalBus,
    formatter: DateFormatter,
    config: SessionConfig,
}

impl RecordDetailSession {
    /// Sets up a session in view mode. Date columns found in the record are rewritten
    /// to the configured display format; values that are not dates stay as they are.
    pub fn initialize<S: AsRef<str>>(
        kind: RecordKind,
        mut record: Record,
        schema: ColumnSchema,
        date_columns: &[S],
        store: Arc<dyn RecordStore>,
        config: SessionConfig,
    ) -> Self {
        let formatter = config.date_formatter();
        let date_columns: Vec<String> = date_columns
            .iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        let formatted = formatter.format_date_values(&mut record.state, &date_columns);
        let visible = schema.default_columns();
        let id = Uuid::new_v4();

        event!(
            Level::DEBUG,
            session = %id,
            kind = %kind,
            record = %record.id,
            formatted,
            visible = visible.len(),
            "detail session initialized"
        );

        Self {
            id,
            kind,
            record,
            schema,
            visible,
            date_columns,
            labels: LabelSet::default(),
            mode: Mode::View,
            store,
            signals: SignalBus::new(config.signal_capacity),
            formatter,
            config,
        }
    }

    pub fn with_labels(mut self, labels: LabelSet) -> Self {
        self.labels = labels;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn state(&self) -> &RecordState {
        &self.record.state
    }

    /// Snapshot taken by `enter_edit`, present only while editing.
    pub fn original(&self) -> Option<&Record> {
        match &self.mode {
            Mode::View => None,
            Mode::Edit { original } => Some(original.as_ref()),
        }
    }

    pub fn mode(&self) -> SessionMode {
        match self.mode {
            Mode::View => SessionMode::View,
            Mode::Edit { .. } => SessionMode::Edit,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Edit { .. })
    }

    pub fn is_saving(&self) -> bool {
        self.signals.is_saving()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.original().is_some_and(|original| *original != self.record)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn column_schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn date_columns(&self) -> &[String] {
        &self.date_columns
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn applied_labels(&self) -> Vec<&Label> {
        self.labels.applied_to(self.record.id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.signals.subscribe()
    }

    /// Page title, followed by the record's identity value when it has one.
    pub fn heading(&self) -> String {
        match self.record.state.get(self.kind.identity_field) {
            Some(JsonValue::String(s)) if !s.trim().is_empty() => {
                format!("{}: {}", self.kind.page_title, s.trim())
            }
            Some(JsonValue::Number(n)) => format!("{}: {}", self.kind.page_title, n),
            _ => self.kind.page_title.to_string(),
        }
    }

    // ========================================================================
    // Display fields
    // ========================================================================

    pub fn visible_columns(&self) -> &[ColumnDescriptor] {
        &self.visible
    }

    /// Shows the named columns, in the given order. Unknown names are skipped; the
    /// number of columns now visible is returned.
    pub fn set_visible_columns<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        self.visible = self.schema.subset(names);
        self.visible.len()
    }

    pub fn show_default_columns(&mut self) {
        self.visible = self.schema.default_columns();
    }

    pub fn show_all_columns(&mut self) {
        self.visible = self.schema.columns().to_vec();
    }

    pub fn derive_display_fields(&self, columns: &[ColumnDescriptor]) -> Vec<DisplayField> {
        derive_display_fields(&self.record.state, columns)
    }

    /// Display fields of the visible columns, computed from the current state.
    pub fn display_fields(&self) -> Vec<DisplayField> {
        self.derive_display_fields(&self.visible)
    }

    // ========================================================================
    // Edit lifecycle
    // ========================================================================

    /// Snapshots the record and switches to edit mode. Calling it again while editing
    /// keeps the first snapshot.
    pub fn enter_edit(&mut self) -> Result<Transition> {
        if !self.record.user_role.can_edit() {
            return Err(DetailError::ReadOnly(format!(
                "{} role cannot edit {} {}",
                self.record.user_role, self.kind, self.record.id
            )));
        }
        if self.is_editing() {
            return Ok(Transition::Ignored);
        }
        self.mode = Mode::Edit {
            original: Box::new(self.record.clone()),
        };
        event!(Level::DEBUG, session = %self.id, "entered edit mode");
        Ok(Transition::Applied)
    }

    /// Puts the snapshot back and leaves edit mode.
    pub fn cancel(&mut self) -> Transition {
        match std::mem::replace(&mut self.mode, Mode::View) {
            Mode::Edit { original } => {
                self.record = *original;
                event!(Level::DEBUG, session = %self.id, "edits discarded");
                Transition::Applied
            }
            Mode::View => Transition::Ignored,
        }
    }

    /// Working state, only while editing.
    pub fn state_mut(&mut self) -> Option<&mut RecordState> {
        match self.mode {
            Mode::Edit { .. } => Some(&mut self.record.state),
            Mode::View => None,
        }
    }

    pub fn set_field(&mut self, name: &str, value: JsonValue) -> Result<Option<JsonValue>> {
        let state = self.editable_state()?;
        Ok(state.set(name, value))
    }

    pub fn set_extra_field(&mut self, name: &str, value: JsonValue) -> Result<Option<JsonValue>> {
        let state = self.editable_state()?;
        state.set_extra(name, value)
    }

    fn editable_state(&mut self) -> Result<&mut RecordState> {
        let kind = self.kind;
        let id = self.record.id;
        self.state_mut()
            .ok_or_else(|| DetailError::ReadOnly(format!("{kind} {id} is not in edit mode")))
    }

    /// Sends the edited state to the store.
    ///
    /// In edit mode exactly one `SavingStarted` and one `SavingFinished` are emitted,
    /// whatever the outcome. Failures are logged and returned, never raised.
    pub async fn save(&mut self) -> SaveOutcome {
        if !self.is_editing() {
            return SaveOutcome::NotEditing;
        }
        let span = info_span!(
            "record_detail.save",
            session = %self.id,
            kind = %self.kind,
            id = %self.record.id,
            cycle = %self.record.cycle.id
        );
        self.run_save().instrument(span).await
    }

    async fn run_save(&mut self) -> SaveOutcome {
        let Mode::Edit { original } = &self.mode else {
            return SaveOutcome::NotEditing;
        };
        let saving = self.signals.begin_saving();

        if self.config.validate_reserved_fields {
            if let Err(err) = self.record.state.validate_reserved(&self.kind, &original.state) {
                drop(saving);
                event!(Level::WARN, error = %err, "edited state failed validation");
                return SaveOutcome::Failed(err);
            }
        }

        let request = UpdateRequest::for_record(self.kind, &self.record);
        let result = self.store.update(request).await;
        drop(saving);

        match result {
            Ok(mut stored) => {
                if self.config.adopt_store_response {
                    self.formatter
                        .format_date_values(&mut stored.state, &self.date_columns);
                    stored.user_role = self.record.user_role;
                    self.record = stored;
                }
                self.mode = Mode::View;
                event!(Level::INFO, "record saved");
                SaveOutcome::Saved
            }
            Err(err) => {
                if err.is_store_failure() {
                    event!(Level::ERROR, error = %err, "record update failed");
                } else {
                    event!(Level::WARN, error = %err, "record update returned unusable data");
                }
                SaveOutcome::Failed(err)
            }
        }
    }
}

impl fmt::Debug for RecordDetailSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDetailSession")
            .field("id", &self.id)
            .field("kind", &self.kind.item_type)
            .field("record", &self.record.id)
            .field("mode", &self.mode())
            .field("saving", &self.is_saving())
            .finish_non_exhaustive()
    }
}
