pub mod error;
pub mod state;
pub mod types;

pub use error::{DetailError, Result};
pub use state::{EXTRA_DATA_KEY, RecordState, SYSTEM_FIELDS};
pub use types::{Cycle, CycleId, OrgId, Record, RecordId, UserRole};
