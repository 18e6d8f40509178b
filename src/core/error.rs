use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetailError {
    #[error("{kind} {id} not found in cycle {cycle_id}")]
    NotFound {
        kind: String,
        id: i64,
        cycle_id: i64,
    },

    #[error("Store rejected update: {0}")]
    StoreRejected(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Reserved field '{field}': {reason}")]
    ReservedField { field: String, reason: String },

    #[error("Record is read-only: {0}")]
    ReadOnly(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, DetailError>;

impl DetailError {
    pub fn reserved(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ReservedField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Store-side failures, as opposed to problems with the session's own data.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::StoreRejected(_) | Self::StoreUnavailable(_)
        )
    }
}

impl From<serde_json::Error> for DetailError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

impl From<std::io::Error> for DetailError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_classification() {
        assert!(DetailError::StoreRejected("409".into()).is_store_failure());
        assert!(
            DetailError::NotFound {
                kind: "taxlot".into(),
                id: 1,
                cycle_id: 2
            }
            .is_store_failure()
        );
        assert!(!DetailError::reserved("id", "changed").is_store_failure());
    }

    #[test]
    fn test_messages() {
        let err = DetailError::reserved("hash_object", "is read-only");
        assert_eq!(err.to_string(), "Reserved field 'hash_object': is read-only");

        let err = DetailError::NotFound {
            kind: "taxlot".into(),
            id: 7,
            cycle_id: 3,
        };
        assert_eq!(err.to_string(), "taxlot 7 not found in cycle 3");
    }

    #[test]
    fn test_from_serde_error() {
        let err: DetailError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, DetailError::InvalidPayload(_)));
    }
}
