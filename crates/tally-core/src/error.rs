use tally_domain::ParseKindError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Amount required: a positive total or per-unit amount must be supplied")]
    AmountRequired,
    #[error("Invalid unit count: {0}")]
    InvalidUnitCount(String),
    #[error("Invalid commitment kind: {0}")]
    InvalidKind(String),
    #[error("Billing configuration missing: {0}")]
    BillerConfigMissing(String),
    #[error("Ledger category missing for commitment `{0}`")]
    LedgerCategoryMissing(String),
    #[error("Commitment not found: {0}")]
    CommitmentNotFound(Uuid),
    #[error("Obligation not found: {0}")]
    ObligationNotFound(Uuid),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Boundary classes that callers map onto their own response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadInput,
    NotFound,
    Internal,
}

impl CoreError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CoreError::AmountRequired
            | CoreError::InvalidUnitCount(_)
            | CoreError::InvalidKind(_)
            | CoreError::BillerConfigMissing(_)
            | CoreError::LedgerCategoryMissing(_)
            | CoreError::Validation(_) => ErrorClass::BadInput,
            CoreError::CommitmentNotFound(_) | CoreError::ObligationNotFound(_) => {
                ErrorClass::NotFound
            }
            CoreError::Storage(_) | CoreError::Serde(_) | CoreError::Io(_) => {
                ErrorClass::Internal
            }
        }
    }

    /// Wraps a store failure with the id of the record being processed.
    pub fn in_context(self, context: impl std::fmt::Display) -> Self {
        match self {
            CoreError::Storage(message) => CoreError::Storage(format!("{context}: {message}")),
            CoreError::Serde(message) => CoreError::Serde(format!("{context}: {message}")),
            CoreError::Io(err) => CoreError::Storage(format!("{context}: {err}")),
            other => other,
        }
    }
}

impl From<ParseKindError> for CoreError {
    fn from(err: ParseKindError) -> Self {
        CoreError::InvalidKind(err.0)
    }
}
