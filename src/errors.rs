use tally_config::ConfigError;
use tally_core::{CoreError, ErrorClass};
use thiserror::Error;

/// Errors surfaced by the [`crate::Tally`] facade.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TallyError {
    /// Boundary class for callers mapping failures onto their own responses.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Core(err) => err.class(),
            Self::Config(_) => ErrorClass::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn core_errors_keep_their_class() {
        let err = TallyError::from(CoreError::CommitmentNotFound(Uuid::new_v4()));
        assert_eq!(err.class(), ErrorClass::NotFound);

        let err = TallyError::from(CoreError::AmountRequired);
        assert_eq!(err.class(), ErrorClass::BadInput);
    }

    #[test]
    fn config_errors_are_internal() {
        let err = TallyError::from(ConfigError::Serde("bad".into()));
        assert_eq!(err.class(), ErrorClass::Internal);
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
