use thiserror::Error;

/// Errors surfaced by the tracker. None of them are fatal to the shell.
#[derive(Error, Debug)]
pub enum DietError {
    #[error("{what} {index} not found")]
    NotFound { what: &'static str, index: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no data: {0}")]
    NoData(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DietError {
    pub fn not_found(what: &'static str, index: impl ToString) -> Self {
        Self::NotFound {
            what,
            index: index.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, DietError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diet_error_display() {
        let err = DietError::not_found("historic record", 4);
        assert_eq!(err.to_string(), "historic record 4 not found");
        assert!(err.is_not_found());

        let err = DietError::not_found("restaurant", "wendys");
        assert_eq!(err.to_string(), "restaurant wendys not found");

        let err = DietError::InvalidInput("expected a number, got \"abc\"".to_string());
        assert_eq!(err.to_string(), "invalid input: expected a number, got \"abc\"");
        assert!(!err.is_not_found());

        let err = DietError::NoData("no biometric data available".to_string());
        assert_eq!(err.to_string(), "no data: no biometric data available");
    }
}
