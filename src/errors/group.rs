//! Question group error types
//!
//! ```rust
//! use survey_groups::errors::GroupError;
//!
//! let err = GroupError::MissingTranslation("fr".to_string());
//! assert!(err.is_client_error());
//! assert_eq!(err.error_code(), "VALIDATION_FAILED");
//! ```

use thiserror::Error;

use super::FieldErrors;

#[derive(Error, Debug)]
pub enum GroupError {
    /// Survey not found by ID
    #[error("Survey {0} not found")]
    SurveyNotFound(i32),

    /// No row for this group in the requested language
    #[error("Question group {gid} not found for language '{language}'")]
    GroupNotFound {
        /// Group identifier
        gid: i32,
        /// Language code
        language: String,
    },

    /// A survey language has no group attributes in the input
    #[error("No question group data supplied for survey language '{0}'")]
    MissingTranslation(String),

    /// The input map was empty
    #[error("No question group data supplied")]
    EmptyInput,

    /// Field-level validation failures
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl GroupError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, GroupError::Database(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GroupError::SurveyNotFound(_) | GroupError::GroupNotFound { .. }
        )
    }

    /// Field errors carried by a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            GroupError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GroupError::SurveyNotFound(_) | GroupError::GroupNotFound { .. } => "NOT_FOUND",
            GroupError::MissingTranslation(_)
            | GroupError::EmptyInput
            | GroupError::Validation(_) => "VALIDATION_FAILED",
            GroupError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<FieldErrors> for GroupError {
    fn from(errors: FieldErrors) -> Self {
        GroupError::Validation(errors)
    }
}
