//! Repository error type.

use polyroll_core::material::MaterialError;
use polyroll_core::orders::OrderError;
use polyroll_core::payables::PayablesError;
use polyroll_core::raw_material::RawMaterialError;
use polyroll_core::receivables::AllocationError;
use polyroll_core::statement::{ExportError, StatementError};
use polyroll_shared::AppError;
use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

/// Error types for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Requested id.
        id: Uuid,
    },

    /// Input rejected before any write.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Material ledger rule violated.
    #[error(transparent)]
    Material(#[from] MaterialError),

    /// Order rule violated.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Raw-material rule violated.
    #[error(transparent)]
    RawMaterial(#[from] RawMaterialError),

    /// Allocation rule violated.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Supplier payment rule violated.
    #[error(transparent)]
    Payables(#[from] PayablesError),

    /// Statement could not be built.
    #[error(transparent)]
    Statement(#[from] StatementError),

    /// Export could not be written.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// A unique constraint rejected the write.
    #[error("Integrity violation on {entity}: {detail}")]
    Integrity {
        /// Table or entity the constraint guards.
        entity: &'static str,
        /// Message reported by the store.
        detail: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Maps a unique-constraint violation to `Integrity`, anything else to `Database`.
    pub(crate) fn from_write(entity: &'static str, err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::Integrity { entity, detail },
            _ => Self::Database(err),
        }
    }

    /// Returns true for errors the caller can fix by changing the input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Material(_)
                | Self::Order(_)
                | Self::RawMaterial(_)
                | Self::Allocation(_)
                | Self::Payables(_)
                | Self::Statement(_)
        )
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Material(e) => e.error_code(),
            Self::Order(e) => e.error_code(),
            Self::RawMaterial(e) => e.error_code(),
            Self::Allocation(e) => e.error_code(),
            Self::Payables(e) => e.error_code(),
            Self::Statement(e) => e.error_code(),
            Self::Export(e) => e.error_code(),
            Self::Integrity { .. } => "INTEGRITY_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => Self::NotFound(err.to_string()),
            RepositoryError::Order(OrderError::InsufficientMaterial { .. }) => {
                Self::BusinessRule(err.to_string())
            }
            RepositoryError::Integrity { .. } => Self::Integrity(err.to_string()),
            RepositoryError::Export(_) => Self::Internal(err.to_string()),
            RepositoryError::Database(_) => Self::Database(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let not_found = RepositoryError::NotFound {
            entity: "order",
            id: Uuid::nil(),
        };
        assert_eq!(AppError::from(not_found).status_code(), 404);

        let integrity = RepositoryError::Integrity {
            entity: "material_ledger_entries",
            detail: "duplicate".into(),
        };
        assert_eq!(AppError::from(integrity).error_code(), "INTEGRITY_VIOLATION");

        let allocation = RepositoryError::Allocation(AllocationError::NegativeAmount);
        assert!(allocation.is_validation());
        assert_eq!(AppError::from(allocation).status_code(), 400);
    }

    #[test]
    fn test_non_unique_errors_stay_database_errors() {
        let err = RepositoryError::from_write("payments", DbErr::Custom("boom".into()));
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
