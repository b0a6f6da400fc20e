use crate::{
    Error,
    error::{StorageError, ValidationError},
};

/// Maps any displayable storage failure into [`StorageError::Database`].
///
/// ```rust,ignore
/// use sesame_core::error::utilities::DatabaseResultExt;
///
/// sqlx::query("DELETE FROM magic_credentials")
///     .execute(&pool)
///     .await
///     .map_db_err()?;
/// ```
pub trait DatabaseResultExt<T> {
    fn map_db_err(self) -> Result<T, Error>;

    fn map_db_err_with_context(self, context: &str) -> Result<T, Error>;
}

impl<T, E: std::fmt::Display> DatabaseResultExt<T> for Result<T, E> {
    fn map_db_err(self) -> Result<T, Error> {
        self.map_err(|e| Error::Storage(StorageError::Database(e.to_string())))
    }

    fn map_db_err_with_context(self, context: &str) -> Result<T, Error> {
        self.map_err(|e| Error::Storage(StorageError::Database(format!("{context}: {e}"))))
    }
}

/// Turns a missing builder field into [`ValidationError::MissingField`].
pub trait RequiredFieldExt<T> {
    fn require_field(self, field_name: &str) -> Result<T, ValidationError>;
}

impl<T> RequiredFieldExt<T> for Option<T> {
    fn require_field(self, field_name: &str) -> Result<T, ValidationError> {
        self.ok_or_else(|| ValidationError::MissingField(format!("{field_name} is required")))
    }
}
