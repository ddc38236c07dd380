//! Repository utilities.

use std::error::Error;

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};

use super::pool::DieselError;

/// Error info for failures raised outside SQLite, such as opening the file.
#[derive(Debug)]
pub struct StoreErrorInfo {
    message: String,
    details: Option<String>,
}

impl StoreErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn into_diesel(self) -> DieselError {
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, Box::new(self))
    }
}

impl DatabaseErrorInformation for StoreErrorInfo {
    fn message(&self) -> &str {
        &self.message
    }
    fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
    fn hint(&self) -> Option<&str> {
        None
    }
    fn table_name(&self) -> Option<&str> {
        None
    }
    fn column_name(&self) -> Option<&str> {
        None
    }
    fn constraint_name(&self) -> Option<&str> {
        None
    }
    fn statement_position(&self) -> Option<i32> {
        None
    }
}

/// Convert any displayable error to a diesel error with its message.
pub fn to_diesel_error(e: impl std::fmt::Display) -> DieselError {
    StoreErrorInfo::new(e.to_string()).into_diesel()
}

/// Convert a failure to open `database` into a diesel error.
///
/// The message carries the whole source chain, the details name the file.
pub fn connection_error(e: &(dyn Error + 'static), database: &str) -> DieselError {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(src) = source {
        message = format!("{}: {}", message, src);
        source = src.source();
    }

    StoreErrorInfo::new(message)
        .with_details(format!("database: {}", database))
        .into_diesel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("cannot open store")]
    struct OpenFailed(#[source] std::io::Error);

    fn info(err: DieselError) -> (String, Option<String>) {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::Unknown, info) => (
                info.message().to_string(),
                info.details().map(str::to_string),
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_to_diesel_error_keeps_message() {
        let (message, details) = info(to_diesel_error("disk full"));
        assert_eq!(message, "disk full");
        assert!(details.is_none());
    }

    #[test]
    fn test_connection_error_walks_sources() {
        let err = OpenFailed(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
        ));
        let (message, details) = info(connection_error(&err, "/srv/census.db"));
        assert_eq!(message, "cannot open store: permission denied");
        assert_eq!(details.as_deref(), Some("database: /srv/census.db"));
    }
}
