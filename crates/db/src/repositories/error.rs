//! Repository error type.

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

use clubdesk_core::booking::{BookingError, ErrorKind};
use clubdesk_shared::AppError;
use clubdesk_shared::types::UnitId;

/// SQLSTATE raised by Postgres when a serializable transaction loses a race.
const SERIALIZATION_FAILURE: &str = "40001";

/// Name of the partial unique index over active booking claims.
pub const CLAIMS_UNIQUE_INDEX: &str = "uq_booking_claims_active";

/// Error types for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Domain rule violated.
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Booking(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Booking(err) => err.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns true for availability and concurrency conflicts.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Booking(err) if err.kind() == ErrorKind::Conflict)
    }

    /// Turns constraint and serialization failures from a booking write into
    /// the domain errors they stand for.
    #[must_use]
    pub(crate) fn classify(self, units: &[UnitId]) -> Self {
        match self {
            Self::Database(err) => classify_db_error(err, units),
            other => other,
        }
    }
}

fn classify_db_error(err: DbErr, units: &[UnitId]) -> RepositoryError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err()
        && message.contains(CLAIMS_UNIQUE_INDEX)
    {
        return RepositoryError::Booking(BookingError::DoubleBooked {
            unit: join_units(units),
        });
    }
    if sqlstate(&err).as_deref() == Some(SERIALIZATION_FAILURE) {
        return RepositoryError::Booking(BookingError::ConcurrentModification);
    }
    RepositoryError::Database(err)
}

fn sqlstate(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime) => runtime,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx_err) => sqlx_err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned()),
        RuntimeErr::Internal(_) => None,
    }
}

fn join_units(units: &[UnitId]) -> String {
    units
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Booking(err) => err.into(),
            RepositoryError::Database(err) => Self::Database(err.to_string()),
        }
    }
}
