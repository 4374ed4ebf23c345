//! Translation of pool and Diesel failures into [`RepositoryError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Pool failures mean the store cannot be reached.
pub(crate) fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::unavailable(message)
        }
    }
}

/// Map Diesel failures, logging driver detail at debug level only.
pub(crate) fn map_diesel_error(error: DieselError) -> RepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            RepositoryError::conflict("record already exists")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
            let constraint = info.constraint_name().unwrap_or("check").to_owned();
            RepositoryError::validation(format!("constraint {constraint} violated"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::unavailable("database connection error")
        }
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        _ => RepositoryError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PoolError::checkout("timed out"))]
    #[case(PoolError::build("bad url"))]
    fn pool_errors_are_unavailable(#[case] error: PoolError) {
        assert!(matches!(
            map_pool_error(error),
            RepositoryError::Unavailable { .. }
        ));
    }

    #[rstest]
    fn unique_violation_is_conflict() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );
        assert_eq!(
            map_diesel_error(error),
            RepositoryError::conflict("record already exists")
        );
    }

    #[rstest]
    fn closed_connection_is_unavailable() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );
        assert!(matches!(
            map_diesel_error(error),
            RepositoryError::Unavailable { .. }
        ));
    }

    #[rstest]
    fn other_failures_are_query_errors() {
        assert!(matches!(
            map_diesel_error(DieselError::RollbackTransaction),
            RepositoryError::Query { .. }
        ));
    }
}
