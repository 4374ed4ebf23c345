//! Error vocabulary shared by the entity repositories.

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Failures raised by user and post repository adapters.
    ///
    /// `Unavailable` means the store could not be reached; callers must not
    /// read it as "no data".
    pub enum RepositoryError {
        /// No record exists at the addressed key.
        NotFound { entity: String } => "{entity} not found",
        /// A record already exists at the requested identity.
        Conflict { message: String } => "conflict: {message}",
        /// Input or stored data failed validation.
        Validation { message: String } => "validation failed: {message}",
        /// The store could not be reached.
        Unavailable { message: String } => "store unavailable: {message}",
        /// The store rejected or failed the operation.
        Query { message: String } => "store query failed: {message}",
    }
}

impl From<RepositoryError> for Error {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound { entity } => Self::not_found(format!("{entity} not found")),
            RepositoryError::Conflict { message } => Self::conflict(message),
            RepositoryError::Validation { message } => Self::invalid_request(message),
            RepositoryError::Unavailable { message } => Self::service_unavailable(message),
            RepositoryError::Query { message } => Self::internal(message),
        }
    }
}
