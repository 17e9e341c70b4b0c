use thiserror::Error;

/// Coarse classification of a storage failure, used by the HTTP layer to pick
/// a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    NotFound,
    Conflict,
    Unavailable,
    Internal,
}

/// A failed storage operation. `op` names the operation that failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{op}: record not found")]
    NotFound { op: &'static str },

    #[error("{op}: constraint violation: {source}")]
    Conflict {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{op}: database unavailable: {source}")]
    Unavailable {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{op}: {source}")]
    Internal {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StorageError {
    pub fn from_sqlx(op: &'static str, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StorageError::NotFound { op },
            sqlx::Error::Database(db)
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                StorageError::Conflict { op, source: err }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StorageError::Unavailable { op, source: err },
            _ => StorageError::Internal { op, source: err },
        }
    }

    pub fn kind(&self) -> StorageErrorKind {
        match self {
            StorageError::NotFound { .. } => StorageErrorKind::NotFound,
            StorageError::Conflict { .. } => StorageErrorKind::Conflict,
            StorageError::Unavailable { .. } => StorageErrorKind::Unavailable,
            StorageError::Internal { .. } => StorageErrorKind::Internal,
        }
    }

    pub fn op(&self) -> &'static str {
        match self {
            StorageError::NotFound { op }
            | StorageError::Conflict { op, .. }
            | StorageError::Unavailable { op, .. }
            | StorageError::Internal { op, .. } => op,
        }
    }
}
