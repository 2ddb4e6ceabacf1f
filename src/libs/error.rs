use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("table `{0}` already exists")]
    SchemaConflict(String),

    #[error("table `{0}` does not exist")]
    NotFound(String),

    #[error("cannot reach schema store: {0}")]
    ConnectivityFailure(#[source] sqlx::Error),

    #[error("schema store not connected")]
    NotConnected,

    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported database url `{0}`")]
    UnsupportedBackend(String),

    #[error("unrecognized column type `{0}`")]
    UnknownColumnType(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for MigrationError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => MigrationError::ConnectivityFailure(err),
            other => MigrationError::Database(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
