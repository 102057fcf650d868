/// Errors raised while opening or using data-store connections.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The data store refused the delegated credential.
    #[error("data store rejected the delegated credential")]
    CredentialRejected,

    /// The data store could not be reached.
    #[error("data store unavailable: {0}")]
    Unavailable(String),

    /// The configured connection string cannot be used by the driver.
    #[error("invalid connection string: {0}")]
    Config(String),

    /// A statement failed on an open connection.
    #[error("data store query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("schema migration failed: {0}")]
    Migration(String),
}
