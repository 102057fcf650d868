use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::DbError;

/// How a connection authenticates against the data store.
pub enum ConnectionAuth {
    /// The end user's access token taken from the request.
    Delegated(SecretString),
    /// The process identity, via the service connection string.
    ServiceIdentity,
}

impl ConnectionAuth {
    #[must_use]
    pub fn mode(&self) -> AuthMode {
        match self {
            Self::Delegated(_) => AuthMode::Delegated,
            Self::ServiceIdentity => AuthMode::ServiceIdentity,
        }
    }
}

impl std::fmt::Debug for ConnectionAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mode().as_str())
    }
}

/// Secret-free label of a [`ConnectionAuth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Delegated,
    ServiceIdentity,
}

impl AuthMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delegated => "delegated",
            Self::ServiceIdentity => "service_identity",
        }
    }
}

/// Everything a [`Connector`] needs to open one connection.
#[derive(Debug)]
pub struct ConnectionRequest {
    pub connection_string: String,
    pub auth: ConnectionAuth,
}

/// Connection handle of the in-process store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    id: u64,
    auth: AuthMode,
}

impl Connection {
    #[must_use]
    pub fn new(id: u64, auth: AuthMode) -> Self {
        Self { id, auth }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn auth(&self) -> AuthMode {
        self.auth
    }
}

/// Driver seam for opening connections.
///
/// Implementations hand the request's credential to the driver and report a
/// refused delegated token as [`DbError::CredentialRejected`].
#[async_trait]
pub trait Connector: Send + Sync {
    /// Driver connection handed back to the repository.
    type Connection: Send;

    async fn connect(&self, request: &ConnectionRequest) -> Result<Self::Connection, DbError>;
}

/// Connector for in-process storage that accepts every credential.
#[derive(Debug, Default)]
pub struct InMemoryConnector {
    next_id: AtomicU64,
}

impl InMemoryConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    type Connection = Connection;

    async fn connect(&self, request: &ConnectionRequest) -> Result<Connection, DbError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(Connection::new(id, request.auth.mode()))
    }
}
