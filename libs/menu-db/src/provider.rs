use std::sync::Arc;

use menu_security::credential;

use crate::config::DatabaseConfig;
use crate::connector::{ConnectionAuth, ConnectionRequest, Connector, InMemoryConnector};
use crate::error::DbError;

/// Process-wide connection factory.
///
/// Holds no per-request state. The credential for each connection is read
/// from the current request scope at the moment [`DbProvider::open`] runs.
pub struct DbProvider<C = InMemoryConnector> {
    config: DatabaseConfig,
    connector: Arc<C>,
}

impl<C: Connector> DbProvider<C> {
    #[must_use]
    pub fn new(config: DatabaseConfig, connector: Arc<C>) -> Self {
        Self { config, connector }
    }

    /// Open a connection authenticated as the current request's caller.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::CredentialRejected`] when the store refuses the
    /// delegated token, or [`DbError::Unavailable`] when it cannot be reached.
    pub async fn open(&self) -> Result<C::Connection, DbError> {
        let request = match credential::current() {
            Some(token) => ConnectionRequest {
                connection_string: self.config.delegated_connection_string(),
                auth: ConnectionAuth::Delegated(token),
            },
            None => {
                tracing::debug!("no delegated credential, using service identity");
                ConnectionRequest {
                    connection_string: self.config.service_connection_string(),
                    auth: ConnectionAuth::ServiceIdentity,
                }
            }
        };

        let auth = request.auth.mode().as_str();
        match self.connector.connect(&request).await {
            Ok(conn) => {
                tracing::debug!(auth, "data store connection opened");
                Ok(conn)
            }
            Err(e) => {
                tracing::warn!(auth, error = %e, "failed to open data store connection");
                Err(e)
            }
        }
    }
}

impl<C> Clone for DbProvider<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            connector: Arc::clone(&self.connector),
        }
    }
}

impl<C> std::fmt::Debug for DbProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
