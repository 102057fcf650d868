//! `PostgreSQL` connector.
//!
//! One physical connection is opened per repository operation. With a
//! delegated credential the token is sent as the password of the user named
//! in the connection string (Entra ID token authentication). Without one the
//! connection string is used as configured.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::Connection as _;
use sqlx::postgres::{PgConnectOptions, PgConnection};

use crate::connector::{ConnectionAuth, ConnectionRequest, Connector};
use crate::error::DbError;

/// SQLSTATE codes `PostgreSQL` returns for refused credentials.
const AUTH_FAILURE_CODES: [&str; 2] = ["28P01", "28000"];

#[derive(Debug, Clone)]
pub struct PgConnector {
    connect_timeout: Duration,
}

impl PgConnector {
    #[must_use]
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Connection = PgConnection;

    async fn connect(&self, request: &ConnectionRequest) -> Result<PgConnection, DbError> {
        let mut options = PgConnectOptions::from_str(&request.connection_string)
            .map_err(|e| DbError::Config(e.to_string()))?;
        let delegated = match &request.auth {
            ConnectionAuth::Delegated(token) => {
                options = options.password(token.expose_secret());
                true
            }
            ConnectionAuth::ServiceIdentity => false,
        };

        match tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&options)).await
        {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) if delegated && is_auth_failure(&e) => Err(DbError::CredentialRejected),
            Ok(Err(e)) => Err(DbError::Unavailable(e.to_string())),
            Err(_) => Err(DbError::Unavailable(format!(
                "connect timed out after {} ms",
                self.connect_timeout.as_millis()
            ))),
        }
    }
}

fn is_auth_failure(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| AUTH_FAILURE_CODES.contains(&&*code))
}
