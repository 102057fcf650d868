#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use authz_resolver::{AuthZResolverConfig, PermissionChecker};
use authz_resolver_sdk::{PolicyStoreClient, PolicyStoreError, TupleKey};
use menu::{DomainError, InMemoryMenuRepository, MenuGroupDraft, MenuService};
use menu_db::{
    Connection, ConnectionAuth, ConnectionRequest, Connector, DatabaseConfig, DbError, DbProvider,
};
use menu_security::credential;
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};

/// Remembers the token of every connection; rejects `"expired"`.
#[derive(Default)]
struct TokenLog {
    tokens: Mutex<Vec<Option<String>>>,
}

#[async_trait]
impl Connector for TokenLog {
    type Connection = Connection;

    async fn connect(&self, request: &ConnectionRequest) -> Result<Connection, DbError> {
        let token = match &request.auth {
            ConnectionAuth::Delegated(t) => Some(t.expose_secret().to_owned()),
            ConnectionAuth::ServiceIdentity => None,
        };
        if token.as_deref() == Some("expired") {
            return Err(DbError::CredentialRejected);
        }
        let mut tokens = self.tokens.lock();
        tokens.push(token);
        Ok(Connection::new(tokens.len() as u64, request.auth.mode()))
    }
}

struct AllowAll;

#[async_trait]
impl PolicyStoreClient for AllowAll {
    async fn check(&self, _tuple: &TupleKey) -> Result<bool, PolicyStoreError> {
        Ok(true)
    }

    async fn write(&self, _tuples: &[TupleKey]) -> Result<(), PolicyStoreError> {
        Ok(())
    }
}

fn setup() -> (Arc<TokenLog>, MenuService) {
    let log = Arc::new(TokenLog::default());
    let db = DbProvider::new(DatabaseConfig::default(), log.clone());
    let repo = Arc::new(InMemoryMenuRepository::new(db));
    let checker = PermissionChecker::new(Arc::new(AllowAll), &AuthZResolverConfig::default());
    (log, MenuService::new(repo, checker))
}

fn group(name: &str) -> MenuGroupDraft {
    MenuGroupDraft {
        name: name.to_owned(),
        icon: None,
        parent_id: None,
        display_order: 0,
        is_visible: true,
    }
}

#[tokio::test]
async fn repository_connections_carry_the_request_credential() {
    let (log, svc) = setup();

    credential::with_request_scope(async {
        let _scope = credential::begin_scope(Some(SecretString::from("alice-token"))).unwrap();
        svc.create_group(group("Main")).await.unwrap();
        svc.menu_structure("alice").await.unwrap();
    })
    .await;

    let tokens = log.tokens.lock();
    assert_eq!(tokens.len(), 2);
    assert!(tokens.iter().all(|t| t.as_deref() == Some("alice-token")));
}

#[tokio::test]
async fn requests_without_credential_use_service_identity() {
    let (log, svc) = setup();

    credential::with_request_scope(async {
        let _scope = credential::begin_scope(None).unwrap();
        svc.menu_structure("bob").await.unwrap();
    })
    .await;

    assert_eq!(log.tokens.lock().as_slice(), &[None]);
}

#[tokio::test]
async fn rejected_credential_surfaces_as_database_error() {
    let (log, svc) = setup();

    let result = credential::with_request_scope(async {
        let _scope = credential::begin_scope(Some(SecretString::from("expired"))).unwrap();
        svc.create_group(group("Main")).await
    })
    .await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::Database(DbError::CredentialRejected)
    ));
    assert!(log.tokens.lock().is_empty());
}
