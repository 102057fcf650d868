//! Per-request authentication, authorization and credential scoping.
//!
//! Every request runs through [`RequestPipeline::run`]:
//!
//! ```text
//! Start -> IdentityResolved | Unauthenticated (401)
//!       -> AuthorizationChecked | AuthorizationSkipped | Forbidden (403)
//!       -> CredentialScopeActive -> OperationExecuted -> ScopeEnded -> ResponseSent
//! ```
//!
//! Handlers only run after identity and authorization succeeded, so request
//! bodies are never parsed for rejected callers. The delegated credential
//! scope is torn down by its guard, including when the handler fails or
//! panics.

use std::sync::Arc;

use authn_resolver::IdentityResolver;
use authz_resolver::PermissionChecker;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use menu_security::constants::DELEGATED_CREDENTIAL_HEADER;
use menu_security::{ResolvedIdentity, credential};
use secrecy::SecretString;

use crate::auth::{GatewayRoutePolicy, RouteRequirement};
use crate::problem::Problem;

/// Named states of the request pipeline, emitted as debug traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Start,
    IdentityResolved,
    Unauthenticated,
    AuthorizationChecked,
    AuthorizationSkipped,
    Forbidden,
    CredentialScopeActive,
    OperationExecuted,
    ScopeEnded,
    ResponseSent,
}

impl RequestPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::IdentityResolved => "identity_resolved",
            Self::Unauthenticated => "unauthenticated",
            Self::AuthorizationChecked => "authorization_checked",
            Self::AuthorizationSkipped => "authorization_skipped",
            Self::Forbidden => "forbidden",
            Self::CredentialScopeActive => "credential_scope_active",
            Self::OperationExecuted => "operation_executed",
            Self::ScopeEnded => "scope_ended",
            Self::ResponseSent => "response_sent",
        }
    }
}

fn enter(phase: RequestPhase) {
    tracing::debug!(phase = phase.as_str(), "request phase");
}

/// Shared, stateless pipeline. One instance serves every request.
pub struct RequestPipeline {
    resolver: Arc<IdentityResolver>,
    permissions: PermissionChecker,
    route_policy: GatewayRoutePolicy,
}

impl RequestPipeline {
    #[must_use]
    pub fn new(
        resolver: Arc<IdentityResolver>,
        permissions: PermissionChecker,
        route_policy: GatewayRoutePolicy,
    ) -> Self {
        Self {
            resolver,
            permissions,
            route_policy,
        }
    }

    /// Drive one request through the pipeline.
    pub async fn run(&self, mut req: Request, next: Next) -> Response {
        enter(RequestPhase::Start);
        let requirement = self.route_policy.resolve(req.method(), req.uri().path());

        if requirement == RouteRequirement::Public {
            enter(RequestPhase::AuthorizationSkipped);
        } else {
            let Some(identity) = self.resolver.resolve(req.headers(), req.uri()) else {
                enter(RequestPhase::Unauthenticated);
                return Problem::unauthorized().into_response();
            };
            enter(RequestPhase::IdentityResolved);
            tracing::debug!(
                user_id = identity.user_id(),
                source = identity.source().as_str(),
                requirement = requirement.as_str(),
                "caller identified"
            );

            if requirement == RouteRequirement::Admin {
                if !self.permissions.is_admin(&identity).await {
                    enter(RequestPhase::Forbidden);
                    tracing::info!(user_id = identity.user_id(), "admin operation denied");
                    return Problem::forbidden().into_response();
                }
                enter(RequestPhase::AuthorizationChecked);
            } else {
                enter(RequestPhase::AuthorizationSkipped);
            }
            req.extensions_mut().insert::<ResolvedIdentity>(identity);
        }

        let token = delegated_credential(req.headers());
        let response = credential::with_request_scope(async move {
            let scope = match credential::begin_scope(token) {
                Ok(scope) => scope,
                Err(e) => {
                    tracing::error!(error = %e, "failed to start credential scope");
                    return Problem::internal().into_response();
                }
            };
            enter(RequestPhase::CredentialScopeActive);
            let response = next.run(req).await;
            enter(RequestPhase::OperationExecuted);
            scope.end();
            enter(RequestPhase::ScopeEnded);
            response
        })
        .await;

        enter(RequestPhase::ResponseSent);
        response
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("resolver", &self.resolver)
            .field("route_policy", &self.route_policy)
            .finish_non_exhaustive()
    }
}

/// Axum middleware entry point.
pub async fn request_pipeline_middleware(
    State(pipeline): State<Arc<RequestPipeline>>,
    req: Request,
    next: Next,
) -> Response {
    pipeline.run(req, next).await
}

/// The raw `x-sql-token` value, if present and non-blank.
fn delegated_credential(headers: &HeaderMap) -> Option<SecretString> {
    let raw = headers
        .get(DELEGATED_CREDENTIAL_HEADER)?
        .to_str()
        .ok()?
        .trim();
    if raw.is_empty() {
        tracing::debug!("no delegated credential on request");
        return None;
    }
    tracing::debug!(length = raw.len(), "delegated credential received");
    Some(SecretString::from(raw))
}
