//! Carrier precedence and the single dev-identity gate.

use http::{HeaderMap, Uri};
use menu_security::ResolvedIdentity;

use super::bearer::{self, JwtValidator};
use super::error::IdentityError;
use super::{client_principal, dev_query};
use crate::config::AuthNResolverConfig;

/// Identity carriers, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdentityCarrier {
    BearerToken,
    ClientPrincipal,
    DevQuery,
}

impl IdentityCarrier {
    const PRECEDENCE: [Self; 3] = [Self::BearerToken, Self::ClientPrincipal, Self::DevQuery];

    fn as_str(self) -> &'static str {
        match self {
            Self::BearerToken => "bearer_token",
            Self::ClientPrincipal => "client_principal",
            Self::DevQuery => "dev_query",
        }
    }
}

/// Resolves at most one identity per request.
///
/// Stateless with respect to requests; build once and share.
pub struct IdentityResolver {
    allow_dev_query_identity: bool,
    jwt: Option<JwtValidator>,
}

impl IdentityResolver {
    /// Build a resolver from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidConfig`] when bearer-token validation
    /// is configured with an unknown algorithm or missing key material.
    pub fn new(cfg: &AuthNResolverConfig) -> Result<Self, IdentityError> {
        let jwt = cfg.jwt.as_ref().map(JwtValidator::from_config).transpose()?;
        if cfg.allow_dev_query_identity {
            tracing::warn!("development query identity is enabled; do not use in production");
        }
        Ok(Self {
            allow_dev_query_identity: cfg.allow_dev_query_identity,
            jwt,
        })
    }

    /// First identity yielded by the request's carriers, in precedence order.
    ///
    /// Never fails: malformed carriers are logged and skipped.
    #[must_use]
    pub fn resolve(&self, headers: &HeaderMap, uri: &Uri) -> Option<ResolvedIdentity> {
        let identity = IdentityCarrier::PRECEDENCE
            .into_iter()
            .find_map(|carrier| self.try_carrier(carrier, headers, uri));

        match &identity {
            Some(id) => tracing::debug!(
                user_id = %id.user_id(),
                source = id.source().as_str(),
                roles = id.roles().len(),
                "identity resolved"
            ),
            None => tracing::debug!("no identity carrier yielded a user id"),
        }
        identity
    }

    fn try_carrier(
        &self,
        carrier: IdentityCarrier,
        headers: &HeaderMap,
        uri: &Uri,
    ) -> Option<ResolvedIdentity> {
        let result = match carrier {
            IdentityCarrier::BearerToken => self.bearer_identity(headers),
            IdentityCarrier::ClientPrincipal => client_principal::resolve(headers),
            IdentityCarrier::DevQuery if self.allow_dev_query_identity => dev_query::resolve(uri),
            IdentityCarrier::DevQuery => Ok(None),
        };

        result.unwrap_or_else(|e| {
            tracing::debug!(carrier = carrier.as_str(), error = %e, "ignoring malformed identity carrier");
            None
        })
    }

    fn bearer_identity(&self, headers: &HeaderMap) -> Result<Option<ResolvedIdentity>, IdentityError> {
        let Some(token) = bearer::extract_bearer_token(headers) else {
            return Ok(None);
        };
        let claims = match &self.jwt {
            Some(validator) => validator.claims(token)?,
            None => bearer::decode_unverified(token)?,
        };
        Ok(bearer::identity_from_claims(&claims))
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("allow_dev_query_identity", &self.allow_dev_query_identity)
            .field("validates_jwt", &self.jwt.is_some())
            .finish()
    }
}
