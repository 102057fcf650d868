use std::collections::BTreeSet;

use crate::constants::ADMIN_ROLE;

/// Identity carrier that produced a [`ResolvedIdentity`].
///
/// Recorded for diagnostics only. Authorization never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    BearerToken,
    ClientPrincipal,
    DevQuery,
}

impl IdentitySource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BearerToken => "bearer_token",
            Self::ClientPrincipal => "client_principal",
            Self::DevQuery => "dev_query",
        }
    }
}

/// `ResolvedIdentity` is the caller identity for one request.
///
/// Built by the identity resolver from the first carrier that yields a user id
/// and passed by reference through the rest of the request. The user id is a
/// stable identity-provider object id, never a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    user_id: String,
    roles: BTreeSet<String>,
    source: IdentitySource,
}

impl ResolvedIdentity {
    /// Create a new `ResolvedIdentity` builder
    #[must_use]
    pub fn builder(source: IdentitySource) -> ResolvedIdentityBuilder {
        ResolvedIdentityBuilder {
            user_id: None,
            roles: BTreeSet::new(),
            source,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    #[must_use]
    pub fn source(&self) -> IdentitySource {
        self.source
    }

    /// Case-insensitive exact match against the asserted role labels.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    /// Whether the identity carrier itself asserts the admin role.
    #[must_use]
    pub fn claims_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

pub struct ResolvedIdentityBuilder {
    user_id: Option<String>,
    roles: BTreeSet<String>,
    source: IdentitySource,
}

impl ResolvedIdentityBuilder {
    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(
            roles
                .into_iter()
                .map(Into::into)
                .filter(|r: &String| !r.is_empty()),
        );
        self
    }

    /// Returns `None` when no user id or a blank one was supplied.
    #[must_use]
    pub fn build(self) -> Option<ResolvedIdentity> {
        let user_id = self.user_id.filter(|id| !id.trim().is_empty())?;
        Some(ResolvedIdentity {
            user_id,
            roles: self.roles,
            source: self.source,
        })
    }
}
