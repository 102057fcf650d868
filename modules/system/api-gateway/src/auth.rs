use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;

/// What a route demands of the caller before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRequirement {
    /// No identity needed.
    Public,
    /// Any resolved identity.
    Authenticated,
    /// A resolved identity that passes the admin check.
    Admin,
}

impl RouteRequirement {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Authenticated => "authenticated",
            Self::Admin => "admin",
        }
    }
}

/// Per-method route matcher.
#[derive(Clone)]
struct RouteMatcher {
    matcher: matchit::Router<RouteRequirement>,
}

impl RouteMatcher {
    fn new() -> Self {
        Self {
            matcher: matchit::Router::new(),
        }
    }

    fn insert(&mut self, path: &str, requirement: RouteRequirement) -> Result<(), matchit::InsertError> {
        self.matcher.insert(path, requirement)
    }

    fn find(&self, path: &str) -> Option<RouteRequirement> {
        self.matcher.at(path).ok().map(|m| *m.value)
    }
}

/// Maps `(method, path)` to a [`RouteRequirement`].
///
/// Paths use `{param}` segments. Requests that match no registered route
/// require authentication.
#[derive(Clone)]
pub struct GatewayRoutePolicy {
    matchers: Arc<HashMap<Method, RouteMatcher>>,
}

impl GatewayRoutePolicy {
    /// Build the policy from a route table.
    ///
    /// # Errors
    ///
    /// Returns an error when two entries for the same method conflict.
    pub fn build<'a, I>(routes: I) -> Result<Self, matchit::InsertError>
    where
        I: IntoIterator<Item = (Method, &'a str, RouteRequirement)>,
    {
        let mut matchers: HashMap<Method, RouteMatcher> = HashMap::new();
        for (method, path, requirement) in routes {
            matchers
                .entry(method)
                .or_insert_with(RouteMatcher::new)
                .insert(path, requirement)?;
        }
        Ok(Self {
            matchers: Arc::new(matchers),
        })
    }

    /// Resolve the requirement for a given (method, path).
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> RouteRequirement {
        self.matchers
            .get(method)
            .and_then(|matcher| matcher.find(path))
            .unwrap_or(RouteRequirement::Authenticated)
    }
}

impl std::fmt::Debug for GatewayRoutePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayRoutePolicy")
            .field("methods", &self.matchers.len())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn policy() -> GatewayRoutePolicy {
        GatewayRoutePolicy::build([
            (Method::GET, "/api/health", RouteRequirement::Public),
            (Method::GET, "/api/menu-structure", RouteRequirement::Authenticated),
            (Method::PUT, "/api/menu-items/{id}", RouteRequirement::Admin),
            (Method::DELETE, "/api/menu-items/{id}", RouteRequirement::Admin),
        ])
        .unwrap()
    }

    #[test]
    fn exact_match() {
        assert_eq!(
            policy().resolve(&Method::GET, "/api/health"),
            RouteRequirement::Public
        );
    }

    #[test]
    fn path_params_match_concrete_values() {
        assert_eq!(
            policy().resolve(&Method::PUT, "/api/menu-items/42"),
            RouteRequirement::Admin
        );
    }

    #[test]
    fn methods_resolve_independently() {
        let policy = policy();
        assert_eq!(
            policy.resolve(&Method::DELETE, "/api/menu-items/42"),
            RouteRequirement::Admin
        );
        assert_eq!(
            policy.resolve(&Method::POST, "/api/health"),
            RouteRequirement::Authenticated
        );
    }

    #[test]
    fn unknown_route_requires_authentication() {
        assert_eq!(
            policy().resolve(&Method::GET, "/api/unknown"),
            RouteRequirement::Authenticated
        );
    }

    #[test]
    fn conflicting_routes_are_rejected() {
        let result = GatewayRoutePolicy::build([
            (Method::GET, "/a/{id}", RouteRequirement::Public),
            (Method::GET, "/a/{name}", RouteRequirement::Admin),
        ]);
        assert!(result.is_err());
    }
}
