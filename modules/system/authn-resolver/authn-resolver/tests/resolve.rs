#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::{SystemTime, UNIX_EPOCH};

use authn_resolver::{AuthNResolverConfig, IdentityResolver, JwtValidationConfig};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue, Uri};
use jsonwebtoken::{EncodingKey, Header, encode};
use menu_security::IdentitySource;
use menu_security::constants::CLIENT_PRINCIPAL_HEADER;
use secrecy::SecretString;
use serde_json::{Value, json};

const SECRET: &str = "test-signing-secret";

fn unsigned_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

fn signed_token(claims: &Value, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn with_bearer(mut headers: HeaderMap, token: &str) -> HeaderMap {
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}

fn with_principal(mut headers: HeaderMap, principal: &Value) -> HeaderMap {
    let encoded = STANDARD.encode(principal.to_string());
    headers.insert(
        CLIENT_PRINCIPAL_HEADER,
        HeaderValue::from_str(&encoded).unwrap(),
    );
    headers
}

fn resolver() -> IdentityResolver {
    IdentityResolver::new(&AuthNResolverConfig::default()).unwrap()
}

fn dev_resolver() -> IdentityResolver {
    IdentityResolver::new(&AuthNResolverConfig {
        allow_dev_query_identity: true,
        jwt: None,
    })
    .unwrap()
}

fn root() -> Uri {
    Uri::from_static("/api/menu-structure")
}

#[test]
fn bearer_token_takes_precedence_over_principal_header() {
    let headers = with_bearer(
        with_principal(
            HeaderMap::new(),
            &json!({ "userId": "header-user", "userRoles": ["admin"] }),
        ),
        &unsigned_token(&json!({ "oid": "token-user", "roles": ["Reader"] })),
    );

    let identity = resolver().resolve(&headers, &root()).unwrap();
    assert_eq!(identity.user_id(), "token-user");
    assert_eq!(identity.source(), IdentitySource::BearerToken);
    // roles are not merged across carriers
    assert!(!identity.claims_admin());
    assert!(identity.has_role("reader"));
}

#[test]
fn malformed_bearer_falls_through_to_principal_header() {
    let headers = with_bearer(
        with_principal(HeaderMap::new(), &json!({ "userId": "header-user" })),
        "garbage",
    );

    let identity = resolver().resolve(&headers, &root()).unwrap();
    assert_eq!(identity.user_id(), "header-user");
    assert_eq!(identity.source(), IdentitySource::ClientPrincipal);
}

#[test]
fn bearer_without_user_id_claim_falls_through() {
    let headers = with_bearer(
        with_principal(HeaderMap::new(), &json!({ "userId": "header-user" })),
        &unsigned_token(&json!({ "name": "No Id" })),
    );

    let identity = resolver().resolve(&headers, &root()).unwrap();
    assert_eq!(identity.user_id(), "header-user");
}

#[test]
fn malformed_principal_falls_through_to_dev_query() {
    let mut headers = HeaderMap::new();
    headers.insert(
        CLIENT_PRINCIPAL_HEADER,
        HeaderValue::from_static("bm90IGpzb24="),
    );
    let uri = Uri::from_static("/api/menu-structure?user=dev-user");

    let identity = dev_resolver().resolve(&headers, &uri).unwrap();
    assert_eq!(identity.user_id(), "dev-user");
    assert_eq!(identity.source(), IdentitySource::DevQuery);
}

#[test]
fn no_carrier_yields_none() {
    assert!(resolver().resolve(&HeaderMap::new(), &root()).is_none());
    assert!(dev_resolver().resolve(&HeaderMap::new(), &root()).is_none());
}

#[test]
fn dev_query_alone_is_rejected_when_disabled() {
    let uri = Uri::from_static("/api/menu-structure?user=dev-user");
    assert!(resolver().resolve(&HeaderMap::new(), &uri).is_none());
}

#[test]
fn same_user_id_from_every_carrier() {
    let oid = "9f1c2d3e-0000-4000-8000-000000000001";

    let bearer = with_bearer(HeaderMap::new(), &unsigned_token(&json!({ "oid": oid })));
    let principal = with_principal(
        HeaderMap::new(),
        &json!({
            "userId": "platform-id",
            "claims": [{ "typ": "http://schemas.microsoft.com/identity/claims/objectidentifier", "val": oid }],
        }),
    );

    let from_bearer = resolver().resolve(&bearer, &root()).unwrap();
    let from_principal = resolver().resolve(&principal, &root()).unwrap();
    assert_eq!(from_bearer.user_id(), from_principal.user_id());
}

fn validating_resolver() -> IdentityResolver {
    IdentityResolver::new(&AuthNResolverConfig {
        allow_dev_query_identity: false,
        jwt: Some(JwtValidationConfig {
            algorithm: "HS256".to_owned(),
            secret: Some(SecretString::from(SECRET)),
            issuers: vec!["https://login.example.com/tenant/v2.0".to_owned()],
            audiences: vec!["api://menu".to_owned()],
            ..JwtValidationConfig::default()
        }),
    })
    .unwrap()
}

#[test]
fn validated_token_yields_identity() {
    let token = signed_token(
        &json!({
            "oid": "abc-123",
            "roles": ["Admin"],
            "iss": "https://login.example.com/tenant/v2.0",
            "aud": "api://menu",
            "exp": now() + 600,
        }),
        SECRET,
    );
    let headers = with_bearer(HeaderMap::new(), &token);

    let identity = validating_resolver().resolve(&headers, &root()).unwrap();
    assert_eq!(identity.user_id(), "abc-123");
    assert!(identity.claims_admin());
}

#[test]
fn token_with_wrong_signature_is_treated_as_absent() {
    let token = signed_token(
        &json!({
            "oid": "abc-123",
            "iss": "https://login.example.com/tenant/v2.0",
            "aud": "api://menu",
            "exp": now() + 600,
        }),
        "some-other-secret",
    );
    let headers = with_principal(
        with_bearer(HeaderMap::new(), &token),
        &json!({ "userId": "header-user" }),
    );

    let identity = validating_resolver().resolve(&headers, &root()).unwrap();
    assert_eq!(identity.user_id(), "header-user");
}

#[test]
fn expired_or_foreign_tokens_are_rejected() {
    let expired = signed_token(
        &json!({
            "oid": "abc-123",
            "iss": "https://login.example.com/tenant/v2.0",
            "aud": "api://menu",
            "exp": now() - 3600,
        }),
        SECRET,
    );
    let wrong_audience = signed_token(
        &json!({
            "oid": "abc-123",
            "iss": "https://login.example.com/tenant/v2.0",
            "aud": "api://other",
            "exp": now() + 600,
        }),
        SECRET,
    );
    let unsigned = unsigned_token(&json!({ "oid": "abc-123" }));

    let resolver = validating_resolver();
    for token in [expired, wrong_audience, unsigned] {
        let headers = with_bearer(HeaderMap::new(), &token);
        assert!(resolver.resolve(&headers, &root()).is_none());
    }
}

#[test]
fn invalid_validation_config_fails_construction() {
    let err = IdentityResolver::new(&AuthNResolverConfig {
        allow_dev_query_identity: false,
        jwt: Some(JwtValidationConfig {
            algorithm: "RS256".to_owned(),
            public_key_pem: Some("not a pem".to_owned()),
            ..JwtValidationConfig::default()
        }),
    })
    .unwrap_err();

    assert!(matches!(err, authn_resolver::IdentityError::InvalidConfig(_)));
}
