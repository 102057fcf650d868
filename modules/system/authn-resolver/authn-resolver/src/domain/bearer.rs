//! `Authorization: Bearer <JWT>` carrier.

use std::str::FromStr;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use http::HeaderMap;
use http::header::AUTHORIZATION;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use menu_security::constants::claim_types;
use menu_security::{IdentitySource, ResolvedIdentity};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};

use super::claims::ClaimSet;
use super::error::IdentityError;
use crate::config::JwtValidationConfig;

/// URL-safe base64 that accepts payloads with or without padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Extract the token from an `Authorization: Bearer` header.
///
/// The scheme is matched case-insensitively.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Claims of a JWT read without signature verification.
pub(crate) fn decode_unverified(token: &str) -> Result<Map<String, Value>, IdentityError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(_), Some(payload)) if !payload.is_empty() => payload,
        _ => return Err(IdentityError::MalformedToken("missing payload segment")),
    };
    let bytes = URL_SAFE_LENIENT.decode(payload)?;
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(claims) => Ok(claims),
        _ => Err(IdentityError::MalformedToken("payload is not a JSON object")),
    }
}

/// Signature and claim validation for bearer tokens.
pub(crate) struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub(crate) fn from_config(cfg: &JwtValidationConfig) -> Result<Self, IdentityError> {
        let algorithm = Algorithm::from_str(cfg.algorithm.trim()).map_err(|_| {
            IdentityError::InvalidConfig(format!("unsupported algorithm '{}'", cfg.algorithm))
        })?;

        let name = cfg.algorithm.trim();
        let key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                let secret = cfg.secret.as_ref().ok_or_else(|| {
                    IdentityError::InvalidConfig(format!("{name} requires `secret`"))
                })?;
                DecodingKey::from_secret(secret.expose_secret().as_bytes())
            }
            _ => {
                let pem = cfg.public_key_pem.as_deref().ok_or_else(|| {
                    IdentityError::InvalidConfig(format!("{name} requires `public_key_pem`"))
                })?;
                decoding_key_from_pem(algorithm, pem.as_bytes())
                    .map_err(|e| IdentityError::InvalidConfig(format!("public key: {e}")))?
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = cfg.leeway_secs;
        if !cfg.issuers.is_empty() {
            validation.set_issuer(&cfg.issuers);
        }
        if cfg.audiences.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&cfg.audiences);
        }

        Ok(Self { key, validation })
    }

    pub(crate) fn claims(&self, token: &str) -> Result<Map<String, Value>, IdentityError> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

fn decoding_key_from_pem(
    algorithm: Algorithm,
    pem: &[u8],
) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
    match algorithm {
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
        _ => DecodingKey::from_rsa_pem(pem),
    }
}

/// Identity asserted by a bearer token's claims.
pub(crate) fn identity_from_claims(claims: &Map<String, Value>) -> Option<ResolvedIdentity> {
    let set = ClaimSet::from_json_object(claims);
    let user_id = set.first_value(claim_types::BEARER_USER_ID)?;
    ResolvedIdentity::builder(IdentitySource::BearerToken)
        .user_id(user_id)
        .roles(set.values(claim_types::BEARER_ROLES))
        .build()
}
