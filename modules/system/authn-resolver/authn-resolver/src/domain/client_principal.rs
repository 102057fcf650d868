//! Platform principal header carrier (`x-ms-client-principal`).

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use http::HeaderMap;
use menu_security::constants::{CLIENT_PRINCIPAL_HEADER, claim_types};
use menu_security::{IdentitySource, ResolvedIdentity};
use serde::Deserialize;

use super::claims::ClaimSet;
use super::error::IdentityError;

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Principal document injected by the hosting platform.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientPrincipal {
    #[serde(alias = "IdentityProvider")]
    identity_provider: Option<String>,
    #[serde(alias = "UserId")]
    user_id: Option<String>,
    #[serde(alias = "UserDetails")]
    user_details: Option<String>,
    #[serde(alias = "UserRoles")]
    user_roles: Option<Vec<String>>,
    #[serde(alias = "Claims")]
    claims: Option<Vec<PrincipalClaim>>,
}

#[derive(Debug, Deserialize)]
struct PrincipalClaim {
    #[serde(alias = "Typ")]
    typ: String,
    #[serde(alias = "Val")]
    val: String,
}

impl ClientPrincipal {
    fn parse(encoded: &str) -> Result<Self, IdentityError> {
        let bytes = STANDARD_LENIENT.decode(encoded.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn into_identity(self) -> Option<ResolvedIdentity> {
        let mut claims = ClaimSet::default();
        for c in self.claims.unwrap_or_default() {
            claims.push(c.typ, c.val);
        }

        let user_id = claims
            .first_value_ignore_case(claim_types::PRINCIPAL_OBJECT_ID)
            .map(str::to_owned)
            .or_else(|| non_empty(self.user_id))
            .or_else(|| non_empty(self.user_details))?;

        tracing::trace!(
            identity_provider = self.identity_provider.as_deref().unwrap_or_default(),
            "client principal resolved"
        );

        ResolvedIdentity::builder(IdentitySource::ClientPrincipal)
            .user_id(user_id)
            .roles(self.user_roles.unwrap_or_default())
            .build()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Identity from the principal header, `Ok(None)` when the header is absent.
pub(crate) fn resolve(headers: &HeaderMap) -> Result<Option<ResolvedIdentity>, IdentityError> {
    let Some(value) = headers.get(CLIENT_PRINCIPAL_HEADER) else {
        return Ok(None);
    };
    let Ok(encoded) = value.to_str() else {
        return Ok(None);
    };
    if encoded.trim().is_empty() {
        return Ok(None);
    }
    Ok(ClientPrincipal::parse(encoded)?.into_identity())
}
