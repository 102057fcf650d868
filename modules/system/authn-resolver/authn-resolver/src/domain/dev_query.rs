//! Local-development `?user=<id>` carrier.

use http::Uri;
use menu_security::constants::DEV_USER_QUERY_PARAM;
use menu_security::{IdentitySource, ResolvedIdentity};

use super::error::IdentityError;

/// Identity named by the `user` query parameter, with no roles.
pub(crate) fn resolve(uri: &Uri) -> Result<Option<ResolvedIdentity>, IdentityError> {
    let Some(query) = uri.query() else {
        return Ok(None);
    };
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
    let identity = pairs
        .into_iter()
        .find(|(key, value)| key == DEV_USER_QUERY_PARAM && !value.trim().is_empty())
        .and_then(|(_, user)| {
            ResolvedIdentity::builder(IdentitySource::DevQuery)
                .user_id(user)
                .build()
        });
    Ok(identity)
}
