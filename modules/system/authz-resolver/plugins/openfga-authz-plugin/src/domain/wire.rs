//! OpenFGA HTTP API request and response bodies.

use authz_resolver_sdk::TupleKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct CheckRequest<'a> {
    pub tuple_key: &'a TupleKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_model_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CheckResponse {
    pub allowed: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct WriteRequest<'a> {
    pub writes: TupleKeys<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_model_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct TupleKeys<'a> {
    pub tuple_keys: &'a [TupleKey],
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ErrorBody {
    pub code: String,
    pub message: String,
}
