//! Wire names used by identity carriers and the delegated credential header.

/// Header injected by the hosting platform with a base64 JSON principal.
pub const CLIENT_PRINCIPAL_HEADER: &str = "x-ms-client-principal";

/// Header carrying the end user's token for the backing data store.
pub const DELEGATED_CREDENTIAL_HEADER: &str = "x-sql-token";

/// Query parameter accepted as identity in local development only.
pub const DEV_USER_QUERY_PARAM: &str = "user";

/// Role label that grants admin through the identity carrier.
pub const ADMIN_ROLE: &str = "admin";

/// Claim types searched when resolving identities.
pub mod claim_types {
    pub const OID: &str = "oid";
    pub const OBJECT_IDENTIFIER: &str = "http://schemas.microsoft.com/identity/claims/objectidentifier";
    pub const NAME_IDENTIFIER: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
    pub const SUBJECT: &str = "sub";
    pub const ROLES: &str = "roles";
    pub const ROLE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

    /// Bearer-token claims that carry the stable user id, in preference order.
    pub const BEARER_USER_ID: &[&str] = &[OID, OBJECT_IDENTIFIER, NAME_IDENTIFIER, SUBJECT];

    /// Principal-header claims that carry the object id.
    pub const PRINCIPAL_OBJECT_ID: &[&str] = &[OID, OBJECT_IDENTIFIER];

    /// Bearer-token claims that carry role labels.
    pub const BEARER_ROLES: &[&str] = &[ROLES, ROLE];
}
