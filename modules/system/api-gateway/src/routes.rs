//! HTTP handlers and the route table.

use authz_resolver::PermissionChecker;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use menu::api::dto::{
    MenuGroupDto, MenuGroupRequest, MenuItemDto, MenuItemRequest, MenuStructureResponse,
};
use menu::{MenuItemDraft, MenuService};
use menu_security::ResolvedIdentity;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::RouteRequirement;
use crate::problem::Problem;

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub menu: MenuService,
    pub permissions: PermissionChecker,
    pub menu_cache_max_age_secs: u64,
}

/// Every route with its caller requirement.
#[must_use]
pub fn route_table() -> Vec<(Method, &'static str, RouteRequirement)> {
    use RouteRequirement::{Admin, Authenticated, Public};
    vec![
        (Method::GET, "/api/health", Public),
        (Method::GET, "/api/auth/check-admin", Authenticated),
        (Method::POST, "/api/auth/assign-user-permission", Admin),
        (Method::GET, "/api/menu-structure", Authenticated),
        (Method::POST, "/api/menu-items", Admin),
        (Method::PUT, "/api/menu-items/{id}", Admin),
        (Method::DELETE, "/api/menu-items/{id}", Admin),
        (Method::POST, "/api/menu-groups", Admin),
        (Method::PUT, "/api/menu-groups/{id}", Admin),
        (Method::DELETE, "/api/menu-groups/{id}", Admin),
    ]
}

#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/check-admin", get(check_admin))
        .route("/api/auth/assign-user-permission", post(assign_user_permission))
        .route("/api/menu-structure", get(menu_structure))
        .route("/api/menu-items", post(create_menu_item))
        .route(
            "/api/menu-items/{id}",
            put(update_menu_item).delete(delete_menu_item),
        )
        .route("/api/menu-groups", post(create_menu_group))
        .route(
            "/api/menu-groups/{id}",
            put(update_menu_group).delete(delete_menu_group),
        )
        .with_state(state)
}

/// Decode a JSON body. Runs only after the pipeline admitted the caller.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Problem> {
    serde_json::from_slice(body)
        .map_err(|e| Problem::bad_request(format!("invalid request body: {e}")))
}

/// Path ids arrive as text; a malformed one is a 400 problem.
fn parse_id(raw: &str) -> Result<i64, Problem> {
    raw.parse()
        .map_err(|_| Problem::bad_request(format!("invalid id '{raw}': expected an integer")))
}

fn created<T: Serialize>(location: &str, body: T) -> Response {
    let mut response = (StatusCode::CREATED, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckAdminResponse {
    is_admin: bool,
    user_id: String,
}

async fn check_admin(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
) -> Json<CheckAdminResponse> {
    let is_admin = state.permissions.is_admin(&identity).await;
    Json(CheckAdminResponse {
        is_admin,
        user_id: identity.user_id().to_owned(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignPermissionRequest {
    #[serde(default, alias = "UserId")]
    user_id: String,
    #[serde(default, alias = "Relation")]
    relation: String,
    #[serde(default, alias = "Object")]
    object: String,
}

#[derive(Debug, Serialize)]
struct TupleDto {
    user: String,
    relation: String,
    object: String,
}

#[derive(Debug, Serialize)]
struct AssignPermissionResponse {
    success: bool,
    message: String,
    tuple: TupleDto,
}

async fn assign_user_permission(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
    body: Bytes,
) -> Result<Json<AssignPermissionResponse>, Problem> {
    let request: AssignPermissionRequest = parse_body(&body)?;
    let tuple = state
        .permissions
        .assign(&request.user_id, &request.relation, &request.object)
        .await?;
    tracing::info!(
        granted_by = identity.user_id(),
        tuple = %tuple,
        "permission assigned"
    );
    Ok(Json(AssignPermissionResponse {
        success: true,
        message: format!(
            "User {} assigned {} on {}",
            request.user_id, request.relation, request.object
        ),
        tuple: TupleDto {
            user: tuple.user,
            relation: tuple.relation,
            object: tuple.object,
        },
    }))
}

async fn menu_structure(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
) -> Result<Response, Problem> {
    let structure = state.menu.menu_structure(identity.user_id()).await?;
    let mut response = Json(MenuStructureResponse::from(structure)).into_response();
    let cache = format!("private, max-age={}", state.menu_cache_max_age_secs);
    if let Ok(value) = HeaderValue::from_str(&cache) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }
    Ok(response)
}

async fn create_menu_item(State(state): State<AppState>, body: Bytes) -> Result<Response, Problem> {
    let request: MenuItemRequest = parse_body(&body)?;
    let item = state.menu.create_item(MenuItemDraft::try_from(request)?).await?;
    Ok(created(
        &format!("/api/menu-items/{}", item.id),
        MenuItemDto::from(item),
    ))
}

async fn update_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MenuItemDto>, Problem> {
    let id = parse_id(&id)?;
    let request: MenuItemRequest = parse_body(&body)?;
    let item = state
        .menu
        .update_item(id, MenuItemDraft::try_from(request)?)
        .await?;
    Ok(Json(item.into()))
}

async fn delete_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, Problem> {
    let id = parse_id(&id)?;
    state.menu.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_menu_group(State(state): State<AppState>, body: Bytes) -> Result<Response, Problem> {
    let request: MenuGroupRequest = parse_body(&body)?;
    let group = state.menu.create_group(request.into()).await?;
    Ok(created(
        &format!("/api/menu-groups/{}", group.id),
        MenuGroupDto::from(group),
    ))
}

async fn update_menu_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MenuGroupDto>, Problem> {
    let id = parse_id(&id)?;
    let request: MenuGroupRequest = parse_body(&body)?;
    let group = state.menu.update_group(id, request.into()).await?;
    Ok(Json(group.into()))
}

async fn delete_menu_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, Problem> {
    let id = parse_id(&id)?;
    state.menu.delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
