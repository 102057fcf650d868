use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::GatewayRoutePolicy;
use crate::config::ApiGatewayConfig;
use crate::pipeline::{RequestPipeline, request_pipeline_middleware};
use crate::problem::Problem;
use crate::routes::{self, AppState};

const REQUEST_ID_HEADER: &str = "x-request-id";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while assembling or running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid route table: {0}")]
    Routes(#[from] matchit::InsertError),

    #[error("invalid bind address '{addr}': {source}")]
    BindAddr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("http server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns the HTTP router and serves it.
pub struct ApiGateway {
    config: ApiGatewayConfig,
    state: AppState,
    resolver: Arc<authn_resolver::IdentityResolver>,
}

impl ApiGateway {
    #[must_use]
    pub fn new(
        config: ApiGatewayConfig,
        resolver: Arc<authn_resolver::IdentityResolver>,
        menu: menu::MenuService,
        permissions: authz_resolver::PermissionChecker,
    ) -> Self {
        let state = AppState {
            menu,
            permissions,
            menu_cache_max_age_secs: config.menu_cache_max_age_secs,
        };
        Self {
            config,
            state,
            resolver,
        }
    }

    /// Build the router with the full middleware stack.
    ///
    /// Request order (outermost first): set request id -> propagate request id
    /// -> trace -> timeout -> body limit -> catch panic -> request pipeline
    /// -> handler.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Routes`] when the route table is inconsistent.
    pub fn build_router(&self) -> Result<Router, GatewayError> {
        let route_policy = GatewayRoutePolicy::build(routes::route_table())?;
        let pipeline = Arc::new(RequestPipeline::new(
            Arc::clone(&self.resolver),
            self.state.permissions.clone(),
            route_policy,
        ));

        // `Router::layer` wraps everything added before it, so layers are
        // listed innermost first.
        let mut router = routes::router(self.state.clone());

        router = router.layer(from_fn_with_state(pipeline, request_pipeline_middleware));
        router = router.layer(CatchPanicLayer::custom(panic_response));

        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        router = router.layer(DefaultBodyLimit::max(self.config.body_limit_bytes));

        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            REQUEST_TIMEOUT,
        ));

        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                    let rid = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        request_id = %rid,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<axum::body::Body>,
                     latency: Duration,
                     span: &tracing::Span| {
                        span.record("status", res.status().as_u16());
                        span.record("latency_ms", latency.as_millis());
                    },
                ),
        );

        let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

        Ok(router)
    }

    fn parse_bind_address(bind_addr: &str) -> Result<SocketAddr, GatewayError> {
        bind_addr.parse().map_err(|source| GatewayError::BindAddr {
            addr: bind_addr.to_owned(),
            source,
        })
    }

    /// Bind and serve until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error when the address cannot be parsed or bound, or the
    /// server fails.
    pub async fn serve<F>(&self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = Self::parse_bind_address(&self.config.bind_addr)?;
        let router = self.build_router()?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "HTTP server bound");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// A panicking handler or middleware still answers with a problem body.
#[allow(clippy::needless_pass_by_value)]
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());
    tracing::error!(panic = %message, "request handler panicked");
    Problem::internal().into_response()
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
