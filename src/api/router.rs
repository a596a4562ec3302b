//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Routes: `/health`, `/appointments/search`, and the `/verifications`
//! session resource.
//!
//! Middleware stack (outermost → innermost):
//! 1. Trace span → 2. CORS → 3. Rate limiter → 4. Access log

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// context layer). Endpoint handlers use `State<ApiContext>`.
pub fn api_router(ctx: ApiContext) -> Router {
    // Layers are applied from bottom (innermost) to top (outermost).
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/appointments/search", get(endpoints::appointments::search))
        .route("/verifications", post(endpoints::verifications::create))
        .route(
            "/verifications/:id",
            get(endpoints::verifications::get).delete(endpoints::verifications::close),
        )
        .route(
            "/verifications/:id/inputs",
            put(endpoints::verifications::update_inputs),
        )
        .route(
            "/verifications/:id/submit",
            post(endpoints::verifications::submit),
        )
        .route(
            "/verifications/:id/reset",
            post(endpoints::verifications::reset),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        // Extension must be outside the rate limiter so it can extract ApiContext
        .layer(axum::Extension(ctx));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    // Span fields leave out the query string: it carries phone numbers.
    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        tracing::info_span!("request", method = %req.method(), path = %req.uri().path())
    });

    Router::new().nest("/api", api).layer(cors).layer(trace)
}
