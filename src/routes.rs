// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::{admin, answers, health},
    state::AppState,
    utils::auth::admin_token_middleware,
};

/// Assembles the main application router.
///
/// * `/` and `/api/answers` accept submissions (POST) and list recent ones (GET).
/// * `/api/admin` is only mounted when an admin token is configured.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let answer_routes = Router::new()
        .route(
            "/",
            get(answers::recent_answers).post(answers::submit_answers),
        )
        // Wildcard: ids embed the user id, which may contain '/'.
        .route("/{*id}", get(answers::get_submission));

    let mut app = Router::new()
        // Bare root kept for clients that post straight to the service URL.
        .route(
            "/",
            get(answers::recent_answers).post(answers::submit_answers),
        )
        .route("/api/health", get(health::health_check))
        .nest("/api/answers", answer_routes);

    if state.config.admin_token.is_some() {
        let admin_routes = Router::new()
            .route("/keys", get(admin::list_keys))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                admin_token_middleware,
            ));
        app = app.nest("/api/admin", admin_routes);
    } else {
        tracing::info!("ADMIN_TOKEN not set, admin routes disabled");
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
    .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.cors_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
