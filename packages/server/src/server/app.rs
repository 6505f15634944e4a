//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::auth::JwtService;
use crate::kernel::{BaseCatalog, NullCatalog, TmdbCatalog};
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    active_sessions_handler, cancel_invite_handler, cancel_session_handler, complete_handler,
    contribute_handler, decide_handler, friends_handler, health_handler, invite_handler,
    matches_handler, pool_handler, ready_handler, received_invites_handler, respond_handler,
    sent_invites_handler, session_status_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub db_pool: PgPool,
    pub jwt_service: Arc<JwtService>,
    pub catalog: Arc<dyn BaseCatalog>,
}

/// Build the Axum application router
///
/// Without a TMDB key the server runs with a null catalog: matches still
/// work, they just carry no title metadata.
pub fn build_app(
    pool: PgPool,
    jwt_secret: String,
    jwt_issuer: String,
    tmdb_api_key: Option<String>,
) -> Router {
    let jwt_service = Arc::new(JwtService::new(&jwt_secret, jwt_issuer));

    let catalog: Arc<dyn BaseCatalog> = match tmdb_api_key {
        Some(key) => Arc::new(TmdbCatalog::new(key)),
        None => {
            tracing::warn!("No TMDB API key configured, matches will have no title metadata");
            Arc::new(NullCatalog)
        }
    };

    let app_state = AxumAppState {
        db_pool: pool,
        jwt_service: jwt_service.clone(),
        catalog,
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let jwt_service_for_middleware = jwt_service.clone();

    let match_routes = Router::new()
        .route("/invite", post(invite_handler))
        .route("/invite/cancel", post(cancel_invite_handler))
        .route("/invite/respond", post(respond_handler))
        .route("/invites/sent", get(sent_invites_handler))
        .route("/invites/received", get(received_invites_handler))
        .route("/active", get(active_sessions_handler))
        .route("/friends", get(friends_handler))
        .route("/:id/status", get(session_status_handler))
        .route("/:id/pool", post(contribute_handler).get(pool_handler))
        .route("/:id/ready", post(ready_handler))
        .route("/:id/like", post(decide_handler))
        .route("/:id/matches", get(matches_handler))
        .route("/:id/complete", post(complete_handler))
        .route(
            "/:id",
            axum::routing::delete(cancel_session_handler),
        );

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/match", match_routes)
        .layer(middleware::from_fn(move |request, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), request, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
