use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{ExpiredDeletion, Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::{Config, ServerConfig};
use crate::services::{AuthService, BookingService};
use crate::state::SharedState;

pub mod auth;
mod bookings;
mod error;
mod observability;
mod shows;
mod theaters;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn booking_service(&self) -> &Arc<dyn BookingService> {
        &self.shared.booking_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let server = state.config().read().await.server.clone();

    let api_router = if server.persistent_sessions {
        let session_store =
            SqliteStore::new(state.store().conn.get_sqlite_connection_pool().clone());
        session_store.migrate().await?;

        tokio::spawn(
            session_store
                .clone()
                .continuously_delete_expired(Duration::from_secs(60)),
        );

        api_routes(state, session_layer(session_store, &server))
    } else {
        api_routes(state, session_layer(MemoryStore::default(), &server))
    };

    let cors_layer = if server.cors_allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Ok(Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware)))
}

fn session_layer<S: SessionStore + Clone>(
    store: S,
    server: &ServerConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_idle_minutes,
        )))
}

fn api_routes<S: SessionStore + Clone>(
    state: Arc<AppState>,
    session_layer: SessionManagerLayer<S>,
) -> Router {
    Router::new()
        .merge(create_protected_router())
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/health", get(observability::health))
        .layer(session_layer)
        .with_state(state)
}

fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/totp/setup", get(auth::totp_setup))
        .route("/auth/totp", post(auth::totp_confirm))
        .route("/auth/totp", delete(auth::totp_disable))
        .route("/users", post(users::create_user))
        .route("/theaters", get(theaters::list_theaters))
        .route("/theaters", post(theaters::create_theater))
        .route("/theaters/{id}", get(theaters::get_theater))
        .route("/shows", get(shows::list_shows))
        .route("/shows", post(shows::create_show))
        .route("/shows/{id}", get(shows::get_show))
        .route("/shows/{id}", delete(shows::delete_show))
        .route("/shows/{id}/bookings", post(shows::book_show))
        .route("/bookings", get(bookings::list_bookings))
        .route("/bookings/{id}", delete(bookings::cancel_booking))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::auth_middleware))
}
