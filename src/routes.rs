use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing::warn;

use crate::{
    config::Config,
    handlers::{self, admin as admin_handlers, auth as auth_handlers, contact as contact_handlers},
    state::AppState,
};

pub fn app_router(state: Arc<AppState>) -> Router {
    let mut auth = Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login))
        .route("/logout", post(auth_handlers::logout))
        .route("/refresh", post(auth_handlers::refresh))
        .route("/me", get(auth_handlers::me))
        .route("/profile", patch(auth_handlers::update_profile))
        .route("/password", put(auth_handlers::update_password))
        .route(
            "/account/{id}",
            axum::routing::delete(auth_handlers::delete_account),
        );
    if state.cfg.auth_rate_limit {
        auth = rate_limited(auth, &state.cfg);
    }

    let admin = Router::new()
        .route(
            "/users",
            get(admin_handlers::list_users).post(admin_handlers::create_user),
        )
        .route(
            "/users/{id}",
            get(admin_handlers::get_user)
                .patch(admin_handlers::update_user)
                .delete(admin_handlers::delete_user),
        );

    let api = Router::new().route("/contact", post(contact_handlers::send_message));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/auth", auth)
        .nest("/admin", admin)
        .nest("/api", api)
        .with_state(state)
}

/// Per-IP throttle on the credential endpoints.
fn rate_limited(router: Router<Arc<AppState>>, cfg: &Config) -> Router<Arc<AppState>> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(cfg.auth_rate_per_second)
        .burst_size(cfg.auth_rate_burst)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish();

    match governor_conf {
        Some(conf) => router.route_layer(GovernorLayer { config: Arc::new(conf) }),
        None => {
            warn!("invalid auth rate limit settings; rate limiting disabled");
            router
        }
    }
}
