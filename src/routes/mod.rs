pub mod auth;
pub mod posts;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new().merge(auth::router()).merge(posts::router());

    // Credentialed CORS for a configured frontend origin
    if let Some(origin) = state.config.server.cors_origin.as_deref() {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => {
                let cors = CorsLayer::new()
                    .allow_origin(origin)
                    .allow_credentials(true)
                    .allow_methods([Method::GET, Method::POST, Method::PUT])
                    .allow_headers([header::CONTENT_TYPE]);
                router = router.layer(cors);
            }
            Err(_) => {
                tracing::warn!(origin, "ignoring invalid cors_origin value");
            }
        }
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
