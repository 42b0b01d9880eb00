//! Route handlers for the HTTP API.

pub mod app_config;
pub mod cleanup;
pub mod coupons;
pub mod health;
pub mod layout;
pub mod letters;
pub mod memories;
pub mod stats;
pub mod timeline;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Multipart framing allowance on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the router with all routes.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Shared configuration
        .route(
            "/api/config",
            get(app_config::get_config).put(app_config::update_config),
        )
        // Points, XP and leaves
        .route("/api/stats", get(stats::get_stats))
        .route("/api/stats/add-xp", put(stats::add_xp))
        .route("/api/stats/quest-complete", post(stats::complete_quest))
        .route("/api/stats/add-leaf", post(stats::add_leaf))
        .route("/api/stats/add-points", post(stats::add_points))
        // Timeline
        .route(
            "/api/timeline",
            get(timeline::list_events).post(timeline::create_event),
        )
        .route(
            "/api/timeline/:id",
            get(timeline::get_event)
                .put(timeline::update_event)
                .delete(timeline::delete_event),
        )
        .route("/api/layout/timeline", get(layout::timeline_layout))
        // Gallery
        .route(
            "/api/memories",
            get(memories::list_memories).post(memories::add_memory),
        )
        .route("/api/memories/:id", delete(memories::delete_memory))
        // Coupons
        .route(
            "/api/coupons",
            get(coupons::list_coupons).post(coupons::create_coupon),
        )
        .route("/api/coupons/:id/redeem", post(coupons::redeem_coupon))
        .route("/api/coupons/:id", delete(coupons::delete_coupon))
        // Love letters
        .route(
            "/api/letters",
            get(letters::list_letters).post(letters::create_letter),
        )
        .route("/api/letters/:id", delete(letters::delete_letter))
        // Media
        .route(
            "/api/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
        .route("/api/cleanup", get(cleanup::report).delete(cleanup::purge))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use database::Database;
    use media_store::MemoryStore;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::state::AppState;

    /// Router over an in-memory database and object store.
    pub async fn test_app() -> (Router, AppState) {
        test_app_with(Config::from_lookup(|_| None).unwrap()).await
    }

    pub async fn test_app_with(config: Config) -> (Router, AppState) {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();

        let store = Arc::new(MemoryStore::new(&config.media_base_url));
        let state = AppState::new(db, store, config);

        let app = super::router(state.config.max_upload_bytes).with_state(state.clone());
        (app, state)
    }

    /// Send a request with an optional JSON body and decode the JSON reply.
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}
