//! Computed timeline layout.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use database::validation::validate_zoom;
use database::DatabaseError;
use narinyland_core::{layout, merge, LayoutMode, LayoutParams, TimelineEntry, TimelineLayout};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::AppState;

const DEFAULT_WIDTH: f64 = 800.0;

#[derive(Debug, Default, Deserialize)]
pub struct LayoutQuery {
    pub mode: Option<LayoutMode>,
    pub zoom: Option<f64>,
    pub width: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub entries: Vec<TimelineEntry>,
    pub layout: TimelineLayout,
    pub svg_path: String,
}

/// Stored events merged with anniversary markers, positioned for rendering.
///
/// Mode and zoom default to the configured ones. An explicit zoom must be in
/// the same range the configuration accepts.
pub async fn timeline_layout(
    State(state): State<AppState>,
    query: std::result::Result<Query<LayoutQuery>, QueryRejection>,
) -> Result<Json<LayoutResponse>> {
    let Query(query) = query?;
    if let Some(zoom) = query.zoom {
        validate_zoom(zoom).map_err(DatabaseError::from)?;
    }
    let pool = state.db.pool();

    let config = database::app_config::get_config(pool).await?;
    let events = database::timeline::list_events(pool).await?;

    let now = Utc::now();
    let entries = merge(events, config.anniversary_date, now);

    let mode = query.mode.unwrap_or(config.timeline_layout);
    let params = LayoutParams {
        zoom: query.zoom.unwrap_or(config.timeline_zoom),
        container_width: query.width.unwrap_or(DEFAULT_WIDTH),
        now,
    };
    let layout = layout(mode, &entries, &params);
    let svg_path = layout.svg_path();

    Ok(Json(LayoutResponse {
        entries,
        layout,
        svg_path,
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{send, test_app};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_layout() {
        let (app, _) = test_app().await;
        let (status, body) = send(&app, "GET", "/api/layout/timeline", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["layout"]["mode"], "vertical");
        assert_eq!(body["layout"]["height"], 0.0);
        assert_eq!(body["svgPath"], "");
        assert!(body["layout"]["nowMarker"].is_null());
    }

    #[tokio::test]
    async fn test_layout_includes_anniversaries() {
        let (app, _) = test_app().await;
        send(
            &app,
            "PUT",
            "/api/config",
            Some(json!({ "anniversaryDate": "2020-02-14T00:00:00Z" })),
        )
        .await;
        send(
            &app,
            "POST",
            "/api/timeline",
            Some(json!({ "text": "Moved in", "timestamp": "2021-09-01T00:00:00Z" })),
        )
        .await;

        let (status, body) =
            send(&app, "GET", "/api/layout/timeline?mode=wave&zoom=2&width=1024", None).await;
        assert_eq!(status, StatusCode::OK);

        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["variant"], "anniversary");
        assert_eq!(entries[0]["label"], "The Beginning of Us");
        assert!(entries.iter().any(|e| e["variant"] == "real"));
        assert_eq!(body["layout"]["mode"], "wave");
        assert_eq!(
            body["layout"]["nodes"].as_array().unwrap().len(),
            entries.len()
        );
        assert!(body["svgPath"].as_str().unwrap().starts_with('M'));
    }

    #[tokio::test]
    async fn test_out_of_range_zoom_is_bad_request() {
        let (app, _) = test_app().await;
        send(
            &app,
            "POST",
            "/api/timeline",
            Some(json!({ "text": "First date", "timestamp": "2020-01-01T00:00:00Z" })),
        )
        .await;

        for zoom in ["1e300", "0", "-2", "10.5"] {
            let uri = format!("/api/layout/timeline?mode=wave&zoom={}", zoom);
            let (status, body) = send(&app, "GET", &uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "zoom {}", zoom);
            assert_eq!(body["error"], "Validation failed");
        }

        let (status, body) =
            send(&app, "GET", "/api/layout/timeline?mode=wave&zoom=10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["layout"]["path"].as_array().unwrap().len() <= 4097);
    }

    #[tokio::test]
    async fn test_unknown_mode_is_bad_request() {
        let (app, _) = test_app().await;
        let (status, _) = send(&app, "GET", "/api/layout/timeline?mode=spiral", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
