//! Love coupon routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use database::{Coupon, NewCoupon};

use crate::error::Result;
use crate::state::AppState;

pub async fn list_coupons(State(state): State<AppState>) -> Result<Json<Vec<Coupon>>> {
    Ok(Json(database::coupon::list_coupons(state.db.pool()).await?))
}

pub async fn create_coupon(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewCoupon>, JsonRejection>,
) -> Result<(StatusCode, Json<Coupon>)> {
    let Json(new) = payload?;
    let coupon = database::coupon::create_coupon(state.db.pool(), &new).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// Redeem a coupon once, paying its price in points.
pub async fn redeem_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Coupon>> {
    let coupon = database::coupon::redeem_coupon(state.db.pool(), &id, Utc::now()).await?;
    Ok(Json(coupon))
}

pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    database::coupon::delete_coupon(state.db.pool(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{send, test_app};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_coupon_lifecycle() {
        let (app, _) = test_app().await;
        send(
            &app,
            "POST",
            "/api/stats/add-points",
            Some(json!({ "partnerId": "partner2", "amount": 25 })),
        )
        .await;

        let (status, coupon) = send(
            &app,
            "POST",
            "/api/coupons",
            Some(json!({
                "title": "One free massage",
                "desc": "Valid any evening",
                "emoji": "💆",
                "forPartner": "partner1",
                "points": 25
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(coupon["color"], "#ff8fab");
        assert_eq!(coupon["isRedeemed"], false);
        let id = coupon["id"].as_str().unwrap();

        let (status, redeemed) =
            send(&app, "POST", &format!("/api/coupons/{}/redeem", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(redeemed["isRedeemed"], true);

        let (status, _) = send(&app, "POST", &format!("/api/coupons/{}/redeem", id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, stats) = send(&app, "GET", "/api/stats", None).await;
        assert_eq!(stats["totalPoints"], 0);

        let (status, _) = send(&app, "DELETE", &format!("/api/coupons/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, coupons) = send(&app, "GET", "/api/coupons", None).await;
        assert!(coupons.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redeem_needs_points() {
        let (app, _) = test_app().await;
        let (_, coupon) = send(
            &app,
            "POST",
            "/api/coupons",
            Some(json!({ "title": "Dinner", "forPartner": "partner1", "points": 10 })),
        )
        .await;
        let id = coupon["id"].as_str().unwrap();

        let (status, body) =
            send(&app, "POST", &format!("/api/coupons/{}/redeem", id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Not enough points");
    }
}
