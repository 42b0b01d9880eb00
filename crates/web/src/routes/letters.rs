//! Love letter routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use database::{LoveLetter, NewLoveLetter};

use crate::error::Result;
use crate::state::AppState;

/// All letters. Letters whose unlock time has passed are delivered first.
pub async fn list_letters(State(state): State<AppState>) -> Result<Json<Vec<LoveLetter>>> {
    let pool = state.db.pool();
    database::letter::deliver_due_letters(pool, Utc::now()).await?;
    Ok(Json(database::letter::list_letters(pool).await?))
}

pub async fn create_letter(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewLoveLetter>, JsonRejection>,
) -> Result<(StatusCode, Json<LoveLetter>)> {
    let Json(new) = payload?;
    let letter = database::letter::create_letter(state.db.pool(), &new, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(letter)))
}

/// Delete a letter and, best effort, its attached media.
pub async fn delete_letter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LoveLetter>> {
    let letter = database::letter::delete_letter(state.db.pool(), &id).await?;
    if let Some(url) = &letter.media_url {
        state.discard_media(url).await;
    }
    Ok(Json(letter))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{send, test_app};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_letters_arrive_when_listed() {
        let (app, _) = test_app().await;

        let (status, letter) = send(
            &app,
            "POST",
            "/api/letters",
            Some(json!({
                "fromPartner": "partner2",
                "title": "Read me first",
                "content": "Hi love."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(letter["delivered"], false);

        send(
            &app,
            "POST",
            "/api/letters",
            Some(json!({
                "fromPartner": "partner1",
                "title": "For our tenth",
                "content": "Still you.",
                "unlockAt": "2099-01-01T00:00:00Z"
            })),
        )
        .await;

        let (status, letters) = send(&app, "GET", "/api/letters", None).await;
        assert_eq!(status, StatusCode::OK);
        let letters = letters.as_array().unwrap();
        assert_eq!(letters.len(), 2);
        assert_eq!(letters[0]["delivered"], true);
        assert_eq!(letters[1]["delivered"], false);

        let (_, events) = send(&app, "GET", "/api/timeline", None).await;
        let events = events.as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "letter");
    }

    #[tokio::test]
    async fn test_delete_missing_letter() {
        let (app, _) = test_app().await;
        let (status, _) = send(&app, "DELETE", "/api/letters/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
