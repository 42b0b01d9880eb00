//! Media upload.

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use media_store::object_key;
use narinyland_core::MediaType;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub key: String,
    pub url: String,
    pub size_bytes: u64,
    pub media_type: MediaType,
}

struct FilePart {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

/// Store a multipart `file` field, optionally under a `folder`.
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart?;
    let mut file = None;
    let mut folder = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                file = Some(FilePart {
                    filename,
                    content_type,
                    bytes,
                });
            }
            Some("folder") => folder = Some(field.text().await?),
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    if file.bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    let max = state.config.max_upload_bytes;
    if file.bytes.len() > max {
        return Err(ApiError::BadRequest(format!(
            "File too large: {} bytes (max {})",
            file.bytes.len(),
            max
        )));
    }
    let media_type = MediaType::from_content_type(&file.content_type).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Unsupported file type: {}",
            file.content_type
        ))
    })?;

    let key = object_key(folder.as_deref(), &file.filename);
    let stored = state
        .store
        .put(&key, file.bytes.to_vec(), &file.content_type)
        .await?;

    info!(
        key = %stored.key,
        size = stored.size_bytes,
        media_type = %media_type.as_str(),
        "Upload stored"
    );

    Ok(Json(UploadResponse {
        key: stored.key,
        url: stored.url,
        size_bytes: stored.size_bytes,
        media_type,
    }))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::routes::test_support::{test_app, test_app_with};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use media_store::ObjectStore;
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "narinyland-test-boundary";

    fn multipart_body(folder: Option<&str>, file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(folder) = folder {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"folder\"\r\n\r\n{}\r\n",
                    BOUNDARY, folder
                )
                .as_bytes(),
            );
        }
        if let Some((filename, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, filename, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    async fn post_upload(app: &Router, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_upload_image() {
        let (app, state) = test_app().await;
        let body = multipart_body(
            Some("memories"),
            Some(("Beach.JPG", "image/jpeg", &b"\xff\xd8\xff\xe0fake"[..])),
        );

        let (status, reply) = post_upload(&app, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["sizeBytes"], 8);
        assert_eq!(reply["mediaType"], "image");

        let key = reply["key"].as_str().unwrap();
        assert!(key.starts_with("memories/") && key.ends_with(".jpg"));
        assert_eq!(reply["url"], format!("/media/{}", key));
        assert_eq!(state.store.list_keys().await.unwrap(), vec![key.to_string()]);
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let (app, _) = test_app().await;

        let (status, reply) = post_upload(&app, multipart_body(Some("memories"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["error"], "No file uploaded");

        let body = multipart_body(None, Some(("notes.pdf", "application/pdf", &b"%PDF"[..])));
        let (status, _) = post_upload(&app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let config = Config {
            max_upload_bytes: 4,
            ..Config::from_lookup(|_| None).unwrap()
        };
        let (app, state) = test_app_with(config).await;

        let body = multipart_body(None, Some(("song.mp3", "audio/mpeg", &b"0123456789"[..])));
        let (status, reply) = post_upload(&app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(reply["error"].as_str().unwrap().starts_with("File too large"));
        assert!(state.store.list_keys().await.unwrap().is_empty());
    }
}
