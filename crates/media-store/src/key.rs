//! Object keys: `folder/uuid.ext`, relative and without traversal.

use crate::error::{Result, StoreError};

const MAX_EXTENSION_LENGTH: usize = 8;

/// Folder used when the caller names none or an unusable one.
pub const DEFAULT_FOLDER: &str = "uploads";

/// Build a fresh key under `folder`, keeping the extension of `filename`.
///
/// The folder is reduced to lowercase ASCII alphanumerics, `-` and `_`.
/// Extensions that are too long or not alphanumeric are dropped.
pub fn object_key(folder: Option<&str>, filename: &str) -> String {
    let folder = folder
        .map(sanitize_segment)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FOLDER.to_string());

    let id = uuid::Uuid::new_v4();
    match extension(filename) {
        Some(ext) => format!("{}/{}.{}", folder, id, ext),
        None => format!("{}/{}", folder, id),
    }
}

/// Reject keys that could escape the store root.
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn sanitize_segment(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LENGTH {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
