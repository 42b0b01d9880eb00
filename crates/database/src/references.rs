//! Media URLs referenced by stored rows.

use sqlx::SqlitePool;

use crate::Result;

/// Every distinct media URL any row points at.
pub async fn referenced_urls(pool: &SqlitePool) -> Result<Vec<String>> {
    let urls = sqlx::query_scalar::<_, String>(
        r#"
        SELECT url FROM memories
        UNION
        SELECT media_url FROM timeline_events WHERE media_url IS NOT NULL
        UNION
        SELECT media_url FROM love_letters WHERE media_url IS NOT NULL
        UNION
        SELECT music_url FROM app_config WHERE music_url IS NOT NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(urls)
}
