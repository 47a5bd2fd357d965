//! Key/value `settings` table

use crate::Result;
use sqlx::SqlitePool;

/// Read a setting; `None` when the key is absent or its value is NULL
pub async fn get_setting(db: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;
    Ok(value.flatten())
}

/// Insert a setting only if the key does not exist yet
pub async fn insert_setting_if_absent(db: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(value)
        .execute(db)
        .await?;
    Ok(())
}
