use rust_embed::RustEmbed;
use sqlx::SqlitePool;
use std::str;

use crate::error::{Error, Result};

#[derive(RustEmbed)]
#[folder = "schema/"]
struct SchemaAssets;

const BUILD_ORDER: &str = "00_build_order.sql";

/// Reads the build order and applies all SQL files in a single transaction.
pub async fn rebuild_database(pool: &SqlitePool) -> Result<()> {
    let script = assemble_script()?;

    let mut tx = pool.begin().await?;
    sqlx::raw_sql(&script).execute(&mut *tx).await?;
    tx.commit().await?;

    tracing::debug!("schema applied ({} bytes of SQL)", script.len());
    Ok(())
}

/// Drops every table the build order creates. Cached documents, the
/// pending queue and persisted settings are all lost.
pub async fn reset_database(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(
        "DROP TABLE IF EXISTS cache_entries;
         DROP TABLE IF EXISTS pending_downloads;
         DROP TABLE IF EXISTS settings;",
    )
    .execute(pool)
    .await?;
    tracing::warn!("local store reset");
    Ok(())
}

fn assemble_script() -> Result<String> {
    let manifest = get_file_content(BUILD_ORDER)?;
    let mut full_script = String::new();

    for line in manifest.lines() {
        let trimmed = line.trim();

        // -- @include tables/file.sql
        if let Some(path) = parse_include_directive(trimmed) {
            tracing::debug!("including {}", path);
            full_script.push_str(&get_file_content(path)?);
            full_script.push('\n');
        } else if !trimmed.starts_with("--") {
            full_script.push_str(line);
            full_script.push('\n');
        }
    }

    Ok(full_script)
}

fn get_file_content(path: &str) -> Result<String> {
    let file = SchemaAssets::get(path).ok_or_else(|| Error::MissingAsset(path.to_string()))?;
    str::from_utf8(file.data.as_ref())
        .map(str::to_string)
        .map_err(|_| Error::InvalidAsset(path.to_string()))
}

fn parse_include_directive(line: &str) -> Option<&str> {
    if line.starts_with("--") && line.contains("@include") {
        line.split_whitespace().last()
    } else {
        None
    }
}
