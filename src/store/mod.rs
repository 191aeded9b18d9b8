//! SQLite-backed metadata store for gallery records.
//!
//! Records live in a single `images` table; tags are kept as a JSON array
//! column and filtered with `json_each`. The service owns one connection
//! behind a mutex and is cheap to clone.
//!
//! # Async Usage
//!
//! All database operations are blocking. The public async methods wrap each
//! operation in `spawn_blocking` to avoid stalling the async runtime, so
//! handlers can call the store directly.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::Path;
use std::sync::Arc;

use crate::constants;
use crate::model::{ImageMetadata, ImagePatch, ImageRecord, Position3};

/// Key a listing can be ordered by. Parsed from the API's `sortBy`
/// parameter against a fixed whitelist; raw input never reaches the SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    Title,
    Views,
    Likes,
}

impl SortKey {
    /// Parse the wire name; unrecognized keys are rejected by the caller.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "createdAt" => Some(Self::CreatedAt),
            "title" => Some(Self::Title),
            "views" => Some(Self::Views),
            "likes" => Some(Self::Likes),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Title => "title",
            Self::Views => "views",
            Self::Likes => "likes",
        }
    }
}

/// Listing order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Validated listing filter: pagination window, ordering, and the two
/// content filters (any-of tag membership, substring search).
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub sort_by: SortKey,
    pub sort_dir: SortDir,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            search: None,
            tags: Vec::new(),
            sort_by: SortKey::default(),
            sort_dir: SortDir::default(),
            limit: constants::DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Outcome of a transactional bulk position update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkUpdate {
    /// All rows updated; carries the number of records touched.
    Applied(usize),
    /// An id did not match any record. The transaction was rolled back and
    /// no position changed.
    MissingId(String),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS images (
    id            TEXT PRIMARY KEY,
    title         TEXT NOT NULL DEFAULT '',
    description   TEXT NOT NULL DEFAULT '',
    image_url     TEXT NOT NULL,
    thumbnail_url TEXT NOT NULL,
    width         INTEGER NOT NULL,
    height        INTEGER NOT NULL,
    format        TEXT NOT NULL,
    size          INTEGER NOT NULL,
    uploaded_by   TEXT NOT NULL DEFAULT '',
    tags          TEXT NOT NULL DEFAULT '[]',
    pos_x         REAL NOT NULL DEFAULT 0,
    pos_y         REAL NOT NULL DEFAULT 0,
    pos_z         REAL NOT NULL DEFAULT 0,
    views         INTEGER NOT NULL DEFAULT 0,
    likes         INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_images_created_at ON images(created_at);
CREATE INDEX IF NOT EXISTS idx_images_views ON images(views);
";

const COLUMNS: &str = "id, title, description, image_url, thumbnail_url, \
     width, height, format, size, uploaded_by, tags, \
     pos_x, pos_y, pos_z, views, likes, created_at";

/// Metadata store for gallery records.
///
/// # Thread Safety
///
/// `ImageStore` is `Clone` and can be shared across threads. Access to the
/// underlying connection is serialized by a mutex; concurrent requests
/// queue on it for the duration of a single statement or transaction.
#[derive(Clone)]
pub struct ImageStore {
    conn: Arc<Mutex<Connection>>,
}

impl ImageStore {
    /// Creates or opens a file-backed store.
    ///
    /// The parent directory is created if needed and the schema applied
    /// on first open. WAL journaling keeps readers unblocked by writers.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened or initialized.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to enable WAL journaling")?;
        Self::init(conn)
    }

    /// Creates an in-memory store. All data is lost when the last clone is
    /// dropped; intended for tests and ephemeral development servers.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize images table")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Inserts a freshly created record.
    ///
    /// # Errors
    ///
    /// Returns an error on constraint violation (duplicate id) or any
    /// database failure.
    pub async fn insert(&self, record: ImageRecord) -> Result<()> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.insert_sync(&record))
            .await
            .context("Task join error")?
    }

    /// Fetches a record without touching its view counter.
    pub async fn get(&self, id: &str) -> Result<Option<ImageRecord>> {
        let store = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || store.get_sync(&id))
            .await
            .context("Task join error")?
    }

    /// Fetches a record, incrementing its view counter first. The returned
    /// record carries the incremented count.
    pub async fn get_and_increment_views(&self, id: &str) -> Result<Option<ImageRecord>> {
        let store = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || store.get_and_increment_views_sync(&id))
            .await
            .context("Task join error")?
    }

    /// Applies a partial update to the mutable fields, returning the
    /// updated record, or `None` when the id is unknown.
    pub async fn update(&self, id: &str, patch: ImagePatch) -> Result<Option<ImageRecord>> {
        let store = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || store.update_sync(&id, patch))
            .await
            .context("Task join error")?
    }

    /// Deletes a record, returning it so the caller can remove the derived
    /// files, or `None` when the id is unknown.
    pub async fn delete(&self, id: &str) -> Result<Option<ImageRecord>> {
        let store = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || store.delete_sync(&id))
            .await
            .context("Task join error")?
    }

    /// Adjusts the like counter up or down, returning the new count, or
    /// `None` when the id is unknown.
    pub async fn toggle_like(&self, id: &str, increment: bool) -> Result<Option<i64>> {
        let store = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || store.toggle_like_sync(&id, increment))
            .await
            .context("Task join error")?
    }

    /// Lists records matching the filter, returning the page plus the total
    /// match count (for pagination math).
    pub async fn list(&self, filter: ListFilter) -> Result<(Vec<ImageRecord>, u64)> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.list_sync(&filter))
            .await
            .context("Task join error")?
    }

    /// Most-viewed records, ties broken by likes.
    pub async fn trending(&self, limit: u32) -> Result<Vec<ImageRecord>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.trending_sync(limit))
            .await
            .context("Task join error")?
    }

    /// Overwrites `position3D` for every listed record inside a single
    /// transaction: either all rows update or none do.
    pub async fn update_positions(&self, updates: Vec<(String, Position3)>) -> Result<BulkUpdate> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.update_positions_sync(&updates))
            .await
            .context("Task join error")?
    }

    /// Cheap liveness probe for the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = store.conn.lock();
            conn.query_row("SELECT 1", [], |_| Ok(()))
                .context("Database ping failed")
        })
        .await
        .context("Task join error")?
    }

    // =========================================================================
    // Blocking implementations
    // =========================================================================

    fn insert_sync(&self, record: &ImageRecord) -> Result<()> {
        let conn = self.conn.lock();
        let tags = serde_json::to_string(&record.tags).context("Failed to encode tags")?;
        conn.execute(
            "INSERT INTO images (id, title, description, image_url, thumbnail_url, \
             width, height, format, size, uploaded_by, tags, \
             pos_x, pos_y, pos_z, views, likes, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                record.id,
                record.title,
                record.description,
                record.image_url,
                record.thumbnail_url,
                record.metadata.width,
                record.metadata.height,
                record.metadata.format,
                record.metadata.size as i64,
                record.metadata.uploaded_by,
                tags,
                record.position3d.x,
                record.position3d.y,
                record.position3d.z,
                record.views,
                record.likes,
                encode_timestamp(record.created_at),
            ],
        )
        .with_context(|| format!("Failed to insert image record '{}'", record.id))?;
        Ok(())
    }

    fn get_sync(&self, id: &str) -> Result<Option<ImageRecord>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM images WHERE id = ?1"),
            params![id],
            record_from_row,
        )
        .optional()
        .with_context(|| format!("Failed to load image record '{id}'"))
    }

    fn get_and_increment_views_sync(&self, id: &str) -> Result<Option<ImageRecord>> {
        let conn = self.conn.lock();
        let changed = conn
            .execute("UPDATE images SET views = views + 1 WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to increment views for '{id}'"))?;
        if changed == 0 {
            return Ok(None);
        }
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM images WHERE id = ?1"),
            params![id],
            record_from_row,
        )
        .optional()
        .with_context(|| format!("Failed to load image record '{id}'"))
    }

    fn update_sync(&self, id: &str, patch: ImagePatch) -> Result<Option<ImageRecord>> {
        let conn = self.conn.lock();

        if !patch.is_empty() {
            let mut sets: Vec<&'static str> = Vec::new();
            let mut values: Vec<Value> = Vec::new();

            if let Some(title) = patch.title {
                sets.push("title = ?");
                values.push(title.into());
            }
            if let Some(description) = patch.description {
                sets.push("description = ?");
                values.push(description.into());
            }
            if let Some(tags) = patch.tags {
                sets.push("tags = ?");
                values.push(serde_json::to_string(&tags).context("Failed to encode tags")?.into());
            }
            if let Some(pos) = patch.position3d {
                sets.push("pos_x = ?");
                values.push(pos.x.into());
                sets.push("pos_y = ?");
                values.push(pos.y.into());
                sets.push("pos_z = ?");
                values.push(pos.z.into());
            }

            values.push(id.to_string().into());
            let sql = format!("UPDATE images SET {} WHERE id = ?", sets.join(", "));
            let changed = conn
                .execute(&sql, params_from_iter(values))
                .with_context(|| format!("Failed to update image record '{id}'"))?;
            if changed == 0 {
                return Ok(None);
            }
        }

        conn.query_row(
            &format!("SELECT {COLUMNS} FROM images WHERE id = ?1"),
            params![id],
            record_from_row,
        )
        .optional()
        .with_context(|| format!("Failed to load image record '{id}'"))
    }

    fn delete_sync(&self, id: &str) -> Result<Option<ImageRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM images WHERE id = ?1"),
                params![id],
                record_from_row,
            )
            .optional()
            .with_context(|| format!("Failed to load image record '{id}'"))?;

        let Some(record) = record else {
            return Ok(None);
        };

        conn.execute("DELETE FROM images WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete image record '{id}'"))?;
        Ok(Some(record))
    }

    fn toggle_like_sync(&self, id: &str, increment: bool) -> Result<Option<i64>> {
        let delta: i64 = if increment { 1 } else { -1 };
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE images SET likes = likes + ?1 WHERE id = ?2",
                params![delta, id],
            )
            .with_context(|| format!("Failed to adjust likes for '{id}'"))?;
        if changed == 0 {
            return Ok(None);
        }
        let likes = conn
            .query_row("SELECT likes FROM images WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .with_context(|| format!("Failed to load likes for '{id}'"))?;
        Ok(Some(likes))
    }

    fn list_sync(&self, filter: &ListFilter) -> Result<(Vec<ImageRecord>, u64)> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(
                "(LOWER(title) LIKE '%' || LOWER(?) || '%' ESCAPE '\\' \
                 OR LOWER(description) LIKE '%' || LOWER(?) || '%' ESCAPE '\\')"
                    .to_string(),
            );
            let escaped = escape_like(search);
            values.push(escaped.clone().into());
            values.push(escaped.into());
        }

        if !filter.tags.is_empty() {
            // Any-of membership over the JSON tags column.
            let placeholders = vec!["?"; filter.tags.len()].join(", ");
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM json_each(images.tags) \
                 WHERE json_each.value IN ({placeholders}))"
            ));
            for tag in &filter.tags {
                values.push(tag.clone().into());
            }
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let conn = self.conn.lock();

        let total: u64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM images {where_sql}"),
                params_from_iter(values.iter()),
                |row| row.get::<_, i64>(0).map(|n| n as u64),
            )
            .context("Failed to count image records")?;

        // Sort column and direction come from fixed whitelists, never from
        // raw request input.
        let sql = format!(
            "SELECT {COLUMNS} FROM images {where_sql} ORDER BY {} {} LIMIT ? OFFSET ?",
            filter.sort_by.column(),
            filter.sort_dir.sql(),
        );
        values.push(i64::from(filter.limit).into());
        values.push(i64::from(filter.offset).into());

        let mut stmt = conn.prepare(&sql).context("Failed to prepare list query")?;
        let records = stmt
            .query_map(params_from_iter(values), record_from_row)
            .context("Failed to list image records")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read image records")?;

        Ok((records, total))
    }

    fn trending_sync(&self, limit: u32) -> Result<Vec<ImageRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM images ORDER BY views DESC, likes DESC LIMIT ?1"
            ))
            .context("Failed to prepare trending query")?;
        let records = stmt
            .query_map(params![limit], record_from_row)
            .context("Failed to query trending records")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read trending records")?;
        Ok(records)
    }

    fn update_positions_sync(&self, updates: &[(String, Position3)]) -> Result<BulkUpdate> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .context("Failed to begin positions transaction")?;

        let mut applied = 0usize;
        for (id, pos) in updates {
            let changed = tx
                .execute(
                    "UPDATE images SET pos_x = ?1, pos_y = ?2, pos_z = ?3 WHERE id = ?4",
                    params![pos.x, pos.y, pos.z, id],
                )
                .with_context(|| format!("Failed to update position for '{id}'"))?;
            if changed == 0 {
                // Dropping the transaction rolls back every prior update.
                return Ok(BulkUpdate::MissingId(id.clone()));
            }
            applied += changed;
        }

        tx.commit().context("Failed to commit positions transaction")?;
        Ok(BulkUpdate::Applied(applied))
    }
}

/// Escape LIKE wildcards in a user-supplied search term.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Map a SELECT row (in [`COLUMNS`] order) back to a record.
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ImageRecord> {
    let tags_json: String = row.get(10)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    let created_at: String = row.get(16)?;

    Ok(ImageRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        image_url: row.get(3)?,
        thumbnail_url: row.get(4)?,
        metadata: ImageMetadata {
            width: row.get(5)?,
            height: row.get(6)?,
            format: row.get(7)?,
            size: row.get::<_, i64>(8)? as u64,
            uploaded_by: row.get(9)?,
        },
        tags,
        position3d: Position3::new(row.get(11)?, row.get(12)?, row.get(13)?),
        views: row.get(14)?,
        likes: row.get(15)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, title: &str, tags: &[&str]) -> ImageRecord {
        ImageRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            image_url: format!("/uploads/full-1-{id}.jpg"),
            thumbnail_url: format!("/uploads/thumb-1-{id}.jpg"),
            metadata: ImageMetadata {
                width: 800,
                height: 600,
                format: "jpeg".into(),
                size: 1024,
                uploaded_by: "Anonymous".into(),
            },
            tags: tags.iter().map(|t| t.to_string()).collect(),
            position3d: Position3::ORIGIN,
            views: 0,
            likes: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let store = ImageStore::memory().unwrap();
        let record = sample("a", "Sunset", &["sky", "orange"]);
        store.insert(record.clone()).await.unwrap();

        let loaded = store.get("a").await.unwrap().unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.tags, vec!["sky", "orange"]);
        assert_eq!(loaded.metadata, record.metadata);
        assert_eq!(loaded.views, 0);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = ImageStore::memory().unwrap();
        store.insert(sample("a", "one", &[])).await.unwrap();
        assert!(store.insert(sample("a", "two", &[])).await.is_err());
    }

    #[tokio::test]
    async fn get_and_increment_views_counts_reads() {
        let store = ImageStore::memory().unwrap();
        store.insert(sample("a", "Sunset", &[])).await.unwrap();

        let first = store.get_and_increment_views("a").await.unwrap().unwrap();
        assert_eq!(first.views, 1);
        let second = store.get_and_increment_views("a").await.unwrap().unwrap();
        assert_eq!(second.views, 2);

        assert!(store.get_and_increment_views("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_patches_only_given_fields() {
        let store = ImageStore::memory().unwrap();
        store.insert(sample("a", "Old", &["keep"])).await.unwrap();

        let patch = ImagePatch {
            title: Some("New".into()),
            position3d: Some(Position3::new(1.0, 2.0, 3.0)),
            ..ImagePatch::default()
        };
        let updated = store.update("a", patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.tags, vec!["keep"]);
        assert_eq!(updated.position3d, Position3::new(1.0, 2.0, 3.0));

        assert!(store.update("nope", ImagePatch::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_record_once() {
        let store = ImageStore::memory().unwrap();
        store.insert(sample("a", "Sunset", &[])).await.unwrap();

        let deleted = store.delete("a").await.unwrap().unwrap();
        assert_eq!(deleted.id, "a");
        assert!(store.delete("a").await.unwrap().is_none());
        assert!(store.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn like_toggle_moves_both_ways() {
        let store = ImageStore::memory().unwrap();
        store.insert(sample("a", "Sunset", &[])).await.unwrap();

        assert_eq!(store.toggle_like("a", true).await.unwrap(), Some(1));
        assert_eq!(store.toggle_like("a", true).await.unwrap(), Some(2));
        assert_eq!(store.toggle_like("a", false).await.unwrap(), Some(1));
        assert_eq!(store.toggle_like("nope", true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_filters_by_tag_membership() {
        let store = ImageStore::memory().unwrap();
        store.insert(sample("a", "one", &["sky", "sea"])).await.unwrap();
        store.insert(sample("b", "two", &["forest"])).await.unwrap();
        store.insert(sample("c", "three", &[])).await.unwrap();

        let filter = ListFilter {
            tags: vec!["sky".into(), "mountain".into()],
            ..ListFilter::default()
        };
        let (records, total) = store.list(filter).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
    }

    #[tokio::test]
    async fn list_searches_title_and_description() {
        let store = ImageStore::memory().unwrap();
        let mut with_desc = sample("a", "plain", &[]);
        with_desc.description = "Golden Hour over the bay".into();
        store.insert(with_desc).await.unwrap();
        store.insert(sample("b", "golden gate", &[])).await.unwrap();
        store.insert(sample("c", "unrelated", &[])).await.unwrap();

        let filter = ListFilter {
            search: Some("golden".into()),
            sort_by: SortKey::Title,
            sort_dir: SortDir::Asc,
            ..ListFilter::default()
        };
        let (records, total) = store.list(filter).await.unwrap();
        assert_eq!(total, 2);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let store = ImageStore::memory().unwrap();
        store.insert(sample("a", "100% cotton", &[])).await.unwrap();
        store.insert(sample("b", "100 pct", &[])).await.unwrap();

        let filter = ListFilter {
            search: Some("100%".into()),
            ..ListFilter::default()
        };
        let (records, total) = store.list(filter).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(records[0].id, "a");
    }

    #[tokio::test]
    async fn list_paginates_with_total() {
        let store = ImageStore::memory().unwrap();
        for i in 0..5 {
            store
                .insert(sample(&format!("id{i}"), &format!("t{i}"), &[]))
                .await
                .unwrap();
        }

        let filter = ListFilter {
            sort_by: SortKey::Title,
            sort_dir: SortDir::Asc,
            limit: 2,
            offset: 2,
            ..ListFilter::default()
        };
        let (records, total) = store.list(filter).await.unwrap();
        assert_eq!(total, 5);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["id2", "id3"]);
    }

    #[tokio::test]
    async fn trending_orders_by_views_then_likes() {
        let store = ImageStore::memory().unwrap();
        store.insert(sample("a", "a", &[])).await.unwrap();
        store.insert(sample("b", "b", &[])).await.unwrap();
        store.insert(sample("c", "c", &[])).await.unwrap();

        store.get_and_increment_views("b").await.unwrap();
        store.get_and_increment_views("b").await.unwrap();
        store.get_and_increment_views("c").await.unwrap();
        store.get_and_increment_views("a").await.unwrap();
        store.toggle_like("c", true).await.unwrap();

        let records = store.trending(2).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn bulk_positions_apply_atomically() {
        let store = ImageStore::memory().unwrap();
        store.insert(sample("a", "a", &[])).await.unwrap();
        store.insert(sample("b", "b", &[])).await.unwrap();

        let outcome = store
            .update_positions(vec![
                ("a".into(), Position3::new(1.0, 0.0, 0.0)),
                ("b".into(), Position3::new(0.0, 2.0, 0.0)),
            ])
            .await
            .unwrap();
        assert_eq!(outcome, BulkUpdate::Applied(2));
        assert_eq!(
            store.get("b").await.unwrap().unwrap().position3d,
            Position3::new(0.0, 2.0, 0.0)
        );
    }

    #[tokio::test]
    async fn bulk_positions_roll_back_on_unknown_id() {
        let store = ImageStore::memory().unwrap();
        store.insert(sample("a", "a", &[])).await.unwrap();

        let outcome = store
            .update_positions(vec![
                ("a".into(), Position3::new(9.0, 9.0, 9.0)),
                ("ghost".into(), Position3::new(1.0, 1.0, 1.0)),
            ])
            .await
            .unwrap();
        assert_eq!(outcome, BulkUpdate::MissingId("ghost".into()));

        // First update rolled back with the failed transaction.
        assert_eq!(
            store.get("a").await.unwrap().unwrap().position3d,
            Position3::ORIGIN
        );
    }

    #[tokio::test]
    async fn file_store_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("gallery.db");

        {
            let store = ImageStore::file(&db_path).unwrap();
            store.insert(sample("a", "kept", &[])).await.unwrap();
        }

        let store = ImageStore::file(&db_path).unwrap();
        let loaded = store.get("a").await.unwrap().unwrap();
        assert_eq!(loaded.title, "kept");
    }

    #[tokio::test]
    async fn ping_succeeds_on_open_store() {
        let store = ImageStore::memory().unwrap();
        store.ping().await.unwrap();
    }
}
