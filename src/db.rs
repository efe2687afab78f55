//! Read-only client for the document store.
//!
//! The store is the SQLite database written by the ingestion pipeline. Its
//! logical collections are the distinct `source` labels of the `documents`
//! table (e.g. `filesystem:docs`, `git:platform`).
//!
//! Connections are opened read-only and never create the database file, so
//! probing a store leaves it untouched.

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up when the store path is a directory.
pub const STORE_FILE_NAME: &str = "ctx.sqlite";

/// Number of document ids sampled per collection.
pub const SAMPLE_SIZE: i64 = 3;

/// A named group of documents and its size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub documents: i64,
    /// First few document ids, in insertion order.
    pub sample_ids: Vec<String>,
    /// Metadata of the first document, when the store records any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_metadata: Option<Value>,
}

/// Resolve the configured store path to the database file.
pub fn resolve_store_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(STORE_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

pub struct StoreClient {
    pool: SqlitePool,
    has_metadata: bool,
}

impl StoreClient {
    /// Open the store at `path` read-only.
    ///
    /// `timeout` bounds both pool acquisition and SQLite's busy wait on a
    /// locked database.
    pub async fn open(path: &Path, timeout: Duration) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout(timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(timeout)
            .connect_with(options)
            .await?;

        let mut client = Self {
            pool,
            has_metadata: false,
        };
        client.ensure_schema().await?;
        Ok(client)
    }

    async fn ensure_schema(&mut self) -> Result<()> {
        let has_documents: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='documents'",
        )
        .fetch_one(&self.pool)
        .await?;

        if !has_documents {
            bail!("not a document store: table 'documents' is missing");
        }

        self.has_metadata = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('documents') WHERE name = 'metadata_json'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(())
    }

    /// All collections with their document counts, ordered by name.
    ///
    /// Documents without a `source` label belong to no collection.
    pub async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT source, COUNT(*) AS doc_count
            FROM documents
            WHERE source IS NOT NULL
            GROUP BY source
            ORDER BY source
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut collections = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.get("source");
            let sample_ids = self.sample_ids(&name).await?;
            let sample_metadata = self.sample_metadata(&name).await?;
            collections.push(CollectionInfo {
                name,
                documents: row.get("doc_count"),
                sample_ids,
                sample_metadata,
            });
        }
        Ok(collections)
    }

    /// Look up a single collection by name.
    pub async fn collection(&self, name: &str) -> Result<Option<CollectionInfo>> {
        let documents = self.count_documents(name).await?;
        if documents == 0 {
            return Ok(None);
        }
        Ok(Some(CollectionInfo {
            name: name.to_string(),
            documents,
            sample_ids: self.sample_ids(name).await?,
            sample_metadata: self.sample_metadata(name).await?,
        }))
    }

    pub async fn count_documents(&self, collection: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE source = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn sample_ids(&self, collection: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM documents WHERE source = ? ORDER BY rowid LIMIT ?",
        )
        .bind(collection)
        .bind(SAMPLE_SIZE)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Metadata of the collection's first document; empty objects are skipped.
    async fn sample_metadata(&self, collection: &str) -> Result<Option<Value>> {
        if !self.has_metadata {
            return Ok(None);
        }

        let raw: Option<Option<String>> = sqlx::query_scalar(
            "SELECT metadata_json FROM documents WHERE source = ? ORDER BY rowid LIMIT 1",
        )
        .bind(collection)
        .fetch_optional(&self.pool)
        .await?;

        let Some(raw) = raw.flatten() else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
        Ok(match &value {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            Value::String(s) if s.is_empty() => None,
            _ => Some(value),
        })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_resolves_to_store_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(resolve_store_path(tmp.path()), tmp.path().join(STORE_FILE_NAME));

        let file = tmp.path().join("other.sqlite");
        assert_eq!(resolve_store_path(&file), file);
    }

    #[tokio::test]
    async fn test_open_missing_file_does_not_create_it() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.sqlite");
        let result = StoreClient::open(&path, Duration::from_secs(2)).await;
        assert!(result.is_err());
        assert!(!path.exists());
    }

    async fn write_rows(path: &Path, schema: &str, inserts: &[&str]) {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::query(schema).execute(&pool).await.unwrap();
        for insert in inserts {
            sqlx::query(insert).execute(&pool).await.unwrap();
        }
        pool.close().await;
    }

    #[tokio::test]
    async fn test_unlabelled_documents_are_not_a_collection() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(STORE_FILE_NAME);
        write_rows(
            &path,
            "CREATE TABLE documents (id TEXT PRIMARY KEY, source TEXT)",
            &[
                "INSERT INTO documents VALUES ('a', NULL)",
                "INSERT INTO documents VALUES ('b', 'git:platform')",
            ],
        )
        .await;

        let client = StoreClient::open(&path, Duration::from_secs(2)).await.unwrap();
        let collections = client.list_collections().await.unwrap();
        client.close().await;

        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].name, "git:platform");
        assert_eq!(collections[0].sample_metadata, None);
    }

    #[tokio::test]
    async fn test_sample_metadata_from_first_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(STORE_FILE_NAME);
        write_rows(
            &path,
            "CREATE TABLE documents (id TEXT PRIMARY KEY, source TEXT NOT NULL, metadata_json TEXT)",
            &[
                r#"INSERT INTO documents VALUES ('d1', 'filesystem:docs', '{"path": "intro.md"}')"#,
                r#"INSERT INTO documents VALUES ('d2', 'filesystem:docs', '{"path": "later.md"}')"#,
                "INSERT INTO documents VALUES ('g1', 'git:platform', '{}')",
                "INSERT INTO documents VALUES ('n1', 'notes', 'plain text')",
            ],
        )
        .await;

        let client = StoreClient::open(&path, Duration::from_secs(2)).await.unwrap();
        let collections = client.list_collections().await.unwrap();
        let docs = client.collection("filesystem:docs").await.unwrap().unwrap();
        client.close().await;

        assert_eq!(
            collections[0].sample_metadata,
            Some(serde_json::json!({"path": "intro.md"}))
        );
        assert_eq!(collections[1].name, "git:platform");
        assert_eq!(collections[1].sample_metadata, None);
        assert_eq!(
            collections[2].sample_metadata,
            Some(Value::String("plain text".to_string()))
        );
        assert_eq!(docs.sample_metadata, collections[0].sample_metadata);
    }
}
