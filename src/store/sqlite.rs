use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, SplashError};
use crate::domain::{
    ContentItem, DownloadOrigin, DownloadRecord, DownloadRequest, DownloadStatus, WidgetState,
};
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| SplashError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            SplashError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn parse_status(s: &str) -> DownloadStatus {
        s.parse().unwrap_or(DownloadStatus::Failed)
    }

    fn download_from_row(row: &Row<'_>) -> rusqlite::Result<DownloadRecord> {
        Ok(DownloadRecord {
            id: row.get(0)?,
            url: row.get(1)?,
            file_name: row.get(2)?,
            preview_path: row.get::<_, Option<String>>(3)?.map(PathBuf::from),
            origin: DownloadOrigin::parse(&row.get::<_, String>(4)?),
            status: Self::parse_status(&row.get::<_, String>(5)?),
            created_at: row
                .get::<_, String>(6)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
        })
    }
}

impl Store for SqliteStore {
    fn save_snapshot(&self, feed_key: &str, items: &[ContentItem]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO feed_snapshots (feed_key, items_json, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(feed_key) DO UPDATE SET items_json = excluded.items_json, saved_at = excluded.saved_at",
            params![feed_key, json, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    fn load_snapshot(&self, feed_key: &str) -> Result<Option<Vec<ContentItem>>> {
        let conn = self.lock()?;

        let json: Option<String> = conn
            .query_row(
                "SELECT items_json FROM feed_snapshots WHERE feed_key = ?1",
                params![feed_key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn clear_snapshot(&self, feed_key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM feed_snapshots WHERE feed_key = ?1",
            params![feed_key],
        )?;
        Ok(())
    }

    fn add_download(&self, request: &DownloadRequest) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO downloads (url, file_name, preview_path, origin, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                request.url,
                request.file_name,
                request
                    .preview_path
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
                request.origin.as_str(),
                DownloadStatus::Pending.as_str(),
                Utc::now().to_rfc3339()
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn get_download(&self, id: i64) -> Result<Option<DownloadRecord>> {
        let conn = self.lock()?;

        let record = conn
            .query_row(
                "SELECT id, url, file_name, preview_path, origin, status, created_at
                 FROM downloads WHERE id = ?1",
                params![id],
                Self::download_from_row,
            )
            .optional()?;

        Ok(record)
    }

    fn get_downloads(&self) -> Result<Vec<DownloadRecord>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, url, file_name, preview_path, origin, status, created_at
             FROM downloads ORDER BY created_at DESC, id DESC",
        )?;

        let records = stmt
            .query_map([], Self::download_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn set_download_status(&self, id: i64, status: DownloadStatus) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE downloads SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(())
    }

    fn delete_download(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM downloads WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn delete_downloads_by_status(&self, status: DownloadStatus) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM downloads WHERE status = ?1",
            params![status.as_str()],
        )?;
        Ok(deleted)
    }

    fn save_widget_state(&self, state: &WidgetState) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO widget_state (id, image_id, file_path, download_url, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                image_id = excluded.image_id,
                file_path = excluded.file_path,
                download_url = excluded.download_url,
                updated_at = excluded.updated_at",
            params![
                state.image_id,
                state.file_path.to_string_lossy().into_owned(),
                state.download_url,
                state.updated_at.to_rfc3339()
            ],
        )?;

        Ok(())
    }

    fn get_widget_state(&self) -> Result<Option<WidgetState>> {
        let conn = self.lock()?;

        let state = conn
            .query_row(
                "SELECT image_id, file_path, download_url, updated_at FROM widget_state WHERE id = 1",
                [],
                |row| {
                    Ok(WidgetState {
                        image_id: row.get(0)?,
                        file_path: PathBuf::from(row.get::<_, String>(1)?),
                        download_url: row.get(2)?,
                        updated_at: row
                            .get::<_, String>(3)
                            .ok()
                            .and_then(|s| Self::parse_datetime(&s))
                            .unwrap_or_else(Utc::now),
                    })
                },
            )
            .optional()?;

        Ok(state)
    }
}
