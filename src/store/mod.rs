//! Document store for projects and contact messages
//!
//! Two collections live in one SQLite file:
//!
//! ```text
//! projects  ── read by the showcase (GET /api/projects)
//! messages  ── written by the contact form (POST /api/contact)
//! ```
//!
//! Reads and writes share an r2d2 pool; the database runs in WAL mode so the
//! admin CLI can read while the server writes.

use crate::contact::{MessageStore, NewMessage};
use crate::projects::{Project, ProjectSource};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use std::path::Path;

/// Status written on every new message
const UNREAD: &str = "unread";

/// Placeholder when the client address is unknown
const UNKNOWN: &str = "N/A";

/// A contact message as persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub read: bool,
    pub ip_address: String,
    pub user_agent: String,
}

/// SQLite-backed document store
#[derive(Clone)]
pub struct Store {
    pool: Pool<SqliteConnectionManager>,
}

impl Store {
    /// Open (or create) the store at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory {}", parent.display())
                })?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path)
            .with_init(|conn| conn.execute_batch("PRAGMA busy_timeout = 5000;"));
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .context("Failed to build store connection pool")?;

        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;

            CREATE TABLE IF NOT EXISTS projects (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                tech        TEXT NOT NULL DEFAULT '[]',
                github      TEXT NOT NULL DEFAULT '#',
                live        TEXT NOT NULL DEFAULT '#',
                gradient    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS messages (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL,
                message     TEXT NOT NULL,
                timestamp   TEXT NOT NULL,
                status      TEXT NOT NULL,
                read        INTEGER NOT NULL DEFAULT 0,
                ip_address  TEXT NOT NULL,
                user_agent  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp);
            "#,
        )?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Projects
    // ─────────────────────────────────────────────────────────────────────────

    /// All projects, oldest first
    pub fn projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, tech, github, live, gradient, created_at
             FROM projects ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut projects = Vec::new();
        for row in rows {
            let (id, title, description, tech, github, live, gradient, created_at) = row?;
            let tech: Vec<String> = serde_json::from_str(&tech)
                .with_context(|| format!("Malformed tech list for project {}", id))?;
            projects.push(Project {
                created_at: parse_timestamp(&created_at)
                    .with_context(|| format!("Malformed created_at for project {}", id))?,
                id,
                title,
                description,
                tech,
                github,
                live,
                gradient,
            });
        }
        Ok(projects)
    }

    /// Insert or replace a project by id, assigning one when empty.
    /// Returns the id written.
    pub fn insert_project(&self, project: &Project) -> Result<String> {
        let id = if project.id.trim().is_empty() {
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            project.id.clone()
        };
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO projects
             (id, title, description, tech, github, live, gradient, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                project.title,
                project.description,
                serde_json::to_string(&project.tech)?,
                project.github,
                project.live,
                project.gradient,
                sortable(&project.created_at),
            ],
        )?;
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist a new message, returning its generated id
    pub fn insert_message(&self, message: &NewMessage) -> Result<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO messages
             (id, name, email, message, timestamp, status, read, ip_address, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8)",
            params![
                id,
                message.submission.name,
                message.submission.email,
                message.submission.message,
                sortable(&message.received_at),
                UNREAD,
                message.ip_address.as_deref().unwrap_or(UNKNOWN),
                message.user_agent.as_deref().unwrap_or(UNKNOWN),
            ],
        )?;
        Ok(id)
    }

    /// Most recent messages first
    pub fn messages(&self, limit: usize) -> Result<Vec<StoredMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, email, message, timestamp, status, read, ip_address, user_agent
             FROM messages ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], message_from_row)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// Fetch one message by id
    pub fn message(&self, id: &str) -> Result<Option<StoredMessage>> {
        let conn = self.conn()?;
        let message = conn
            .query_row(
                "SELECT id, name, email, message, timestamp, status, read, ip_address, user_agent
                 FROM messages WHERE id = ?1",
                params![id],
                message_from_row,
            )
            .optional()?;
        Ok(message)
    }

    /// Mark a message as read; returns false if no such message
    pub fn mark_read(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE messages SET read = 1, status = 'read' WHERE id = ?1",
            params![id],
        )?;
        Ok(updated > 0)
    }
}

impl ProjectSource for Store {
    fn list_projects(&self) -> Result<Vec<Project>> {
        self.projects()
    }
}

impl MessageStore for Store {
    fn add_message(&self, message: &NewMessage) -> Result<String> {
        self.insert_message(message)
    }
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<StoredMessage> {
    let timestamp: String = row.get(4)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);
    let read: i64 = row.get(6)?;

    Ok(StoredMessage {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        message: row.get(3)?,
        timestamp,
        status: row.get(5)?,
        read: read != 0,
        ip_address: row.get(7)?,
        user_agent: row.get(8)?,
    })
}

/// Fixed-width RFC 3339 so TEXT ordering matches time ordering
fn sortable(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::fallback_projects;
    use crate::validation::Submission;
    use chrono::TimeZone;

    fn open_temp() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("data").join("folio.db")).unwrap();
        (dir, store)
    }

    fn new_message(name: &str, at: DateTime<Utc>) -> NewMessage {
        NewMessage {
            submission: Submission::new(name, "ada@gmail.com", "Hello"),
            received_at: at,
            ip_address: None,
            user_agent: Some("test-agent/1.0".to_string()),
        }
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let (dir, _store) = open_temp();
        assert!(dir.path().join("data").join("folio.db").exists());
    }

    #[test]
    fn test_empty_store_has_no_projects() {
        let (_dir, store) = open_temp();
        assert!(store.list_projects().unwrap().is_empty());
    }

    #[test]
    fn test_projects_roundtrip_in_creation_order() {
        let (_dir, store) = open_temp();
        let mut projects = fallback_projects();
        projects[0].created_at = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        projects[1].created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        projects[2].created_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        for project in &projects {
            store.insert_project(project).unwrap();
        }

        let loaded = store.list_projects().unwrap();
        let titles: Vec<_> = loaded.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Task Management App", "Weather Dashboard", "My Portfolio Website"]
        );
        assert_eq!(loaded[0].tech, projects[1].tech);
        assert_eq!(loaded[0].created_at, projects[1].created_at);
    }

    #[test]
    fn test_insert_project_replaces_same_id() {
        let (_dir, store) = open_temp();
        let mut project = fallback_projects().remove(0);
        store.insert_project(&project).unwrap();
        project.title = "Renamed".to_string();
        store.insert_project(&project).unwrap();

        let loaded = store.list_projects().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "Renamed");
    }

    #[test]
    fn test_insert_project_assigns_missing_id() {
        let (_dir, store) = open_temp();
        let mut project = fallback_projects().remove(0);
        project.id = String::new();

        let id = store.insert_project(&project).unwrap();
        assert_eq!(id.len(), 32);
        assert_eq!(store.list_projects().unwrap()[0].id, id);
    }

    #[test]
    fn test_message_write_generates_unique_ids() {
        let (_dir, store) = open_temp();
        let now = Utc::now();
        let a = store.add_message(&new_message("Ada", now)).unwrap();
        let b = store.add_message(&new_message("Ada", now)).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_message_defaults() {
        let (_dir, store) = open_temp();
        let id = store.add_message(&new_message("Ada", Utc::now())).unwrap();

        let stored = store.message(&id).unwrap().expect("message stored");
        assert_eq!(stored.name, "Ada");
        assert_eq!(stored.status, "unread");
        assert!(!stored.read);
        assert_eq!(stored.ip_address, "N/A");
        assert_eq!(stored.user_agent, "test-agent/1.0");
    }

    #[test]
    fn test_messages_newest_first_with_limit() {
        let (_dir, store) = open_temp();
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        for (i, name) in ["first", "second", "third"].iter().enumerate() {
            let at = base + chrono::Duration::minutes(i as i64);
            store.add_message(&new_message(name, at)).unwrap();
        }

        let latest = store.messages(2).unwrap();
        let names: Vec<_> = latest.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second"]);
    }

    #[test]
    fn test_mark_read() {
        let (_dir, store) = open_temp();
        let id = store.add_message(&new_message("Ada", Utc::now())).unwrap();

        assert!(store.mark_read(&id).unwrap());
        assert!(!store.mark_read("missing").unwrap());

        let stored = store.message(&id).unwrap().unwrap();
        assert!(stored.read);
        assert_eq!(stored.status, "read");
    }

    #[test]
    fn test_missing_message_is_none() {
        let (_dir, store) = open_temp();
        assert!(store.message("nope").unwrap().is_none());
    }
}
