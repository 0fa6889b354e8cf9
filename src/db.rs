use crate::normalize::STORE_ID_FIELD;
use crate::store::RecordStore;
use anyhow::{anyhow, Context};
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;

pub const DB_FILE: &str = "perfboard.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace.to_string_lossy()
        )
    })?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.to_string_lossy()))?;
    create_schema(&conn)?;
    Ok(conn)
}

fn create_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            sort_order INTEGER NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_sort ON students(sort_order)",
        [],
    )?;
    Ok(())
}

/// Roster rows kept as JSON documents, one per student, in insertion order.
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(open_db(workspace)?))
    }
}

/// Decodes a stored body and stamps the row key into it as `_id`.
fn parse_body(key: String, body: String) -> Value {
    // Unparsable bodies are handed on as plain strings; normalization copes.
    let mut value = serde_json::from_str(&body).unwrap_or(Value::String(body));
    if let Value::Object(map) = &mut value {
        map.insert(STORE_ID_FIELD.to_string(), Value::String(key));
    }
    value
}

impl RecordStore for SqliteRecordStore {
    fn list(&self) -> anyhow::Result<Vec<Value>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, body FROM students ORDER BY sort_order")?;
        let rows = stmt
            .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .map(|(key, body)| parse_body(key, body))
            .collect())
    }

    fn create(&mut self, record: &Value) -> anyhow::Result<Value> {
        let id = record
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("record has no id"))?;
        let body = serde_json::to_string(record).context("failed to serialize record")?;

        let tx = self.conn.transaction()?;
        let sort_order: i64 = tx.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM students",
            [],
            |r| r.get(0),
        )?;
        tx.execute(
            "INSERT INTO students(id, sort_order, body, created_at)
             VALUES(?, ?, ?, strftime('%Y-%m-%dT%H:%M:%SZ','now'))",
            (id, sort_order, &body),
        )
        .with_context(|| format!("failed to insert student {}", id))?;
        let stored: String = tx.query_row("SELECT body FROM students WHERE id = ?", [id], |r| {
            r.get(0)
        })?;
        tx.commit()?;
        Ok(parse_body(id.to_string(), stored))
    }

    fn remove(&mut self, id: &str) -> anyhow::Result<bool> {
        let existed = self
            .conn
            .query_row("SELECT 1 FROM students WHERE id = ?", [id], |r| {
                r.get::<_, i64>(0)
            })
            .optional()?
            .is_some();
        if existed {
            self.conn.execute("DELETE FROM students WHERE id = ?", [id])?;
        }
        Ok(existed)
    }
}
