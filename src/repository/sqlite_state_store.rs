// ==========================================
// 技师排班系统 - SQLite 文档存储
// ==========================================
// 职责: 管理 app_state 表 (按应用键存放一份 JSON 文档)
// 说明: 文档整体读写, 不拆表; 引擎视文档为不透明结构
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::document::RosterState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::state_store::StateStore;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct SqliteStateStore {
    conn: Arc<Mutex<Connection>>,
    app_key: String,
}

impl SqliteStateStore {
    pub fn new(db_path: &str, app_key: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)), app_key)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>, app_key: &str) -> RepositoryResult<Self> {
        let store = Self {
            conn,
            app_key: app_key.to_string(),
        };
        store.ensure_table()?;
        Ok(store)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS app_state (
              app_key TEXT PRIMARY KEY,
              version INTEGER NOT NULL,
              document TEXT NOT NULL,
              saved_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// 最近一次保存时间
    pub fn last_saved_at(&self) -> RepositoryResult<Option<DateTime<Utc>>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT saved_at FROM app_state WHERE app_key = ?1",
            params![self.app_key],
            |row| row.get::<_, DateTime<Utc>>(0),
        );
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl StateStore for SqliteStateStore {
    fn load(&self) -> RepositoryResult<Option<RosterState>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT document FROM app_state WHERE app_key = ?1",
            params![self.app_key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &RosterState) -> RepositoryResult<()> {
        let raw = serde_json::to_string(state)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO app_state (app_key, version, document, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(app_key) DO UPDATE SET
                version = excluded.version,
                document = excluded.document,
                saved_at = excluded.saved_at
            "#,
            params![self.app_key, state.version, raw, Utc::now()],
        )?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite(app_key={})", self.app_key)
    }
}
