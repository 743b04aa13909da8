// ==========================================
// 技师排班系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::db::open_sqlite_connection;
use crate::domain::types::WorkloadClass;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        let manager = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        manager.ensure_table()?;
        Ok(manager)
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        let manager = Self { conn };
        manager.ensure_table()?;
        Ok(manager)
    }

    fn ensure_table(&self) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
                scope_id TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (scope_id, key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    // ==========================================
    // 类型化读取
    // ==========================================

    /// 读取引擎配置: 内置默认值 + global 覆写
    ///
    /// 格式错误的覆写项记录 warn 并回退默认值
    pub fn load_engine_config(&self) -> Result<EngineConfig, Box<dyn Error>> {
        let mut config = EngineConfig::default();

        if let Some(v) = self.get_config_value(config_keys::APP_KEY)? {
            if !v.trim().is_empty() {
                config.app_key = v.trim().to_string();
            }
        }

        if let Some(v) = self.get_config_value(config_keys::DEFAULT_SECTORS_UPA)? {
            match serde_json::from_str::<Vec<String>>(&v) {
                Ok(labels) => config.default_sectors_upa = labels,
                Err(e) => tracing::warn!(
                    config_key = config_keys::DEFAULT_SECTORS_UPA,
                    raw_value = %v,
                    error = %e,
                    "默认科室配置格式错误，使用内置默认值"
                ),
            }
        }

        if let Some(v) = self.get_config_value(config_keys::DEFAULT_SECTORS_HOB)? {
            match serde_json::from_str::<Vec<String>>(&v) {
                Ok(labels) => config.default_sectors_hob = labels,
                Err(e) => tracing::warn!(
                    config_key = config_keys::DEFAULT_SECTORS_HOB,
                    raw_value = %v,
                    error = %e,
                    "默认科室配置格式错误，使用内置默认值"
                ),
            }
        }

        if let Some(v) = self.get_config_value(config_keys::DEFAULT_REQUIRED_COUNT)? {
            config.default_required_count = v
                .trim()
                .parse::<u32>()
                .map(crate::domain::schedule::clamp_required)
                .unwrap_or(config.default_required_count);
        }

        if let Some(v) = self.get_config_value(config_keys::DISPLAY_DEFAULT_DAYS)? {
            config.display_default_days = v
                .trim()
                .parse::<u32>()
                .unwrap_or(config.display_default_days);
        }

        if let Some(v) = self.get_config_value(config_keys::DEFAULT_WORKLOAD)? {
            config.default_workload = WorkloadClass::parse_lenient(&v);
        }

        Ok(config)
    }
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 持久化
    pub const APP_KEY: &str = "app_key";

    // 科室模板
    pub const DEFAULT_SECTORS_UPA: &str = "default_sectors_upa"; // JSON 数组
    pub const DEFAULT_SECTORS_HOB: &str = "default_sectors_hob"; // JSON 数组
    pub const DEFAULT_REQUIRED_COUNT: &str = "default_required_count";

    // 显示
    pub const DISPLAY_DEFAULT_DAYS: &str = "display_default_days";

    // 名册
    pub const DEFAULT_WORKLOAD: &str = "default_workload";
}
