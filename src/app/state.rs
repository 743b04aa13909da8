// ==========================================
// 技师排班系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 三个 API 共享同一个仓储句柄, 所有变更经同一把锁串行化
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{RosterApi, ScheduleApi, SectorApi};
use crate::config::config_manager::ConfigManager;
use crate::config::EngineConfig;
use crate::db::open_sqlite_connection;
use crate::repository::{
    InMemoryStateStore, SharedStateRepository, SqliteStateStore, StateRepository, StateStore,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "ESCALA_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径 (内存模式为 ":memory:")
    pub db_path: String,

    /// 生效的引擎配置
    pub config: EngineConfig,

    /// 共享仓储
    pub repository: SharedStateRepository,

    /// 排班API
    pub schedule_api: Arc<ScheduleApi>,

    /// 名册API
    pub roster_api: Arc<RosterApi>,

    /// 科室模板API
    pub sector_api: Arc<SectorApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开 SQLite 连接 (配置表与文档表共享连接)
    /// 2. 从 config_kv 加载引擎配置
    /// 3. 加载排班文档 (不存在或损坏时使用默认文档)
    /// 4. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = ConfigManager::from_connection(conn.clone())
            .map_err(|e| format!("无法初始化配置管理器: {}", e))?;
        let config = config_manager
            .load_engine_config()
            .map_err(|e| format!("无法加载配置: {}", e))?;

        let store = SqliteStateStore::from_connection(conn, &config.app_key)
            .map_err(|e| format!("无法初始化文档存储: {}", e))?;

        Self::with_store(db_path, Box::new(store), config)
    }

    /// 内存模式 (不落盘)
    pub fn in_memory(config: EngineConfig) -> Result<Self, String> {
        Self::with_store(
            ":memory:".to_string(),
            Box::new(InMemoryStateStore::new()),
            config,
        )
    }

    /// 使用指定存储创建
    pub fn with_store(
        db_path: String,
        store: Box<dyn StateStore>,
        config: EngineConfig,
    ) -> Result<Self, String> {
        let repository = StateRepository::open(store, config.clone())
            .map_err(|e| format!("无法加载排班文档: {}", e))?
            .into_shared();

        let schedule_api = Arc::new(ScheduleApi::new(repository.clone()));
        let roster_api = Arc::new(RosterApi::new(repository.clone()));
        let sector_api = Arc::new(SectorApi::new(repository.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config,
            repository,
            schedule_api,
            roster_api,
            sector_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 ESCALA_DB_PATH, 否则使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./escala.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("escala-tecnicos-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("escala-tecnicos");
        }

        if let Err(e) = std::fs::create_dir_all(&path) {
            tracing::warn!("无法创建数据目录 {}: {}", path.display(), e);
        }
        path = path.join("escala.db");
    }

    path.to_string_lossy().to_string()
}
