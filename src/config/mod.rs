// ==========================================
// 技师排班系统 - 配置层
// ==========================================
// 职责: 系统配置管理,支持 global 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod engine_config;
pub mod sector_label;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use engine_config::EngineConfig;
pub use sector_label::{format_sector_label, parse_sector_label, sector_from_label, SectorLabel};
