// ==========================================
// 技师排班系统 - 核心库
// ==========================================
// 四套固定排班 (UPA/HOB x DIA/NOITE) 的分配约束引擎
// 技术栈: Rust + SQLite
// 系统定位: 排班辅助 (人工最终控制权, 疲劳提示可确认越过)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 文档与月度记录
pub mod repository;

// 引擎层 - 约束与自动分配
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 宿主集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AutoFillMode, CoverageKind, Shift, Unit, WorkloadClass, YearMonth};

// 领域实体
pub use domain::{MonthRecord, Occurrence, ScheduleId, Sector, Slot, Technician};

// 引擎
pub use engine::{
    AssignOutcome, AutoAssigner, AutoDistributionReport, AvailabilityEngine, EngineError,
    ManualAssignRequest, ManualAssignmentGate, TechnicianRef,
};

// API
pub use api::{ApiError, ApiResult, RosterApi, ScheduleApi, SectorApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Escala de Técnicos";
