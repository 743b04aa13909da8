// ==========================================
// 技师排班系统 - API层错误类型
// ==========================================
// 职责: 汇总引擎/仓储/导出错误, 提供稳定错误码与本地化文案
// ==========================================

use crate::engine::error::EngineError;
use crate::engine::export::ExportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 排班约束错误
    // ==========================================
    #[error("排班约束失败: {0}")]
    Engine(#[from] EngineError),

    // ==========================================
    // 名册 / 科室维护错误
    // ==========================================
    #[error("技师姓名重复: {0}")]
    DuplicateTechnicianName(String),

    #[error("技师姓名为空")]
    EmptyName,

    #[error("日期区间无效: start={start}, end={end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {entity}(id={id})")]
    NotFound { entity: String, id: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("存储失败: {0}")]
    StorageError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("导出失败: {0}")]
    ExportError(#[from] ExportError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound { entity, id },
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => ApiError::StorageError(msg),
            RepositoryError::IoError(msg) => ApiError::StorageError(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl ApiError {
    /// 稳定错误码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Engine(e) => e.code(),
            ApiError::DuplicateTechnicianName(_) => "DUPLICATE_NAME",
            ApiError::EmptyName => "EMPTY_NAME",
            ApiError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::DatabaseError(_) | ApiError::DatabaseConnectionError(_) => "DATABASE_ERROR",
            ApiError::StorageError(_) => "STORAGE_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::ExportError(_) => "EXPORT_ERROR",
            ApiError::InternalError(_) | ApiError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// 面向用户的本地化文案 (无对应文案时回退为错误描述)
    pub fn localized_message(&self) -> String {
        use crate::i18n::t;
        match self {
            ApiError::Engine(e) => e.localized_message(),
            ApiError::DuplicateTechnicianName(_) => t("errors.duplicate_name"),
            ApiError::EmptyName => t("errors.empty_name"),
            ApiError::InvalidDateRange { .. } => t("errors.invalid_date_range"),
            ApiError::NotFound { entity, .. } => match entity.as_str() {
                "Technician" => t("errors.technician_not_found"),
                "Occurrence" => t("errors.occurrence_not_found"),
                "Sector" => t("errors.sector_not_found"),
                _ => self.to_string(),
            },
            other => other.to_string(),
        }
    }

    pub(crate) fn not_found(entity: &str, id: &str) -> Self {
        ApiError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Technician".to_string(),
            id: "T001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match &api_err {
            ApiError::NotFound { entity, id } => {
                assert_eq!(entity, "Technician");
                assert_eq!(id, "T001");
            }
            _ => panic!("Expected NotFound"),
        }
        assert_eq!(api_err.code(), "NOT_FOUND");

        let api_err: ApiError = RepositoryError::IoError("disk full".to_string()).into();
        assert_eq!(api_err.code(), "STORAGE_ERROR");
        assert!(api_err.to_string().contains("disk full"));
    }

    #[test]
    fn test_engine_error_code_passthrough() {
        let api_err: ApiError = EngineError::NothingToDo {
            reason: "empty roster".to_string(),
        }
        .into();
        assert_eq!(api_err.code(), "NOTHING_TO_DO");
    }
}
