// ==========================================
// 企业培训管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 注: 排期冲突不是错误,以 ConflictReport 形式返回
// ==========================================

use crate::engine::lifecycle::LifecycleError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无权限: {0}")]
    PermissionDenied(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    /// 报名时培训已满员
    #[error("培训名额已满: training_id={training_id}")]
    TrainingFull { training_id: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 稳定的错误码（供 CLI / 前端分支判断）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::PermissionDenied(_) => "PERMISSION_DENIED",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            ApiError::TrainingFull { .. } => "TRAINING_FULL",
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_) => "DATABASE_ERROR",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// 从 LifecycleError 转换
// ==========================================
impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::AlreadyPublished => {
                ApiError::BusinessRuleViolation("培训已发布".to_string())
            }
            LifecycleError::InvalidTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
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
            entity: "Training".to_string(),
            id: "T001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Training"));
                assert!(msg.contains("T001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError =
            RepositoryError::UniqueConstraintViolation("users.email".to_string()).into();
        assert_eq!(api_err.code(), "BUSINESS_RULE_VIOLATION");
    }

    #[test]
    fn test_lifecycle_error_conversion() {
        let api_err: ApiError = LifecycleError::AlreadyPublished.into();
        assert!(matches!(api_err, ApiError::BusinessRuleViolation(_)));

        let api_err: ApiError = LifecycleError::InvalidTransition {
            from: "cancelled".to_string(),
            to: "published".to_string(),
        }
        .into();
        assert_eq!(api_err.code(), "INVALID_STATE_TRANSITION");
    }
}
