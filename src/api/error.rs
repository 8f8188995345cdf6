// ==========================================
// OpenSILEX 事件导入 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将导入/仓储层的硬错误转换为调用方可理解的错误
// 说明: 单元格级软错误不经过此类型，而是以 BadRequest 响应体返回
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用方错误（对应 400）
    // ==========================================
    /// 提交时令牌与缓存的校验结果不匹配
    #[error("校验令牌无效: {0}")]
    InvalidToken(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入与配置错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否属于调用方错误（对应 HTTP 400）
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidToken(_)
                | ApiError::InvalidInput(_)
                | ApiError::NotFound(_)
                | ApiError::BusinessRuleViolation(_)
        )
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
            RepositoryError::SerializationError { field, message } => {
                ApiError::InternalError(format!("字段{}序列化失败: {}", field, message))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InvalidValidationToken => {
                ApiError::InvalidToken("令牌与已校验的文件不匹配，请重新校验".to_string())
            }
            err @ ImportError::InvalidUri { .. } => ApiError::InvalidInput(err.to_string()),
            err @ ImportError::CsvParseError(_) => ApiError::InvalidInput(err.to_string()),
            ImportError::FileReadError(msg) => ApiError::ImportError(msg),
            ImportError::Repository(repo_err) => repo_err.into(),
            err @ ImportError::ConfigReadError { .. } => ApiError::ConfigError(err.to_string()),
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
