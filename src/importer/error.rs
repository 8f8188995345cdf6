// ==========================================
// OpenSILEX 事件导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 此处只包含"硬错误"（中断整个文件）；
//       单元格级软错误记录在 CsvValidationModel 中
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 行解析错误 =====
    #[error("URI 格式错误 (行 {row}, 列 {column} {header}): {value} ({message})")]
    InvalidUri {
        row: usize,
        column: usize,
        header: String,
        value: String,
        message: String,
    },

    // ===== 校验令牌错误 =====
    #[error("校验令牌无效或与文件不匹配")]
    InvalidValidationToken,

    // ===== 数据库错误 =====
    #[error("数据库操作失败: {0}")]
    Repository(#[from] RepositoryError),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            return ImportError::FileReadError(err.to_string());
        }
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
