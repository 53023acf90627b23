// ==========================================
// 供应商绩效分析系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 每个错误都带文件名/表名上下文，便于人工排查
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 目录 / 文件相关错误 =====
    #[error("目录读取失败 ({path}): {message}")]
    DirectoryRead { path: String, message: String },

    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败 ({file}): {message}")]
    CsvParseError { file: String, message: String },

    #[error("CSV 表头为空: {0}")]
    EmptyHeader(String),

    // ===== 入库相关错误 =====
    #[error("非法表名 ({file}): {message}")]
    InvalidTableName { file: String, message: String },

    #[error("上传失败 (file={file}, table={table}): {source}")]
    UploadFailed {
        file: String,
        table: String,
        #[source]
        source: RepositoryError,
    },
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 无文件上下文时的兜底转换
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError {
            file: "<unknown>".to_string(),
            message: err.to_string(),
        }
    }
}

impl ImportError {
    /// 包装 csv::Error 并附带文件上下文
    pub fn csv(file: &std::path::Path, err: csv::Error) -> Self {
        ImportError::CsvParseError {
            file: file.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
