// ==========================================
// 供应商绩效分析系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 标识符 / 结构校验 =====
    #[error("非法标识符: {name:?} ({reason})")]
    InvalidIdentifier { name: String, reason: String },

    #[error("表结构校验失败 (table={table}): {message}")]
    SchemaValidation { table: String, message: String },

    #[error("行宽不匹配 (table={table}, row={row}): 期望 {expected} 列，实际 {actual} 列")]
    RowWidthMismatch {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    // ===== 数据库错误 =====
    #[error("表不存在: {0}")]
    TableNotFound(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg))
            | rusqlite::Error::SqlInputError { msg, .. } => {
                if msg.starts_with("no such table") {
                    RepositoryError::TableNotFound(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
