// ==========================================
// 供应商绩效分析系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 汇总阶段的任何错误对本次运行都是致命的
// ==========================================

use crate::config::ConfigError;
use crate::importer::ImportError;
use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 汇总查询 =====
    #[error("缺少源表: {0}")]
    MissingSourceTable(String),

    #[error("汇总查询失败: {0}")]
    Query(#[source] RepositoryError),

    #[error("汇总结果缺少列: {0}")]
    MissingColumn(String),

    // ===== 持久化 =====
    #[error("汇总结果写入失败 (table={table}): {source}")]
    Persist {
        table: String,
        #[source]
        source: RepositoryError,
    },

    // ===== 外围 =====
    #[error("存储错误: {0}")]
    Store(#[from] RepositoryError),

    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

pub type EngineResult<T> = Result<T, EngineError>;
