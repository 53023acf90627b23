// ==========================================
// 供应商绩效分析系统 - 核心库
// ==========================================
// 主流程: CSV 目录 → SQLite 源表 → 多 CTE 汇总 → 指标派生 → 汇总表
// 技术栈: Rust + SQLite (rusqlite)
// 执行模型: 单线程、同步、批处理
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 表级存储
pub mod repository;

// 引擎层 - 汇总查询 / 指标派生 / 编排
pub mod engine;

// 导入层 - CSV 扫描与入库
pub mod importer;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// SQL 性能统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, ColumnDescriptor, ColumnType, CsvFile, CsvShape, RawVendorSummary, TableSchema,
    VendorSummaryRow, WriteMode,
};

// 存储
pub use repository::{QueryResult, RepositoryError, SqliteTableStore, TableStore};

// 导入
pub use importer::{CsvLoader, CsvSampler, CsvScanner, ImportError, IngestReport, TableLifecycle};

// 引擎
pub use engine::{
    EngineError, MetricEnricher, PipelineOrchestrator, PipelineReport, SummaryQueryEngine,
    SummaryReport,
};

// 配置
pub use config::{ConfigError, EtlConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "供应商绩效分析系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
