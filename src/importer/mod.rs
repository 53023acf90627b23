// ==========================================
// 供应商绩效分析系统 - 导入层
// ==========================================
// 职责: CSV 目录扫描、列类型推断、批量入库、表生命周期
// 附带: CSV 抽样工具（与核心流程独立）
// ==========================================

// 模块声明
pub mod csv_loader;
pub mod csv_sampler;
pub mod csv_scanner;
pub mod error;
pub mod schema_inference;
pub mod table_lifecycle;

// 重导出核心类型
pub use csv_loader::{CsvLoader, CsvLoaderOptions, IngestReport, UploadReport};
pub use csv_sampler::{CsvSampler, SampleReport, SampledFile};
pub use csv_scanner::{CsvScanner, FileFailure, ScanReport};
pub use error::{ImportError, ImportResult};
pub use schema_inference::infer_schema;
pub use table_lifecycle::TableLifecycle;
