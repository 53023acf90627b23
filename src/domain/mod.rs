// ==========================================
// 供应商绩效分析系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod csv_file;
pub mod types;
pub mod vendor_summary;

// 重导出核心类型
pub use csv_file::{CsvFile, CsvShape};
pub use types::{CellValue, ColumnDescriptor, ColumnType, TableSchema, WriteMode};
pub use vendor_summary::{RawVendorSummary, VendorSummaryRow};
