// ==========================================
// 供应商绩效分析系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供表级存储接口,屏蔽数据库细节
// 约束: 数据参数化绑定; 表名严格校验,防止 SQL 注入
// ==========================================

pub mod error;
pub mod identifier;
pub mod sqlite_store;
pub mod table_store;
pub mod vendor_summary_sql;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use identifier::{quote_identifier, validate_schema, validate_table_name};
pub use sqlite_store::SqliteTableStore;
pub use table_store::{QueryResult, TableStore};
