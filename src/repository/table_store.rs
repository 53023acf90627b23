// ==========================================
// 供应商绩效分析系统 - 表存储 Trait
// ==========================================
// 职责: 定义核心流程依赖的存储边界（不包含实现）
// 红线: 上层只通过该接口访问存储，不直接持有连接
// ==========================================

use crate::domain::types::{CellValue, TableSchema, WriteMode};
use crate::repository::error::RepositoryResult;

// ==========================================
// QueryResult - 表格化查询结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl QueryResult {
    /// 按列名定位列下标（大小写不敏感）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// TableStore Trait
// ==========================================
// 用途: 关系型存储边界
// 实现者: SqliteTableStore
pub trait TableStore {
    /// 执行只读查询，返回表格化结果
    fn query_rows(&self, sql: &str) -> RepositoryResult<QueryResult>;

    /// 写入整表
    ///
    /// # 参数
    /// - name: 目标表名（写入前严格校验）
    /// - schema: 显式列描述（写入前校验）
    /// - rows: 行数据，列顺序与 schema 一致
    /// - mode: Replace = 删表重建；Append = 不存在则建表后追加
    ///
    /// # 返回
    /// - Ok(usize): 写入行数
    fn write_table(
        &self,
        name: &str,
        schema: &TableSchema,
        rows: &[Vec<CellValue>],
        mode: WriteMode,
    ) -> RepositoryResult<usize>;

    /// 表是否存在
    fn table_exists(&self, name: &str) -> RepositoryResult<bool>;

    /// 删除表（不存在时不报错）
    fn drop_table(&self, name: &str) -> RepositoryResult<()>;

    /// 重命名表
    fn rename_table(&self, from: &str, to: &str) -> RepositoryResult<()>;

    /// 列出所有用户表（按名称排序）
    fn list_tables(&self) -> RepositoryResult<Vec<String>>;

    /// 表行数
    fn row_count(&self, name: &str) -> RepositoryResult<u64>;
}
