// ==========================================
// 供应商绩效分析系统 - 表生命周期
// ==========================================
// 职责: 重新入库前按名删除旧表，保证重复运行幂等
// 约束: 删除失败只记日志，不中断；后续 Replace 写入由存储层保证原子性
// ==========================================

use crate::repository::TableStore;
use tracing::{error, info};

pub struct TableLifecycle<'a, S: TableStore> {
    store: &'a S,
}

impl<'a, S: TableStore> TableLifecycle<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// 表存在则删除
    ///
    /// # 返回
    /// - true: 表存在且已删除
    /// - false: 表不存在，或删除失败（已记录 error 日志）
    pub fn drop_if_exists(&self, table_name: &str) -> bool {
        match self.store.table_exists(table_name) {
            Ok(false) => false,
            Ok(true) => match self.store.drop_table(table_name) {
                Ok(()) => {
                    info!(table = table_name, "旧表已存在，已删除");
                    true
                }
                Err(e) => {
                    error!(table = table_name, error = %e, "删除旧表失败");
                    false
                }
            },
            Err(e) => {
                error!(table = table_name, error = %e, "检查表是否存在失败");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CellValue, ColumnDescriptor, ColumnType, TableSchema, WriteMode};
    use crate::repository::SqliteTableStore;

    #[test]
    fn test_drop_if_exists() {
        let store = SqliteTableStore::in_memory().unwrap();
        let schema = TableSchema::new(vec![ColumnDescriptor::new("a", ColumnType::Integer)]);
        store
            .write_table("sales", &schema, &[vec![CellValue::Integer(1)]], WriteMode::Replace)
            .unwrap();

        let lifecycle = TableLifecycle::new(&store);
        assert!(lifecycle.drop_if_exists("sales"));
        assert!(!store.table_exists("sales").unwrap());

        // 第二次调用：表已不存在
        assert!(!lifecycle.drop_if_exists("sales"));
    }

    #[test]
    fn test_drop_failure_is_not_fatal() {
        let store = SqliteTableStore::in_memory().unwrap();
        // 非法表名：存在性检查为 false，不会触发删除
        let lifecycle = TableLifecycle::new(&store);
        assert!(!lifecycle.drop_if_exists("bad name"));
    }
}
