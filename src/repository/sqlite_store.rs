// ==========================================
// 供应商绩效分析系统 - SQLite 表存储实现
// ==========================================
// 职责: 实现 TableStore（使用 rusqlite）
// 红线: Repository 不含业务规则，只做表级读写
// 约束: 表名严格校验；数据一律参数化绑定
// ==========================================

use crate::db::{ensure_parent_dir, open_in_memory, open_sqlite_connection};
use crate::domain::types::{CellValue, TableSchema, WriteMode};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::identifier::{quote_identifier, validate_schema, validate_table_name};
use crate::repository::table_store::{QueryResult, TableStore};
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, ToSql};
use std::path::Path;
use tracing::debug;

// ==========================================
// CellValue <-> SQLite 值转换
// ==========================================
impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
            CellValue::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            CellValue::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            CellValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

fn cell_from_value_ref(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(v) => CellValue::Integer(v),
        ValueRef::Real(v) => CellValue::Real(v),
        ValueRef::Text(t) | ValueRef::Blob(t) => {
            CellValue::Text(String::from_utf8_lossy(t).into_owned())
        }
    }
}

// ==========================================
// SqliteTableStore
// ==========================================
// 生命周期: 每次运行打开一次，顺序供各阶段使用，结束时显式 close
#[derive(Debug)]
pub struct SqliteTableStore {
    conn: Connection,
}

impl SqliteTableStore {
    /// 打开文件数据库
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn open<P: AsRef<Path>>(db_path: P) -> RepositoryResult<Self> {
        let db_path = db_path.as_ref();
        ensure_parent_dir(db_path).map_err(|e| {
            RepositoryError::DatabaseConnectionError(format!(
                "无法创建数据库目录 {}: {}",
                db_path.display(),
                e
            ))
        })?;
        let mut conn = open_sqlite_connection(db_path).map_err(|e| {
            RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path.display(), e))
        })?;
        crate::perf::install_sqlite_tracing(&mut conn);

        debug!(db_path = %db_path.display(), "SQLite 存储已打开");
        Ok(Self { conn })
    }

    /// 打开内存数据库
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = open_in_memory()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// 关闭连接，释放文件句柄
    pub fn close(self) -> RepositoryResult<()> {
        self.conn
            .close()
            .map_err(|(_, e)| RepositoryError::DatabaseConnectionError(e.to_string()))
    }
}

impl TableStore for SqliteTableStore {
    fn query_rows(&self, sql: &str) -> RepositoryResult<QueryResult> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        let width = columns.len();

        let mut result_rows = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(cell_from_value_ref(row.get_ref(idx)?));
            }
            result_rows.push(cells);
        }

        Ok(QueryResult {
            columns,
            rows: result_rows,
        })
    }

    fn write_table(
        &self,
        name: &str,
        schema: &TableSchema,
        rows: &[Vec<CellValue>],
        mode: WriteMode,
    ) -> RepositoryResult<usize> {
        validate_table_name(name)?;
        validate_schema(name, schema)?;

        let expected = schema.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(RepositoryError::RowWidthMismatch {
                table: name.to_string(),
                row: idx + 1,
                expected,
                actual: row.len(),
            });
        }

        let table = quote_identifier(name);
        let column_defs = schema
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.column_type.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        let column_list = schema
            .columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=expected)
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");

        // 整表写入放在同一事务内：要么全部可见，要么保持原状
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        if mode == WriteMode::Replace {
            tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
        }
        tx.execute(
            &format!("CREATE TABLE IF NOT EXISTS {} ({})", table, column_defs),
            [],
        )?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table, column_list, placeholders
            ))?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter()))?;
                count += 1;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(table = name, rows = count, mode = %mode, "写表完成");
        Ok(count)
    }

    fn table_exists(&self, name: &str) -> RepositoryResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type = 'table' AND name = ?1 COLLATE NOCASE
            )",
            params![name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn drop_table(&self, name: &str) -> RepositoryResult<()> {
        validate_table_name(name)?;
        self.conn.execute(
            &format!("DROP TABLE IF EXISTS {}", quote_identifier(name)),
            [],
        )?;
        Ok(())
    }

    fn rename_table(&self, from: &str, to: &str) -> RepositoryResult<()> {
        validate_table_name(from)?;
        validate_table_name(to)?;
        self.conn.execute(
            &format!(
                "ALTER TABLE {} RENAME TO {}",
                quote_identifier(from),
                quote_identifier(to)
            ),
            [],
        )?;
        Ok(())
    }

    fn list_tables(&self) -> RepositoryResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn row_count(&self, name: &str) -> RepositoryResult<u64> {
        validate_table_name(name)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_identifier(name)),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ColumnDescriptor, ColumnType};

    fn sample_schema() -> TableSchema {
        TableSchema::new(vec![
            ColumnDescriptor::new("Brand", ColumnType::Integer),
            ColumnDescriptor::new("Description", ColumnType::Text),
            ColumnDescriptor::new("Price", ColumnType::Real),
        ])
    }

    fn sample_rows() -> Vec<Vec<CellValue>> {
        vec![
            vec![
                CellValue::Integer(58),
                CellValue::Text("Gekkeikan Black & Gold Sake".to_string()),
                CellValue::Real(12.99),
            ],
            vec![CellValue::Integer(60), CellValue::Null, CellValue::Real(10.99)],
        ]
    }

    #[test]
    fn test_write_replace_then_query() {
        let store = SqliteTableStore::in_memory().unwrap();
        let written = store
            .write_table("purchase_prices", &sample_schema(), &sample_rows(), WriteMode::Replace)
            .unwrap();
        assert_eq!(written, 2);

        // 再次 Replace 不应累加
        store
            .write_table("purchase_prices", &sample_schema(), &sample_rows(), WriteMode::Replace)
            .unwrap();
        assert_eq!(store.row_count("purchase_prices").unwrap(), 2);

        let result = store
            .query_rows("SELECT Brand, Description, Price FROM purchase_prices ORDER BY Brand")
            .unwrap();
        assert_eq!(result.columns, vec!["Brand", "Description", "Price"]);
        assert_eq!(result.rows[1][1], CellValue::Null);
        assert_eq!(result.column_index("price"), Some(2));
    }

    #[test]
    fn test_write_append_accumulates() {
        let store = SqliteTableStore::in_memory().unwrap();
        store
            .write_table("sales", &sample_schema(), &sample_rows(), WriteMode::Append)
            .unwrap();
        store
            .write_table("sales", &sample_schema(), &sample_rows(), WriteMode::Append)
            .unwrap();
        assert_eq!(store.row_count("sales").unwrap(), 4);
    }

    #[test]
    fn test_write_rejects_bad_table_name_and_row_width() {
        let store = SqliteTableStore::in_memory().unwrap();
        let err = store
            .write_table("x; DROP TABLE y", &sample_schema(), &sample_rows(), WriteMode::Replace)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidIdentifier { .. }));

        let short_row = vec![vec![CellValue::Integer(1)]];
        let err = store
            .write_table("ok_table", &sample_schema(), &short_row, WriteMode::Replace)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::RowWidthMismatch { row: 1, .. }));
        assert!(!store.table_exists("ok_table").unwrap());
    }

    #[test]
    fn test_exists_drop_rename_list() {
        let store = SqliteTableStore::in_memory().unwrap();
        store
            .write_table("staging", &sample_schema(), &sample_rows(), WriteMode::Replace)
            .unwrap();
        assert!(store.table_exists("staging").unwrap());
        assert!(store.table_exists("STAGING").unwrap());

        store.rename_table("staging", "final_table").unwrap();
        assert!(!store.table_exists("staging").unwrap());
        assert_eq!(store.list_tables().unwrap(), vec!["final_table".to_string()]);

        store.drop_table("final_table").unwrap();
        store.drop_table("final_table").unwrap(); // 不存在时幂等
        assert!(store.list_tables().unwrap().is_empty());
    }

    #[test]
    fn test_row_count_missing_table() {
        let store = SqliteTableStore::in_memory().unwrap();
        let err = store.row_count("nope").unwrap_err();
        assert!(matches!(err, RepositoryError::TableNotFound(_)));
    }

    #[test]
    fn test_close_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteTableStore::open(dir.path().join("inventory.db")).unwrap();
        store
            .write_table("t", &sample_schema(), &sample_rows(), WriteMode::Replace)
            .unwrap();
        store.close().unwrap();

        let reopened = SqliteTableStore::open(dir.path().join("inventory.db")).unwrap();
        assert_eq!(reopened.row_count("t").unwrap(), 2);
    }

    #[test]
    fn test_open_reports_unusable_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = SqliteTableStore::open(blocker.join("inventory.db")).unwrap_err();
        match err {
            RepositoryError::DatabaseConnectionError(msg) => {
                assert!(msg.contains("无法创建数据库目录"), "{}", msg)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
