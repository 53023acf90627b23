// ==========================================
// 供应商绩效分析系统 - SQL 标识符校验
// ==========================================
// 约束: 表名来自用户提供的文件名，拼接进 SQL 前必须严格校验
//       列名来自 CSV 表头，统一双引号转义后使用
// ==========================================

use crate::domain::types::TableSchema;
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::collections::HashSet;

/// 表名最大长度
pub const MAX_TABLE_NAME_LEN: usize = 128;

/// 校验表名: ^[A-Za-z_][A-Za-z0-9_]{0,127}$，且不得以 sqlite_ 开头
pub fn validate_table_name(name: &str) -> RepositoryResult<()> {
    let invalid = |reason: &str| RepositoryError::InvalidIdentifier {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let first = name.chars().next().ok_or_else(|| invalid("表名为空"))?;
    if name.len() > MAX_TABLE_NAME_LEN {
        return Err(invalid("表名过长"));
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(invalid("必须以字母或下划线开头"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("仅允许字母、数字、下划线"));
    }
    if name.to_ascii_lowercase().starts_with("sqlite_") {
        return Err(invalid("sqlite_ 前缀为系统保留"));
    }

    Ok(())
}

/// 双引号包裹标识符（内部双引号转义为两个）
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// 写入前校验列描述：非空、不重复（SQLite 列名大小写不敏感）
pub fn validate_schema(table: &str, schema: &TableSchema) -> RepositoryResult<()> {
    if schema.is_empty() {
        return Err(RepositoryError::SchemaValidation {
            table: table.to_string(),
            message: "列描述为空".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for (idx, column) in schema.columns.iter().enumerate() {
        if column.name.trim().is_empty() {
            return Err(RepositoryError::SchemaValidation {
                table: table.to_string(),
                message: format!("第 {} 列列名为空", idx + 1),
            });
        }
        if !seen.insert(column.name.to_lowercase()) {
            return Err(RepositoryError::SchemaValidation {
                table: table.to_string(),
                message: format!("列名重复: {}", column.name),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ColumnDescriptor, ColumnType};

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("vendor_invoice").is_ok());
        assert!(validate_table_name("_tmp1").is_ok());

        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2017sales").is_err());
        assert!(validate_table_name("sales; DROP TABLE x").is_err());
        assert!(validate_table_name("purchase prices").is_err());
        assert!(validate_table_name("sqlite_master").is_err());
        assert!(validate_table_name(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_quote_identifier_escapes() {
        assert_eq!(quote_identifier("Brand"), "\"Brand\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_validate_schema_rejects_duplicates() {
        let schema = TableSchema::new(vec![
            ColumnDescriptor::new("Brand", ColumnType::Integer),
            ColumnDescriptor::new("brand", ColumnType::Text),
        ]);
        assert!(validate_schema("t", &schema).is_err());

        let empty_name = TableSchema::new(vec![ColumnDescriptor::new(" ", ColumnType::Text)]);
        assert!(validate_schema("t", &empty_name).is_err());

        assert!(validate_schema("t", &TableSchema::default()).is_err());
    }
}
