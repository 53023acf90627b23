// ==========================================
// 供应商绩效分析系统 - 列类型推断
// ==========================================
// 规则（逐列）:
// - 所有非空值都能解析为 i64 → INTEGER
// - 否则所有非空值都能解析为 f64 → REAL
// - 否则 / 全空列 → TEXT
// ==========================================

use crate::domain::types::{CellValue, ColumnDescriptor, ColumnType, TableSchema};
use csv::StringRecord;

/// 单值推断
fn infer_value(raw: &str) -> Option<ColumnType> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.parse::<i64>().is_ok() {
        Some(ColumnType::Integer)
    } else if trimmed.parse::<f64>().map(|v| v.is_finite()).unwrap_or(false) {
        Some(ColumnType::Real)
    } else {
        Some(ColumnType::Text)
    }
}

// ==========================================
// SchemaAccumulator - 逐行累积的类型推断
// ==========================================
// 逐行喂入，列类型只会放宽；分块写入前先完整过一遍文件，
// 保证与一次性写入得到同一份列描述
pub struct SchemaAccumulator {
    headers: Vec<String>,
    inferred: Vec<Option<ColumnType>>,
}

impl SchemaAccumulator {
    pub fn new(headers: &[String]) -> Self {
        Self {
            headers: headers.to_vec(),
            inferred: vec![None; headers.len()],
        }
    }

    pub fn observe(&mut self, record: &StringRecord) {
        for (idx, slot) in self.inferred.iter_mut().enumerate() {
            let value_type = match record.get(idx).and_then(infer_value) {
                Some(t) => t,
                None => continue,
            };
            *slot = Some(match *slot {
                Some(current) => current.widen(value_type),
                None => value_type,
            });
        }
    }

    pub fn finish(self) -> TableSchema {
        TableSchema::new(
            self.headers
                .into_iter()
                .zip(self.inferred)
                .map(|(name, t)| ColumnDescriptor::new(name, t.unwrap_or(ColumnType::Text)))
                .collect(),
        )
    }
}

/// 根据表头与全量行推断列描述列表
pub fn infer_schema(headers: &[String], records: &[StringRecord]) -> TableSchema {
    let mut acc = SchemaAccumulator::new(headers);
    for record in records {
        acc.observe(record);
    }
    acc.finish()
}

/// 按列描述把原始行转换为写入行
///
/// 行短于表头时缺失单元补 NULL；多出的单元丢弃
pub fn convert_record(schema: &TableSchema, record: &StringRecord) -> Vec<CellValue> {
    schema
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| match record.get(idx) {
            Some(raw) => CellValue::parse_as(raw, column.column_type),
            None => CellValue::Null,
        })
        .collect()
}
