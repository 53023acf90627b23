// ==========================================
// 供应商绩效分析系统 - 领域类型定义
// ==========================================
// 职责: 单元格值 / 列类型 / 表结构描述 / 写入模式
// 说明: CSV 入库是"无模式"的，这里把推断结果显式化为列描述列表
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 与 SQLite 存储类一一对应（BLOB 不参与本系统）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    /// 数值视图：整数/浮点直接转换，文本按 f64 解析（失败视为 None）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Null => None,
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Real(v) => Some(*v),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// 文本视图：NULL 视为 None，数值格式化为字符串
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Integer(v) => Some(v.to_string()),
            CellValue::Real(v) => Some(v.to_string()),
            CellValue::Text(s) => Some(s.clone()),
        }
    }

    /// 按目标列类型解析原始 CSV 文本
    ///
    /// 空串 → NULL；解析失败时保留为文本（SQLite 动态类型允许）
    pub fn parse_as(raw: &str, column_type: ColumnType) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }

        match column_type {
            ColumnType::Integer => trimmed
                .parse::<i64>()
                .map(CellValue::Integer)
                .unwrap_or_else(|_| CellValue::Text(trimmed.to_string())),
            ColumnType::Real => match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => CellValue::Real(v),
                _ => CellValue::Text(trimmed.to_string()),
            },
            ColumnType::Text => CellValue::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Real(v) => write!(f, "{}", v),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

// ==========================================
// 列类型 (Column Type)
// ==========================================
// 序列化格式: 与 SQLite 声明类型一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// 合并两个推断结果（取能容纳两者的最窄类型）
    pub fn widen(self, other: ColumnType) -> ColumnType {
        match (self, other) {
            (ColumnType::Text, _) | (_, ColumnType::Text) => ColumnType::Text,
            (ColumnType::Real, _) | (_, ColumnType::Real) => ColumnType::Real,
            _ => ColumnType::Integer,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_type())
    }
}

// ==========================================
// 列描述 / 表结构
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

// ==========================================
// 写入模式 (Write Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteMode {
    Replace, // 删除旧表后整体重建
    Append,  // 表不存在则创建，存在则追加
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Replace => write!(f, "REPLACE"),
            WriteMode::Append => write!(f, "APPEND"),
        }
    }
}
