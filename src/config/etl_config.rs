// ==========================================
// 供应商绩效分析系统 - ETL 运行配置
// ==========================================
// 职责: 配置加载、校验、多级覆写
// 覆写顺序: 内置默认值 → JSON 配置文件 → 环境变量 → 命令行参数
// ==========================================

use crate::repository::identifier::validate_table_name;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 默认分块行数
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// 默认分块阈值（100 MB）
pub const DEFAULT_CHUNK_THRESHOLD_BYTES: u64 = 100 * 1024 * 1024;

/// 默认汇总表名
pub const DEFAULT_SUMMARY_TABLE: &str = "vendor_sales_summary";

/// 默认抽样行数上限
pub const DEFAULT_SAMPLE_MAX_ROWS: usize = 1000;

/// 默认抽样随机种子
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    FileRead { path: String, message: String },

    #[error("配置文件解析失败 ({path}): {message}")]
    Parse { path: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

// ==========================================
// EtlConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// SQLite 数据库文件路径
    pub db_path: PathBuf,

    /// CSV 源目录
    pub source_dir: Option<PathBuf>,

    /// 大文件分块写入时每块行数
    pub chunk_size: usize,

    /// 超过该字节数的文件走分块写入
    pub chunk_threshold_bytes: u64,

    /// 汇总结果表名
    pub summary_table: String,

    /// 运维日志目录
    pub log_dir: PathBuf,

    /// 抽样: 每个文件最多保留行数
    pub sample_max_rows: usize,

    /// 抽样: 洗牌随机种子
    pub sample_seed: u64,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(get_default_db_path()),
            source_dir: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_threshold_bytes: DEFAULT_CHUNK_THRESHOLD_BYTES,
            summary_table: DEFAULT_SUMMARY_TABLE.to_string(),
            log_dir: PathBuf::from("log"),
            sample_max_rows: DEFAULT_SAMPLE_MAX_ROWS,
            sample_seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl EtlConfig {
    /// 从 JSON 文件加载（缺省字段取默认值）
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 加载配置：默认值 → 可选 JSON 文件 → 环境变量
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_file {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// 应用进程环境变量覆写
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// 应用覆写（键查找函数可注入，便于测试）
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get(env_keys::DB_PATH) {
            self.db_path = PathBuf::from(v);
        }
        if let Some(v) = get(env_keys::SOURCE_DIR) {
            self.source_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get(env_keys::CHUNK_SIZE) {
            self.chunk_size = parse_value(env_keys::CHUNK_SIZE, &v)?;
        }
        if let Some(v) = get(env_keys::CHUNK_THRESHOLD_BYTES) {
            self.chunk_threshold_bytes = parse_value(env_keys::CHUNK_THRESHOLD_BYTES, &v)?;
        }
        if let Some(v) = get(env_keys::SUMMARY_TABLE) {
            self.summary_table = v;
        }
        if let Some(v) = get(env_keys::LOG_DIR) {
            self.log_dir = PathBuf::from(v);
        }

        Ok(())
    }

    /// 汇总结果先写入的中间表名
    pub fn staging_table(&self) -> String {
        format!("{}_staging", self.summary_table)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "chunk_size".to_string(),
                value: "0".to_string(),
                message: "分块行数必须大于 0".to_string(),
            });
        }

        // 汇总表与其中间表都必须是合法表名
        for name in [self.summary_table.clone(), self.staging_table()] {
            if let Err(e) = validate_table_name(&name) {
                return Err(ConfigError::InvalidValue {
                    key: "summary_table".to_string(),
                    value: self.summary_table.clone(),
                    message: e.to_string(),
                });
            }
        }

        if self.sample_max_rows == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sample_max_rows".to_string(),
                value: "0".to_string(),
                message: "抽样行数必须大于 0".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// 获取默认数据库路径
///
/// 优先级: VENDOR_ETL_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(env_keys::DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => data_dir
            .join("vendor-summary-etl")
            .join("inventory.db")
            .to_string_lossy()
            .to_string(),
        None => "./inventory.db".to_string(),
    }
}

// ==========================================
// 环境变量键
// ==========================================
pub mod env_keys {
    pub const DB_PATH: &str = "VENDOR_ETL_DB_PATH";
    pub const SOURCE_DIR: &str = "VENDOR_ETL_SOURCE_DIR";
    pub const CHUNK_SIZE: &str = "VENDOR_ETL_CHUNK_SIZE";
    pub const CHUNK_THRESHOLD_BYTES: &str = "VENDOR_ETL_CHUNK_THRESHOLD_BYTES";
    pub const SUMMARY_TABLE: &str = "VENDOR_ETL_SUMMARY_TABLE";
    pub const LOG_DIR: &str = "VENDOR_ETL_LOG_DIR";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EtlConfig::default();
        assert_eq!(config.chunk_size, 100_000);
        assert_eq!(config.chunk_threshold_bytes, 100 * 1024 * 1024);
        assert_eq!(config.summary_table, "vendor_sales_summary");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_file_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.json");
        std::fs::write(&path, r#"{"chunk_size": 500, "summary_table": "vendor_kpi"}"#).unwrap();

        let config = EtlConfig::from_json_file(&path).unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.summary_table, "vendor_kpi");
        assert_eq!(config.sample_max_rows, DEFAULT_SAMPLE_MAX_ROWS);
    }

    #[test]
    fn test_json_file_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = EtlConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (env_keys::CHUNK_SIZE, "250"),
            (env_keys::SOURCE_DIR, " /data/csv "),
            (env_keys::SUMMARY_TABLE, ""),
        ]
        .into_iter()
        .collect();

        let mut config = EtlConfig::default();
        config
            .apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.chunk_size, 250);
        assert_eq!(config.source_dir, Some(PathBuf::from("/data/csv")));
        assert_eq!(config.summary_table, DEFAULT_SUMMARY_TABLE); // 空值不覆写
    }

    #[test]
    fn test_override_invalid_number() {
        let mut config = EtlConfig::default();
        let err = config
            .apply_overrides_from(|k| (k == env_keys::CHUNK_SIZE).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = EtlConfig {
            chunk_size: 0,
            ..EtlConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EtlConfig {
            summary_table: "vendor summary".to_string(),
            ..EtlConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_leaves_room_for_staging_suffix() {
        use crate::repository::identifier::MAX_TABLE_NAME_LEN;

        // 加上 "_staging" 后超长
        let config = EtlConfig {
            summary_table: "s".repeat(MAX_TABLE_NAME_LEN - 4),
            ..EtlConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "summary_table"
        ));

        let config = EtlConfig {
            summary_table: "s".repeat(MAX_TABLE_NAME_LEN - "_staging".len()),
            ..EtlConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.staging_table().len(), MAX_TABLE_NAME_LEN);
    }
}
