// ==========================================
// 供应商绩效分析系统 - 配置层
// ==========================================
// 职责: 运行配置管理,支持多级覆写
// 来源: 默认值 / JSON 文件 / 环境变量 / 命令行
// ==========================================

pub mod etl_config;

// 重导出核心配置
pub use etl_config::{env_keys, get_default_db_path, ConfigError, EtlConfig};
