// ==========================================
// 供应商绩效分析系统 - 命令行参数
// ==========================================
// 覆写优先级: 命令行 > 环境变量 > JSON 配置文件 > 默认值
// ==========================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vendor_summary_etl::config::EtlConfig;

/// 供应商绩效分析 ETL
///
/// 将 CSV 目录导入 SQLite，生成供应商销售汇总表
#[derive(Parser, Debug)]
#[command(name = "vendor-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite 数据库路径（覆盖 VENDOR_ETL_DB_PATH）
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// JSON 配置文件
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 日志目录（覆盖 VENDOR_ETL_LOG_DIR）
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 扫描目录并把每个 CSV 导入同名表
    Ingest(SourceArgs),

    /// 由源表构建并写入供应商汇总表
    Summary,

    /// 导入后立即构建汇总
    Run(SourceArgs),

    /// 列出数据库中的表
    Tables,

    /// 对目录下每个 CSV 随机抽样，输出到 processed/
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
pub struct SourceArgs {
    /// CSV 源目录（覆盖 VENDOR_ETL_SOURCE_DIR）
    #[arg(short = 's', long, value_name = "DIR")]
    pub source: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// 每个文件最多保留行数
    #[arg(long, value_name = "N")]
    pub max_rows: Option<usize>,

    /// 洗牌随机种子
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

impl Cli {
    /// 命令行参数覆盖到配置
    pub fn apply_to(&self, config: &mut EtlConfig) {
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = log_dir.clone();
        }

        let source = match &self.command {
            Command::Ingest(args) | Command::Run(args) => args.source.as_ref(),
            Command::Sample(args) => {
                if let Some(n) = args.max_rows {
                    config.sample_max_rows = n;
                }
                if let Some(seed) = args.seed {
                    config.sample_seed = seed;
                }
                args.source.source.as_ref()
            }
            Command::Summary | Command::Tables => None,
        };
        if let Some(dir) = source {
            config.source_dir = Some(dir.clone());
        }
    }

    /// 日志文件名（按子命令区分）
    pub fn log_file_name(&self) -> &'static str {
        match self.command {
            Command::Ingest(_) => "ingestion_db.log",
            Command::Summary | Command::Run(_) => "get_vendor_summary.log",
            Command::Tables => "tables.log",
            Command::Sample(_) => "sampling.log",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "vendor-etl",
            "--db",
            "/tmp/x.db",
            "sample",
            "--source",
            "data",
            "--max-rows",
            "5",
        ]);

        let mut config = EtlConfig::default();
        cli.apply_to(&mut config);

        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.source_dir, Some(PathBuf::from("data")));
        assert_eq!(config.sample_max_rows, 5);
        assert_eq!(cli.log_file_name(), "sampling.log");
    }
}
