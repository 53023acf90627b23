// ==========================================
// 供应商绩效分析系统 - 命令行主入口
// ==========================================
// 子命令: ingest / summary / run / tables / sample
// 退出码: 致命错误返回非 0
// ==========================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use vendor_summary_etl::config::EtlConfig;
use vendor_summary_etl::engine::PipelineOrchestrator;
use vendor_summary_etl::importer::CsvSampler;
use vendor_summary_etl::logging;
use vendor_summary_etl::perf::format_elapsed;
use vendor_summary_etl::repository::{SqliteTableStore, TableStore};

fn main() {
    if let Err(e) = run() {
        tracing::error!(error = ?e, "运行失败");
        eprintln!("错误: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // 配置: 默认值 → JSON 文件 → 环境变量 → 命令行
    let mut config = EtlConfig::load(cli.config.as_deref()).context("加载配置失败")?;
    cli.apply_to(&mut config);
    config.validate().context("配置校验失败")?;

    let log_path = logging::init_with_file(&config.log_dir, cli.log_file_name())
        .with_context(|| format!("无法创建日志目录: {}", config.log_dir.display()))?;

    tracing::info!("==================================================");
    tracing::info!("{} v{}", vendor_summary_etl::APP_NAME, vendor_summary_etl::VERSION);
    tracing::info!("数据库: {}", config.db_path.display());
    tracing::info!("日志文件: {}", log_path.display());
    tracing::info!("==================================================");

    let orchestrator = PipelineOrchestrator::new(config.clone());

    match &cli.command {
        Command::Ingest(_) => {
            let dir = source_dir(&config)?;
            let report = orchestrator.run_ingest_only(&dir)?;
            println!(
                "已导入 {} 张表，共 {} 行；失败 {}，跳过 {}",
                report.uploaded.len(),
                report.total_rows(),
                report.failed.len(),
                report.unreadable.len()
            );
        }
        Command::Summary => {
            let report = orchestrator.run_summary_only()?;
            println!(
                "汇总表 {} 已生成: {} 行，用时 {}",
                report.table,
                report.rows,
                format_elapsed(report.elapsed)
            );
        }
        Command::Run(_) => {
            let dir = source_dir(&config)?;
            let report = orchestrator.run_pipeline(&dir)?;
            println!(
                "运行 {}: 导入 {} 张表，汇总表 {} 共 {} 行",
                report.run_id,
                report.ingest.uploaded.len(),
                report.summary.table,
                report.summary.rows
            );
        }
        Command::Tables => {
            let store = SqliteTableStore::open(&config.db_path)
                .with_context(|| format!("无法打开数据库: {}", config.db_path.display()))?;
            let tables = store.list_tables();
            store.close()?;
            for table in tables? {
                println!("{}", table);
            }
        }
        Command::Sample(_) => {
            let dir = source_dir(&config)?;
            let sampler = CsvSampler::new(config.sample_max_rows, config.sample_seed);
            let report = sampler.sample_directory(&dir)?;
            println!(
                "已抽样 {} 个文件到 {}；失败 {}",
                report.outputs.len(),
                report.output_dir.display(),
                report.failed.len()
            );
        }
    }

    Ok(())
}

fn source_dir(config: &EtlConfig) -> Result<PathBuf> {
    config
        .source_dir
        .clone()
        .context("未指定 CSV 源目录（--source 或 VENDOR_ETL_SOURCE_DIR）")
}
