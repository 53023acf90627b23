// ==========================================
// 供应商绩效分析系统 - 流程编排器
// ==========================================
// 主流程: 打开存储 → 入库 → 汇总查询 → 指标派生 → 持久化 → 清理 → 关闭存储
// 约束: 单线程顺序执行，不自动重试；任一阶段失败即终止本次运行
// 持久化: 先写 <summary>_staging，再删旧表并改名，避免半成品表对外可见
// ==========================================

use crate::config::EtlConfig;
use crate::domain::vendor_summary::VendorSummaryRow;
use crate::domain::types::WriteMode;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::metric_enricher::MetricEnricher;
use crate::engine::summary_query::SummaryQueryEngine;
use crate::importer::{CsvLoader, CsvLoaderOptions, IngestReport, TableLifecycle};
use crate::perf::{format_elapsed, PerfGuard};
use crate::repository::{SqliteTableStore, TableStore};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

// ==========================================
// 运行结果
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub run_id: String,
    pub table: String,
    pub rows: usize,
    pub elapsed: Duration,
    pub finished_at: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub started_at: DateTime<Local>,
    pub ingest: IngestReport,
    pub summary: SummaryReport,
}

// ==========================================
// PipelineOrchestrator
// ==========================================

pub struct PipelineOrchestrator {
    config: EtlConfig,
    enricher: MetricEnricher,
}

impl PipelineOrchestrator {
    pub fn new(config: EtlConfig) -> Self {
        Self {
            config,
            enricher: MetricEnricher::new(),
        }
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// 汇总表对应的中间表名
    pub fn staging_table(&self) -> String {
        self.config.staging_table()
    }

    // ==========================================
    // 入口: 自行管理存储生命周期
    // ==========================================

    /// 完整流程: 入库 + 汇总
    pub fn run_pipeline<P: AsRef<Path>>(&self, source_dir: P) -> EngineResult<PipelineReport> {
        let run_id = new_run_id();
        let started_at = Local::now();
        let span = info_span!("pipeline", run_id = %run_id);
        let _enter = span.enter();

        let source_dir = source_dir.as_ref();
        info!(source = %source_dir.display(), db = %self.config.db_path.display(), "流程开始");

        self.with_store(|store| {
            let ingest = self.run_ingest(store, source_dir)?;
            let summary = self.summarize(store, &run_id)?;
            Ok(PipelineReport {
                run_id: run_id.clone(),
                started_at,
                ingest,
                summary,
            })
        })
    }

    /// 仅入库
    pub fn run_ingest_only<P: AsRef<Path>>(&self, source_dir: P) -> EngineResult<IngestReport> {
        let source_dir = source_dir.as_ref();
        self.with_store(|store| self.run_ingest(store, source_dir))
    }

    /// 仅汇总（源表须已存在）
    pub fn run_summary_only(&self) -> EngineResult<SummaryReport> {
        self.with_store(|store| self.run_summary(store))
    }

    /// 打开存储 → 执行 → 关闭存储（成功失败都关闭）
    fn with_store<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&SqliteTableStore) -> EngineResult<T>,
    {
        let store = SqliteTableStore::open(&self.config.db_path)?;
        let result = f(&store);

        match (result, store.close()) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(EngineError::Store(e)),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!(error = %close_err, "关闭存储失败");
                Err(e)
            }
        }
    }

    // ==========================================
    // 阶段: 由调用方提供存储
    // ==========================================

    /// 扫描目录并批量入库（单文件失败不致命）
    pub fn run_ingest<S: TableStore, P: AsRef<Path>>(
        &self,
        store: &S,
        source_dir: P,
    ) -> EngineResult<IngestReport> {
        let _perf = PerfGuard::new("ingest");
        let start = Instant::now();
        let source_dir = source_dir.as_ref();

        // 步骤1: 扫描 + 上传
        info!(source = %source_dir.display(), "入库开始");
        let loader = CsvLoader::new(store, CsvLoaderOptions::from(&self.config));
        let report = loader.load_directory(source_dir)?;

        if report.has_failures() {
            warn!(
                failed = report.failed.len(),
                unreadable = report.unreadable.len(),
                "部分文件未入库"
            );
        }
        info!(
            tables = report.uploaded.len(),
            rows = report.total_rows(),
            elapsed = %format_elapsed(start.elapsed()),
            "入库完成"
        );
        Ok(report)
    }

    /// 构建并持久化供应商汇总表
    pub fn run_summary<S: TableStore>(&self, store: &S) -> EngineResult<SummaryReport> {
        let run_id = new_run_id();
        let span = info_span!("summary", run_id = %run_id);
        let _enter = span.enter();
        self.summarize(store, &run_id)
    }

    fn summarize<S: TableStore>(&self, store: &S, run_id: &str) -> EngineResult<SummaryReport> {
        let start = Instant::now();
        let table = self.config.summary_table.clone();

        // 步骤1: 汇总查询
        info!("汇总查询开始");
        let raw = {
            let _perf = PerfGuard::new("summary_query");
            SummaryQueryEngine::new(store).fetch()?
        };

        // 步骤2: 清洗 + 派生指标
        info!(rows = raw.len(), "指标派生开始");
        let rows = {
            let _perf = PerfGuard::new("metric_enrich");
            self.enricher.enrich(raw)
        };

        // 步骤3: 持久化
        info!(table = %table, rows = rows.len(), "汇总结果写入开始");
        let written = {
            let _perf = PerfGuard::new("summary_persist");
            self.persist(store, &rows)?
        };

        // 步骤4: 清理中间表
        self.cleanup(store);

        let elapsed = start.elapsed();
        info!(
            table = %table,
            rows = written,
            elapsed = %format_elapsed(elapsed),
            "汇总完成"
        );

        Ok(SummaryReport {
            run_id: run_id.to_string(),
            table,
            rows: written,
            elapsed,
            finished_at: Local::now(),
        })
    }

    /// staging 全量写入 → 删旧表 → 改名
    pub fn persist<S: TableStore>(&self, store: &S, rows: &[VendorSummaryRow]) -> EngineResult<usize> {
        let target = self.config.summary_table.as_str();
        let staging = self.staging_table();
        let cells: Vec<_> = rows.iter().map(VendorSummaryRow::to_cells).collect();

        let written = store
            .write_table(&staging, &VendorSummaryRow::schema(), &cells, WriteMode::Replace)
            .map_err(|source| {
                error!(table = %staging, error = %source, "写入中间表失败");
                self.cleanup(store);
                EngineError::Persist {
                    table: staging.clone(),
                    source,
                }
            })?;

        TableLifecycle::new(store).drop_if_exists(target);

        store.rename_table(&staging, target).map_err(|source| {
            error!(from = %staging, to = target, error = %source, "中间表改名失败");
            self.cleanup(store);
            EngineError::Persist {
                table: target.to_string(),
                source,
            }
        })?;

        Ok(written)
    }

    /// 删除残留中间表（失败只告警）
    fn cleanup<S: TableStore>(&self, store: &S) {
        let staging = self.staging_table();
        match store.table_exists(&staging) {
            Ok(false) => {}
            Ok(true) => {
                if let Err(e) = store.drop_table(&staging) {
                    warn!(table = %staging, error = %e, "清理中间表失败");
                }
            }
            Err(e) => warn!(table = %staging, error = %e, "检查中间表失败"),
        }
    }
}

fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}
