// ==========================================
// 供应商绩效分析系统 - 引擎层
// ==========================================
// 职责: 汇总查询、指标派生、流程编排
// 红线: Engine 不拼 SQL，查询文本来自仓储层
// ==========================================

pub mod error;
pub mod metric_enricher;
pub mod orchestrator;
pub mod summary_query;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use metric_enricher::{safe_ratio, MetricEnricher};
pub use orchestrator::{PipelineOrchestrator, PipelineReport, SummaryReport};
pub use summary_query::SummaryQueryEngine;
