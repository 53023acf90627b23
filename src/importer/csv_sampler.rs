// ==========================================
// 供应商绩效分析系统 - CSV 抽样工具
// ==========================================
// 职责: 对目录下每个 CSV 随机洗牌并截断到固定行数，
//       输出到 <dir>/processed/<stem>_sample.csv，供下游快速试跑
// 约束: 固定随机种子，结果可复现；单文件失败不影响其他文件
// 说明: 与核心 ETL 流程独立
// ==========================================

use crate::config::etl_config::{DEFAULT_SAMPLE_MAX_ROWS, DEFAULT_SAMPLE_SEED};
use crate::domain::csv_file::file_stem;
use crate::importer::csv_scanner::{list_csv_paths, open_csv_reader, FileFailure};
use crate::importer::error::{ImportError, ImportResult};
use csv::{StringRecord, WriterBuilder};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 抽样输出子目录名
pub const PROCESSED_DIR: &str = "processed";

#[derive(Debug, Clone, Serialize)]
pub struct SampledFile {
    pub source: PathBuf,
    pub output: PathBuf,
    pub rows_in: usize,
    pub rows_out: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SampleReport {
    pub output_dir: PathBuf,
    pub outputs: Vec<SampledFile>,
    pub failed: Vec<FileFailure>,
}

// ==========================================
// CsvSampler
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct CsvSampler {
    pub max_rows: usize,
    pub seed: u64,
}

impl Default for CsvSampler {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_SAMPLE_MAX_ROWS,
            seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl CsvSampler {
    pub fn new(max_rows: usize, seed: u64) -> Self {
        Self { max_rows, seed }
    }

    /// 处理目录下全部 CSV
    pub fn sample_directory<P: AsRef<Path>>(&self, dir: P) -> ImportResult<SampleReport> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ImportError::DirectoryRead {
                path: dir.display().to_string(),
                message: "不是有效目录".to_string(),
            });
        }

        let output_dir = dir.join(PROCESSED_DIR);
        std::fs::create_dir_all(&output_dir)?;

        let paths = list_csv_paths(dir)?;
        let mut report = SampleReport {
            output_dir: output_dir.clone(),
            ..SampleReport::default()
        };

        if paths.is_empty() {
            warn!(dir = %dir.display(), "目录下未找到 CSV 文件");
            return Ok(report);
        }
        info!(dir = %dir.display(), count = paths.len(), "开始抽样");

        for path in paths {
            let output = output_dir.join(format!("{}_sample.csv", file_stem(&path)));
            match self.sample_file(&path, &output) {
                Ok(sampled) => {
                    info!(
                        file = %path.display(),
                        rows_in = sampled.rows_in,
                        rows_out = sampled.rows_out,
                        output = %sampled.output.display(),
                        "抽样完成"
                    );
                    report.outputs.push(sampled);
                }
                Err(e) => {
                    error!(file = %path.display(), error = %e, "抽样失败");
                    report.failed.push(FileFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// 单文件: 读取 → 洗牌 → 截断 → 写出（保留原表头）
    pub fn sample_file(&self, source: &Path, output: &Path) -> ImportResult<SampledFile> {
        let mut reader = open_csv_reader(source)?;
        let headers = reader
            .headers()
            .map_err(|e| ImportError::csv(source, e))?
            .clone();

        let mut records = reader
            .records()
            .collect::<Result<Vec<StringRecord>, _>>()
            .map_err(|e| ImportError::csv(source, e))?;
        let rows_in = records.len();

        // 每个文件使用同一初始种子，结果与处理顺序无关
        let mut rng = StdRng::seed_from_u64(self.seed);
        records.shuffle(&mut rng);
        records.truncate(self.max_rows);

        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(output)
            .map_err(|e| ImportError::csv(output, e))?;
        writer
            .write_record(&headers)
            .map_err(|e| ImportError::csv(output, e))?;
        for record in &records {
            writer
                .write_record(record)
                .map_err(|e| ImportError::csv(output, e))?;
        }
        writer.flush()?;

        Ok(SampledFile {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            rows_in,
            rows_out: records.len(),
        })
    }
}
