// ==========================================
// 供应商绩效分析系统 - CSV 批量入库
// ==========================================
// 流程: 扫描目录 → 逐文件 删除旧表 → 推断列类型 → 写表
// 分块: 文件大小超过阈值时先流式推断列类型，再按固定行数分块追加，限制内存占用
// 约束: 单文件失败只记录，批内其他文件继续
// ==========================================

use crate::config::EtlConfig;
use crate::config::etl_config::{DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_THRESHOLD_BYTES};
use crate::domain::csv_file::CsvFile;
use crate::domain::types::{TableSchema, WriteMode};
use crate::importer::csv_scanner::{open_csv_reader, read_headers, CsvScanner, FileFailure, ScanReport};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::schema_inference::{convert_record, infer_schema, SchemaAccumulator};
use crate::importer::table_lifecycle::TableLifecycle;
use crate::perf::format_elapsed;
use crate::repository::{validate_table_name, RepositoryError, TableStore};
use csv::StringRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// CsvLoaderOptions
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLoaderOptions {
    pub chunk_size: usize,
    pub chunk_threshold_bytes: u64,
}

impl Default for CsvLoaderOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_threshold_bytes: DEFAULT_CHUNK_THRESHOLD_BYTES,
        }
    }
}

impl From<&EtlConfig> for CsvLoaderOptions {
    fn from(config: &EtlConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            chunk_threshold_bytes: config.chunk_threshold_bytes,
        }
    }
}

// ==========================================
// 上传结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub table: String,
    pub source: PathBuf,
    pub rows: usize,
    pub chunks: usize,
    pub chunked: bool,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub uploaded: Vec<UploadReport>,
    pub failed: Vec<FileFailure>,     // 上传失败
    pub unreadable: Vec<FileFailure>, // 扫描阶段不可读，未尝试上传
}

impl IngestReport {
    pub fn total_rows(&self) -> usize {
        self.uploaded.iter().map(|u| u.rows).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || !self.unreadable.is_empty()
    }
}

// ==========================================
// CsvLoader
// ==========================================
pub struct CsvLoader<'a, S: TableStore> {
    store: &'a S,
    options: CsvLoaderOptions,
}

impl<'a, S: TableStore> CsvLoader<'a, S> {
    pub fn new(store: &'a S, options: CsvLoaderOptions) -> Self {
        Self { store, options }
    }

    /// 扫描目录并上传全部可读 CSV
    pub fn load_directory<P: AsRef<Path>>(&self, dir: P) -> ImportResult<IngestReport> {
        let scan = CsvScanner.scan(dir)?;
        Ok(self.upload_all(scan))
    }

    /// 上传扫描结果中的全部文件（顺序执行，单文件失败不影响其他文件）
    pub fn upload_all(&self, scan: ScanReport) -> IngestReport {
        let mut report = IngestReport {
            unreadable: scan.unreadable,
            ..IngestReport::default()
        };

        for file in &scan.files {
            match self.upload_file(file) {
                Ok(upload) => report.uploaded.push(upload),
                Err(e) => {
                    error!(file = %file.path.display(), error = %e, "文件上传失败");
                    report.failed.push(FileFailure {
                        path: file.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            skipped = report.unreadable.len(),
            rows = report.total_rows(),
            "批量上传完成"
        );
        report
    }

    /// 上传单个 CSV 到同名表（去扩展名）
    #[instrument(skip(self, file), fields(file = %file.file_name()))]
    pub fn upload_file(&self, file: &CsvFile) -> ImportResult<UploadReport> {
        let table = file.table_name();
        validate_table_name(&table).map_err(|e| ImportError::InvalidTableName {
            file: file.path.display().to_string(),
            message: e.to_string(),
        })?;

        info!(
            table = %table,
            size_mb = %format!("{:.2}", file.size_mb()),
            "开始上传"
        );
        let start = Instant::now();

        // 删除旧表（失败只记日志）
        TableLifecycle::new(self.store).drop_if_exists(&table);

        let chunked = file.size_bytes > self.options.chunk_threshold_bytes;
        let (rows, chunks) = if chunked {
            self.upload_chunked(&file.path, &table)?
        } else {
            self.upload_single(&file.path, &table)?
        };

        let elapsed = start.elapsed();
        info!(
            table = %table,
            rows,
            chunks,
            elapsed = %format_elapsed(elapsed),
            "上传完成"
        );

        Ok(UploadReport {
            table,
            source: file.path.clone(),
            rows,
            chunks,
            chunked,
            elapsed,
        })
    }

    /// 小文件: 全量读取后一次性 Replace 写入
    fn upload_single(&self, path: &Path, table: &str) -> ImportResult<(usize, usize)> {
        let mut reader = open_csv_reader(path)?;
        let headers = read_headers(&mut reader, path)?;

        let records = reader
            .records()
            .collect::<Result<Vec<StringRecord>, _>>()
            .map_err(|e| ImportError::csv(path, e))?;

        let schema = infer_schema(&headers, &records);
        let rows: Vec<_> = records.iter().map(|r| convert_record(&schema, r)).collect();

        let written = self
            .store
            .write_table(table, &schema, &rows, WriteMode::Replace)
            .map_err(|e| upload_failed(path, table, e))?;

        Ok((written, 1))
    }

    /// 大文件: 先流式推断列类型，再按 chunk_size 行分块顺序 Append
    fn upload_chunked(&self, path: &Path, table: &str) -> ImportResult<(usize, usize)> {
        match self.stream_chunks(path, table) {
            Ok(result) => Ok(result),
            Err(e) => {
                // 中途失败：清掉半截表，避免下游误用
                warn!(table, "分块上传中断，删除不完整的表");
                TableLifecycle::new(self.store).drop_if_exists(table);
                Err(e)
            }
        }
    }

    fn stream_chunks(&self, path: &Path, table: &str) -> ImportResult<(usize, usize)> {
        // 第一遍: 只做类型推断，不保留行
        let schema = scan_schema(path)?;
        debug!(table, columns = schema.len(), "列类型推断完成");

        // 第二遍: 按块写入，全部块共用同一份列描述
        let mut reader = open_csv_reader(path)?;
        read_headers(&mut reader, path)?;

        let mut buffer: Vec<StringRecord> = Vec::with_capacity(self.options.chunk_size);
        let mut written = 0;
        let mut chunks = 0;

        for record in reader.records() {
            buffer.push(record.map_err(|e| ImportError::csv(path, e))?);
            if buffer.len() >= self.options.chunk_size {
                written += self.write_chunk(path, table, &schema, &buffer)?;
                chunks += 1;
                debug!(table, chunk = chunks, rows = buffer.len(), "已写入分块");
                buffer.clear();
            }
        }

        // 尾块；空文件也建一张空表
        if !buffer.is_empty() || chunks == 0 {
            written += self.write_chunk(path, table, &schema, &buffer)?;
            chunks += 1;
            debug!(table, chunk = chunks, rows = buffer.len(), "已写入分块");
        }

        Ok((written, chunks))
    }

    fn write_chunk(
        &self,
        path: &Path,
        table: &str,
        schema: &TableSchema,
        records: &[StringRecord],
    ) -> ImportResult<usize> {
        let rows: Vec<_> = records.iter().map(|r| convert_record(schema, r)).collect();

        self.store
            .write_table(table, schema, &rows, WriteMode::Append)
            .map_err(|e| upload_failed(path, table, e))
    }
}

/// 流式读取整个文件推断列类型，内存只占一行
fn scan_schema(path: &Path) -> ImportResult<TableSchema> {
    let mut reader = open_csv_reader(path)?;
    let headers = read_headers(&mut reader, path)?;

    let mut acc = SchemaAccumulator::new(&headers);
    let mut record = StringRecord::new();
    while reader
        .read_record(&mut record)
        .map_err(|e| ImportError::csv(path, e))?
    {
        acc.observe(&record);
    }
    Ok(acc.finish())
}

fn upload_failed(path: &Path, table: &str, source: RepositoryError) -> ImportError {
    ImportError::UploadFailed {
        file: path.display().to_string(),
        table: table.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::csv_file::CsvShape;
    use crate::domain::types::CellValue;
    use crate::repository::SqliteTableStore;

    fn csv_file(path: PathBuf, size_bytes: u64) -> CsvFile {
        CsvFile {
            path,
            size_bytes,
            shape: CsvShape { rows: 0, columns: 0 },
        }
    }

    #[test]
    fn test_upload_single_replace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendor_invoice.csv");
        std::fs::write(&path, "VendorNumber,Freight\n1,3.5\n2,\n").unwrap();

        let store = SqliteTableStore::in_memory().unwrap();
        let loader = CsvLoader::new(&store, CsvLoaderOptions::default());

        let report = loader.upload_file(&csv_file(path.clone(), 30)).unwrap();
        assert_eq!(report.table, "vendor_invoice");
        assert_eq!(report.rows, 2);
        assert!(!report.chunked);

        // 重跑不重复
        loader.upload_file(&csv_file(path, 30)).unwrap();
        assert_eq!(store.row_count("vendor_invoice").unwrap(), 2);
    }

    #[test]
    fn test_upload_chunked_counts_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        let mut body = String::from("Brand,SalesQuantity\n");
        for i in 0..5 {
            body.push_str(&format!("{},{}\n", i, i * 2));
        }
        std::fs::write(&path, body).unwrap();

        let store = SqliteTableStore::in_memory().unwrap();
        let loader = CsvLoader::new(
            &store,
            CsvLoaderOptions {
                chunk_size: 2,
                chunk_threshold_bytes: 0,
            },
        );

        let report = loader.upload_file(&csv_file(path, 1)).unwrap();
        assert!(report.chunked);
        assert_eq!(report.rows, 5);
        assert_eq!(report.chunks, 3);
        assert_eq!(store.row_count("sales").unwrap(), 5);
    }

    #[test]
    fn test_chunked_schema_covers_later_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "Brand,SalesPrice\n1,1\n2,2\n3,2.5\n4,N/A\n").unwrap();

        let store = SqliteTableStore::in_memory().unwrap();
        let loader = CsvLoader::new(
            &store,
            CsvLoaderOptions {
                chunk_size: 2,
                chunk_threshold_bytes: 0,
            },
        );
        loader.upload_file(&csv_file(path, 1)).unwrap();

        let result = store
            .query_rows("SELECT SalesPrice FROM sales ORDER BY rowid")
            .unwrap();
        let prices: Vec<CellValue> = result.rows.into_iter().map(|mut r| r.remove(0)).collect();
        assert_eq!(
            prices,
            vec![
                CellValue::Text("1".to_string()),
                CellValue::Text("2".to_string()),
                CellValue::Text("2.5".to_string()),
                CellValue::Text("N/A".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2017 purchases.csv");
        std::fs::write(&path, "a\n1\n").unwrap();

        let store = SqliteTableStore::in_memory().unwrap();
        let loader = CsvLoader::new(&store, CsvLoaderOptions::default());

        let err = loader.upload_file(&csv_file(path, 4)).unwrap_err();
        assert!(matches!(err, ImportError::InvalidTableName { .. }));
        assert!(store.list_tables().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_header_fails_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dupes.csv");
        std::fs::write(&path, "Brand,brand\n1,2\n").unwrap();

        let store = SqliteTableStore::in_memory().unwrap();
        let loader = CsvLoader::new(&store, CsvLoaderOptions::default());

        let err = loader.upload_file(&csv_file(path, 4)).unwrap_err();
        assert!(matches!(
            err,
            ImportError::UploadFailed {
                source: RepositoryError::SchemaValidation { .. },
                ..
            }
        ));
    }
}
