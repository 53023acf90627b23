// ==========================================
// 供应商绩效分析系统 - CSV 目录扫描
// ==========================================
// 职责: 列出目录下 CSV 文件（非递归），逐个读取一遍统计行列规模
// 约束: 单个文件读取失败只记录并跳过，不影响整批
// ==========================================

use crate::domain::csv_file::{is_csv_path, CsvFile, CsvShape};
use crate::importer::error::{ImportError, ImportResult};
use csv::{Reader, ReaderBuilder, StringRecord};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ==========================================
// FileFailure - 单文件失败记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

// ==========================================
// ScanReport - 扫描结果
// ==========================================
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub files: Vec<CsvFile>,        // 可读文件（按文件名排序）
    pub unreadable: Vec<FileFailure>, // 无法读取的文件，不参与上传
}

/// 打开 CSV 读取器（首行为表头，允许行长度不一致）
pub fn open_csv_reader(path: &Path) -> ImportResult<Reader<File>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

/// 读取并清洗表头（TRIM），表头缺失时报错
pub fn read_headers(reader: &mut Reader<File>, path: &Path) -> ImportResult<Vec<String>> {
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::csv(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::EmptyHeader(path.display().to_string()));
    }

    Ok(headers)
}

/// 完整读取一遍文件，统计 (数据行数, 列数)
pub fn inspect_shape(path: &Path) -> ImportResult<CsvShape> {
    let mut reader = open_csv_reader(path)?;
    let columns = read_headers(&mut reader, path)?.len();

    let mut record = StringRecord::new();
    let mut rows = 0;
    while reader
        .read_record(&mut record)
        .map_err(|e| ImportError::csv(path, e))?
    {
        rows += 1;
    }

    Ok(CsvShape { rows, columns })
}

/// 列出目录下的 CSV 文件路径（非递归，按文件名排序）
pub fn list_csv_paths(dir: &Path) -> ImportResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ImportError::DirectoryRead {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ImportError::DirectoryRead {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if path.is_file() && is_csv_path(&path) {
            paths.push(path);
        }
    }

    paths.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(paths)
}

// ==========================================
// CsvScanner
// ==========================================
pub struct CsvScanner;

impl CsvScanner {
    /// 扫描目录，返回带行列规模的 CSV 文件列表
    ///
    /// # 返回
    /// - Ok(ScanReport): files 为可读文件，unreadable 为已跳过文件
    /// - Err: 目录本身不可读
    pub fn scan<P: AsRef<Path>>(&self, dir: P) -> ImportResult<ScanReport> {
        let dir = dir.as_ref();
        let paths = list_csv_paths(dir)?;

        if paths.is_empty() {
            warn!(dir = %dir.display(), "目录下未找到 CSV 文件");
            return Ok(ScanReport::default());
        }

        info!(dir = %dir.display(), count = paths.len(), "发现 CSV 文件");

        let mut report = ScanReport::default();
        for path in paths {
            let size_bytes = match std::fs::metadata(&path) {
                Ok(meta) => meta.len(),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "无法读取文件元数据，已跳过");
                    report.unreadable.push(FileFailure {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match inspect_shape(&path) {
                Ok(shape) => {
                    info!(
                        file = %path.display(),
                        rows = shape.rows,
                        columns = shape.columns,
                        "CSV 规模"
                    );
                    report.files.push(CsvFile {
                        path,
                        size_bytes,
                        shape,
                    });
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "无法读取 CSV，已跳过");
                    report.unreadable.push(FileFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_shapes_and_skips_non_csv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_sales.csv"), "Brand,SalesDollars\n1,10\n2,20\n").unwrap();
        std::fs::write(dir.path().join("a_invoice.CSV"), "VendorNumber,Freight\n1,3.5\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let report = CsvScanner.scan(dir.path()).unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].file_name(), "a_invoice.CSV");
        assert_eq!(report.files[0].shape, CsvShape { rows: 1, columns: 2 });
        assert_eq!(report.files[1].shape, CsvShape { rows: 2, columns: 2 });
        assert!(report.unreadable.is_empty());
    }

    #[test]
    fn test_scan_reports_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.csv"), "a,b\n1,2\n").unwrap();
        // 非 UTF-8 内容，StringRecord 读取失败
        std::fs::write(dir.path().join("bad.csv"), b"a,b\n\xff\xfe,1\n").unwrap();

        let report = CsvScanner.scan(dir.path()).unwrap();

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.unreadable.len(), 1);
        assert!(report.unreadable[0].path.ends_with("bad.csv"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let err = CsvScanner.scan("/definitely/not/here").unwrap_err();
        assert!(matches!(err, ImportError::DirectoryRead { .. }));
    }

    #[test]
    fn test_empty_file_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();

        let err = inspect_shape(&path).unwrap_err();
        assert!(matches!(err, ImportError::EmptyHeader(_)));
    }
}
