// ==========================================
// 供应商绩效分析系统 - CSV 文件实体
// ==========================================
// 生命周期: 仅在一次目录扫描期间存在
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ==========================================
// CsvShape - 行列规模
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvShape {
    pub rows: usize,    // 数据行数（不含表头）
    pub columns: usize, // 表头列数
}

// ==========================================
// CsvFile - 扫描得到的 CSV 文件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub shape: CsvShape,
}

impl CsvFile {
    /// 文件名（含扩展名）
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// 目标表名候选：去掉扩展名的文件名（合法性由上传阶段校验）
    pub fn table_name(&self) -> String {
        file_stem(&self.path)
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// 取文件主干名（去扩展名）
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 是否为 CSV 文件（扩展名大小写不敏感）
pub fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_csv_path() {
        assert!(is_csv_path(Path::new("sales.csv")));
        assert!(is_csv_path(Path::new("/data/SALES.CSV")));
        assert!(!is_csv_path(Path::new("sales.csv.bak")));
        assert!(!is_csv_path(Path::new("README")));
    }

    #[test]
    fn test_table_name_strips_extension() {
        let file = CsvFile {
            path: PathBuf::from("/data/vendor_invoice.csv"),
            size_bytes: 2 * 1024 * 1024,
            shape: CsvShape { rows: 3, columns: 2 },
        };
        assert_eq!(file.table_name(), "vendor_invoice");
        assert_eq!(file.file_name(), "vendor_invoice.csv");
        assert!((file.size_mb() - 2.0).abs() < f64::EPSILON);
    }
}
