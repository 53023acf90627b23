// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// 可选: 追加写入的运维日志文件（无 ANSI 颜色，带时间戳）
// ==========================================

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn default_filter() -> EnvFilter {
    // 从环境变量读取日志级别，默认为 info
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化日志系统（仅控制台）
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=vendor_summary_etl=trace
///
/// # 示例
/// ```no_run
/// use vendor_summary_etl::logging;
/// logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(default_filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化日志系统（控制台 + 追加写入的日志文件）
///
/// # 参数
/// - log_dir: 日志目录（不存在时创建）
/// - file_name: 日志文件名，例如 `ingestion.log`
///
/// # 返回
/// - Ok(PathBuf): 日志文件完整路径
pub fn init_with_file<P: AsRef<Path>>(log_dir: P, file_name: &str) -> std::io::Result<PathBuf> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)?;

    let log_path = log_dir.join(file_name);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file));

    // 已有全局 subscriber（例如测试中重复初始化）时忽略
    let _ = tracing_subscriber::registry()
        .with(default_filter())
        .with(console_layer)
        .with(file_layer)
        .try_init();

    Ok(log_path)
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_file_creates_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = init_with_file(dir.path().join("log"), "ingestion.log").unwrap();

        assert!(log_path.exists());
        assert!(log_path.ends_with("log/ingestion.log"));
    }
}
