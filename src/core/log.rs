//! 日志系统模块
//!
//! 基于 `tracing` 提供结构化的日志记录功能。
//!
//! - 控制台输出，可选按天滚动的文件输出（`tracing-appender`）
//! - 日志级别来自配置文件的 `[logging]` 段
//! - `RUST_LOG` 环境变量存在时优先生效
//!
//! # 使用示例
//!
//! ```no_run
//! use hello_triangle12::core::{log, config::LoggingConfig};
//!
//! log::init_logger(&LoggingConfig::default()).unwrap();
//! tracing::info!(width = 800, height = 600, "Window created");
//! ```

use std::path::Path;

use tracing::{debug, warn, Level};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::config::{LogLevel, LoggingConfig};
use super::error::{Error, Result};

/// 初始化日志系统
///
/// 必须在程序开始时调用一次。日志文件目录无法创建时返回错误。
/// 重复调用时保留第一次安装的订阅者，并通过它输出警告。
pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(true);

    let file_layer = if config.file_output {
        let (directory, filename) = split_log_path(&config.log_file);
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(filename)
            .build(directory)
            .map_err(|e| {
                Error::Initialization(format!(
                    "Failed to open log file {}: {}",
                    config.log_file, e
                ))
            })?;

        Some(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)  // 文件不需要 ANSI 颜色
                .with_writer(file_appender),
        )
    } else {
        None
    };

    match tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        Ok(()) => debug!(
            level = %Level::from(config.level),
            file_output = config.file_output,
            "Logger initialized"
        ),
        Err(e) => warn!(
            file_output = config.file_output,
            "Logger already initialized, keeping existing subscriber: {}", e
        ),
    }

    Ok(())
}

/// 把日志文件路径拆成目录和文件名，缺失部分使用默认值
fn split_log_path(log_path: &str) -> (&Path, &str) {
    let path = Path::new(log_path);
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("hello_triangle12.log");
    (directory, filename)
}

impl LogLevel {
    /// EnvFilter 指令字符串
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 日志级别转换
impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(LogLevel::Debug.as_filter(), "debug");
    }

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path("logs/app.log");
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(name, "app.log");

        let (dir, name) = split_log_path("plain.log");
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "plain.log");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        let config = LoggingConfig::default();
        assert!(init_logger(&config).is_ok());
        assert!(init_logger(&config).is_ok());
    }

    #[test]
    fn test_unusable_log_directory_is_an_error() {
        // 父路径是一个普通文件，日志目录无法创建
        let blocker = std::env::temp_dir().join(format!(
            "hello_triangle12_log_blocker_{}",
            std::process::id()
        ));
        std::fs::write(&blocker, b"").unwrap();

        let config = LoggingConfig {
            file_output: true,
            log_file: blocker.join("app.log").to_string_lossy().to_string(),
            ..LoggingConfig::default()
        };
        let result = init_logger(&config);
        assert!(matches!(result, Err(Error::Initialization(_))));

        std::fs::remove_file(&blocker).ok();
    }
}
