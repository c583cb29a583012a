//! 核心功能模块
//!
//! 与具体图形 API 无关的基础设施：配置、日志和错误处理。
//!
//! - `config`：配置管理，支持从配置文件加载并用命令行参数覆盖
//! - `log`：日志系统，提供结构化的日志记录功能
//! - `error`：错误处理，定义统一的错误类型

pub mod config;
pub mod error;
pub mod log;

pub use config::{Config, Presentation};
pub use error::{ConfigError, Error, GraphicsError, Result};
