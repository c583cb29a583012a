//! 错误处理模块
//!
//! 定义了示例中使用的统一错误类型。
//!
//! 图形 API 调用失败时不做任何恢复，第一个失败的调用会携带其所在的
//! 初始化或渲染阶段一路向上传递到 `main`。

use std::fmt;

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, Error>;

/// hello_triangle12 的错误类型
#[derive(Debug)]
pub enum Error {
    /// 配置错误
    Config(ConfigError),

    /// 图形 API 错误
    Graphics(GraphicsError),

    /// IO 错误
    Io(std::io::Error),

    /// 初始化错误（窗口、事件循环、平台不支持等）
    Initialization(String),

    /// 运行时错误
    Runtime(String),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 图形 API 相关的错误
///
/// 每个变体对应一个初始化阶段，消息中包含失败的调用和 HRESULT 描述。
#[derive(Debug)]
pub enum GraphicsError {
    /// 工厂、适配器、设备或命令队列创建失败
    DeviceCreation(String),

    /// 交换链或渲染目标错误
    SwapchainError(String),

    /// 着色器编译失败（包含编译器输出）
    ShaderCompilation(String),

    /// 根签名或管线状态创建失败
    PipelineCreation(String),

    /// 缓冲区等资源创建失败
    ResourceCreation(String),

    /// 命令录制、提交或呈现失败
    CommandExecution(String),

    /// Fence 或事件等待失败
    Synchronization(String),

    /// DirectComposition 绑定失败
    Composition(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Graphics(e) => write!(f, "Graphics error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Initialization(msg) => write!(f, "Initialization error: {}", msg),
            Error::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            GraphicsError::SwapchainError(msg) => write!(f, "Swapchain error: {}", msg),
            GraphicsError::ShaderCompilation(msg) => write!(f, "Shader compilation failed: {}", msg),
            GraphicsError::PipelineCreation(msg) => write!(f, "Pipeline creation failed: {}", msg),
            GraphicsError::ResourceCreation(msg) => write!(f, "Resource creation failed: {}", msg),
            GraphicsError::CommandExecution(msg) => write!(f, "Command execution failed: {}", msg),
            GraphicsError::Synchronization(msg) => write!(f, "Synchronization failed: {}", msg),
            GraphicsError::Composition(msg) => write!(f, "Composition failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Graphics(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<GraphicsError> for Error {
    fn from(err: GraphicsError) -> Self {
        Error::Graphics(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_graphics_error_display() {
        let err: Error = GraphicsError::ShaderCompilation("VSMain: syntax error".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Graphics error: Shader compilation failed: VSMain: syntax error"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err: Error = ConfigError::InvalidValue {
            field: "window.width".to_string(),
            reason: "must be greater than 0".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value for 'window.width': must be greater than 0"
        );
    }

    #[test]
    fn test_error_source_chain() {
        let err: Error = GraphicsError::Synchronization("fence".to_string()).into();
        let source = err.source().expect("graphics errors expose their source");
        assert_eq!(source.to_string(), "Synchronization failed: fence");

        let err = Error::Initialization("no window".to_string());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
