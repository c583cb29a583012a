//! 配置管理模块
//!
//! 提供示例配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 800
//! height = 600
//! title = "HelloTriangle12"
//!
//! [graphics]
//! presentation = "composition"  # 或 "hwnd"
//! vsync = true
//! continuous = true             # false 时只渲染一帧
//! debug_layer = false
//! warp = false
//! clear_color = [0.39, 0.58, 0.93, 1.0]
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

use super::error::{ConfigError, Error, Result};

/// 示例配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
///
/// 交换链大小固定为窗口创建时的尺寸，窗口不可调整大小。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口宽度（物理像素）
    #[serde(default = "default_width")]
    pub width: u32,

    /// 窗口高度（物理像素）
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 交换链的呈现方式
    #[serde(default = "default_presentation")]
    pub presentation: Presentation,

    /// 垂直同步
    #[serde(default = "default_vsync")]
    pub vsync: bool,

    /// 持续重绘；关闭时只渲染一帧，之后仅处理窗口消息
    #[serde(default = "default_continuous")]
    pub continuous: bool,

    /// 启用 D3D12 调试层
    #[serde(default = "default_debug_layer")]
    pub debug_layer: bool,

    /// 使用 WARP 软件适配器
    #[serde(default)]
    pub warp: bool,

    /// 清屏颜色（RGBA）
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
}

/// 交换链呈现方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    /// 通过 DirectComposition 视觉树呈现
    Composition,
    /// 直接绑定到窗口句柄
    Hwnd,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default)]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_title() -> String { "HelloTriangle12".to_string() }
fn default_presentation() -> Presentation { Presentation::Composition }
fn default_vsync() -> bool { true }
fn default_continuous() -> bool { true }
fn default_debug_layer() -> bool { cfg!(debug_assertions) }
fn default_clear_color() -> [f32; 4] { [0.39, 0.58, 0.93, 1.0] }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_log_file() -> String { "hello_triangle12.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            presentation: default_presentation(),
            vsync: default_vsync(),
            continuous: default_continuous(),
            debug_layer: default_debug_layer(),
            warp: false,
            clear_color: default_clear_color(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: false,
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// 文件不存在时返回 `ConfigError::FileNotFound`，其他读取错误原样返回。
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                ConfigError::FileNotFound(path.to_string_lossy().to_string()).into()
            }
            _ => Error::Io(e),
        })?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，文件不存在时使用默认配置
    ///
    /// 解析失败和其他 IO 错误不会被默认配置掩盖。
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::from_file(path) {
            Err(Error::Config(ConfigError::FileNotFound(_))) => Ok(Self::default()),
            other => other,
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--composition` / `--hwnd`: 选择呈现方式
    /// - `--warp`: 使用 WARP 软件适配器
    /// - `--once`: 只渲染一帧
    /// - `--no-vsync`: 关闭垂直同步
    /// - `--width <value>` / `--height <value>`: 窗口尺寸
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if args.iter().any(|a| a == "--composition") {
            self.graphics.presentation = Presentation::Composition;
        }
        if args.iter().any(|a| a == "--hwnd") {
            self.graphics.presentation = Presentation::Hwnd;
        }
        if args.iter().any(|a| a == "--warp") {
            self.graphics.warp = true;
        }
        if args.iter().any(|a| a == "--once") {
            self.graphics.continuous = false;
        }
        if args.iter().any(|a| a == "--no-vsync") {
            self.graphics.vsync = false;
        }

        if let Some(width) = value_after(&args, "--width") {
            self.window.width = width;
        }
        if let Some(height) = value_after(&args, "--height") {
            self.window.height = height;
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }.into());
        }

        if self.graphics.clear_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(ConfigError::InvalidValue {
                field: "graphics.clear_color".to_string(),
                reason: "Color components must be within [0.0, 1.0]".to_string(),
            }.into());
        }

        Ok(())
    }
}

fn value_after(args: &[String], flag: &str) -> Option<u32> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1)?.parse().ok()
}

impl Presentation {
    /// 获取呈现方式名称
    pub fn name(&self) -> &'static str {
        match self {
            Presentation::Composition => "DirectComposition",
            Presentation::Hwnd => "HWND",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "HelloTriangle12");
        assert_eq!(config.graphics.presentation, Presentation::Composition);
        assert!(config.graphics.vsync);
        assert!(config.graphics.continuous);
        assert_eq!(config.graphics.clear_color, [0.39, 0.58, 0.93, 1.0]);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.window.width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.graphics.clear_color = [0.0, 0.0, 1.5, 1.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args(["app", "--hwnd", "--warp", "--once", "--width", "1024", "--height", "768"]);

        assert_eq!(config.graphics.presentation, Presentation::Hwnd);
        assert!(config.graphics.warp);
        assert!(!config.graphics.continuous);
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 768);
    }

    #[test]
    fn test_apply_args_ignores_bad_numbers() {
        let mut config = Config::default();
        config.apply_args(["app", "--width", "wide", "--height"]);

        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [graphics]
            presentation = "hwnd"
            vsync = false

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.graphics.presentation, Presentation::Hwnd);
        assert!(!config.graphics.vsync);
        assert!(config.graphics.continuous);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[graphics]\npresentation = \"vulkan\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = Config::from_file_or_default("definitely/not/here.toml").unwrap();
        assert_eq!(config.window.width, 800);

        let result = Config::from_file("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config(ConfigError::FileNotFound(_)))));
    }

    #[test]
    fn test_malformed_file_is_not_replaced_by_defaults() {
        let path = std::env::temp_dir().join(format!(
            "hello_triangle12_malformed_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[graphics]\npresentation = \"hwdn\"\n\n[window]\nwidth = 1024\n").unwrap();

        let result = Config::from_file_or_default(&path);
        assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unreadable_path_is_io_error() {
        // 目录不能作为文件读取，错误不是 NotFound
        let result = Config::from_file_or_default(std::env::temp_dir());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_apply_args_vsync_and_presentation_flags() {
        let mut config = Config::default();
        config.apply_args(["app", "--no-vsync"]);
        assert!(!config.graphics.vsync);
        assert_eq!(config.graphics.presentation, Presentation::Composition);

        // 两个呈现参数同时出现时 --hwnd 优先
        let mut config = Config::default();
        config.apply_args(["app", "--hwnd", "--composition"]);
        assert_eq!(config.graphics.presentation, Presentation::Hwnd);
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!(
            "hello_triangle12_config_{}.toml",
            std::process::id()
        ));

        let mut config = Config::default();
        config.window.title = "Saved".to_string();
        config.graphics.presentation = Presentation::Hwnd;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.window.title, "Saved");
        assert_eq!(loaded.graphics.presentation, Presentation::Hwnd);

        std::fs::remove_file(&path).ok();
    }
}
