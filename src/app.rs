//! 应用程序外壳
//!
//! 两个入口程序共用的启动流程：加载配置、创建窗口、初始化 DX12，
//! 然后进入 winit 消息循环直到窗口关闭。

use tracing::error;

use crate::core::{Config, Error, Presentation, Result};

/// 默认配置文件路径
pub const CONFIG_PATH: &str = "config.toml";

/// 加载配置文件并应用命令行参数
///
/// 配置文件不存在时使用默认配置，其他加载错误直接返回。
/// `presentation` 不为 `None` 时覆盖配置文件和命令行中的呈现方式。
/// 覆盖之后的结果必须通过校验。
pub fn load_config<I>(path: &str, args: I, presentation: Option<Presentation>) -> Result<Config>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut config = Config::from_file_or_default(path)?;
    config.apply_args(args);
    if let Some(presentation) = presentation {
        config.graphics.presentation = presentation;
    }
    config.validate()?;
    Ok(config)
}

/// 创建窗口和渲染器并运行消息循环
///
/// 第一帧在进入循环之前渲染。`graphics.continuous` 为 false 时之后不再渲染，
/// 交换链保留最后呈现的内容直到窗口关闭。
#[cfg(target_os = "windows")]
pub fn run(config: &Config) -> Result<()> {
    use tracing::{debug, info};
    use winit::dpi::PhysicalSize;
    use winit::event::{Event, WindowEvent};
    use winit::event_loop::{ControlFlow, EventLoop};
    use winit::platform::windows::WindowBuilderExtWindows;
    use winit::window::WindowBuilder;

    use crate::gfx::dx12::{CompositionBinding, Dx12Context, Renderer, SwapChainTarget};

    let presentation = config.graphics.presentation;

    let event_loop = EventLoop::new()
        .map_err(|e| Error::Initialization(format!("Failed to create event loop: {}", e)))?;

    // 合成模式下窗口不需要 GDI 重定向表面，内容全部来自视觉树
    let window = WindowBuilder::new()
        .with_title(format!("{} [{}]", config.window.title, presentation.name()))
        .with_inner_size(PhysicalSize::new(config.window.width, config.window.height))
        .with_resizable(false)
        .with_no_redirection_bitmap(presentation == Presentation::Composition)
        .build(&event_loop)
        .map_err(|e| Error::Initialization(format!("Failed to create window: {}", e)))?;
    let hwnd = native_window(&window)?;
    info!(
        width = config.window.width,
        height = config.window.height,
        presentation = presentation.name(),
        "Window created"
    );

    let context = Dx12Context::new(&config.graphics)?;
    let target = match presentation {
        Presentation::Composition => SwapChainTarget::Composition,
        Presentation::Hwnd => SwapChainTarget::Window(hwnd),
    };
    let mut renderer = Renderer::new(
        context,
        target,
        config.window.width,
        config.window.height,
        &config.graphics,
    )?;

    let _composition = match presentation {
        Presentation::Composition => {
            Some(CompositionBinding::attach(hwnd, renderer.swap_chain().raw())?)
        }
        Presentation::Hwnd => None,
    };

    renderer.render()?;
    info!("First frame presented");

    let continuous = config.graphics.continuous;
    let mut failure: Option<Error> = None;

    info!(continuous, "Entering main loop...");
    event_loop
        .run(|event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent {
                    event: WindowEvent::CloseRequested,
                    ..
                } => {
                    info!("Window close requested, exiting...");
                    elwt.exit();
                }
                Event::WindowEvent {
                    event: WindowEvent::RedrawRequested,
                    ..
                } if continuous => {
                    if let Err(e) = renderer.render() {
                        error!("Render error: {}", e);
                        failure = Some(e);
                        elwt.exit();
                    }
                }
                Event::AboutToWait if continuous => {
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|e| Error::Runtime(format!("Event loop error: {}", e)))?;

    debug!(frames = renderer.frames_presented(), "Main loop finished");

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// 非 Windows 平台没有 DirectX 12
#[cfg(not(target_os = "windows"))]
pub fn run(_config: &Config) -> Result<()> {
    error!("DirectX 12 requires Windows");
    Err(Error::Initialization(
        "DirectX 12 is only available on Windows".to_string(),
    ))
}

#[cfg(target_os = "windows")]
fn native_window(window: &winit::window::Window) -> Result<windows::Win32::Foundation::HWND> {
    use raw_window_handle::{HasWindowHandle, RawWindowHandle};
    use windows::Win32::Foundation::HWND;

    let handle = window
        .window_handle()
        .map_err(|e| Error::Initialization(format!("Failed to get window handle: {}", e)))?;

    match handle.as_raw() {
        RawWindowHandle::Win32(handle) => Ok(HWND(handle.hwnd.get() as *mut std::ffi::c_void)),
        other => Err(Error::Initialization(format!(
            "Unsupported window handle: {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "does-not-exist.toml";

    fn temp_config(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "hello_triangle12_app_{}_{}.toml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(MISSING, ["hello_triangle12"], None).unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.graphics.presentation, Presentation::Composition);
    }

    #[test]
    fn test_load_config_applies_args() {
        let config = load_config(
            MISSING,
            ["hello_triangle12", "--hwnd", "--once", "--no-vsync", "--width", "1024"],
            None,
        )
        .unwrap();
        assert_eq!(config.graphics.presentation, Presentation::Hwnd);
        assert!(!config.graphics.continuous);
        assert!(!config.graphics.vsync);
        assert_eq!(config.window.width, 1024);
    }

    #[test]
    fn test_load_config_hwnd_flag_wins_over_composition_flag() {
        let config = load_config(MISSING, ["hello_triangle12", "--composition", "--hwnd"], None).unwrap();
        assert_eq!(config.graphics.presentation, Presentation::Hwnd);
    }

    #[test]
    fn test_load_config_rejects_zero_size() {
        let result = load_config(MISSING, ["hello_triangle12", "--height", "0"], None);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_config_rejects_malformed_file() {
        let path = temp_config("malformed", "[graphics]\npresentation = \"hwdn\"\n\n[window]\nwidth = 1024\n");

        let result = load_config(path.to_str().unwrap(), ["hello_triangle12"], None);
        assert!(matches!(result, Err(Error::Config(_))));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_config_forced_presentation_overrides_file_and_args() {
        let path = temp_config(
            "forced",
            "[window]\nwidth = 1024\n\n[graphics]\npresentation = \"composition\"\n",
        );

        let config = load_config(
            path.to_str().unwrap(),
            ["hello_triangle12_hwnd", "--composition"],
            Some(Presentation::Hwnd),
        )
        .unwrap();
        assert_eq!(config.graphics.presentation, Presentation::Hwnd);
        assert_eq!(config.window.width, 1024);

        std::fs::remove_file(&path).ok();
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_run_fails_without_windows() {
        let result = run(&Config::default());
        assert!(matches!(result, Err(Error::Initialization(_))));
    }
}
