//! HelloTriangle12 - 窗口交换链版本
//!
//! 与默认程序相同，但交换链直接绑定到 HWND，不经过 DirectComposition。
//! 配置文件和命令行中的呈现方式设置会被忽略。

use anyhow::Context;
use hello_triangle12::app;
use hello_triangle12::core::{log, Presentation};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let config = app::load_config(app::CONFIG_PATH, std::env::args(), Some(Presentation::Hwnd))
        .context("Failed to load configuration")?;

    log::init_logger(&config.logging).context("Failed to initialize logging")?;
    info!("HelloTriangle12 (HWND) starting...");
    info!(
        width = config.window.width,
        height = config.window.height,
        vsync = config.graphics.vsync,
        warp = config.graphics.warp,
        "Graphics configuration"
    );

    if let Err(e) = app::run(&config) {
        error!("HelloTriangle12 (HWND) failed: {}", e);
        return Err(e).context("HelloTriangle12 (HWND) failed");
    }

    info!("HelloTriangle12 (HWND) exited normally");
    Ok(())
}
