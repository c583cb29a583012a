//! HelloTriangle12 - DirectComposition 版本
//!
//! 创建 800x600 的窗口，把合成交换链挂到窗口的视觉树上，
//! 用矢车菊蓝清屏并绘制一个红绿蓝三角形。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件（config.toml，不存在时使用默认值）
//! cargo run
//!
//! # 只渲染一帧，使用 WARP 软件适配器
//! cargo run -- --once --warp
//!
//! # 改为直接绑定窗口的交换链
//! cargo run -- --hwnd
//! ```

use anyhow::Context;
use hello_triangle12::app;
use hello_triangle12::core::log;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    // 日志依赖配置，配置错误只能输出到 stderr
    let config = app::load_config(app::CONFIG_PATH, std::env::args(), None)
        .context("Failed to load configuration")?;

    log::init_logger(&config.logging).context("Failed to initialize logging")?;
    info!("HelloTriangle12 starting...");
    info!(version = env!("CARGO_PKG_VERSION"), "Application initialized");
    info!(
        presentation = config.graphics.presentation.name(),
        width = config.window.width,
        height = config.window.height,
        vsync = config.graphics.vsync,
        warp = config.graphics.warp,
        "Graphics configuration"
    );

    if let Err(e) = app::run(&config) {
        error!("HelloTriangle12 failed: {}", e);
        return Err(e).context("HelloTriangle12 failed");
    }

    info!("HelloTriangle12 exited normally");
    Ok(())
}
