//! hello_triangle12 - DirectX 12 三角形示例
//!
//! 初始化 D3D12 管线，把交换链绑定到窗口合成器（DirectComposition）
//! 或直接绑定到窗口，每帧绘制一个静态三角形。
//!
//! # 模块结构
//!
//! - `core`: 配置、日志、错误处理
//! - `renderer`: 与 API 无关的顶点数据、帧计算和 Fence 记账
//! - `gfx`: DirectX 12 后端（仅 Windows）
//! - `app`: 窗口与消息循环，两个入口程序共用

pub mod app;
pub mod core;
pub mod gfx;
pub mod renderer;
