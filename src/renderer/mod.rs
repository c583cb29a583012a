//! 渲染器模块
//!
//! 与图形 API 无关的部分放在这里：顶点数据、帧相关计算和 Fence 记账。
//! 实际的 DirectX 12 实现在 `gfx::dx12` 中，仅在 Windows 上编译。

pub mod frame;
pub mod sync;
pub mod vertex;

pub use frame::FRAME_COUNT;
pub use vertex::{Vertex, TRIANGLE};

#[cfg(target_os = "windows")]
pub use crate::gfx::dx12::Renderer;
