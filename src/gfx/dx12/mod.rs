//! DirectX 12 图形 API 实现模块
//!
//! - `context`：DXGI 工厂、适配器、设备和命令队列
//! - `swapchain`：合成/窗口交换链、RTV 描述符堆和渲染目标
//! - `pipeline`：空根签名、着色器编译和管线状态对象
//! - `buffer`：上传堆上的静态顶点缓冲区
//! - `composition`：把交换链挂到 DirectComposition 视觉树
//! - `renderer`：每帧录制、提交、呈现和 Fence 等待

pub mod buffer;
pub mod composition;
pub mod context;
pub mod pipeline;
pub mod renderer;
pub mod swapchain;

pub use composition::CompositionBinding;
pub use context::Dx12Context;
pub use renderer::Renderer;
pub use swapchain::{SwapChain, SwapChainTarget};

use crate::core::error::{GraphicsError, Result};

/// 把 `windows::core::Result` 转换为带阶段和调用名的 `GraphicsError`
pub(crate) trait CheckHresult<T> {
    fn check(self, kind: fn(String) -> GraphicsError, call: &str) -> Result<T>;
}

impl<T> CheckHresult<T> for windows::core::Result<T> {
    fn check(self, kind: fn(String) -> GraphicsError, call: &str) -> Result<T> {
        self.map_err(|e| kind(format!("{} failed: {}", call, e)).into())
    }
}
