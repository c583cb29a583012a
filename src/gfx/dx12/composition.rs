//! DirectComposition 绑定
//!
//! 合成交换链不直接属于任何窗口，需要作为某个视觉对象的内容挂到
//! 窗口的合成目标上，提交之后才会显示。

use tracing::info;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::DirectComposition::*;
use windows::Win32::Graphics::Dxgi::IDXGISwapChain3;

use super::CheckHresult;
use crate::core::error::{GraphicsError, Result};

/// 窗口 → 合成目标 → 根视觉对象 → 交换链
///
/// 这些对象必须在整个呈现期间存活，否则窗口内容会消失。
pub struct CompositionBinding {
    _device: IDCompositionDevice,
    _target: IDCompositionTarget,
    _visual: IDCompositionVisual,
}

impl CompositionBinding {
    pub fn attach(hwnd: HWND, swap_chain: &IDXGISwapChain3) -> Result<Self> {
        unsafe {
            let device: IDCompositionDevice = DCompositionCreateDevice2(None)
                .check(GraphicsError::Composition, "DCompositionCreateDevice2")?;
            let target = device
                .CreateTargetForHwnd(hwnd, true)
                .check(GraphicsError::Composition, "CreateTargetForHwnd")?;
            let visual = device
                .CreateVisual()
                .check(GraphicsError::Composition, "CreateVisual")?;

            visual
                .SetContent(swap_chain)
                .check(GraphicsError::Composition, "IDCompositionVisual::SetContent")?;
            target
                .SetRoot(&visual)
                .check(GraphicsError::Composition, "IDCompositionTarget::SetRoot")?;
            device
                .Commit()
                .check(GraphicsError::Composition, "IDCompositionDevice::Commit")?;

            info!("Swap chain attached to DirectComposition visual tree");

            Ok(Self {
                _device: device,
                _target: target,
                _visual: visual,
            })
        }
    }
}
