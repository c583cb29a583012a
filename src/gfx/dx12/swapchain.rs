//! 交换链与渲染目标
//!
//! 交换链有两种创建方式：
//!
//! - 合成交换链：不绑定窗口，由 DirectComposition 视觉树引用，
//!   使用 `FLIP_SEQUENTIAL` + `STRETCH` + 预乘 alpha
//! - 窗口交换链：直接绑定 HWND，使用 `FLIP_DISCARD`，并禁用 Alt+Enter
//!
//! 两种方式都是双缓冲、`B8G8R8A8_UNORM`，每个后备缓冲区在 RTV 堆中有一个描述符。

use tracing::{debug, info};
use windows::core::Interface;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

use super::{CheckHresult, Dx12Context};
use crate::core::error::{GraphicsError, Result};
use crate::renderer::frame::{descriptor_address, FRAME_COUNT};

/// 后备缓冲区格式，管线状态的 RTV 格式与之一致
pub const BACK_BUFFER_FORMAT: DXGI_FORMAT = DXGI_FORMAT_B8G8R8A8_UNORM;

/// 交换链的呈现目标
#[derive(Debug, Clone, Copy)]
pub enum SwapChainTarget {
    /// 为合成创建，之后挂到视觉树上
    Composition,
    /// 直接绑定到窗口
    Window(HWND),
}

/// 交换链、RTV 堆和后备缓冲区资源
pub struct SwapChain {
    swap_chain: IDXGISwapChain3,
    rtv_heap: ID3D12DescriptorHeap,
    rtv_descriptor_size: u32,
    render_targets: Vec<ID3D12Resource>,
}

impl SwapChain {
    pub fn new(context: &Dx12Context, target: SwapChainTarget, width: u32, height: u32) -> Result<Self> {
        unsafe {
            let swap_chain = create_swap_chain(context, target, width, height)?;
            info!(width, height, buffers = FRAME_COUNT, ?target, "Swap chain created");

            // RTV 描述符堆
            let rtv_heap_desc = D3D12_DESCRIPTOR_HEAP_DESC {
                NumDescriptors: FRAME_COUNT,
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
                NodeMask: 0,
            };
            let rtv_heap: ID3D12DescriptorHeap = context
                .device
                .CreateDescriptorHeap(&rtv_heap_desc)
                .check(GraphicsError::SwapchainError, "CreateDescriptorHeap(RTV)")?;
            let rtv_descriptor_size = context
                .device
                .GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_RTV);

            // 每个后备缓冲区一个 RTV
            let heap_start = rtv_heap.GetCPUDescriptorHandleForHeapStart().ptr;
            let render_targets = (0..FRAME_COUNT)
                .map(|n| {
                    let surface: ID3D12Resource = swap_chain
                        .GetBuffer(n)
                        .check(GraphicsError::SwapchainError, "IDXGISwapChain::GetBuffer")?;
                    let handle = D3D12_CPU_DESCRIPTOR_HANDLE {
                        ptr: descriptor_address(heap_start, n, rtv_descriptor_size),
                    };
                    context.device.CreateRenderTargetView(&surface, None, handle);
                    Ok(surface)
                })
                .collect::<Result<Vec<_>>>()?;
            debug!(rtv_descriptor_size, "Render target views created");

            Ok(Self {
                swap_chain,
                rtv_heap,
                rtv_descriptor_size,
                render_targets,
            })
        }
    }

    /// 底层交换链，用于挂到合成视觉树
    pub fn raw(&self) -> &IDXGISwapChain3 {
        &self.swap_chain
    }

    pub fn current_back_buffer_index(&self) -> u32 {
        unsafe { self.swap_chain.GetCurrentBackBufferIndex() }
    }

    pub fn render_target(&self, index: u32) -> &ID3D12Resource {
        &self.render_targets[index as usize]
    }

    pub fn rtv_handle(&self, index: u32) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        let heap_start = unsafe { self.rtv_heap.GetCPUDescriptorHandleForHeapStart() }.ptr;
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: descriptor_address(heap_start, index, self.rtv_descriptor_size),
        }
    }

    pub fn present(&self, sync_interval: u32) -> Result<()> {
        unsafe { self.swap_chain.Present(sync_interval, DXGI_PRESENT(0)) }
            .ok()
            .check(GraphicsError::CommandExecution, "IDXGISwapChain::Present")
    }
}

unsafe fn create_swap_chain(
    context: &Dx12Context,
    target: SwapChainTarget,
    width: u32,
    height: u32,
) -> Result<IDXGISwapChain3> {
    let swap_chain: IDXGISwapChain1 = match target {
        SwapChainTarget::Composition => {
            let desc = DXGI_SWAP_CHAIN_DESC1 {
                Width: width,
                Height: height,
                Format: BACK_BUFFER_FORMAT,
                SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: FRAME_COUNT,
                Scaling: DXGI_SCALING_STRETCH,
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL,
                AlphaMode: DXGI_ALPHA_MODE_PREMULTIPLIED,
                ..Default::default()
            };
            context
                .factory
                .CreateSwapChainForComposition(&context.command_queue, &desc, None)
                .check(GraphicsError::SwapchainError, "CreateSwapChainForComposition")?
        }
        SwapChainTarget::Window(hwnd) => {
            let desc = DXGI_SWAP_CHAIN_DESC1 {
                Width: width,
                Height: height,
                Format: BACK_BUFFER_FORMAT,
                SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: FRAME_COUNT,
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
                ..Default::default()
            };
            let swap_chain = context
                .factory
                .CreateSwapChainForHwnd(&context.command_queue, hwnd, &desc, None, None)
                .check(GraphicsError::SwapchainError, "CreateSwapChainForHwnd")?;

            // 交换链大小固定，不支持全屏切换
            context
                .factory
                .MakeWindowAssociation(hwnd, DXGI_MWA_NO_ALT_ENTER)
                .check(GraphicsError::SwapchainError, "MakeWindowAssociation")?;
            swap_chain
        }
    };

    swap_chain
        .cast()
        .check(GraphicsError::SwapchainError, "IDXGISwapChain1 -> IDXGISwapChain3")
}
