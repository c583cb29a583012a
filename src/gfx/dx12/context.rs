//! DirectX 12 设备上下文
//!
//! # 初始化流程
//!
//! 1. 启用调试层（可选）
//! 2. 创建 DXGI 工厂
//! 3. 选择适配器（硬件适配器或 WARP）
//! 4. 创建 D3D12 设备
//! 5. 创建直接命令队列

use tracing::{debug, info, warn};
use windows::Win32::Graphics::Direct3D::D3D_FEATURE_LEVEL_11_0;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;

use super::CheckHresult;
use crate::core::config::GraphicsConfig;
use crate::core::error::{GraphicsError, Result};

/// 设备级别的 DX12 对象
///
/// 在进程生命周期内只创建一次，由 `Renderer` 持有。
pub struct Dx12Context {
    /// DXGI 工厂，交换链从这里创建
    pub factory: IDXGIFactory4,
    /// D3D12 设备
    pub device: ID3D12Device,
    /// 直接命令队列
    pub command_queue: ID3D12CommandQueue,
}

impl Dx12Context {
    pub fn new(graphics: &GraphicsConfig) -> Result<Self> {
        unsafe {
            // 1. 调试层
            if graphics.debug_layer {
                enable_debug_layer();
            }

            // 2. DXGI 工厂
            let factory_flags = if graphics.debug_layer {
                DXGI_CREATE_FACTORY_DEBUG
            } else {
                DXGI_CREATE_FACTORY_FLAGS::default()
            };
            let factory: IDXGIFactory4 = CreateDXGIFactory2(factory_flags)
                .check(GraphicsError::DeviceCreation, "CreateDXGIFactory2")?;

            // 3. 适配器
            let adapter = if graphics.warp {
                factory
                    .EnumWarpAdapter::<IDXGIAdapter1>()
                    .check(GraphicsError::DeviceCreation, "EnumWarpAdapter")?
            } else {
                hardware_adapter(&factory)?
            };
            let desc = adapter
                .GetDesc1()
                .check(GraphicsError::DeviceCreation, "IDXGIAdapter1::GetDesc1")?;
            info!(
                adapter = %adapter_name(&desc),
                dedicated_video_memory_mb = desc.DedicatedVideoMemory / (1024 * 1024),
                warp = graphics.warp,
                "Adapter selected"
            );

            // 4. 设备
            let mut device: Option<ID3D12Device> = None;
            D3D12CreateDevice(&adapter, D3D_FEATURE_LEVEL_11_0, &mut device)
                .check(GraphicsError::DeviceCreation, "D3D12CreateDevice")?;
            let device = device.ok_or_else(|| {
                GraphicsError::DeviceCreation("D3D12CreateDevice returned no device".to_string())
            })?;
            debug!("D3D12 Device created successfully");

            // 5. 命令队列
            let queue_desc = D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
                ..Default::default()
            };
            let command_queue: ID3D12CommandQueue = device
                .CreateCommandQueue(&queue_desc)
                .check(GraphicsError::DeviceCreation, "CreateCommandQueue")?;
            debug!("Direct command queue created");

            Ok(Self {
                factory,
                device,
                command_queue,
            })
        }
    }
}

unsafe fn enable_debug_layer() {
    let mut debug: Option<ID3D12Debug> = None;
    match D3D12GetDebugInterface(&mut debug).ok().and(debug) {
        Some(debug) => {
            debug.EnableDebugLayer();
            debug!("DX12 Debug Layer enabled");
        }
        None => warn!("Failed to enable DX12 Debug Layer (graphics tools not installed?)"),
    }
}

/// 第一个支持 11.0 特性级别的非软件适配器
unsafe fn hardware_adapter(factory: &IDXGIFactory4) -> Result<IDXGIAdapter1> {
    let mut index = 0;
    loop {
        let adapter = factory.EnumAdapters1(index).map_err(|e| {
            GraphicsError::DeviceCreation(format!(
                "No hardware adapter supports Direct3D 12 (EnumAdapters1: {})",
                e
            ))
        })?;
        index += 1;

        let desc = adapter
            .GetDesc1()
            .check(GraphicsError::DeviceCreation, "IDXGIAdapter1::GetDesc1")?;
        if desc.Flags & DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32 != 0 {
            debug!(adapter = %adapter_name(&desc), "Skipping software adapter");
            continue;
        }

        // 只检查能否创建设备，不保留
        if D3D12CreateDevice(
            &adapter,
            D3D_FEATURE_LEVEL_11_0,
            std::ptr::null_mut::<Option<ID3D12Device>>(),
        )
        .is_ok()
        {
            return Ok(adapter);
        }
    }
}

fn adapter_name(desc: &DXGI_ADAPTER_DESC1) -> String {
    let len = desc
        .Description
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(desc.Description.len());
    String::from_utf16_lossy(&desc.Description[..len])
}
