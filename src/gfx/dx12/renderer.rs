//! DirectX 12 三角形渲染器
//!
//! 所有对象在构造时按 API 要求的顺序创建一次：
//! 交换链 → RTV 堆 → 渲染目标 → 命令分配器 → 根签名 → 管线状态 →
//! 命令列表 → 顶点缓冲区 → Fence。
//!
//! 之后每帧只改变两样东西：Fence 期望值和当前后备缓冲区索引。
//! 同一时间只有一帧在 GPU 上执行，提交后立即等待它完成，
//! 所以一个命令分配器就够了。

use std::mem::ManuallyDrop;

use tracing::{debug, trace, warn};
use windows::core::Interface;
use windows::Win32::Foundation::{CloseHandle, HANDLE, RECT, WAIT_OBJECT_0};
use windows::Win32::Graphics::Direct3D::D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::System::Threading::{CreateEventA, WaitForSingleObject, INFINITE};

use super::buffer::VertexBuffer;
use super::pipeline::Pipeline;
use super::swapchain::{SwapChain, SwapChainTarget};
use super::{CheckHresult, Dx12Context};
use crate::core::config::GraphicsConfig;
use crate::core::error::{GraphicsError, Result};
use crate::renderer::frame::{sync_interval, ScissorRect, Viewport};
use crate::renderer::sync::FrameFence;
use crate::renderer::vertex::TRIANGLE;

pub struct Renderer {
    context: Dx12Context,
    swap_chain: SwapChain,
    command_allocator: ID3D12CommandAllocator,
    pipeline: Pipeline,
    command_list: ID3D12GraphicsCommandList,
    vertex_buffer: VertexBuffer,

    viewport: D3D12_VIEWPORT,
    scissor_rect: RECT,
    clear_color: [f32; 4],
    sync_interval: u32,

    frame_index: u32,
    fence: ID3D12Fence,
    frame_fence: FrameFence,
    fence_event: HANDLE,
    frames_presented: u64,
}

impl Renderer {
    pub fn new(
        context: Dx12Context,
        target: SwapChainTarget,
        width: u32,
        height: u32,
        graphics: &GraphicsConfig,
    ) -> Result<Self> {
        // 交换链、RTV 堆、渲染目标
        let swap_chain = SwapChain::new(&context, target, width, height)?;
        let frame_index = swap_chain.current_back_buffer_index();

        unsafe {
            let command_allocator: ID3D12CommandAllocator = context
                .device
                .CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)
                .check(GraphicsError::DeviceCreation, "CreateCommandAllocator")?;

            // 根签名、着色器、管线状态
            let pipeline = Pipeline::new(&context.device)?;

            let command_list: ID3D12GraphicsCommandList = context
                .device
                .CreateCommandList(
                    0,
                    D3D12_COMMAND_LIST_TYPE_DIRECT,
                    &command_allocator,
                    &pipeline.pipeline_state,
                )
                .check(GraphicsError::CommandExecution, "CreateCommandList")?;
            // 命令列表创建时处于录制状态，主循环要求它是关闭的
            command_list
                .Close()
                .check(GraphicsError::CommandExecution, "ID3D12GraphicsCommandList::Close")?;

            let vertex_buffer = VertexBuffer::new(&context.device, &TRIANGLE)?;

            let fence: ID3D12Fence = context
                .device
                .CreateFence(0, D3D12_FENCE_FLAG_NONE)
                .check(GraphicsError::Synchronization, "CreateFence")?;
            let fence_event = CreateEventA(None, false, false, None)
                .check(GraphicsError::Synchronization, "CreateEventA")?;

            let viewport = Viewport::full(width, height);
            let scissor = ScissorRect::full(width, height);

            let mut renderer = Self {
                context,
                swap_chain,
                command_allocator,
                pipeline,
                command_list,
                vertex_buffer,
                viewport: D3D12_VIEWPORT {
                    TopLeftX: viewport.x,
                    TopLeftY: viewport.y,
                    Width: viewport.width,
                    Height: viewport.height,
                    MinDepth: viewport.min_depth,
                    MaxDepth: viewport.max_depth,
                },
                scissor_rect: RECT {
                    left: scissor.left,
                    top: scissor.top,
                    right: scissor.right,
                    bottom: scissor.bottom,
                },
                clear_color: graphics.clear_color,
                sync_interval: sync_interval(graphics.vsync),
                frame_index,
                fence,
                frame_fence: FrameFence::new(),
                fence_event,
                frames_presented: 0,
            };

            // 等待初始化提交的工作完成后再进入主循环
            renderer.wait_for_previous_frame()?;
            debug!("DX12 Renderer initialized");

            Ok(renderer)
        }
    }

    /// 交换链，用于挂到合成视觉树
    pub fn swap_chain(&self) -> &SwapChain {
        &self.swap_chain
    }

    /// 已呈现的帧数
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// 渲染并呈现一帧，返回前等待 GPU 完成
    pub fn render(&mut self) -> Result<()> {
        self.populate_command_list()?;

        let command_list: ID3D12CommandList = self
            .command_list
            .cast()
            .check(GraphicsError::CommandExecution, "ID3D12GraphicsCommandList -> ID3D12CommandList")?;
        unsafe {
            self.context
                .command_queue
                .ExecuteCommandLists(&[Some(command_list)]);
        }

        self.swap_chain.present(self.sync_interval)?;
        self.frames_presented += 1;
        trace!(frame = self.frames_presented, back_buffer = self.frame_index, "Presented");

        self.wait_for_previous_frame()
    }

    fn populate_command_list(&self) -> Result<()> {
        let render_target = self.swap_chain.render_target(self.frame_index);
        let rtv_handle = self.swap_chain.rtv_handle(self.frame_index);

        unsafe {
            // 只有在 GPU 执行完对应命令列表后才能重置分配器
            self.command_allocator
                .Reset()
                .check(GraphicsError::CommandExecution, "ID3D12CommandAllocator::Reset")?;
            self.command_list
                .Reset(&self.command_allocator, &self.pipeline.pipeline_state)
                .check(GraphicsError::CommandExecution, "ID3D12GraphicsCommandList::Reset")?;

            self.command_list.SetGraphicsRootSignature(&self.pipeline.root_signature);
            self.command_list.RSSetViewports(&[self.viewport]);
            self.command_list.RSSetScissorRects(&[self.scissor_rect]);

            self.command_list.ResourceBarrier(&[transition_barrier(
                render_target,
                D3D12_RESOURCE_STATE_PRESENT,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
            )]);

            self.command_list.OMSetRenderTargets(1, Some(&rtv_handle), false, None);
            self.command_list.ClearRenderTargetView(rtv_handle, &self.clear_color, None);
            self.command_list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            self.command_list.IASetVertexBuffers(0, Some(&[*self.vertex_buffer.view()]));
            self.command_list.DrawInstanced(self.vertex_buffer.vertex_count(), 1, 0, 0);

            self.command_list.ResourceBarrier(&[transition_barrier(
                render_target,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
                D3D12_RESOURCE_STATE_PRESENT,
            )]);

            self.command_list
                .Close()
                .check(GraphicsError::CommandExecution, "ID3D12GraphicsCommandList::Close")
        }
    }

    /// signal 下一个 Fence 值并阻塞到 GPU 完成，然后刷新后备缓冲区索引
    fn wait_for_previous_frame(&mut self) -> Result<()> {
        let value = self.frame_fence.signal();

        unsafe {
            self.context
                .command_queue
                .Signal(&self.fence, value.value())
                .check(GraphicsError::Synchronization, "ID3D12CommandQueue::Signal")?;

            if FrameFence::must_wait(self.fence.GetCompletedValue(), value) {
                self.fence
                    .SetEventOnCompletion(value.value(), self.fence_event)
                    .check(GraphicsError::Synchronization, "ID3D12Fence::SetEventOnCompletion")?;
                if WaitForSingleObject(self.fence_event, INFINITE) != WAIT_OBJECT_0 {
                    return Err(GraphicsError::Synchronization(format!(
                        "WaitForSingleObject failed while waiting for fence value {}",
                        value.value()
                    ))
                    .into());
                }
            }
        }

        self.frame_index = self.swap_chain.current_back_buffer_index();
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // 资源释放前确保 GPU 不再引用它们
        if let Err(e) = self.wait_for_previous_frame() {
            warn!("Failed to wait for GPU before shutdown: {}", e);
        }
        unsafe {
            if let Err(e) = CloseHandle(self.fence_event) {
                warn!("Failed to close fence event: {}", e);
            }
        }
        debug!(
            frames = self.frames_presented,
            next_fence_value = self.frame_fence.expected().value(),
            "DX12 Renderer dropped"
        );
    }
}

/// 资源状态转换屏障，借用资源指针，不增加引用计数
fn transition_barrier(
    resource: &ID3D12Resource,
    state_before: D3D12_RESOURCE_STATES,
    state_after: D3D12_RESOURCE_STATES,
) -> D3D12_RESOURCE_BARRIER {
    D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: D3D12_RESOURCE_BARRIER_0 {
            Transition: ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: unsafe { std::mem::transmute_copy(resource) },
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                StateBefore: state_before,
                StateAfter: state_after,
            }),
        },
    }
}
