//! 静态顶点缓冲区
//!
//! 顶点数据只有三个顶点，直接放在上传堆上，创建后不再修改。

use tracing::debug;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use super::CheckHresult;
use crate::core::error::{GraphicsError, Result};
use crate::renderer::vertex::Vertex;

/// 顶点缓冲区资源及其视图
pub struct VertexBuffer {
    /// 视图引用该资源的 GPU 地址，资源必须与视图一起存活
    _resource: ID3D12Resource,
    view: D3D12_VERTEX_BUFFER_VIEW,
    vertex_count: u32,
}

impl VertexBuffer {
    pub fn new(device: &ID3D12Device, vertices: &[Vertex]) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);

        let heap_props = D3D12_HEAP_PROPERTIES {
            Type: D3D12_HEAP_TYPE_UPLOAD,
            ..Default::default()
        };
        let resource_desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
            Width: bytes.len() as u64,
            Height: 1,
            DepthOrArraySize: 1,
            MipLevels: 1,
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
            ..Default::default()
        };

        unsafe {
            let mut resource: Option<ID3D12Resource> = None;
            device
                .CreateCommittedResource(
                    &heap_props,
                    D3D12_HEAP_FLAG_NONE,
                    &resource_desc,
                    D3D12_RESOURCE_STATE_GENERIC_READ,
                    None,
                    &mut resource,
                )
                .check(GraphicsError::ResourceCreation, "CreateCommittedResource(vertex buffer)")?;
            let resource = resource.ok_or_else(|| {
                GraphicsError::ResourceCreation("CreateCommittedResource returned no resource".to_string())
            })?;

            // CPU 不读取该资源
            let read_range = D3D12_RANGE { Begin: 0, End: 0 };
            let mut data = std::ptr::null_mut();
            resource
                .Map(0, Some(&read_range), Some(&mut data))
                .check(GraphicsError::ResourceCreation, "ID3D12Resource::Map")?;
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), data as *mut u8, bytes.len());
            resource.Unmap(0, None);

            let view = D3D12_VERTEX_BUFFER_VIEW {
                BufferLocation: resource.GetGPUVirtualAddress(),
                StrideInBytes: Vertex::STRIDE,
                SizeInBytes: bytes.len() as u32,
            };
            debug!(
                vertices = vertices.len(),
                size = bytes.len(),
                stride = Vertex::STRIDE,
                "Vertex buffer uploaded"
            );

            Ok(Self {
                _resource: resource,
                view,
                vertex_count: vertices.len() as u32,
            })
        }
    }

    pub fn view(&self) -> &D3D12_VERTEX_BUFFER_VIEW {
        &self.view
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}
