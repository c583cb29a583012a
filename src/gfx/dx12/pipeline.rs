//! 根签名、着色器与管线状态对象
//!
//! 根签名为空（不绑定任何资源），只允许输入装配器的输入布局。
//! 着色器源码随程序嵌入，运行时通过 D3DCompile 编译为 SM 5.0 字节码。

use std::ffi::CStr;

use tracing::debug;
use windows::core::{s, PCSTR};
use windows::Win32::Graphics::Direct3D::Fxc::*;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use super::swapchain::BACK_BUFFER_FORMAT;
use super::CheckHresult;
use crate::core::error::{GraphicsError, Result};
use crate::renderer::vertex::{AttributeFormat, Vertex};

const TRIANGLE_HLSL: &str = include_str!("shaders/triangle.hlsl");

/// 固定的单一绘制配置
pub struct Pipeline {
    pub root_signature: ID3D12RootSignature,
    pub pipeline_state: ID3D12PipelineState,
}

impl Pipeline {
    pub fn new(device: &ID3D12Device) -> Result<Self> {
        let root_signature = create_root_signature(device)?;

        let vertex_shader = compile_shader(TRIANGLE_HLSL, c"VSMain", c"vs_5_0")?;
        let pixel_shader = compile_shader(TRIANGLE_HLSL, c"PSMain", c"ps_5_0")?;
        debug!(
            vs_bytes = unsafe { vertex_shader.GetBufferSize() },
            ps_bytes = unsafe { pixel_shader.GetBufferSize() },
            "Shaders compiled"
        );

        let pipeline_state =
            create_pipeline_state(device, &root_signature, &vertex_shader, &pixel_shader)?;
        debug!("Pipeline state created");

        Ok(Self {
            root_signature,
            pipeline_state,
        })
    }
}

fn create_root_signature(device: &ID3D12Device) -> Result<ID3D12RootSignature> {
    let desc = D3D12_ROOT_SIGNATURE_DESC {
        Flags: D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        ..Default::default()
    };

    unsafe {
        let mut signature: Option<ID3DBlob> = None;
        let mut error: Option<ID3DBlob> = None;
        if let Err(e) = D3D12SerializeRootSignature(
            &desc,
            D3D_ROOT_SIGNATURE_VERSION_1,
            &mut signature,
            Some(&mut error),
        ) {
            let details = error.as_ref().map(|error| blob_text(error)).unwrap_or_default();
            return Err(GraphicsError::PipelineCreation(format!(
                "D3D12SerializeRootSignature failed: {} {}",
                e, details
            ))
            .into());
        }
        let signature = signature.ok_or_else(|| {
            GraphicsError::PipelineCreation("D3D12SerializeRootSignature returned no blob".to_string())
        })?;

        device
            .CreateRootSignature(0, blob_bytes(&signature))
            .check(GraphicsError::PipelineCreation, "CreateRootSignature")
    }
}

fn compile_shader(source: &str, entry: &'static CStr, target: &'static CStr) -> Result<ID3DBlob> {
    let flags = if cfg!(debug_assertions) {
        D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION
    } else {
        0
    };

    unsafe {
        let mut code: Option<ID3DBlob> = None;
        let mut error: Option<ID3DBlob> = None;
        let result = D3DCompile(
            source.as_ptr() as _,
            source.len(),
            s!("triangle.hlsl"),
            None,
            None,
            pcstr(entry),
            pcstr(target),
            flags,
            0,
            &mut code,
            Some(&mut error),
        );

        let entry = entry.to_string_lossy();
        if let Err(e) = result {
            let message = match error.as_ref() {
                Some(error) => blob_text(error),
                None => e.to_string(),
            };
            return Err(GraphicsError::ShaderCompilation(format!("{}: {}", entry, message)).into());
        }

        code.ok_or_else(|| {
            GraphicsError::ShaderCompilation(format!("{}: compiler returned no bytecode", entry)).into()
        })
    }
}

fn create_pipeline_state(
    device: &ID3D12Device,
    root_signature: &ID3D12RootSignature,
    vertex_shader: &ID3DBlob,
    pixel_shader: &ID3DBlob,
) -> Result<ID3D12PipelineState> {
    let input_element_descs: Vec<D3D12_INPUT_ELEMENT_DESC> = Vertex::ATTRIBUTES
        .iter()
        .map(|attribute| {
            debug!(
                semantic = %attribute.semantic.to_string_lossy(),
                offset = attribute.offset,
                size = attribute.format.size(),
                "Input element"
            );
            D3D12_INPUT_ELEMENT_DESC {
                SemanticName: pcstr(attribute.semantic),
                SemanticIndex: 0,
                Format: dxgi_format(attribute.format),
                InputSlot: 0,
                AlignedByteOffset: attribute.offset,
                InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            }
        })
        .collect();

    unsafe {
        let mut pso_desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
            InputLayout: D3D12_INPUT_LAYOUT_DESC {
                pInputElementDescs: input_element_descs.as_ptr(),
                NumElements: input_element_descs.len() as u32,
            },
            // 借用根签名，不增加引用计数
            pRootSignature: std::mem::transmute_copy(root_signature),
            VS: shader_bytecode(vertex_shader),
            PS: shader_bytecode(pixel_shader),
            RasterizerState: default_rasterizer_state(),
            BlendState: default_blend_state(),
            DepthStencilState: D3D12_DEPTH_STENCIL_DESC {
                DepthEnable: false.into(),
                StencilEnable: false.into(),
                ..Default::default()
            },
            SampleMask: u32::MAX,
            PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
            NumRenderTargets: 1,
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            ..Default::default()
        };
        pso_desc.RTVFormats[0] = BACK_BUFFER_FORMAT;

        device
            .CreateGraphicsPipelineState(&pso_desc)
            .check(GraphicsError::PipelineCreation, "CreateGraphicsPipelineState")
    }
}

/// 等价于 `CD3DX12_RASTERIZER_DESC(D3D12_DEFAULT)`
fn default_rasterizer_state() -> D3D12_RASTERIZER_DESC {
    D3D12_RASTERIZER_DESC {
        FillMode: D3D12_FILL_MODE_SOLID,
        CullMode: D3D12_CULL_MODE_BACK,
        FrontCounterClockwise: false.into(),
        DepthBias: 0,
        DepthBiasClamp: 0.0,
        SlopeScaledDepthBias: 0.0,
        DepthClipEnable: true.into(),
        MultisampleEnable: false.into(),
        AntialiasedLineEnable: false.into(),
        ForcedSampleCount: 0,
        ConservativeRaster: D3D12_CONSERVATIVE_RASTERIZATION_MODE_OFF,
    }
}

/// 等价于 `CD3DX12_BLEND_DESC(D3D12_DEFAULT)`
fn default_blend_state() -> D3D12_BLEND_DESC {
    let render_target = D3D12_RENDER_TARGET_BLEND_DESC {
        BlendEnable: false.into(),
        LogicOpEnable: false.into(),
        SrcBlend: D3D12_BLEND_ONE,
        DestBlend: D3D12_BLEND_ZERO,
        BlendOp: D3D12_BLEND_OP_ADD,
        SrcBlendAlpha: D3D12_BLEND_ONE,
        DestBlendAlpha: D3D12_BLEND_ZERO,
        BlendOpAlpha: D3D12_BLEND_OP_ADD,
        LogicOp: D3D12_LOGIC_OP_NOOP,
        RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
    };

    D3D12_BLEND_DESC {
        AlphaToCoverageEnable: false.into(),
        IndependentBlendEnable: false.into(),
        RenderTarget: [render_target; 8],
    }
}

fn dxgi_format(format: AttributeFormat) -> DXGI_FORMAT {
    match format {
        AttributeFormat::Float32x3 => DXGI_FORMAT_R32G32B32_FLOAT,
    }
}

fn pcstr(value: &'static CStr) -> PCSTR {
    PCSTR::from_raw(value.as_ptr().cast())
}

unsafe fn shader_bytecode(blob: &ID3DBlob) -> D3D12_SHADER_BYTECODE {
    D3D12_SHADER_BYTECODE {
        pShaderBytecode: blob.GetBufferPointer(),
        BytecodeLength: blob.GetBufferSize(),
    }
}

unsafe fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize())
}

unsafe fn blob_text(blob: &ID3DBlob) -> String {
    String::from_utf8_lossy(blob_bytes(blob))
        .trim_end_matches('\0')
        .trim()
        .to_string()
}
