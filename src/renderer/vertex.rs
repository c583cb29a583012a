//! 顶点数据定义
//!
//! 三角形使用的顶点结构体、静态顶点数据以及与后端无关的输入布局描述。
//!
//! # 设计说明
//!
//! - 使用 `#[repr(C)]` 确保内存布局与 HLSL 输入布局一致
//! - 实现 `Pod` 和 `Zeroable` trait 以支持直接拷贝到上传堆

use std::ffi::CStr;

use bytemuck::{Pod, Zeroable};

/// 顶点结构体
///
/// # 内存布局
///
/// - `position`：偏移 0，3 个 f32
/// - `color`：偏移 12，3 个 f32
///
/// 总大小：24 字节
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// 顶点位置（裁剪空间）
    pub position: [f32; 3],
    /// 顶点颜色（RGB，范围 0.0-1.0）
    pub color: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }

    /// 顶点步长（字节）
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    /// 输入布局，对应着色器中的 `POSITION` 和 `COLOR` 语义
    pub const ATTRIBUTES: [VertexAttribute; 2] = [
        VertexAttribute {
            semantic: c"POSITION",
            format: AttributeFormat::Float32x3,
            offset: std::mem::offset_of!(Vertex, position) as u32,
        },
        VertexAttribute {
            semantic: c"COLOR",
            format: AttributeFormat::Float32x3,
            offset: std::mem::offset_of!(Vertex, color) as u32,
        },
    ];
}

/// 顶点属性格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    /// 3 个 32 位浮点数
    Float32x3,
}

impl AttributeFormat {
    /// 属性占用的字节数
    pub const fn size(&self) -> u32 {
        match self {
            AttributeFormat::Float32x3 => 12,
        }
    }
}

/// 单个顶点属性的描述
///
/// 语义名以 C 字符串保存，后端可以直接把指针交给图形 API。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: &'static CStr,
    pub format: AttributeFormat,
    pub offset: u32,
}

/// 静态三角形：顶部红色、右下绿色、左下蓝色
pub const TRIANGLE: [Vertex; 3] = [
    Vertex::new([0.0, 0.5, 0.0], [1.0, 0.0, 0.0]),
    Vertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0]),
    Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(Vertex::STRIDE, 24);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&TRIANGLE).len(), 72);
    }

    #[test]
    fn test_attributes_cover_vertex() {
        let [position, color] = Vertex::ATTRIBUTES;
        assert_eq!(position.semantic.to_str().unwrap(), "POSITION");
        assert_eq!(position.offset, 0);
        assert_eq!(color.semantic.to_str().unwrap(), "COLOR");
        assert_eq!(color.offset, 12);

        let end = color.offset + color.format.size();
        assert_eq!(end, Vertex::STRIDE);
    }

    #[test]
    fn test_triangle_colors() {
        assert_eq!(TRIANGLE[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(TRIANGLE[1].color, [0.0, 1.0, 0.0]);
        assert_eq!(TRIANGLE[2].color, [0.0, 0.0, 1.0]);
        assert!(TRIANGLE.iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn test_triangle_is_clockwise() {
        // D3D12 默认以顺时针为正面
        let [a, b, c] = TRIANGLE.map(|v| v.position);
        let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        assert!(cross < 0.0);
    }
}
