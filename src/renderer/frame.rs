//! 帧相关的常量与计算
//!
//! 视口、裁剪矩形、RTV 描述符地址和呈现间隔都只依赖于表面尺寸和配置，
//! 这里用与后端无关的类型表示，DX12 后端再转换成原生结构体。

/// 交换链后备缓冲区数量
pub const FRAME_COUNT: u32 = 2;

/// 视口
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// 覆盖整个表面的视口，深度范围 [0, 1]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 裁剪矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScissorRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: i32::try_from(width).unwrap_or(i32::MAX),
            bottom: i32::try_from(height).unwrap_or(i32::MAX),
        }
    }
}

/// 描述符堆中第 `index` 个描述符的 CPU 地址
pub fn descriptor_address(heap_start: usize, index: u32, increment: u32) -> usize {
    heap_start + index as usize * increment as usize
}

/// Present 的同步间隔：开启垂直同步时等待一次垂直消隐
pub fn sync_interval(vsync: bool) -> u32 {
    if vsync { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_viewport() {
        let viewport = Viewport::full(800, 600);
        assert_eq!(viewport.width, 800.0);
        assert_eq!(viewport.height, 600.0);
        assert_eq!((viewport.x, viewport.y), (0.0, 0.0));
        assert_eq!((viewport.min_depth, viewport.max_depth), (0.0, 1.0));
    }

    #[test]
    fn test_full_scissor() {
        let rect = ScissorRect::full(800, 600);
        assert_eq!(rect, ScissorRect { left: 0, top: 0, right: 800, bottom: 600 });

        let clamped = ScissorRect::full(u32::MAX, 1);
        assert_eq!(clamped.right, i32::MAX);
    }

    #[test]
    fn test_descriptor_address() {
        assert_eq!(descriptor_address(0x1000, 0, 32), 0x1000);
        assert_eq!(descriptor_address(0x1000, 1, 32), 0x1020);
        assert_eq!(descriptor_address(0x1000, FRAME_COUNT - 1, 64), 0x1040);
    }

    #[test]
    fn test_sync_interval() {
        assert_eq!(sync_interval(true), 1);
        assert_eq!(sync_interval(false), 0);
    }
}
