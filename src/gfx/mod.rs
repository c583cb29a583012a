//! 图形后端模块
//!
//! 目前只有 DirectX 12 一个后端，仅在 Windows 平台可用。

#[cfg(target_os = "windows")]
pub mod dx12;
