/// Build script for hello_triangle12
///
/// # Shader Compilation Strategy:
/// - DX12: HLSL source is embedded with `include_str!` and compiled at runtime via D3DCompile
fn main() {
    // Trigger rebuild if shader files change
    println!("cargo:rerun-if-changed=src/gfx/dx12/shaders/triangle.hlsl");
}
