//! WGSL source of the laser injection kernel.
//!
//! The kernel follows the CPU indexing contract: one workgroup per block of
//! the launch grid, workers split the plane cells of their supercell
//! round-robin. All index vectors are padded to four components; unused
//! extents are 1 and unused offsets 0, so the same source serves 2D and 3D.

/// Entry point name of the injection kernel.
pub const ENTRY_POINT: &str = "laser_kernel";

/// Transverse shape selector written into the uniforms.
pub const TRANSVERSE_UNIFORM: u32 = 0;
/// Gaussian transverse shape.
pub const TRANSVERSE_GAUSSIAN: u32 = 1;

const UNIFORMS: &str = r#"
struct Laser {
    guarding_super_cells: vec4<i32>,
    super_cell: vec4<i32>,
    plane_size: vec4<i32>,
    data_space: vec4<i32>,
    guard: vec4<i32>,
    local_offset: vec4<i32>,
    global_size: vec4<i32>,
    grid_blocks: vec4<i32>,
    time_part: vec4<f32>,
    cell_size: vec4<f32>,
    block_correction: i32,
    cell_offset: i32,
    plane_volume: u32,
    transverse_kind: u32,
    w0: f32,
    dim: u32,
    _pad0: u32,
    _pad1: u32,
}

@group(0) @binding(0) var<storage, read_write> field_e: array<f32>;
@group(0) @binding(1) var<uniform> laser: Laser;
"#;

const HELPERS: &str = r#"
fn map_linear(extent: vec4<i32>, idx: i32) -> vec4<i32> {
    var rest = idx;
    let x = rest % extent.x;
    rest = rest / extent.x;
    let y = rest % extent.y;
    rest = rest / extent.y;
    let z = rest % extent.z;
    return vec4<i32>(x, y, z, 0);
}

fn transverse_factor(cell: vec4<i32>) -> f32 {
    if (laser.transverse_kind == 0u) {
        return 1.0;
    }
    let global_cell = cell + laser.local_offset;
    let dx = (f32(global_cell.x) + 0.5 - 0.5 * f32(laser.global_size.x)) * laser.cell_size.x;
    var r2 = dx * dx;
    if (laser.dim == 3u) {
        let dz = (f32(global_cell.z) + 0.5 - 0.5 * f32(laser.global_size.z)) * laser.cell_size.z;
        r2 = r2 + dz * dz;
    }
    return exp(-r2 / (laser.w0 * laser.w0));
}

fn write_cell(cell: vec4<i32>) {
    let g = cell + laser.guard;
    if (any(g.xyz < vec3<i32>(0)) || any(g.xyz >= laser.data_space.xyz)) {
        return;
    }
    let idx = g.x + laser.data_space.x * (g.y + laser.data_space.y * g.z);
    let base = u32(idx) * 3u;
    let value = laser.time_part.xyz * transverse_factor(cell);
    field_e[base] = value.x;
    field_e[base + 1u] = value.y;
    field_e[base + 2u] = value.z;
}
"#;

/// Full kernel source for `num_workers` workers per workgroup.
pub fn laser_shader(num_workers: u32) -> String {
    let mut source = String::with_capacity(UNIFORMS.len() + HELPERS.len() + 1024);
    source.push_str(&format!("const WORKERS: u32 = {num_workers}u;\n"));
    source.push_str(UNIFORMS);
    source.push_str(HELPERS);
    source.push_str(&format!(
        r#"
@compute @workgroup_size({num_workers})
fn {ENTRY_POINT}(
    @builtin(workgroup_id) block_id: vec3<u32>,
    @builtin(local_invocation_index) worker: u32,
) {{
    let block_idx = vec4<i32>(vec3<i32>(block_id), 0);
    let super_cell_idx = block_idx + laser.guarding_super_cells;
    var local_super_cell = super_cell_idx - laser.guarding_super_cells;
    local_super_cell.y = local_super_cell.y + laser.block_correction;
    let origin = local_super_cell * laser.super_cell;

    let iterations = (laser.plane_volume + WORKERS - 1u) / WORKERS;
    for (var i = 0u; i < iterations; i = i + 1u) {{
        let linear_idx = i * WORKERS + worker;
        if (linear_idx < laser.plane_volume) {{
            var cell = map_linear(laser.plane_size, i32(linear_idx));
            cell.y = cell.y + laser.cell_offset;
            write_cell(origin + cell);
        }}
    }}
}}
"#
    ));
    source
}
