//! WebGPU dispatch of the laser injection kernel.
//!
//! [`GpuLaserInjector`] compiles the injection kernel for one launch
//! geometry and runs it once per step: the field is uploaded, one workgroup
//! is dispatched per block and the field is read back before `inject`
//! returns.

mod shader;

pub use shader::{laser_shader, ENTRY_POINT};

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use log::{info, trace};

use crate::fields::FieldE;
use crate::grid::DataSpace;
use crate::kernel::MAX_WORKERS;
use crate::laser::{LaserDefinition, PlaneGeometry, Transverse};
use crate::{Error, Float3, Result};

/// Uniform block of the injection kernel.
///
/// Must match `struct Laser` in the WGSL source.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct LaserUniforms {
    guarding_super_cells: [i32; 4],
    super_cell: [i32; 4],
    plane_size: [i32; 4],
    data_space: [i32; 4],
    guard: [i32; 4],
    local_offset: [i32; 4],
    global_size: [i32; 4],
    grid_blocks: [i32; 4],
    time_part: [f32; 4],
    cell_size: [f32; 4],
    block_correction: i32,
    cell_offset: i32,
    plane_volume: u32,
    transverse_kind: u32,
    w0: f32,
    dim: u32,
    _pad: [u32; 2],
}

/// Pad a `D`-component vector to four components with `fill`.
fn pad4<const D: usize>(v: DataSpace<D>, fill: i32) -> [i32; 4] {
    let mut out = [fill; 4];
    out[..D].copy_from_slice(&v.0);
    out
}

impl LaserUniforms {
    fn new<const D: usize>(definition: &LaserDefinition<D>, geometry: &PlaneGeometry<D>) -> Self {
        let layout = geometry.layout();
        let mapping = geometry.mapping();
        let plane = geometry.plane();
        let [tx, ty, tz] = definition.time_part();
        let cs = definition.cell_size();
        let (transverse_kind, w0) = match definition.transverse() {
            Transverse::Uniform => (shader::TRANSVERSE_UNIFORM, 1.0),
            Transverse::Gaussian { w0 } => (shader::TRANSVERSE_GAUSSIAN, w0 as f32),
        };
        Self {
            guarding_super_cells: pad4(mapping.guarding_super_cells(), 0),
            super_cell: pad4(geometry.super_cell().extent(), 1),
            plane_size: pad4(plane.size(), 1),
            data_space: pad4(layout.data_space(), 1),
            guard: pad4(layout.guard(), 0),
            local_offset: pad4(definition.local_offset(), 0),
            global_size: pad4(definition.global_size(), 1),
            grid_blocks: pad4(geometry.grid_blocks(), 1),
            time_part: [tx, ty, tz, 0.0],
            cell_size: [cs[0] as f32, cs[1] as f32, cs[2] as f32, 0.0],
            block_correction: geometry.block_offset_correction() as i32,
            cell_offset: geometry.cell_offset_in_super_cell() as i32,
            plane_volume: plane.volume(),
            transverse_kind,
            w0,
            dim: D as u32,
            _pad: [0; 2],
        }
    }
}

/// Laser injection on a WebGPU device.
pub struct GpuLaserInjector {
    instance: wgpu::Instance,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    field_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    field_len: usize,
    num_workers: u32,
    dispatch: [u32; 3],
}

impl std::fmt::Debug for GpuLaserInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuLaserInjector")
            .field("field_len", &self.field_len)
            .field("num_workers", &self.num_workers)
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}

fn adapter_options() -> wgpu::RequestAdapterOptions<'static, 'static> {
    wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }
}

impl GpuLaserInjector {
    /// Check if a WebGPU adapter is available on this system.
    pub fn is_available() -> bool {
        let instance = wgpu::Instance::default();
        pollster::block_on(instance.request_adapter(&adapter_options())).is_ok()
    }

    /// Compile the injection kernel for `geometry`.
    ///
    /// The workgroup size is `min(plane volume, 256)`.
    pub fn new<const D: usize>(geometry: &PlaneGeometry<D>) -> Result<Self> {
        let num_workers = geometry.plane().volume().clamp(1, MAX_WORKERS);
        let field_len = geometry.layout().data_space().product() as usize;
        let blocks = pad4(geometry.grid_blocks(), 1);
        let dispatch = [blocks[0] as u32, blocks[1] as u32, blocks[2] as u32];

        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&adapter_options()))
            .map_err(|e| Error::Gpu(format!("no suitable adapter: {e}")))?;
        let limits = adapter.limits();
        if num_workers > limits.max_compute_invocations_per_workgroup {
            return Err(Error::Gpu(format!(
                "{num_workers} workers exceed the adapter limit of {}",
                limits.max_compute_invocations_per_workgroup
            )));
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Laser Device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        }))
        .map_err(|e| Error::Gpu(format!("failed to create device: {e}")))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Laser Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(laser_shader(num_workers))),
        });

        let field_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("E Field Buffer"),
            size: (field_len * std::mem::size_of::<Float3>()) as u64,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Laser Uniforms"),
            size: std::mem::size_of::<LaserUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Laser Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Laser Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: field_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Laser Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            ..Default::default()
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Laser Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(ENTRY_POINT),
            compilation_options: Default::default(),
            cache: None,
        });

        info!(
            "GPU laser injector: {} workgroups of {num_workers} workers on {}",
            dispatch.iter().product::<u32>(),
            adapter.get_info().name
        );

        Ok(Self {
            instance,
            device,
            queue,
            pipeline,
            bind_group,
            field_buffer,
            uniform_buffer,
            field_len,
            num_workers,
            dispatch,
        })
    }

    /// Workers per workgroup.
    pub fn num_workers(&self) -> u32 {
        self.num_workers
    }

    /// Write `definition` into the injection plane of `field`.
    pub fn inject<const D: usize>(
        &self,
        field: &mut FieldE<D>,
        definition: &LaserDefinition<D>,
        geometry: &PlaneGeometry<D>,
    ) -> Result<()> {
        if field.len() != self.field_len {
            return Err(Error::Gpu(format!(
                "field has {} cells, injector was built for {}",
                field.len(),
                self.field_len
            )));
        }

        let uniforms = LaserUniforms::new(definition, geometry);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.queue
            .write_buffer(&self.field_buffer, 0, bytemuck::cast_slice(field.as_slice()));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Laser Encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Laser Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            let [x, y, z] = self.dispatch;
            pass.dispatch_workgroups(x, y, z);
        }
        self.queue.submit(Some(encoder.finish()));
        trace!("GPU laser launch at step {}", definition.step());

        self.read_field(field)
    }

    fn read_field<const D: usize>(&self, field: &mut FieldE<D>) -> Result<()> {
        let size = self.field_buffer.size();
        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Staging Buffer"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Read Encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.field_buffer, 0, &staging_buffer, 0, size);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging_buffer.slice(..);
        let (sender, receiver) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |v| {
            // receiver outlives the poll below
            let _ = sender.send(v);
        });

        self.instance.poll_all(true);
        pollster::block_on(receiver)
            .map_err(|_| Error::Gpu("buffer mapping was cancelled".into()))?
            .map_err(|e| Error::Gpu(format!("failed to map staging buffer: {e}")))?;

        {
            let data = slice.get_mapped_range();
            let cells: &[Float3] = bytemuck::cast_slice(&data);
            field.as_mut_slice().copy_from_slice(cells);
        }
        staging_buffer.unmap();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridLayout, SubGrid, SuperCellSize};
    use crate::laser::{LaserPlane, LaserProfile, PlaneWave};
    use crate::params::GridParams;

    #[test]
    fn test_uniform_size_matches_wgsl() {
        // 10 vec4 + 2 x 16 bytes of scalars
        assert_eq!(std::mem::size_of::<LaserUniforms>(), 192);
    }

    #[test]
    fn test_uniforms_pad_2d() {
        let sc = SuperCellSize::new([4, 8]).unwrap();
        let layout =
            GridLayout::new(DataSpace::new([16, 32]), DataSpace::new([4, 8]), sc).unwrap();
        let geometry = PlaneGeometry::new(layout, LaserPlane::new(sc, 2).unwrap(), 10).unwrap();
        let profile = LaserProfile::PlaneWave(PlaneWave::new(1.0, 1.0, 1.0));
        let params = GridParams::new([1.0; 3], 0.5).with_speed_of_light(1.0);
        let def = LaserDefinition::new(3, &profile, &params, &SubGrid::single(layout.data_space_without_guarding()));
        let u = LaserUniforms::new(&def, &geometry);

        assert_eq!(u.super_cell, [4, 8, 1, 1]);
        assert_eq!(u.plane_size, [4, 2, 1, 1]);
        assert_eq!(u.guarding_super_cells, [1, 1, 0, 0]);
        assert_eq!(u.data_space, [24, 48, 1, 1]);
        assert_eq!(u.grid_blocks, [4, 1, 1, 1]);
        assert_eq!(u.block_correction, 1);
        assert_eq!(u.cell_offset, 2);
        assert_eq!(u.plane_volume, 8);
        assert_eq!(u.transverse_kind, shader::TRANSVERSE_UNIFORM);
        assert_eq!(u.dim, 2);
    }
}
