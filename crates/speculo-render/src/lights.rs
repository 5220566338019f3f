//! GPU-side light block.

use speculo_core::light::{LightBlockUniforms, LightManager};

use crate::buffer;

/// The uniform buffer and bind group carrying the scene light block.
///
/// One instance is shared by every shading pipeline; "attaching" lights to a
/// shader means binding [`LightsBuffer::bind_group`] at the pipeline's light
/// slot.
pub struct LightsBuffer {
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl LightsBuffer {
    /// Creates the light block with no lights.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = buffer::create_uniform_buffer(
            device,
            &LightBlockUniforms::default(),
            Some("light block"),
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("light bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("light bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Rewrites the whole block from the CPU light collection.
    pub fn update(&self, queue: &wgpu::Queue, lights: &LightManager) {
        let block = lights.to_uniforms();
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&block));
    }

    /// The light buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// The bind group layout shared by shading pipelines.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// The bind group to bind at a pipeline's light slot.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
