//! Mesh GPU rendering resources.

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::buffer;

/// Interleaved vertex format shared by every geometry pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// The vertex buffer layout for this format.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// GPU representation of per-model uniforms.
///
/// The normal matrix is the inverse-transpose of the model's upper 3x3,
/// stored as a mat4 for WGSL alignment.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl ModelUniforms {
    /// Builds the uniform pair from a model matrix.
    pub fn from_model_matrix(model: Mat4) -> Self {
        let normal3 = glam::Mat3::from_mat4(model).inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal: Mat4::from_mat3(normal3).to_cols_array_2d(),
        }
    }
}

impl Default for ModelUniforms {
    fn default() -> Self {
        Self::from_model_matrix(Mat4::IDENTITY)
    }
}

/// GPU representation of per-mesh material uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    /// Base color factor, multiplied with the base color texture.
    pub base_color: [f32; 4],
    /// x = specular strength, y = shininess exponent; zw unused.
    pub params: [f32; 4],
}

impl Default for MaterialUniforms {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            params: [0.5, 32.0, 0.0, 0.0],
        }
    }
}

/// Per-model GPU resources: the model/normal matrix uniform and its bind
/// group (bind group slot 1 in every geometry pipeline).
pub struct ModelRenderData {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ModelRenderData {
    /// Creates model render data with an identity transform.
    pub fn new(device: &wgpu::Device, bind_group_layout: &wgpu::BindGroupLayout) -> Self {
        let uniform_buffer =
            buffer::create_uniform_buffer(device, &ModelUniforms::default(), Some("model uniforms"));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("model bind group"),
            layout: bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            uniform_buffer,
            bind_group,
        }
    }

    /// Rewrites the uniform from the current model matrix.
    pub fn update(&self, queue: &wgpu::Queue, model_matrix: Mat4) {
        let uniforms = ModelUniforms::from_model_matrix(model_matrix);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// The bind group for slot 1.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// GPU resources for one drawable mesh: vertex/index buffers plus the
/// material bind group (bind group slot 3, one slot above the mirror-system
/// resources so the two never collide).
pub struct MeshRenderData {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    material_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
}

impl MeshRenderData {
    /// Creates render data from interleaved vertices and triangle indices.
    ///
    /// `base_color_view` is the mesh's base color texture (callers pass a
    /// shared 1x1 white texture when the mesh has none).
    pub fn new(
        device: &wgpu::Device,
        material_layout: &wgpu::BindGroupLayout,
        vertices: &[Vertex],
        indices: &[u32],
        base_color_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        material: MaterialUniforms,
    ) -> Self {
        let vertex_buffer = buffer::create_vertex_buffer(device, vertices, Some("mesh vertices"));
        let index_buffer = buffer::create_index_buffer(device, indices, Some("mesh indices"));
        let material_buffer =
            buffer::create_uniform_buffer(device, &material, Some("material uniforms"));

        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material bind group"),
            layout: material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(base_color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: material_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
            material_buffer,
            material_bind_group,
        }
    }

    /// Rewrites the material uniform.
    pub fn update_material(&self, queue: &wgpu::Queue, material: MaterialUniforms) {
        queue.write_buffer(&self.material_buffer, 0, bytemuck::bytes_of(&material));
    }

    /// Records this mesh's draw into `pass` for the given instance range.
    ///
    /// The caller has already bound camera (0) and model (1) groups; mask
    /// rendering ignores the material group this sets at slot 3.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: std::ops::Range<u32>) {
        pass.set_bind_group(3, &self.material_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.num_indices, 0, instances);
    }

    /// Number of indices in the mesh.
    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }
}

/// Creates the shared 1x1 opaque white fallback texture.
pub fn create_white_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("white texture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &[255, 255, 255, 255],
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_vertex_layout_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().array_stride, 32);
    }

    #[test]
    fn test_model_uniforms_size() {
        // Two mat4 fields, 128 bytes.
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 128);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 32);
    }

    #[test]
    fn test_normal_matrix_corrects_nonuniform_scale() {
        let model = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0));
        let uniforms = ModelUniforms::from_model_matrix(model);
        let normal = Mat4::from_cols_array_2d(&uniforms.normal);
        let n = normal.transform_vector3(Vec3::Z).normalize();
        assert!((n - Vec3::Z).length() < 1e-6);
    }
}
