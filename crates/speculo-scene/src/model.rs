//! Renderable models: transform, meshes, and GPU resources.

use std::ops::Range;
use std::path::Path;

use glam::{Mat4, Quat, Vec2, Vec3};

use speculo_core::{Result, SpeculoError};
use speculo_render::engine::RenderEngine;
use speculo_render::mesh::{MaterialUniforms, MeshRenderData, ModelRenderData, Vertex};

/// CPU-side mesh geometry, kept for introspection (the mirror plane
/// constructor reads representative vertex normals from it).
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    /// Normal of the first vertex, if the mesh has any.
    pub fn first_vertex_normal(&self) -> Option<Vec3> {
        self.vertices.first().map(|v| Vec3::from_array(v.normal))
    }
}

/// One drawable part of a model: geometry plus its GPU render data.
pub struct Mesh {
    geometry: MeshGeometry,
    render: MeshRenderData,
}

impl Mesh {
    /// The CPU-side geometry.
    pub fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    /// The GPU render data.
    pub fn render(&self) -> &MeshRenderData {
        &self.render
    }
}

/// A renderable model: a transform and a list of meshes.
///
/// Transform mutations take effect at the next [`Model::update_uniforms`];
/// nothing derived from the transform is cached on the CPU side.
pub struct Model {
    name: String,
    /// World-space translation.
    pub position: Vec3,
    /// World-space rotation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
    meshes: Vec<Mesh>,
    render: ModelRenderData,
}

impl Model {
    /// Builds a model from raw geometry as a single untextured mesh.
    pub fn from_geometry(
        engine: &RenderEngine,
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) -> Self {
        let geometry = MeshGeometry { vertices, indices };
        let render = MeshRenderData::new(
            &engine.device,
            engine.material_bind_group_layout(),
            &geometry.vertices,
            &geometry.indices,
            engine.white_texture_view(),
            engine.default_sampler(),
            MaterialUniforms::default(),
        );

        Self {
            name: name.into(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            meshes: vec![Mesh { geometry, render }],
            render: ModelRenderData::new(&engine.device, engine.model_bind_group_layout()),
        }
    }

    /// Loads a model from a Wavefront OBJ file.
    ///
    /// Missing normals are reconstructed by area-weighted face averaging;
    /// diffuse textures referenced by the material library are loaded, with
    /// a white fallback for untextured meshes.
    pub fn from_obj(engine: &RenderEngine, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();

        let (obj_models, obj_materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
            .map_err(|e| SpeculoError::AssetLoad(format!("{}: {e}", path.display())))?;
        let obj_materials = obj_materials
            .map_err(|e| SpeculoError::AssetLoad(format!("{}: {e}", path.display())))?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut meshes = Vec::with_capacity(obj_models.len());

        for obj in obj_models {
            let mesh = obj.mesh;
            let vertex_count = mesh.positions.len() / 3;

            let mut vertices: Vec<Vertex> = (0..vertex_count)
                .map(|i| Vertex {
                    position: [
                        mesh.positions[3 * i],
                        mesh.positions[3 * i + 1],
                        mesh.positions[3 * i + 2],
                    ],
                    normal: if mesh.normals.is_empty() {
                        [0.0; 3]
                    } else {
                        [
                            mesh.normals[3 * i],
                            mesh.normals[3 * i + 1],
                            mesh.normals[3 * i + 2],
                        ]
                    },
                    uv: if mesh.texcoords.is_empty() {
                        [0.0; 2]
                    } else {
                        [mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1]]
                    },
                })
                .collect();

            if mesh.normals.is_empty() {
                compute_vertex_normals(&mut vertices, &mesh.indices);
            }

            let (texture_view, material) = match mesh.material_id.and_then(|id| obj_materials.get(id))
            {
                Some(mat) => {
                    let view = mat
                        .diffuse_texture
                        .as_ref()
                        .and_then(|tex| load_texture(engine, &base_dir.join(tex)));
                    let base_color = mat
                        .diffuse
                        .map_or([1.0, 1.0, 1.0, 1.0], |d| [d[0], d[1], d[2], 1.0]);
                    let shininess = mat.shininess.unwrap_or(32.0).max(1.0);
                    (
                        view,
                        MaterialUniforms {
                            base_color,
                            params: [0.5, shininess, 0.0, 0.0],
                        },
                    )
                }
                None => (None, MaterialUniforms::default()),
            };

            let geometry = MeshGeometry {
                vertices,
                indices: mesh.indices,
            };
            let render = MeshRenderData::new(
                &engine.device,
                engine.material_bind_group_layout(),
                &geometry.vertices,
                &geometry.indices,
                texture_view.as_ref().unwrap_or_else(|| engine.white_texture_view()),
                engine.default_sampler(),
                material,
            );
            meshes.push(Mesh { geometry, render });
        }

        Ok(Self {
            name,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            meshes,
            render: ModelRenderData::new(&engine.device, engine.model_bind_group_layout()),
        })
    }

    /// A unit quad in the XY plane facing +Z, centered at the origin.
    pub fn plane(engine: &RenderEngine, name: impl Into<String>, size: f32) -> Self {
        let h = size * 0.5;
        let vertices = vec![
            Vertex { position: [-h, -h, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 1.0] },
            Vertex { position: [h, -h, 0.0], normal: [0.0, 0.0, 1.0], uv: [1.0, 1.0] },
            Vertex { position: [h, h, 0.0], normal: [0.0, 0.0, 1.0], uv: [1.0, 0.0] },
            Vertex { position: [-h, h, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 0.0] },
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        Self::from_geometry(engine, name, vertices, indices)
    }

    /// An axis-aligned cube centered at the origin with per-face normals.
    pub fn cube(engine: &RenderEngine, name: impl Into<String>, size: f32) -> Self {
        let h = size * 0.5;
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, tangent, bitangent) in faces {
            let base = vertices.len() as u32;
            let uvs = [Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0)];
            for (corner, uv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
                .into_iter()
                .zip(uvs)
            {
                let pos = (normal + tangent * corner.0 + bitangent * corner.1) * h;
                vertices.push(Vertex {
                    position: pos.to_array(),
                    normal: normal.to_array(),
                    uv: uv.to_array(),
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::from_geometry(engine, name, vertices, indices)
    }

    /// The model's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The meshes of this model.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// The current model matrix.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Composes an axis-angle rotation onto the current rotation.
    pub fn rotate_axis_angle(&mut self, axis: Vec3, degrees: f32) {
        self.rotation = Quat::from_axis_angle(axis.normalize(), degrees.to_radians()) * self.rotation;
    }

    /// Normal of the first vertex of the first mesh, if any geometry exists.
    pub fn first_vertex_normal(&self) -> Option<Vec3> {
        self.meshes
            .first()
            .and_then(|mesh| mesh.geometry.first_vertex_normal())
    }

    /// Rewrites the model/normal matrix uniform from the current transform.
    pub fn update_uniforms(&self, queue: &wgpu::Queue) {
        self.render.update(queue, self.model_matrix());
    }

    /// Records this model's draws for the given instance range.
    ///
    /// Binds the model uniform at slot 1; each mesh binds its material at
    /// slot 3, one slot above the mirror-system resources at slot 2.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: Range<u32>) {
        pass.set_bind_group(1, self.render.bind_group(), &[]);
        for mesh in &self.meshes {
            mesh.render.draw(pass, instances.clone());
        }
    }
}

/// Rebuilds vertex normals by averaging adjacent face normals, weighted by
/// face area (the unnormalized cross product).
fn compute_vertex_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accumulated = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from_array(vertices[a].position);
        let pb = Vec3::from_array(vertices[b].position);
        let pc = Vec3::from_array(vertices[c].position);
        let face = (pb - pa).cross(pc - pa);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    }

    for (vertex, normal) in vertices.iter_mut().zip(accumulated) {
        vertex.normal = normal.normalize_or_zero().to_array();
    }
}

/// Loads a 2D texture from an image file, logging and returning `None` on
/// failure so a missing texture degrades to the white fallback.
fn load_texture(engine: &RenderEngine, path: &Path) -> Option<wgpu::TextureView> {
    let image = match image::open(path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            log::warn!("failed to load texture {}: {e}", path.display());
            return None;
        }
    };

    let (width, height) = image.dimensions();
    let texture = engine.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("model texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    engine.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_vertex_normals_flat_triangle() {
        let mut vertices = vec![
            Vertex { position: [0.0, 0.0, 0.0], normal: [0.0; 3], uv: [0.0; 2] },
            Vertex { position: [1.0, 0.0, 0.0], normal: [0.0; 3], uv: [0.0; 2] },
            Vertex { position: [0.0, 1.0, 0.0], normal: [0.0; 3], uv: [0.0; 2] },
        ];
        compute_vertex_normals(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert!((Vec3::from_array(v.normal) - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_first_vertex_normal_empty_mesh() {
        let geometry = MeshGeometry::default();
        assert!(geometry.first_vertex_normal().is_none());
    }
}
