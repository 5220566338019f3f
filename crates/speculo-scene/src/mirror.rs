//! Mirror plane entities and the reflection manager.

use glam::Vec3;

use speculo_core::mirror::{
    world_normal, MirrorMaterial, MirrorPlaneUniforms, PlaneList, MAX_MIRROR_PLANES,
};
use speculo_core::{LightManager, MirrorConfig, Result, SpeculoError};
use speculo_render::engine::RenderEngine;
use speculo_render::mirror_pass::MirrorPassResources;
use speculo_render::skybox::Skybox;

use crate::model::Model;

/// A renderable mirror surface.
///
/// Couples a model with the base surface normal in object space and the
/// mirror material. The world-space normal is derived on demand from the
/// model's current transform; it is never cached, so transform mutations
/// are picked up immediately.
pub struct MirrorPlane {
    model: Model,
    base_normal: Vec3,
    material: MirrorMaterial,
}

impl MirrorPlane {
    /// Creates a plane with an explicit object-space surface normal.
    pub fn new(model: Model, normal: Vec3, material: MirrorMaterial) -> Self {
        Self {
            model,
            base_normal: normal.normalize(),
            material,
        }
    }

    /// Creates a plane, inferring the surface normal from the first vertex
    /// of the model's first mesh.
    ///
    /// A model without geometry cannot supply a normal; that is a
    /// [`SpeculoError::NoGeometry`] error rather than a degraded entity.
    pub fn from_model(model: Model, material: MirrorMaterial) -> Result<Self> {
        match model.first_vertex_normal() {
            Some(normal) if normal.length_squared() > 0.0 => {
                Ok(Self::new(model, normal, material))
            }
            _ => {
                log::error!(
                    "mirror plane '{}' has no vertices to infer a normal from",
                    model.name()
                );
                Err(SpeculoError::NoGeometry(model.name().to_string()))
            }
        }
    }

    /// The current world-space surface normal (unit length), derived via
    /// the inverse-transpose normal matrix.
    pub fn world_normal(&self) -> Vec3 {
        world_normal(self.model.model_matrix(), self.base_normal)
    }

    /// The object-space base normal.
    pub fn base_normal(&self) -> Vec3 {
        self.base_normal
    }

    /// The mirror material.
    pub fn material(&self) -> &MirrorMaterial {
        &self.material
    }

    /// Mutable access to the mirror material.
    pub fn material_mut(&mut self) -> &mut MirrorMaterial {
        &mut self.material
    }

    /// The underlying model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Mutable access to the underlying model (transform edits).
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// Builds this plane's GPU parameter record from current state.
    pub fn record(&self) -> MirrorPlaneUniforms {
        MirrorPlaneUniforms::compose(self.model.position, self.world_normal(), &self.material)
    }

    /// Records the plane's geometry draws for the given instance range.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: std::ops::Range<u32>) {
        self.model.draw(pass, instances);
    }
}

/// Owner of the mirror planes and the two-pass reflection algorithm.
///
/// The plane's position in the internal [`PlaneList`] is simultaneously its
/// mask ID and its record's slot in the GPU parameter buffer. All GPU
/// resources are created once in [`MirrorManager::new`] and live for the
/// manager's lifetime; `generate_reflection` allocates nothing.
pub struct MirrorManager {
    planes: PlaneList<MirrorPlane>,
    resources: MirrorPassResources,
}

impl MirrorManager {
    /// Creates the manager and all of its GPU resources.
    pub fn new(engine: &RenderEngine, config: MirrorConfig) -> Self {
        let resources = MirrorPassResources::new(
            &engine.device,
            &engine.queue,
            config,
            engine.camera_bind_group_layout(),
            engine.model_bind_group_layout(),
            engine.material_bind_group_layout(),
            &engine.lights,
            engine.surface_config.format,
        );

        Self {
            planes: PlaneList::new(MAX_MIRROR_PLANES),
            resources,
        }
    }

    /// Appends a plane, assigning the next ID.
    ///
    /// Unlike the reference behavior of silently ignoring planes past the
    /// capacity, exhaustion is reported as
    /// [`SpeculoError::CapacityExceeded`]; the stored count never exceeds
    /// [`MAX_MIRROR_PLANES`] either way.
    pub fn add_plane(&mut self, plane: MirrorPlane) -> Result<usize> {
        self.planes.push(plane).map_err(|_| {
            SpeculoError::CapacityExceeded {
                capacity: self.planes.capacity(),
            }
        })
    }

    /// Removes and returns the plane at `index`; out-of-range is a no-op.
    /// Later planes shift down, keeping IDs dense.
    pub fn remove_plane(&mut self, index: usize) -> Option<MirrorPlane> {
        self.planes.remove(index)
    }

    /// Removes all planes. GPU resources are retained for reuse.
    pub fn clear(&mut self) {
        self.planes.clear();
    }

    /// Number of active planes.
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// Whether no planes are active.
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Plane at `index`.
    pub fn get(&self, index: usize) -> Option<&MirrorPlane> {
        self.planes.get(index)
    }

    /// Mutable plane at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut MirrorPlane> {
        self.planes.get_mut(index)
    }

    /// Iterates planes in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &MirrorPlane> {
        self.planes.iter()
    }

    /// Attaches an environment cubemap as the reflection fallback sampled
    /// by the composite.
    pub fn set_environment(&mut self, engine: &RenderEngine, skybox: &Skybox) {
        self.resources
            .set_environment(&engine.device, skybox.view(), skybox.sampler());
    }

    /// Builds the parameter records for all planes, in ID order.
    pub fn records(&self) -> Vec<MirrorPlaneUniforms> {
        self.planes.iter().map(MirrorPlane::record).collect()
    }

    /// Runs the two-pass reflection algorithm for this frame.
    ///
    /// Encodes, in order: the mask pass (one instanced draw per plane, the
    /// instance index doubling as the mask ID), the wholesale upload of the
    /// parameter records and plane count, the reflection pass (every scene
    /// model drawn once, instanced over the active planes), and one mip
    /// generation over the reflection target. With zero planes this clears
    /// the targets and uploads a zero count without drawing anything.
    ///
    /// Every pass carries its own attachments and ends before return, so no
    /// binding or blend state leaks to the caller's subsequent passes.
    pub fn generate_reflection(
        &mut self,
        engine: &RenderEngine,
        encoder: &mut wgpu::CommandEncoder,
        lights: &LightManager,
        scene_models: &[Model],
    ) {
        engine.lights.update(&engine.queue, lights);
        for plane in self.planes.iter() {
            plane.model().update_uniforms(&engine.queue);
        }

        let plane_count = self.planes.len() as u32;

        // Pass 1: plane-ownership mask.
        {
            let mut pass = self.resources.begin_mask_pass(encoder);
            pass.set_pipeline(self.resources.mask_pipeline());
            pass.set_bind_group(0, engine.camera_bind_group(), &[]);
            for (index, plane) in self.planes.iter().enumerate() {
                let id = index as u32;
                plane.draw(&mut pass, id..id + 1);
            }
        }

        // Parameter upload: always the whole active prefix, in mask-ID
        // order.
        self.resources.upload_records(&engine.queue, &self.records());

        // Pass 2: reflected scene, attributed per pixel via the mask.
        {
            let mut pass = self.resources.begin_reflection_pass(encoder);
            pass.set_pipeline(self.resources.reflect_pipeline());
            pass.set_bind_group(0, engine.camera_bind_group(), &[]);
            pass.set_bind_group(2, self.resources.reflect_bind_group(), &[]);
            for model in scene_models {
                model.draw(&mut pass, 0..plane_count);
            }
        }

        // Blur chain for the composite's blur_level sampling; exactly once,
        // after all scene draws.
        self.resources.generate_mipmaps(encoder);
    }

    /// Draws the mirror surfaces into the caller's pass.
    ///
    /// Binds the composite resources (reflection chain, parameter buffer,
    /// lights, environment) at slot 2 and draws each plane with its ID as
    /// the instance index; the planes' own materials bind one slot higher.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(self.resources.composite_pipeline());
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(2, self.resources.composite_bind_group(), &[]);
        for (index, plane) in self.planes.iter().enumerate() {
            let id = index as u32;
            plane.draw(pass, id..id + 1);
        }
    }

    /// The mask target view (debug display).
    pub fn mask_view(&self) -> &wgpu::TextureView {
        self.resources.mask_view()
    }

    /// The reflection target view (debug display).
    pub fn reflect_view(&self) -> &wgpu::TextureView {
        self.resources.reflect_view()
    }

    /// The underlying GPU resources.
    pub fn resources(&self) -> &MirrorPassResources {
        &self.resources
    }
}
