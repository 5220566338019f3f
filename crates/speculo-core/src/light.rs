//! Scene lights and their GPU-visible packing.
//!
//! The light collection lives on the CPU; [`LightManager::to_uniforms`]
//! rewrites the whole uniform block each frame. "Attaching" lights to a
//! shader is done on the render side by binding the block's buffer.

use glam::Vec3;

/// Maximum number of lights packed into the uniform block.
pub const MAX_LIGHTS: usize = 8;

const KIND_POINT: f32 = 0.0;
const KIND_SPOT: f32 = 1.0;

/// An omnidirectional light source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// A cone light source with a smooth falloff between the inner and outer
/// angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    /// Full-intensity cone half-angle, degrees.
    pub inner_angle_deg: f32,
    /// Zero-intensity cone half-angle, degrees.
    pub outer_angle_deg: f32,
}

/// Ordered collection of scene lights.
#[derive(Debug, Clone, Default)]
pub struct LightManager {
    ambient: Vec3,
    points: Vec<PointLight>,
    spots: Vec<SpotLight>,
}

impl LightManager {
    /// Creates an empty collection with a dim default ambient term.
    pub fn new() -> Self {
        Self {
            ambient: Vec3::splat(0.1),
            points: Vec::new(),
            spots: Vec::new(),
        }
    }

    /// Sets the ambient term.
    pub fn set_ambient(&mut self, ambient: Vec3) {
        self.ambient = ambient;
    }

    /// Adds a point light. Lights beyond [`MAX_LIGHTS`] are dropped with a
    /// warning; the uniform block cannot hold them.
    pub fn add_point_light(&mut self, position: Vec3, color: Vec3, intensity: f32) {
        if self.len() >= MAX_LIGHTS {
            log::warn!("light capacity of {MAX_LIGHTS} reached, dropping point light");
            return;
        }
        self.points.push(PointLight {
            position,
            color,
            intensity,
        });
    }

    /// Adds a spot light. Lights beyond [`MAX_LIGHTS`] are dropped with a
    /// warning.
    pub fn add_spot_light(
        &mut self,
        position: Vec3,
        direction: Vec3,
        color: Vec3,
        intensity: f32,
        inner_angle_deg: f32,
        outer_angle_deg: f32,
    ) {
        if self.len() >= MAX_LIGHTS {
            log::warn!("light capacity of {MAX_LIGHTS} reached, dropping spot light");
            return;
        }
        self.spots.push(SpotLight {
            position,
            direction: direction.normalize(),
            color,
            intensity,
            inner_angle_deg,
            outer_angle_deg: outer_angle_deg.max(inner_angle_deg),
        });
    }

    /// Removes all lights. The ambient term is kept.
    pub fn clear(&mut self) {
        self.points.clear();
        self.spots.clear();
    }

    /// Total number of stored lights.
    pub fn len(&self) -> usize {
        self.points.len() + self.spots.len()
    }

    /// Whether no lights are stored.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.spots.is_empty()
    }

    /// Packs the collection into the GPU uniform block.
    pub fn to_uniforms(&self) -> LightBlockUniforms {
        let mut block = LightBlockUniforms {
            ambient: [self.ambient.x, self.ambient.y, self.ambient.z, 1.0],
            ..LightBlockUniforms::default()
        };

        let mut slot = 0;
        for light in &self.points {
            block.lights[slot] = GpuLight {
                position: [light.position.x, light.position.y, light.position.z, 1.0],
                direction: [0.0; 4],
                color: [light.color.x, light.color.y, light.color.z, 1.0],
                params: [light.intensity, 0.0, 0.0, KIND_POINT],
            };
            slot += 1;
        }
        for light in &self.spots {
            block.lights[slot] = GpuLight {
                position: [light.position.x, light.position.y, light.position.z, 1.0],
                direction: [light.direction.x, light.direction.y, light.direction.z, 0.0],
                color: [light.color.x, light.color.y, light.color.z, 1.0],
                params: [
                    light.intensity,
                    light.inner_angle_deg.to_radians().cos(),
                    light.outer_angle_deg.to_radians().cos(),
                    KIND_SPOT,
                ],
            };
            slot += 1;
        }

        block.light_count = slot as u32;
        block
    }
}

/// GPU representation of a single light (64-byte stride).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub color: [f32; 4],
    /// intensity, cos(inner), cos(outer), kind (0 = point, 1 = spot).
    pub params: [f32; 4],
}

impl Default for GpuLight {
    fn default() -> Self {
        Self {
            position: [0.0; 4],
            direction: [0.0, -1.0, 0.0, 0.0],
            color: [0.0; 4],
            params: [0.0; 4],
        }
    }
}

/// GPU representation of the whole light block.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightBlockUniforms {
    pub ambient: [f32; 4],
    pub light_count: u32,
    pub _padding: [u32; 3],
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl Default for LightBlockUniforms {
    fn default() -> Self {
        Self {
            ambient: [0.1, 0.1, 0.1, 1.0],
            light_count: 0,
            _padding: [0; 3],
            lights: [GpuLight::default(); MAX_LIGHTS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_block_size() {
        // Uniform address space requires a 16-byte multiple and a 64-byte
        // array stride.
        assert_eq!(std::mem::size_of::<GpuLight>(), 64);
        assert_eq!(
            std::mem::size_of::<LightBlockUniforms>(),
            16 + 16 + 64 * MAX_LIGHTS
        );
    }

    #[test]
    fn test_packing_order_and_count() {
        let mut lights = LightManager::new();
        lights.add_point_light(Vec3::X, Vec3::ONE, 2.0);
        lights.add_spot_light(Vec3::Y, Vec3::NEG_Y, Vec3::ONE, 1.0, 10.0, 20.0);

        let block = lights.to_uniforms();
        assert_eq!(block.light_count, 2);
        assert_eq!(block.lights[0].params[3], KIND_POINT);
        assert_eq!(block.lights[1].params[3], KIND_SPOT);
        assert!(block.lights[1].params[1] > block.lights[1].params[2]);
    }

    #[test]
    fn test_capacity_drops_extra_lights() {
        let mut lights = LightManager::new();
        for i in 0..MAX_LIGHTS + 3 {
            lights.add_point_light(Vec3::splat(i as f32), Vec3::ONE, 1.0);
        }
        assert_eq!(lights.len(), MAX_LIGHTS);
        assert_eq!(lights.to_uniforms().light_count, MAX_LIGHTS as u32);
    }

    #[test]
    fn test_spot_direction_normalized() {
        let mut lights = LightManager::new();
        lights.add_spot_light(Vec3::ZERO, Vec3::new(0.0, -3.0, 0.0), Vec3::ONE, 1.0, 5.0, 15.0);
        let block = lights.to_uniforms();
        let d = block.lights[0].direction;
        let len = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-6);
    }
}
