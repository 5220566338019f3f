//! Mirror-plane data: materials, the GPU parameter record, and the ordered
//! plane container.
//!
//! A mirror plane's position in the container is load-bearing: it is the ID
//! written into the mask target during the mask pass *and* the slot of the
//! plane's record in the GPU parameter buffer. [`PlaneList`] is the single
//! owner of that coupling; nothing else in the workspace recomputes it.

use glam::{Mat3, Mat4, Vec3};

/// Maximum number of mirror planes supported per manager.
///
/// The GPU parameter buffer is allocated once at this capacity; only the
/// active prefix is meaningful each frame.
pub const MAX_MIRROR_PLANES: usize = 10;

/// Binding index of the plane-parameter storage buffer within the mirror
/// bind groups. Shaders declare the buffer at this slot.
pub const MIRROR_PLANE_BUFFER_BINDING: u32 = 2;

/// Surface parameters of a mirror plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorMaterial {
    /// Tint applied to the reflected image (RGB).
    pub tint: Vec3,
    /// Fraction of the reflected image in the final surface color, in [0, 1].
    pub reflectivity: f32,
    /// Mip level sampled from the reflection target; larger values blur.
    pub blur_level: f32,
}

impl MirrorMaterial {
    /// Creates a material, clamping `reflectivity` to [0, 1] and
    /// `blur_level` to non-negative.
    pub fn new(tint: Vec3, reflectivity: f32, blur_level: f32) -> Self {
        Self {
            tint,
            reflectivity: reflectivity.clamp(0.0, 1.0),
            blur_level: blur_level.max(0.0),
        }
    }
}

impl Default for MirrorMaterial {
    fn default() -> Self {
        Self {
            tint: Vec3::ONE,
            reflectivity: 1.0,
            blur_level: 0.0,
        }
    }
}

/// GPU-visible per-plane parameter record.
///
/// Layout contract: three 16-byte-aligned vec4 fields followed by two packed
/// floats, 64 bytes total. Record `i` in the parameter buffer describes the
/// plane whose mask ID is `i`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MirrorPlaneUniforms {
    /// World-space point on the plane (w = 1).
    pub position: [f32; 4],
    /// World-space unit normal (w = 0).
    pub normal: [f32; 4],
    /// Tint color (w = 1).
    pub color: [f32; 4],
    /// Reflectivity coefficient in [0, 1].
    pub reflect_rate: f32,
    /// Blur mip level, non-negative.
    pub blur_level: f32,
    /// Padding to a 16-byte multiple.
    pub _padding: [f32; 2],
}

impl MirrorPlaneUniforms {
    /// Packs world-space plane state and a material into a record.
    pub fn compose(position: Vec3, normal: Vec3, material: &MirrorMaterial) -> Self {
        Self {
            position: [position.x, position.y, position.z, 1.0],
            normal: [normal.x, normal.y, normal.z, 0.0],
            color: [material.tint.x, material.tint.y, material.tint.z, 1.0],
            reflect_rate: material.reflectivity,
            blur_level: material.blur_level,
            _padding: [0.0; 2],
        }
    }
}

impl Default for MirrorPlaneUniforms {
    fn default() -> Self {
        Self::compose(Vec3::ZERO, Vec3::Z, &MirrorMaterial::default())
    }
}

/// Derives the world-space surface normal of a transformed plane.
///
/// Uses the inverse-transpose normal matrix so that non-uniform scale in the
/// model transform does not skew the direction.
pub fn world_normal(model_matrix: Mat4, base_normal: Vec3) -> Vec3 {
    let normal_matrix = Mat3::from_mat4(model_matrix).inverse().transpose();
    (normal_matrix * base_normal).normalize()
}

/// An ordered, capacity-bounded collection of mirror planes.
///
/// Insertion order defines the plane ID used for mask encoding and
/// parameter-buffer indexing. Removal shifts later planes down, so IDs are
/// always the dense range `0..len`.
#[derive(Debug, Clone)]
pub struct PlaneList<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> PlaneList<T> {
    /// Creates an empty list with the given fixed capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an item, returning its assigned index.
    ///
    /// When full, the item is handed back unchanged in the `Err` variant.
    pub fn push(&mut self, item: T) -> std::result::Result<usize, T> {
        if self.items.len() >= self.capacity {
            return Err(item);
        }
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    /// Removes and returns the item at `index`; out-of-range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Empties the list. Capacity is retained.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Item at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Mutable item at `index`, if in range.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Iterates items in ID order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterates items mutably in ID order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }
}

impl<'a, T> IntoIterator for &'a PlaneList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_material_clamps() {
        let material = MirrorMaterial::new(Vec3::ONE, 1.7, -0.3);
        assert_eq!(material.reflectivity, 1.0);
        assert_eq!(material.blur_level, 0.0);
    }

    #[test]
    fn test_record_size() {
        // The parameter buffer layout is a binary contract with the shaders:
        // three vec4 fields plus two packed floats and padding.
        assert_eq!(std::mem::size_of::<MirrorPlaneUniforms>(), 64);
        assert_eq!(std::mem::size_of::<MirrorPlaneUniforms>() % 16, 0);
    }

    #[test]
    fn test_record_round_trip() {
        // The values authored on the CPU must survive packing exactly.
        for i in 0..4 {
            let tint = Vec3::splat(0.75 + 0.25 * i as f32);
            let material = MirrorMaterial::new(tint, 1.0, 0.7 * i as f32);
            let record = MirrorPlaneUniforms::compose(Vec3::new(i as f32, 0.0, -2.0), Vec3::Z, &material);

            assert_eq!(record.position, [i as f32, 0.0, -2.0, 1.0]);
            assert_eq!(record.normal, [0.0, 0.0, 1.0, 0.0]);
            assert_eq!(record.color, [tint.x, tint.y, tint.z, 1.0]);
            assert_eq!(record.reflect_rate, 1.0);
            assert_eq!(record.blur_level, 0.7 * i as f32);
        }
    }

    #[test]
    fn test_world_normal_identity() {
        let n = world_normal(Mat4::IDENTITY, Vec3::Z);
        assert!((n - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_world_normal_nonuniform_scale() {
        // Scaling a Z-facing plane by (2, 1, 1) must leave its normal on Z;
        // multiplying by the raw model matrix would not.
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = world_normal(model, Vec3::Z);
        assert!((n - Vec3::Z).length() < 1e-6);

        // A tilted normal under non-uniform scale shrinks along the scaled
        // axis relative to naive transformation.
        let base = Vec3::new(1.0, 0.0, 1.0).normalize();
        let n = world_normal(model, base);
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!(n.x < base.x);
    }

    proptest! {
        /// For any rotation and positive non-uniform scale, the derived
        /// normal is unit-length and matches a reference computed from the
        /// transformed tangent basis.
        #[test]
        fn world_normal_matches_tangent_cross(
            yaw in -3.0f32..3.0,
            pitch in -1.5f32..1.5,
            sx in 0.1f32..4.0,
            sy in 0.1f32..4.0,
            sz in 0.1f32..4.0,
        ) {
            let rotation = Mat4::from_rotation_y(yaw) * Mat4::from_rotation_x(pitch);
            let model = rotation * Mat4::from_scale(Vec3::new(sx, sy, sz));

            let base = Vec3::Z;
            let n = world_normal(model, base);
            prop_assert!((n.length() - 1.0).abs() < 1e-4);

            // Independent reference: the normal of the transformed surface is
            // the cross product of the transformed tangent directions.
            let m3 = Mat3::from_mat4(model);
            let reference = (m3 * Vec3::X).cross(m3 * Vec3::Y).normalize();
            prop_assert!(n.dot(reference) > 1.0 - 1e-4);
        }
    }

    #[test]
    fn test_plane_list_capacity() {
        let mut list = PlaneList::new(MAX_MIRROR_PLANES);
        for i in 0..MAX_MIRROR_PLANES {
            assert_eq!(list.push(i), Ok(i));
        }
        assert_eq!(list.push(99), Err(99));
        assert_eq!(list.len(), MAX_MIRROR_PLANES);
    }

    #[test]
    fn test_plane_list_remove_out_of_range() {
        let mut list = PlaneList::new(4);
        list.push("a").unwrap();
        assert!(list.remove(3).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_plane_list_ids_stay_dense() {
        let mut list = PlaneList::new(4);
        for name in ["a", "b", "c", "d"] {
            list.push(name).unwrap();
        }
        assert_eq!(list.remove(1), Some("b"));
        let ids: Vec<_> = list.iter().copied().collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }
}
