//! GPU-ready point storage.

use glam::Vec3;
use rayon::prelude::*;

/// Per-point vertex data uploaded to the GPU instance buffer.
/// Must match the instance inputs in `animated_points.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Palette color, each channel in `[0, 1]`.
    pub color: [f32; 3],
    /// Per-point animation offset in `[0, 1)`.
    pub phase: f32,
}

// Three tightly packed attributes: 12 + 12 + 4 bytes.
const _: [(); 28] = [(); core::mem::size_of::<PointVertex>()];

/// Smallest sphere around the AABB of a point set. Used to reject rays early.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub const EMPTY: Self = Self {
        center: Vec3::ZERO,
        radius: 0.0,
    };

    pub fn from_points(vertices: &[PointVertex]) -> Self {
        if vertices.is_empty() {
            return Self::EMPTY;
        }

        let (min, max) = vertices
            .par_iter()
            .map(|v| {
                let p = Vec3::from(v.position);
                (p, p)
            })
            .reduce(
                || (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
                |(a_min, a_max), (b_min, b_max)| (a_min.min(b_min), a_max.max(b_max)),
            );

        let center = (min + max) * 0.5;
        let radius = vertices
            .par_iter()
            .map(|v| Vec3::from(v.position).distance(center))
            .reduce(|| 0.0, f32::max);

        Self { center, radius }
    }
}

/// Immutable point cloud: vertex data plus the label of every point, same indexing.
#[derive(Debug, Clone)]
pub struct PointCloudBuffer {
    vertices: Vec<PointVertex>,
    labels: Vec<String>,
    bounds: BoundingSphere,
}

impl PointCloudBuffer {
    /// Callers guarantee `vertices.len() == labels.len()`.
    pub(crate) fn new(vertices: Vec<PointVertex>, labels: Vec<String>) -> Self {
        debug_assert_eq!(vertices.len(), labels.len());
        let bounds = BoundingSphere::from_points(&vertices);
        Self {
            vertices,
            labels,
            bounds,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertices(&self) -> &[PointVertex] {
        &self.vertices
    }

    #[inline]
    pub fn bounds(&self) -> BoundingSphere {
        self.bounds
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.vertices.get(index).map(|v| Vec3::from(v.position))
    }

    /// Raw bytes for a vertex buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn vertex(position: [f32; 3]) -> PointVertex {
        PointVertex {
            position,
            color: [1.0; 3],
            phase: 0.0,
        }
    }

    #[test]
    fn bounds_enclose_every_point() {
        let vertices = vec![
            vertex([-1.0, 0.0, 0.0]),
            vertex([3.0, 0.0, 0.0]),
            vertex([1.0, 2.0, -2.0]),
        ];
        let bounds = BoundingSphere::from_points(&vertices);

        assert_abs_diff_eq!(bounds.center.x, 1.0);
        assert_abs_diff_eq!(bounds.center.y, 1.0);
        assert_abs_diff_eq!(bounds.center.z, -1.0);
        for v in &vertices {
            assert!(Vec3::from(v.position).distance(bounds.center) <= bounds.radius + 1e-6);
        }
    }

    #[test]
    fn empty_cloud_has_empty_bounds() {
        assert_eq!(BoundingSphere::from_points(&[]), BoundingSphere::EMPTY);
    }

    #[test]
    fn byte_view_covers_all_vertices() {
        let buffer = PointCloudBuffer::new(
            vec![vertex([0.0; 3]), vertex([1.0; 3])],
            vec!["a".into(), "b".into()],
        );
        assert_eq!(buffer.as_bytes().len(), 2 * 28);
        assert_eq!(buffer.label(1), Some("b"));
        assert_eq!(buffer.label(2), None);
        assert_eq!(buffer.position(1), Some(Vec3::ONE));
    }
}
