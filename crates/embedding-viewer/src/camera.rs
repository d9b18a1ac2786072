//! Camera pose, projection and screen/ray conversions.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4Swizzles};

/// Pixel dimensions of the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width.max(1) as f32, self.height.max(1) as f32)
    }

    /// Pixel position (origin top-left) to normalized device coordinates (y up).
    pub fn to_ndc(&self, pixel: Vec2) -> Vec2 {
        let size = self.size();
        Vec2::new(pixel.x / size.x * 2.0 - 1.0, -(pixel.y / size.y * 2.0 - 1.0))
    }

    pub fn to_pixel(&self, ndc: Vec2) -> Vec2 {
        let size = self.size();
        Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y)
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Viewport {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Parameter of the point on the ray's line closest to `p`; negative is behind the origin.
    #[inline]
    pub fn closest_t(&self, p: Vec3) -> f32 {
        (p - self.origin).dot(self.direction)
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Perpendicular distance from `p` to the ray, clamped to the origin for points behind it.
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        let t = self.closest_t(p).max(0.0);
        self.at(t).distance(p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y_rad: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        // glam's RH perspective maps depth to [0, 1], matching wgpu.
        Mat4::perspective_rh(self.fov_y_rad, self.aspect, self.near, self.far)
    }
}

/// Reference projection: 70° vertical FOV, very wide clip range.
pub const DEFAULT_FOV_DEG: f32 = 70.0;
pub const DEFAULT_NEAR: f32 = 0.0001;
pub const DEFAULT_FAR: f32 = 1_000_000.0;

/// Camera pose plus projection. The camera looks down its local -Z with +Y up.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub orientation: Quat,
    pub projection: Projection,
}

impl CameraState {
    /// The start pose: one unit along +Z, facing the origin.
    pub fn new(fov_y_deg: f32, viewport: Viewport) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            orientation: Quat::IDENTITY,
            projection: Projection {
                fov_y_rad: fov_y_deg.to_radians(),
                aspect: viewport.aspect(),
                near: DEFAULT_NEAR,
                far: DEFAULT_FAR,
            },
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Rotates the camera to face `target`. A no-op when `target` is the camera position.
    pub fn look_at(&mut self, target: Vec3, world_up: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() <= f32::EPSILON {
            return;
        }
        // The inverse of a look-at view matrix is the camera-to-world transform.
        let view = Mat4::look_at_rh(self.position, target, world_up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.orientation = rotation.normalize();
    }

    /// Updates the aspect ratio. Same viewport in, same state out.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if !viewport.is_empty() {
            self.projection.aspect = viewport.aspect();
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn proj(&self) -> Mat4 {
        self.projection.matrix()
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    /// View-space depth of `p`; negative in front of the camera.
    pub fn view_depth(&self, p: Vec3) -> f32 {
        self.view().transform_point3(p).z
    }

    /// Ray from the camera position through an NDC coordinate.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let tan_half = (self.projection.fov_y_rad * 0.5).tan();
        let dir_view = Vec3::new(
            ndc.x * tan_half * self.projection.aspect,
            ndc.y * tan_half,
            -1.0,
        );
        Ray::new(self.position, self.orientation * dir_view)
    }

    /// NDC position of `p`, or `None` when `p` is not in front of the camera.
    pub fn world_to_ndc(&self, p: Vec3) -> Option<Vec3> {
        let clip = self.view_proj() * p.extend(1.0);
        (clip.w > 0.0).then(|| clip.xyz() / clip.w)
    }

    /// Pixel position of `p` in `viewport`, or `None` when `p` is behind the camera.
    pub fn world_to_pixel(&self, p: Vec3, viewport: Viewport) -> Option<Vec2> {
        self.world_to_ndc(p).map(|ndc| viewport.to_pixel(ndc.truncate()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn camera() -> CameraState {
        CameraState::new(DEFAULT_FOV_DEG, Viewport::new(1280, 720))
    }

    #[test]
    fn start_pose_faces_origin() {
        let cam = camera();
        assert_eq!(cam.forward(), Vec3::NEG_Z);
        let ndc = cam.world_to_ndc(Vec3::ZERO).unwrap();
        assert_abs_diff_eq!(ndc.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ndc.y, 0.0, epsilon = 1e-6);
        assert!(cam.view_depth(Vec3::ZERO) < 0.0);
    }

    #[test]
    fn ndc_round_trips_through_pixels() {
        let vp = Viewport::new(800, 600);
        let px = Vec2::new(200.0, 450.0);
        let back = vp.to_pixel(vp.to_ndc(px));
        assert_abs_diff_eq!(back.x, px.x, epsilon = 1e-3);
        assert_abs_diff_eq!(back.y, px.y, epsilon = 1e-3);
        assert_eq!(vp.to_ndc(Vec2::ZERO), Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn ray_through_projection_hits_point() {
        let mut cam = camera();
        cam.position = Vec3::new(3.0, 2.0, 5.0);
        cam.look_at(Vec3::new(0.5, 0.0, 0.0), Vec3::Y);

        for p in [
            Vec3::new(0.2, 0.1, -0.3),
            Vec3::new(-1.0, 0.7, 1.5),
            Vec3::new(2.0, -0.4, 0.0),
        ] {
            let ndc = cam.world_to_ndc(p).unwrap();
            let ray = cam.ray_from_ndc(ndc.truncate());
            assert!(ray.distance_to_point(p) < 1e-4, "distance for {p:?}");
            assert!(ray.closest_t(p) > 0.0);
        }
    }

    #[test]
    fn behind_camera_has_no_projection() {
        let cam = camera();
        assert!(cam.world_to_ndc(Vec3::new(0.0, 0.0, 2.0)).is_none());
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut cam = camera();
        cam.position = Vec3::new(4.0, 0.0, 0.0);
        cam.look_at(Vec3::ZERO, Vec3::Y);
        let f = cam.forward();
        assert_abs_diff_eq!(f.x, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(f.y, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(f.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn set_viewport_is_idempotent_and_ignores_zero() {
        let mut once = camera();
        once.set_viewport(Viewport::new(1000, 500));
        let mut twice = once.clone();
        twice.set_viewport(Viewport::new(1000, 500));
        assert_eq!(once, twice);
        assert_abs_diff_eq!(once.projection.aspect, 2.0);

        twice.set_viewport(Viewport::new(0, 500));
        assert_eq!(once, twice);
    }

    #[test]
    fn distance_to_point_is_perpendicular() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0));
        assert_abs_diff_eq!(ray.distance_to_point(Vec3::new(0.3, 0.4, -10.0)), 0.5, epsilon = 1e-6);
        // Behind the origin: distance to the origin itself.
        assert_abs_diff_eq!(ray.distance_to_point(Vec3::new(0.0, 0.0, 3.0)), 3.0, epsilon = 1e-6);
    }
}
