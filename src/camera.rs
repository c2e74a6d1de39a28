//! Fixed perspective camera looking down at the pond.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::config::{CAMERA_EYE, CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR};
use crate::simulation::{Ray, Raycaster};

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::from_array(CAMERA_EYE),
            target: Vec3::ZERO,
            fov_y_radians: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            aspect: 1.0,
        }
    }
}

impl Camera {
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y_radians, self.aspect, self.near, self.far);
        proj * view
    }
}

impl Raycaster for Camera {
    /// Unproject the pointer onto the near and far planes (wgpu depth range 0..1)
    fn ray(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_proj().inverse();
        let near = inverse * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = inverse * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        Ray::new(near, far - near)
    }
}
