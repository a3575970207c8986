use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub target: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            target: Vec3::ZERO,
        }
    }
}

impl Camera {
    pub fn projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, self.near, self.far)
    }

    pub fn view(&self, eye: Vec3) -> Mat4 {
        Mat4::look_at_rh(eye, self.target, Vec3::Y)
    }

    pub fn view_projection(&self, eye: Vec3, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view(eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_screen_center() {
        let camera = Camera {
            fov: 65.0,
            ..Camera::default()
        };
        let vp = camera.view_projection(Vec3::new(2.3, 1.5, 2.3), 16.0 / 9.0);
        let clip = vp * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn bad_aspect_falls_back_to_square() {
        let camera = Camera::default();
        assert_eq!(camera.projection(0.0), camera.projection(1.0));
    }
}
