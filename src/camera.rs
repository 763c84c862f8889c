use crate::ray::Ray;
use glam::Vec2;

/// Player viewpoint in grid cell units.
///
/// `plane` is kept perpendicular to `dir`; its length relative to `dir` is
/// `tan(fov / 2)`. Rotation goes through [`Camera::rotate`] so the two vectors
/// are always turned together.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Camera {
    pub pos: Vec2,
    dir: Vec2,
    plane: Vec2,
}

impl Camera {
    /// `facing` is normalized; `fov` is the horizontal field of view in degrees.
    pub fn new(pos: Vec2, facing: Vec2, fov: f32) -> Self {
        let dir = facing.try_normalize().unwrap_or(Vec2::X);
        // perp() turns towards +y, which is the right hand side on a y-down map
        let plane = dir.perp() * (fov.to_radians() * 0.5).tan();
        Self { pos, dir, plane }
    }

    pub fn dir(&self) -> Vec2 {
        self.dir
    }

    pub fn plane(&self) -> Vec2 {
        self.plane
    }

    /// Horizontal field of view in degrees, recovered from the plane length.
    pub fn fov(&self) -> f32 {
        (self.plane.length() / self.dir.length()).atan().to_degrees() * 2.
    }

    /// Turn by `angle` radians; positive turns right (clockwise on a y-down map).
    pub fn rotate(&mut self, angle: f32) {
        let rotation = Vec2::from_angle(angle);
        self.dir = rotation.rotate(self.dir);
        self.plane = rotation.rotate(self.plane);
    }

    /// Ray direction for sweep parameter `t` in `[-1, 1]`, left edge to right edge.
    pub fn ray_dir(&self, t: f32) -> Vec2 {
        self.dir + self.plane * t
    }

    /// Ray for screen column `column` of a `width` pixel wide view.
    pub fn column_ray(&self, column: usize, width: usize) -> Ray {
        let t = 2. * column as f32 / width.max(1) as f32 - 1.;
        Ray::new(self.pos, self.ray_dir(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn plane_encodes_field_of_view() {
        let camera = Camera::new(Vec2::ZERO, Vec2::NEG_X, 90.);
        assert!(close(camera.plane(), Vec2::new(0., -1.)));
        assert!((camera.fov() - 90.).abs() < 1e-3);
        assert!(camera.dir().dot(camera.plane()).abs() < 1e-6);
    }

    #[test]
    fn rotation_round_trips() {
        let mut camera = Camera::new(Vec2::new(3., 4.), Vec2::new(0.3, -0.8), 66.);
        let before = camera;
        camera.rotate(0.7);
        assert!(!close(camera.dir(), before.dir()));
        camera.rotate(-0.7);
        assert!(close(camera.dir(), before.dir()));
        assert!(close(camera.plane(), before.plane()));
        assert!((camera.dir().length() - 1.).abs() < 1e-5);
    }

    #[test]
    fn rotation_keeps_vectors_perpendicular() {
        let mut camera = Camera::new(Vec2::ZERO, Vec2::X, 66.);
        for _ in 0..1000 {
            camera.rotate(0.05);
            assert!(camera.dir().dot(camera.plane()).abs() < 1e-3);
        }
    }

    #[test]
    fn positive_rotation_turns_right() {
        let mut camera = Camera::new(Vec2::ZERO, Vec2::NEG_Y, 66.);
        camera.rotate(FRAC_PI_2);
        assert!(close(camera.dir(), Vec2::X));
    }

    #[test]
    fn columns_sweep_left_to_right() {
        let camera = Camera::new(Vec2::new(1., 1.), Vec2::X, 90.);
        let left = camera.column_ray(0, 640);
        let middle = camera.column_ray(320, 640);
        assert!(close(left.dir, Vec2::new(1., -1.)));
        assert!(close(middle.dir, Vec2::X));
        assert_eq!(left.origin, Vec2::new(1., 1.));
        // last column stops one step short of t = 1
        assert!(camera.column_ray(639, 640).dir.y < 1.);
    }
}
