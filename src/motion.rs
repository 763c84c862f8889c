use crate::camera::Camera;
use crate::map::Grid;
use glam::Vec2;

/// Which movement keys are held this frame. Built by the front end from
/// whatever input library it uses.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct Controls {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Movement in map axes rather than camera axes, each component in `-1..=1`.
    pub pan: Vec2,
}

impl Controls {
    fn axis(negative: bool, positive: bool) -> f32 {
        match (negative, positive) {
            (false, true) => 1.,
            (true, false) => -1.,
            _ => 0.,
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Speeds {
    /// cells per second
    pub movement: f32,
    /// radians per second
    pub turn: f32,
}

/// Move from `pos` by `delta`, one axis at a time. An axis whose destination
/// cell is solid is dropped while the other still applies, so a body pushed
/// diagonally into a wall slides along it.
pub fn slide(grid: &Grid, pos: Vec2, delta: Vec2) -> Vec2 {
    let mut pos = pos;

    if !grid.blocks(Vec2::new(pos.x + delta.x, pos.y)) {
        pos.x += delta.x;
    }

    if !grid.blocks(Vec2::new(pos.x, pos.y + delta.y)) {
        pos.y += delta.y;
    }

    pos
}

/// Apply one frame of input to the camera.
pub fn apply(camera: &mut Camera, grid: &Grid, controls: &Controls, speeds: Speeds, dt: f32) {
    let turn = Controls::axis(controls.turn_left, controls.turn_right);
    if turn != 0. {
        camera.rotate(turn * speeds.turn * dt);
    }

    let forward = Controls::axis(controls.backward, controls.forward);
    let strafe = Controls::axis(controls.strafe_left, controls.strafe_right);

    let mut step = camera.dir() * forward + camera.dir().perp() * strafe;
    // holding forward and strafe together is not faster
    if forward != 0. && strafe != 0. {
        step = step.normalize_or_zero();
    }
    step += controls.pan.clamp(Vec2::NEG_ONE, Vec2::ONE);

    if step != Vec2::ZERO {
        camera.pos = slide(grid, camera.pos, step * speeds.movement * dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    const SPEEDS: Speeds = Speeds {
        movement: 1.,
        turn: 2.,
    };

    fn room() -> Grid {
        let mut grid = Grid::bordered(12, 12, 1);
        grid.set(IVec2::new(6, 5), 1);
        grid
    }

    #[test]
    fn diagonal_push_into_wall_slides() {
        let grid = room();
        assert!(!grid.is_occupied(IVec2::new(5, 6)));

        let mut camera = Camera::new(Vec2::new(5.5, 5.5), Vec2::ONE, 66.);
        let controls = Controls {
            forward: true,
            ..Default::default()
        };
        apply(&mut camera, &grid, &controls, SPEEDS, 1.);

        assert_eq!(camera.pos.x, 5.5);
        assert!(camera.pos.y > 6.);
        assert_eq!(Grid::cell_at(camera.pos), IVec2::new(5, 6));
    }

    #[test]
    fn blocked_on_both_axes_stays_put() {
        let mut grid = room();
        grid.set(IVec2::new(5, 6), 3);
        let pos = slide(&grid, Vec2::new(5.5, 5.5), Vec2::new(0.9, 0.9));
        assert_eq!(pos, Vec2::new(5.5, 5.5));
    }

    #[test]
    fn backward_moves_against_facing() {
        let grid = room();
        let mut camera = Camera::new(Vec2::new(3.5, 3.5), Vec2::X, 66.);
        let controls = Controls {
            backward: true,
            ..Default::default()
        };
        apply(&mut camera, &grid, &controls, SPEEDS, 0.5);
        assert!((camera.pos - Vec2::new(3., 3.5)).length() < 1e-5);
    }

    #[test]
    fn movement_scales_with_delta_time() {
        let grid = Grid::bordered(40, 40, 1);
        let controls = Controls {
            forward: true,
            ..Default::default()
        };

        let mut once = Camera::new(Vec2::new(5.5, 5.5), Vec2::X, 66.);
        apply(&mut once, &grid, &controls, SPEEDS, 0.2);

        let mut stepped = Camera::new(Vec2::new(5.5, 5.5), Vec2::X, 66.);
        for _ in 0..4 {
            apply(&mut stepped, &grid, &controls, SPEEDS, 0.05);
        }
        assert!((once.pos - stepped.pos).length() < 1e-5);
    }

    #[test]
    fn turning_rotates_dir_and_plane_together() {
        let grid = room();
        let mut camera = Camera::new(Vec2::new(3.5, 3.5), Vec2::X, 66.);
        let fov = camera.fov();
        let controls = Controls {
            turn_right: true,
            ..Default::default()
        };
        apply(&mut camera, &grid, &controls, SPEEDS, 0.25);
        assert!(camera.dir().y > 0.);
        assert!(camera.dir().dot(camera.plane()).abs() < 1e-5);
        assert!((camera.fov() - fov).abs() < 1e-3);

        let controls = Controls {
            turn_left: true,
            ..Default::default()
        };
        apply(&mut camera, &grid, &controls, SPEEDS, 0.25);
        assert!((camera.dir() - Vec2::X).length() < 1e-5);
    }

    #[test]
    fn pan_moves_in_map_axes_and_collides() {
        let grid = room();
        let mut camera = Camera::new(Vec2::new(5.5, 1.5), Vec2::X, 66.);
        let controls = Controls {
            pan: Vec2::new(0., -1.),
            ..Default::default()
        };
        apply(&mut camera, &grid, &controls, SPEEDS, 1.);
        assert_eq!(camera.pos, Vec2::new(5.5, 1.5));
        assert!(Controls::default().is_idle());
        assert!(!controls.is_idle());
    }
}
