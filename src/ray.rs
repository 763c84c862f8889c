use crate::map::Grid;
use glam::{IVec2, Vec2};

/// Step distance used for an axis the ray never moves along. Large enough to
/// lose every comparison, small enough to stay finite when accumulated.
const PARALLEL: f32 = 1e30;

/// Which kind of grid line the ray crossed last.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    /// A vertical boundary (constant x) was crossed.
    X,
    /// A horizontal boundary (constant y) was crossed.
    Y,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Hit {
    pub cell: IVec2,
    pub value: u8,
    /// Distance measured in units of the ray direction's length. For a
    /// column ray (`dir + plane * t`) that is the distance along the camera's
    /// forward axis; for a normalized ray it is the euclidean distance.
    pub distance: f32,
    pub side: Side,
}

impl Hit {
    /// World position where the ray entered the hit cell.
    pub fn point(&self, ray: &Ray) -> Vec2 {
        ray.at(self.distance)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MissReason {
    /// Zero length direction; nothing was traversed.
    Degenerate,
    /// The ray walked off the edge of the grid.
    LeftGrid,
    /// Distance or iteration bound reached before anything was hit.
    OutOfRange,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Trace {
    Hit(Hit),
    Miss { reason: MissReason, distance: f32 },
}

impl Trace {
    pub const DEGENERATE: Self = Trace::Miss {
        reason: MissReason::Degenerate,
        distance: 0.,
    };

    pub fn hit(&self) -> Option<&Hit> {
        match self {
            Trace::Hit(hit) => Some(hit),
            Trace::Miss { .. } => None,
        }
    }
}

/// Bounds that guarantee a march terminates on any map.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MarchLimits {
    pub max_distance: f32,
    pub max_steps: usize,
}

impl Default for MarchLimits {
    fn default() -> Self {
        Self {
            max_distance: 100.,
            max_steps: 1024,
        }
    }
}

/// Origin and direction in grid cell units. Only lives for one sample.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Ray {
    pub origin: Vec2,
    pub dir: Vec2,
}

impl Ray {
    pub fn new(origin: Vec2, dir: Vec2) -> Self {
        Self { origin, dir }
    }

    /// Unit ray from `origin` towards `target`; `None` when they coincide.
    pub fn toward(origin: Vec2, target: Vec2) -> Option<Self> {
        (target - origin)
            .try_normalize()
            .map(|dir| Self::new(origin, dir))
    }

    pub fn at(&self, distance: f32) -> Vec2 {
        self.origin + self.dir * distance
    }

    /// Walk the grid one boundary at a time until an occupied cell is entered.
    ///
    /// On an exact tie between the two axes the x axis is advanced first.
    pub fn march(&self, grid: &Grid, limits: MarchLimits) -> Trace {
        if self.dir == Vec2::ZERO || !self.dir.is_finite() || !self.origin.is_finite() {
            return Trace::DEGENERATE;
        }

        let mut cell = Grid::cell_at(self.origin);

        let delta = Vec2::new(axis_delta(self.dir.x), axis_delta(self.dir.y));
        let step = IVec2::new(
            if self.dir.x < 0. { -1 } else { 1 },
            if self.dir.y < 0. { -1 } else { 1 },
        );

        // distance to the first boundary on each axis
        let offset = self.origin - cell.as_vec2();
        let mut side_dist = Vec2::new(
            first_boundary(self.dir.x, offset.x, delta.x),
            first_boundary(self.dir.y, offset.y, delta.y),
        );

        for _ in 0..limits.max_steps {
            let side = if side_dist.x <= side_dist.y {
                Side::X
            } else {
                Side::Y
            };

            // distance at which the boundary about to be crossed lies
            let distance = match side {
                Side::X => side_dist.x,
                Side::Y => side_dist.y,
            };
            if distance > limits.max_distance {
                return Trace::Miss {
                    reason: MissReason::OutOfRange,
                    distance: limits.max_distance,
                };
            }

            match side {
                Side::X => {
                    cell.x += step.x;
                    side_dist.x += delta.x;
                }
                Side::Y => {
                    cell.y += step.y;
                    side_dist.y += delta.y;
                }
            }

            match grid.get(cell) {
                None => {
                    return Trace::Miss {
                        reason: MissReason::LeftGrid,
                        distance,
                    }
                }
                Some(0) => {}
                Some(value) => {
                    // side_dist already points one boundary past the hit
                    let distance = match side {
                        Side::X => side_dist.x - delta.x,
                        Side::Y => side_dist.y - delta.y,
                    };
                    return Trace::Hit(Hit {
                        cell,
                        value,
                        distance: distance.max(0.),
                        side,
                    });
                }
            }
        }

        log::trace!("ray from {} gave up after {} steps", self.origin, limits.max_steps);
        Trace::Miss {
            reason: MissReason::OutOfRange,
            distance: side_dist.min_element().min(limits.max_distance),
        }
    }
}

fn axis_delta(component: f32) -> f32 {
    if component == 0. {
        PARALLEL
    } else {
        (1. / component).abs()
    }
}

fn first_boundary(component: f32, offset: f32, delta: f32) -> f32 {
    if component == 0. {
        // never crossed; must not tie with a real boundary at distance 0
        PARALLEL
    } else if component < 0. {
        offset * delta
    } else {
        (1. - offset) * delta
    }
}
