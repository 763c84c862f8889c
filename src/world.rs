use crate::camera::Camera;
use crate::config::Settings;
use crate::map::{Grid, Map, EMPTY};
use crate::motion::{self, Controls, Speeds};
use crate::project::{backdrop, dashed_line, Column, DrawCommand, Overhead, Rgb};
use crate::ray::{MarchLimits, Ray, Trace};
use anyhow::Context;
use glam::{IVec2, Vec2};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

pub const CEILING: Rgb = Rgb::new(40, 40, 48);
pub const FLOOR: Rgb = Rgb::new(72, 72, 72);

/// Pointer state for the overhead view, in screen pixels.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Pointer {
    pub pos: IVec2,
    /// Draw the pointer ray and its hit marker.
    pub show_ray: bool,
}

/// Everything a frame reads: the grid, the camera and the tuning it runs with.
///
/// Casting only borrows the world immutably, so the grid cannot change while
/// a sweep is in flight.
#[derive(Clone, Debug)]
pub struct World {
    pub grid: Grid,
    pub camera: Camera,
    limits: MarchLimits,
    speeds: Speeds,
    dash: (f32, f32),
}

impl World {
    pub fn new(map: Map, settings: &Settings) -> anyhow::Result<Self> {
        let spawn = map.get_spawn().context("no spawn in map")?;
        let fov = map.fov.unwrap_or(settings.fov);
        log::info!(
            "{}x{} grid, spawn at {spawn}, fov {fov}",
            map.grid.width(),
            map.grid.height()
        );

        Ok(Self {
            camera: Camera::new(spawn, map.facing, fov),
            grid: map.grid,
            limits: settings.limits(),
            speeds: settings.speeds(),
            dash: (settings.dash, settings.gap),
        })
    }

    /// World for the configured map, or the built-in one.
    pub fn load(settings: &Settings) -> anyhow::Result<Self> {
        let map = match &settings.map {
            Some(path) => Map::load(path)?,
            None => Map::builtin()?,
        };
        Self::new(map, settings)
    }

    pub fn limits(&self) -> MarchLimits {
        self.limits
    }

    /// Advance the camera by one frame of input.
    pub fn step(&mut self, controls: &Controls, dt: f32) {
        motion::apply(&mut self.camera, &self.grid, controls, self.speeds, dt);
    }

    pub fn cast(&self, ray: &Ray) -> Trace {
        ray.march(&self.grid, self.limits)
    }

    pub fn cast_column(&self, x: usize, width: usize) -> Column {
        Column {
            x,
            trace: self.cast(&self.camera.column_ray(x, width)),
        }
    }

    /// Columns left to right, cast as they are pulled.
    pub fn columns(&self, width: usize) -> impl Iterator<Item = Column> + '_ {
        (0..width).map(move |x| self.cast_column(x, width))
    }

    /// Every column cast on the rayon pool; the result is indexed by column.
    pub fn sweep(&self, width: usize) -> Vec<Column> {
        (0..width)
            .into_par_iter()
            .map(|x| self.cast_column(x, width))
            .collect()
    }

    /// First person frame: backdrop, then one wall slice per column that hit.
    pub fn first_person(
        &self,
        width: usize,
        height: usize,
    ) -> impl Iterator<Item = DrawCommand> + '_ {
        backdrop(width, height, CEILING, FLOOR)
            .into_iter()
            .chain(self.columns(width).filter_map(move |column| column.command(height)))
    }

    /// Unit ray from the camera to `target` and what it runs into.
    pub fn trace_to(&self, target: Vec2) -> (Option<Ray>, Trace) {
        match Ray::toward(self.camera.pos, target) {
            Some(ray) => (Some(ray), self.cast(&ray)),
            None => (None, Trace::DEGENERATE),
        }
    }

    /// Set a cell's type. Refuses cells outside the grid and walling in the
    /// cell the camera stands in.
    pub fn set_cell(&mut self, cell: IVec2, value: u8) -> bool {
        if value != EMPTY && Grid::cell_at(self.camera.pos) == cell {
            return false;
        }
        if self.grid.get(cell) == Some(value) {
            return false;
        }
        let changed = self.grid.set(cell, value);
        if changed {
            log::debug!("cell {cell} set to {value}");
        }
        changed
    }

    /// Top down frame: grid, camera and pointer markers, and while
    /// `pointer.show_ray` the dashed pointer ray with its hit marker.
    pub fn overhead(&self, view: &Overhead, pointer: Pointer) -> Vec<DrawCommand> {
        let mut commands = view.grid(&self.grid).collect::<Vec<_>>();
        commands.push(view.marker(self.camera.pos, 4, Rgb::RED));
        commands.push(DrawCommand::FillCircle {
            center: pointer.pos,
            radius: 4,
            color: Rgb::GREEN,
        });

        if pointer.show_ray {
            let from = view.to_screen(self.camera.pos).as_vec2();
            let (dash, gap) = self.dash;
            commands.extend(dashed_line(
                from,
                pointer.pos.as_vec2(),
                dash,
                gap,
                Rgb::WHITE,
            ));

            let (ray, trace) = self.trace_to(view.to_world(pointer.pos));
            if let (Some(ray), Some(hit)) = (ray, trace.hit()) {
                commands.push(view.marker(hit.point(&ray), 4, Rgb::YELLOW));
            }
        }

        commands
    }
}
