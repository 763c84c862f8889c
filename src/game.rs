use crate::StringToAnyhow;
use glam::IVec2;
use gridcast::map::EMPTY;
use gridcast::motion::Controls;
use gridcast::project::{backdrop, Overhead};
use gridcast::world::{Pointer, CEILING, FLOOR};
use gridcast::{DrawCommand, Rgb, Settings, World};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseState;
use sdl2::pixels::Color;
use sdl2::rect::{Point, Rect};
use sdl2::render::{BlendMode, Canvas};
use sdl2::video::Window;
use std::collections::HashSet;

#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum GameState {
    FirstPerson,
    Overhead,
    Paused,
    Exit,
}

pub(crate) struct Game {
    world: World,
    pub game_state: GameState,
    /// view to return to when unpausing
    resume_state: GameState,
    overhead: Overhead,
    pointer: Pointer,
    width: usize,
    height: usize,
    pub canvas: Canvas<Window>,
}

fn sdl_color(color: Rgb) -> Color {
    Color::RGB(color.r, color.g, color.b)
}

fn sdl_point(point: IVec2) -> Point {
    Point::new(point.x, point.y)
}

/// Pixels of a filled circle; SDL has no primitive for it.
fn circle_points(center: IVec2, radius: i32) -> Vec<Point> {
    let mut points = Vec::new();
    for y in -radius..=radius {
        for x in -radius..=radius {
            if x * x + y * y <= radius * radius {
                points.push(Point::new(center.x + x, center.y + y));
            }
        }
    }
    points
}

impl Game {
    pub fn new(canvas: Canvas<Window>, world: World, settings: &Settings) -> Self {
        let overhead = Overhead::fit(&world.grid, settings.width, settings.height);
        log::debug!("overhead cells are {}px", overhead.cell_px);

        Self {
            world,
            game_state: GameState::FirstPerson,
            resume_state: GameState::FirstPerson,
            overhead,
            pointer: Pointer::default(),
            width: settings.width,
            height: settings.height,
            canvas,
        }
    }

    fn set_state(&mut self, state: GameState) {
        log::debug!("{:?} -> {:?}", self.game_state, state);
        self.game_state = state;
    }

    /// handle key presses (not repeats)
    pub fn key_once(&mut self, key: Keycode) {
        match self.game_state {
            GameState::FirstPerson | GameState::Overhead => match key {
                Keycode::Tab | Keycode::M => {
                    if self.game_state == GameState::Overhead {
                        self.set_state(GameState::FirstPerson);
                    } else {
                        self.set_state(GameState::Overhead);
                    }
                }
                Keycode::Escape => {
                    self.resume_state = self.game_state;
                    self.set_state(GameState::Paused);
                }
                Keycode::Q => self.set_state(GameState::Exit),
                _ => {}
            },
            GameState::Paused => self.set_state(self.resume_state),
            GameState::Exit => {}
        }
    }

    fn controls(&self, keys: &HashSet<Keycode>) -> Controls {
        let held = |key| keys.contains(&key);

        match self.game_state {
            GameState::FirstPerson => Controls {
                forward: held(Keycode::W) || held(Keycode::Up),
                backward: held(Keycode::S) || held(Keycode::Down),
                strafe_left: held(Keycode::A),
                strafe_right: held(Keycode::D),
                turn_left: held(Keycode::Left),
                turn_right: held(Keycode::Right),
                ..Default::default()
            },
            GameState::Overhead => {
                let axis = |neg, pos| match (held(neg), held(pos)) {
                    (false, true) => 1.,
                    (true, false) => -1.,
                    _ => 0.,
                };
                Controls {
                    pan: glam::Vec2::new(
                        axis(Keycode::Left, Keycode::Right),
                        axis(Keycode::Up, Keycode::Down),
                    ),
                    ..Default::default()
                }
            }
            GameState::Paused | GameState::Exit => Controls::default(),
        }
    }

    /// per frame update from held keys and the mouse
    pub fn update(&mut self, keys: &HashSet<Keycode>, mouse: &MouseState, dt: f32) {
        if self.game_state == GameState::Overhead {
            self.pointer = Pointer {
                pos: IVec2::new(mouse.x(), mouse.y()),
                show_ray: mouse.left(),
            };

            let cell = gridcast::Grid::cell_at(self.overhead.to_world(self.pointer.pos));
            if mouse.right() {
                self.world.set_cell(cell, 1);
            } else if mouse.middle() {
                self.world.set_cell(cell, EMPTY);
            }
        }

        let controls = self.controls(keys);
        if !controls.is_idle() {
            self.world.step(&controls, dt);
            log::trace!("camera at {}", self.world.camera.pos);
        }
    }

    fn rasterize(&mut self, command: DrawCommand) -> anyhow::Result<()> {
        match command {
            DrawCommand::VerticalLine { x, y0, y1, color } => {
                self.canvas.set_draw_color(sdl_color(color));
                self.canvas
                    .draw_line(Point::new(x, y0), Point::new(x, y1))
                    .ah()?;
            }
            DrawCommand::Line { from, to, color } => {
                self.canvas.set_draw_color(sdl_color(color));
                self.canvas
                    .draw_line(sdl_point(from), sdl_point(to))
                    .ah()?;
            }
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                self.canvas.set_draw_color(sdl_color(color));
                self.canvas
                    .draw_points(circle_points(center, radius).as_slice())
                    .ah()?;
            }
            DrawCommand::FillRect { min, size, color } => {
                self.canvas.set_draw_color(sdl_color(color));
                self.canvas
                    .fill_rect(Rect::new(min.x, min.y, size.x as u32, size.y as u32))
                    .ah()?;
            }
            DrawCommand::StrokeRect { min, size, color } => {
                self.canvas.set_draw_color(sdl_color(color));
                self.canvas
                    .draw_rect(Rect::new(min.x, min.y, size.x as u32, size.y as u32))
                    .ah()?;
            }
        }

        Ok(())
    }

    // columns are cast in parallel, then drawn in column order
    fn first_person_draw(&mut self) -> anyhow::Result<()> {
        let columns = self.world.sweep(self.width);

        for command in backdrop(self.width, self.height, CEILING, FLOOR) {
            self.rasterize(command)?;
        }
        for column in columns.iter() {
            if let Some(command) = column.command(self.height) {
                self.rasterize(command)?;
            }
        }

        Ok(())
    }

    fn overhead_draw(&mut self) -> anyhow::Result<()> {
        self.canvas.set_draw_color(Color::BLACK);
        self.canvas.clear();

        for command in self.world.overhead(&self.overhead, self.pointer) {
            self.rasterize(command)?;
        }

        Ok(())
    }

    // dim whatever view was active
    fn pause_draw(&mut self) -> anyhow::Result<()> {
        match self.resume_state {
            GameState::Overhead => self.overhead_draw()?,
            _ => self.first_person_draw()?,
        }

        self.canvas.set_blend_mode(BlendMode::Blend);
        self.canvas.set_draw_color(Color::RGBA(0, 0, 0, 0xDD));
        self.canvas.fill_rect(None).ah()?;
        self.canvas.set_blend_mode(BlendMode::None);

        Ok(())
    }

    pub fn draw(&mut self) -> anyhow::Result<()> {
        match self.game_state {
            GameState::FirstPerson => self.first_person_draw(),
            GameState::Overhead => self.overhead_draw(),
            GameState::Paused => self.pause_draw(),
            GameState::Exit => Ok(()),
        }
    }
}
