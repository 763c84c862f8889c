//! Grid raycasting core.
//!
//! A [`World`] owns the [`Grid`] and the [`Camera`]; every frame the front end
//! feeds it a [`Controls`] snapshot and a delta time, then pulls draw commands
//! out of it. Nothing in here knows about windows or canvases.

pub mod camera;
pub mod config;
pub mod map;
pub mod motion;
pub mod project;
pub mod ray;
pub mod world;

pub use camera::Camera;
pub use config::Settings;
pub use map::{Grid, Map};
pub use motion::Controls;
pub use project::{Column, DrawCommand, Rgb};
pub use ray::{Hit, MarchLimits, MissReason, Ray, Side, Trace};
pub use world::World;
