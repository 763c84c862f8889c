use crate::config::check_fov;
use anyhow::Context;
use glam::{IVec2, Vec2};
use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::Path;

/// Map compiled into the binary, used when no map path is configured.
pub const DEFAULT_MAP: &str = include_str!("../maps/default.map");

/// Cell value for passable space.
pub const EMPTY: u8 = 0;

/// Rectangular grid of cell types. `0` is empty, anything else is an opaque wall.
///
/// Cells are addressed by integer `(x, y)`; a continuous world position maps to
/// the cell `floor(position)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY; width * height],
        }
    }

    /// Empty grid enclosed by a one cell thick border of `wall`.
    pub fn bordered(width: usize, height: usize, wall: u8) -> Self {
        let mut this = Self::new(width, height);
        for x in 0..width {
            this.cells[x] = wall;
            this.cells[(height - 1) * width + x] = wall;
        }
        for y in 0..height {
            this.cells[y * width] = wall;
            this.cells[y * width + width - 1] = wall;
        }
        this
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.y as usize * self.width + cell.x as usize)
    }

    /// Cell value, or `None` outside the grid.
    pub fn get(&self, cell: IVec2) -> Option<u8> {
        self.index(cell).map(|idx| self.cells[idx])
    }

    /// Overwrite a cell. Returns `false` (and changes nothing) outside the grid.
    pub fn set(&mut self, cell: IVec2, value: u8) -> bool {
        match self.index(cell) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn is_occupied(&self, cell: IVec2) -> bool {
        self.get(cell).is_some_and(|value| value != EMPTY)
    }

    /// Whether a body standing at `position` would be inside a wall. Anything
    /// outside the grid counts as solid.
    pub fn blocks(&self, position: Vec2) -> bool {
        self.get(Self::cell_at(position))
            .map_or(true, |value| value != EMPTY)
    }

    pub fn cell_at(position: Vec2) -> IVec2 {
        position.floor().as_ivec2()
    }

    /// All cells in row order with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, u8)> + '_ {
        self.cells.iter().enumerate().map(|(idx, value)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (IVec2::new(x as i32, y as i32), *value)
        })
    }
}

/// A loaded map: the grid plus where and how the camera starts.
#[derive(Clone, PartialEq, Debug)]
pub struct Map {
    pub grid: Grid,
    pub spawn: Option<Vec2>,
    pub facing: Vec2,
    pub fov: Option<f32>,
}

impl Default for Map {
    fn default() -> Self {
        Self {
            grid: Grid::new(0, 0),
            spawn: None,
            facing: Vec2::X,
            fov: None,
        }
    }
}

fn parse_facing(name: &str) -> anyhow::Result<Vec2> {
    Ok(match name {
        "north" => Vec2::NEG_Y,
        "east" => Vec2::X,
        "south" => Vec2::Y,
        "west" => Vec2::NEG_X,
        other => anyhow::bail!("unknown facing: {other}"),
    })
}

impl Map {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("loading map at {}", path.display());
        let file = read_to_string(path)
            .with_context(|| format!("could not read map {}", path.display()))?;
        Self::parse(&file).with_context(|| format!("invalid map {}", path.display()))
    }

    pub fn builtin() -> anyhow::Result<Self> {
        Self::parse(DEFAULT_MAP).context("invalid built-in map")
    }

    pub fn parse(source: &str) -> anyhow::Result<Self> {
        let mut lines = source.lines();
        let mut this = Self::default();

        while let Some(line) = lines.by_ref().next() {
            match line.trim_end() {
                "" => continue,
                "!!!!META" => this.parse_meta(&mut lines)?,
                "!!!!MAIN" => this.parse_main(&mut lines)?,
                other => anyhow::bail!("unrecognized directive: {other}"),
            }
        }

        if this.grid.width() == 0 {
            anyhow::bail!("map has no grid");
        }

        Ok(this)
    }

    fn parse_meta<'lines>(
        &mut self,
        mut lines: impl Iterator<Item = &'lines str>,
    ) -> anyhow::Result<()> {
        for line in lines.by_ref() {
            if line.trim().is_empty() {
                break;
            }

            let mut chunks = line.trim().split(',');
            let directive = chunks.by_ref().next().unwrap_or_default();
            let params = chunks
                .map(|param| param.split_once('='))
                .collect::<Option<HashMap<_, _>>>()
                .context("incorrectly formatted meta")?;
            match directive {
                "camera" => {
                    self.facing = parse_facing(params.get("facing").unwrap_or(&"east"))?;
                    self.fov = params
                        .get("fov")
                        .map(|fov| fov.parse::<f32>())
                        .transpose()
                        .context("fov is not a number")?;
                    if let Some(fov) = self.fov {
                        check_fov(fov)?;
                    }
                }
                other => anyhow::bail!("unrecognized meta directive: {other}"),
            }
        }

        Ok(())
    }

    fn parse_main<'lines>(
        &mut self,
        mut lines: impl Iterator<Item = &'lines str>,
    ) -> anyhow::Result<()> {
        let mut width = None;
        let mut height = 0;
        let mut tiles = vec![];
        let mut spawn = None;

        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            let row_width = line.chars().count();
            match width {
                None => width = Some(row_width),
                Some(w) if w != row_width => {
                    anyhow::bail!("row {height} is {row_width} cells wide, expected {w}")
                }
                Some(_) => {}
            }

            for (x, tile) in line.chars().enumerate() {
                tiles.push(match tile {
                    ' ' | '0' => EMPTY,
                    '*' => {
                        if spawn.is_some() {
                            anyhow::bail!("more than one spawn in map");
                        }
                        spawn = Some(Vec2::new(x as f32 + 0.5, height as f32 + 0.5));
                        EMPTY
                    }
                    '1'..='9' => tile as u8 - b'0',
                    other => anyhow::bail!("invalid tile in map: {other:?}"),
                });
            }
            height += 1;
        }

        let width = width.context("map section is empty")?;
        if width == 0 {
            anyhow::bail!("map section is empty");
        }

        self.grid = Grid {
            width,
            height,
            cells: tiles,
        };
        self.spawn = spawn;

        Ok(())
    }

    /// Spawn point, falling back to the first empty cell's centre.
    pub fn get_spawn(&self) -> Option<Vec2> {
        self.spawn.or_else(|| {
            self.grid
                .iter()
                .find(|(_, value)| *value == EMPTY)
                .map(|(cell, _)| cell.as_vec2() + Vec2::splat(0.5))
        })
    }
}
