use crate::error::{invalid_config, Result};
use crate::mask::ColorMask;
use crate::rand::Rng;

/// Square tiling of an image, `density` pixels on a side. The last row and column of cells
/// are cut short at the image border.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CellGrid {
    width: u32,
    height: u32,
    density: u32,
}

/// A half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Cell {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CellGrid {
    pub fn new(width: u32, height: u32, density: u32) -> Result<Self> {
        if density == 0 {
            return Err(invalid_config("density must be at least 1"));
        }
        Ok(CellGrid {
            width,
            height,
            density,
        })
    }

    pub fn columns(&self) -> u32 {
        self.width.div_ceil(self.density)
    }

    pub fn rows(&self) -> u32 {
        self.height.div_ceil(self.density)
    }

    /// Number of cells, occupied or not.
    pub fn len(&self) -> u64 {
        u64::from(self.columns()) * u64::from(self.rows())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let d = self.density;
        (0..self.rows()).flat_map(move |row| {
            (0..self.columns()).map(move |col| {
                let (x0, y0) = (col * d, row * d);
                Cell {
                    x0,
                    y0,
                    x1: (x0 + d).min(self.width),
                    y1: (y0 + d).min(self.height),
                }
            })
        })
    }
}

/// A jittered sample position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Candidate {
    /// Position on the supersampled canvas, in the middle of the jittered pixel.
    pub x: f64,
    pub y: f64,
    /// Nearest source pixel, guaranteed to be inside the image.
    pub px: u32,
    pub py: u32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Sample {
    /// No masked pixel in the cell.
    Empty,
    /// Jitter pushed the sample off the image.
    OutOfBounds,
    Candidate(Candidate),
}

/// Picks at most one jittered, masked point per grid cell.
pub struct CellSampler<'a> {
    mask: &'a ColorMask,
    jitter: f64,
    scale: f64,
    hits: Vec<(u32, u32)>,
}

impl<'a> CellSampler<'a> {
    pub fn new(mask: &'a ColorMask, jitter: f64, scale: u32) -> Self {
        CellSampler {
            mask,
            jitter,
            scale: f64::from(scale),
            hits: Vec::new(),
        }
    }

    /// Chooses one masked pixel of `cell` uniformly at random, then offsets it by up to
    /// `jitter` source pixels on each axis.
    pub fn sample(&mut self, cell: Cell, rng: &mut Rng) -> Sample {
        self.hits.clear();
        for y in cell.y0..cell.y1 {
            for x in cell.x0..cell.x1 {
                if self.mask.get(x, y) {
                    self.hits.push((x, y));
                }
            }
        }
        if self.hits.is_empty() {
            return Sample::Empty;
        }

        let (sx, sy) = self.hits[rng.index(self.hits.len())];
        let u = f64::from(sx) + rng.uniform(-self.jitter, self.jitter);
        let v = f64::from(sy) + rng.uniform(-self.jitter, self.jitter);

        // Ties round to even so that a half-pixel jitter lands on a stable pixel.
        let (px, py) = (u.round_ties_even(), v.round_ties_even());
        let (w, h) = (f64::from(self.mask.width()), f64::from(self.mask.height()));
        if px < 0.0 || px >= w || py < 0.0 || py >= h {
            return Sample::OutOfBounds;
        }
        // Pixel `(px, py)` covers `[px, px + 1)` on each axis; dots are centered on it.
        Sample::Candidate(Candidate {
            x: (u + 0.5) * self.scale,
            y: (v + 0.5) * self.scale,
            px: px as u32,
            py: py as u32,
        })
    }
}
