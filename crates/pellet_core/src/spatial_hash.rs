//! Uniform grid broad phase over the simulation viewport.
//!
//! The grid is rebuilt from scratch every sub-step. Bodies are bucketed by
//! `floor((pos + half_extent) / 2 / CELL)`, so a cell spans `2 * CELL` world
//! units and any two overlapping circles (radius at most `CELL`) land in the
//! same or an adjacent cell. Positions outside the grid are dropped, not
//! clamped: such a body takes part in no pair test that sub-step.

use crate::math::clamp_ordered;
use glam::Vec2;

/// Largest spawnable radius; doubles as the grid cell size.
pub const BIGGER_RADIUS: f32 = 4.0;
/// Smallest spawnable radius.
pub const SMALLER_RADIUS: f32 = 2.0;
/// Clamp a radius into `[0, BIGGER_RADIUS]`, the range the grid can pair.
/// NaN becomes `SMALLER_RADIUS`.
#[inline]
pub fn fit_radius(radius: f32) -> f32 {
    if radius.is_nan() {
        return SMALLER_RADIUS;
    }
    clamp_ordered(radius, 0.0, BIGGER_RADIUS)
}

/// Entries reserved per bucket whenever the grid is resized.
pub const BUCKET_RESERVE: usize = 8;

/// Neighbour offsets visited from each cell.
///
/// Five of the nine 3x3 offsets: every unordered pair of adjacent cells is
/// reached from exactly one side, and `(0, 0)` covers the cell itself.
pub const HALF_STENCIL: [(i32, i32); 5] = [(0, -1), (0, 0), (1, -1), (1, 0), (1, 1)];

/// Flat `width x height` array of index buckets.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    width: u32,
    height: u32,
    half_extent: Vec2,
    buckets: Vec<Vec<u32>>,
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid dimensions for a viewport half-extent.
    pub fn dims_for(half_extent: Vec2) -> (u32, u32) {
        let w = (half_extent.x / BIGGER_RADIUS).ceil().max(0.0) as u32;
        let h = (half_extent.y / BIGGER_RADIUS).ceil().max(0.0) as u32;
        (w, h)
    }

    /// Reallocate buckets if the viewport changed size.
    pub fn resize(&mut self, half_extent: Vec2) {
        if half_extent == self.half_extent && !self.buckets.is_empty() {
            return;
        }
        let (width, height) = Self::dims_for(half_extent);
        self.width = width;
        self.height = height;
        self.half_extent = half_extent;
        self.buckets = (0..(width as usize * height as usize))
            .map(|_| Vec::with_capacity(BUCKET_RESERVE))
            .collect();
        tracing::debug!(width, height, "spatial grid resized");
    }

    /// Clear every bucket and refill from `(index, position)` pairs.
    pub fn rebuild<I>(&mut self, half_extent: Vec2, bodies: I)
    where
        I: IntoIterator<Item = (u32, Vec2)>,
    {
        self.resize(half_extent);
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        for (index, pos) in bodies {
            if let Some((x, y)) = self.cell_of(pos) {
                let slot = self.flat(x, y);
                self.buckets[slot].push(index);
            }
        }
    }

    /// Cell containing `pos`, or `None` when it falls outside the grid.
    pub fn cell_of(&self, pos: Vec2) -> Option<(u32, u32)> {
        let gx = ((pos.x + self.half_extent.x) / 2.0 / BIGGER_RADIUS).floor();
        let gy = ((pos.y + self.half_extent.y) / 2.0 / BIGGER_RADIUS).floor();
        let in_x = gx >= 0.0 && gx < self.width as f32;
        let in_y = gy >= 0.0 && gy < self.height as f32;
        (in_x && in_y).then(|| (gx as u32, gy as u32))
    }

    #[inline]
    fn flat(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bucket(&self, x: u32, y: u32) -> &[u32] {
        if x >= self.width || y >= self.height {
            return &[];
        }
        &self.buckets[self.flat(x, y)]
    }

    /// Number of bodies currently bucketed.
    pub fn occupied(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Call `f(a, b)` once for every unordered pair of bodies in the same or
    /// 8-adjacent cells. Returns the number of calls.
    pub fn for_each_candidate_pair<F>(&self, mut f: F) -> usize
    where
        F: FnMut(u32, u32),
    {
        let mut tested = 0;
        for x in 0..self.width as i32 {
            for y in 0..self.height as i32 {
                let cell = &self.buckets[self.flat(x as u32, y as u32)];
                for &id in cell {
                    for &(dx, dy) in &HALF_STENCIL {
                        let nx = x + dx;
                        let ny = y + dy;
                        if nx < 0 || ny < 0 || nx >= self.width as i32 || ny >= self.height as i32 {
                            continue;
                        }
                        let same_cell = dx == 0 && dy == 0;
                        for &neighbor in &self.buckets[self.flat(nx as u32, ny as u32)] {
                            if same_cell && id >= neighbor {
                                continue;
                            }
                            f(id, neighbor);
                            tested += 1;
                        }
                    }
                }
            }
        }
        tested
    }
}
