//! Multi-resolution min/max heightmap pyramid.
//!
//! Level 0 holds one bound per chunk column (8x8 voxel columns). Each level above merges
//! 2x2 cells of the level below, up to a single cell covering the whole world at level
//! `depth`. The SVO generator reads the bound at a node's level to classify the node's
//! whole subtree without touching individual voxels.

use bytemuck::{Pod, Zeroable};
use octoterra_core::constants::{CHUNK_WIDTH, MAX_DEPTH, NODE_WIDTH};
use octoterra_core::{Error, Result};
use tracing::debug;

use crate::generation::HeightSource;

/// Minimum and maximum column height over a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct HeightApprox {
    pub min: u32,
    pub max: u32,
}

impl HeightApprox {
    /// Bound that any sample will tighten.
    pub const EMPTY: Self = Self {
        min: u32::MAX,
        max: 0,
    };

    /// Widen the bound to include `height`.
    #[inline]
    #[must_use]
    pub const fn include(self, height: u32) -> Self {
        Self {
            min: if height < self.min { height } else { self.min },
            max: if height > self.max { height } else { self.max },
        }
    }

    /// Union of two bounds.
    #[inline]
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            min: if other.min < self.min { other.min } else { self.min },
            max: if other.max > self.max { other.max } else { self.max },
        }
    }
}

/// Finest-resolution column heights, one per voxel column, x fastest.
#[derive(Clone, Debug)]
pub struct Heightmap {
    width: u32,
    heights: Vec<u32>,
}

impl Heightmap {
    /// Width in voxel columns per axis.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of column `(x, y)`, or `None` outside the world.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.width {
            return None;
        }
        self.heights
            .get(x as usize + y as usize * self.width as usize)
            .copied()
    }

    /// Raw heights, row by row.
    pub fn as_slice(&self) -> &[u32] {
        &self.heights
    }
}

/// One square grid of bounds.
#[derive(Clone, Debug)]
pub struct HeightLevel {
    side: u32,
    cells: Vec<HeightApprox>,
}

impl HeightLevel {
    /// Cells per axis.
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Bound of cell `(x, y)`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<HeightApprox> {
        if x >= self.side || y >= self.side {
            return None;
        }
        self.cells
            .get(x as usize + y as usize * self.side as usize)
            .copied()
    }

    pub fn cells(&self) -> &[HeightApprox] {
        &self.cells
    }
}

/// Bounds for every tree level, finest first.
#[derive(Clone, Debug)]
pub struct HeightPyramid {
    levels: Vec<HeightLevel>,
}

impl HeightPyramid {
    /// Sample `source` over a `(CHUNK_WIDTH * NODE_WIDTH^depth)^2` column world and
    /// aggregate the bounds up to a single root cell.
    ///
    /// Returns the retained finest heightmap alongside the pyramid. Depths past
    /// [`MAX_DEPTH`] are rejected since the world width would not fit a `u32`.
    pub fn build<H: HeightSource + ?Sized>(source: &H, depth: u32) -> Result<(Heightmap, Self)> {
        if depth > MAX_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "heightmap depth {depth} exceeds the maximum of {MAX_DEPTH}"
            )));
        }
        let width_chunks = NODE_WIDTH.pow(depth);
        let width = CHUNK_WIDTH * width_chunks;

        let mut heights = try_filled(square(width)?, 0u32)?;
        let mut levels = Vec::with_capacity(depth as usize + 1);

        debug!(
            "Generating heightmap of size {width_chunks}x{width_chunks}, with one heightmap entry being one {CHUNK_WIDTH}x{CHUNK_WIDTH} chunk."
        );
        let mut cells = try_filled(square(width_chunks)?, HeightApprox::EMPTY)?;
        for cy in 0..width_chunks {
            for cx in 0..width_chunks {
                let mut bound = HeightApprox::EMPTY;
                for dy in 0..CHUNK_WIDTH {
                    for dx in 0..CHUNK_WIDTH {
                        let hx = cx * CHUNK_WIDTH + dx;
                        let hy = cy * CHUNK_WIDTH + dy;
                        let h = source.height(hx, hy);
                        heights[hx as usize + hy as usize * width as usize] = h;
                        bound = bound.include(h);
                    }
                }
                cells[cx as usize + cy as usize * width_chunks as usize] = bound;
            }
        }
        levels.push(HeightLevel {
            side: width_chunks,
            cells,
        });

        for level in 1..=depth {
            let below = &levels[level as usize - 1];
            let side = below.side / NODE_WIDTH;
            let span = CHUNK_WIDTH * NODE_WIDTH.pow(level);
            debug!(
                "Generating sub-heightmap of size {side}x{side} with each entry covering one {span}x{span} level {level} node."
            );

            let mut cells = try_filled(square(side)?, HeightApprox::EMPTY)?;
            for cy in 0..side {
                for cx in 0..side {
                    let mut bound = HeightApprox::EMPTY;
                    for dy in 0..NODE_WIDTH {
                        for dx in 0..NODE_WIDTH {
                            let x = cx * NODE_WIDTH + dx;
                            let y = cy * NODE_WIDTH + dy;
                            let index = x as usize + y as usize * below.side as usize;
                            bound = bound.merge(below.cells[index]);
                        }
                    }
                    cells[cx as usize + cy as usize * side as usize] = bound;
                }
            }
            levels.push(HeightLevel { side, cells });
        }

        Ok((Heightmap { width, heights }, Self { levels }))
    }

    /// Number of tree levels, i.e. `levels - 1`.
    pub fn depth(&self) -> u32 {
        self.levels.len() as u32 - 1
    }

    /// Grid at `level`, 0 being the per-chunk grid.
    pub fn level(&self, level: u32) -> Result<&HeightLevel> {
        self.levels.get(level as usize).ok_or_else(|| {
            Error::OutOfBounds(format!(
                "heightmap level {level} requested from a pyramid of depth {}",
                self.depth()
            ))
        })
    }

    /// Bound over the whole world.
    pub fn root(&self) -> HeightApprox {
        self.levels
            .last()
            .and_then(|level| level.cells.first().copied())
            .unwrap_or(HeightApprox::EMPTY)
    }

    pub fn levels(&self) -> &[HeightLevel] {
        &self.levels
    }
}

fn square(side: u32) -> Result<usize> {
    (side as usize).checked_mul(side as usize).ok_or_else(|| {
        Error::OutOfMemory(format!(
            "{side}x{side} heightmap overflows the address space"
        ))
    })
}

fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|e| Error::OutOfMemory(format!("allocating {len} heightmap entries: {e}")))?;
    v.resize(len, value);
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ConstantHeight;

    /// Non-trivial terrain: a ramp with some hash noise so neighbouring cells differ.
    fn bumpy(x: u32, y: u32) -> u32 {
        let hash = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
        x / 2 + y + hash % 5
    }

    #[test]
    fn level_sizes() {
        let (heightmap, pyramid) = HeightPyramid::build(&ConstantHeight(3), 3).unwrap();
        assert_eq!(heightmap.width(), 64);
        assert_eq!(heightmap.as_slice().len(), 64 * 64);
        assert_eq!(pyramid.depth(), 3);
        let sides: Vec<u32> = pyramid.levels().iter().map(HeightLevel::side).collect();
        assert_eq!(sides, vec![8, 4, 2, 1]);
    }

    #[test]
    fn constant_source_gives_flat_bounds() {
        let (_, pyramid) = HeightPyramid::build(&ConstantHeight(42), 2).unwrap();
        for level in pyramid.levels() {
            for cell in level.cells() {
                assert_eq!(*cell, HeightApprox { min: 42, max: 42 });
            }
        }
    }

    #[test]
    fn level_zero_matches_sampled_columns() {
        let (heightmap, pyramid) = HeightPyramid::build(&bumpy, 3).unwrap();
        let level0 = pyramid.level(0).unwrap();
        for cy in 0..level0.side() {
            for cx in 0..level0.side() {
                let mut expected = HeightApprox::EMPTY;
                for y in cy * CHUNK_WIDTH..(cy + 1) * CHUNK_WIDTH {
                    for x in cx * CHUNK_WIDTH..(cx + 1) * CHUNK_WIDTH {
                        let h = heightmap.get(x, y).unwrap();
                        assert_eq!(h, bumpy(x, y));
                        expected = expected.include(h);
                    }
                }
                assert_eq!(level0.get(cx, cy), Some(expected));
            }
        }
    }

    #[test]
    fn upper_levels_aggregate_children() {
        let (_, pyramid) = HeightPyramid::build(&bumpy, 4).unwrap();
        for level in 1..=pyramid.depth() {
            let upper = pyramid.level(level).unwrap();
            let lower = pyramid.level(level - 1).unwrap();
            for cy in 0..upper.side() {
                for cx in 0..upper.side() {
                    let cell = upper.get(cx, cy).unwrap();
                    assert!(cell.min <= cell.max);
                    let children = [
                        lower.get(2 * cx, 2 * cy).unwrap(),
                        lower.get(2 * cx + 1, 2 * cy).unwrap(),
                        lower.get(2 * cx, 2 * cy + 1).unwrap(),
                        lower.get(2 * cx + 1, 2 * cy + 1).unwrap(),
                    ];
                    assert_eq!(cell.min, children.iter().map(|c| c.min).min().unwrap());
                    assert_eq!(cell.max, children.iter().map(|c| c.max).max().unwrap());
                }
            }
        }
    }

    #[test]
    fn root_bounds_whole_world() {
        let (heightmap, pyramid) = HeightPyramid::build(&bumpy, 3).unwrap();
        let root = pyramid.root();
        assert_eq!(root.min, *heightmap.as_slice().iter().min().unwrap());
        assert_eq!(root.max, *heightmap.as_slice().iter().max().unwrap());
    }

    #[test]
    fn out_of_range_lookups() {
        let (heightmap, pyramid) = HeightPyramid::build(&ConstantHeight(1), 1).unwrap();
        assert_eq!(heightmap.get(16, 0), None);
        assert_eq!(pyramid.level(1).unwrap().get(1, 0), None);
        assert!(matches!(pyramid.level(2), Err(Error::OutOfBounds(_))));
    }

    #[test]
    fn depth_past_maximum_is_rejected() {
        let result = HeightPyramid::build(&ConstantHeight(1), MAX_DEPTH + 2);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        let result = HeightPyramid::build(&ConstantHeight(1), u32::MAX);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
