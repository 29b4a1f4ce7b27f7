//! Top-down sparse voxel octree generation over a heightmap pyramid.
//!
//! Every child cell of a node is classified from the pyramid bound at the node's level.
//! Uniform cells collapse into a tag word and are never visited again. Mixed cells get
//! a fresh node (or, at the chunk level, a fresh chunk) and the walk descends into them.

use glam::UVec3;
use octoterra_core::constants::{CHUNK_WIDTH, NODE_WIDTH};
use octoterra_core::{ChunkId, Error, NodeId, Result, TaggedAddress};
use octoterra_voxel::{Chunk, Node, PoolAllocator};
use tracing::info;

use crate::fill::ChunkFill;
use crate::heightmap::{HeightApprox, HeightPyramid, Heightmap};

/// How a cell relates to the terrain surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Every voxel is below every column's height.
    Solid,
    /// No column reaches into the cell.
    Empty,
    /// The surface crosses the cell.
    Mixed,
}

/// Classify the vertical voxel range `[z_low, z_high)` against a column height bound.
#[inline]
pub const fn classify(z_low: u32, z_high: u32, bound: HeightApprox) -> CellKind {
    if z_high <= bound.min {
        CellKind::Solid
    } else if z_low >= bound.max {
        CellKind::Empty
    } else {
        CellKind::Mixed
    }
}

/// Per-level cell counts gathered during generation. Diagnostic only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Air cells per level.
    pub empty: Vec<u32>,
    /// Uniform solid cells per level.
    pub uniform: Vec<u32>,
    /// Mixed cells per level. Level 0 counts chunks.
    pub mixed: Vec<u32>,
}

impl GenerationStats {
    /// Zeroed counters for a tree of `depth` levels.
    pub fn new(depth: u32) -> Self {
        Self {
            empty: vec![0; depth as usize],
            uniform: vec![0; depth as usize],
            mixed: vec![0; depth as usize],
        }
    }

    /// Number of chunks allocated.
    pub fn chunks(&self) -> u32 {
        self.mixed.first().copied().unwrap_or(0)
    }

    /// Every classified cell over all levels.
    pub fn total_cells(&self) -> u64 {
        [&self.empty, &self.uniform, &self.mixed]
            .iter()
            .flat_map(|counts| counts.iter())
            .map(|&n| u64::from(n))
            .sum()
    }

    /// Log one summary line per level, top level first.
    pub fn log(&self) {
        for level in (0..self.empty.len()).rev() {
            info!(
                "SVO level {} contains {} air nodes, {} uniform non-air nodes and {} {}.",
                level,
                self.empty[level],
                self.uniform[level],
                self.mixed[level],
                if level == 0 { "chunks" } else { "mixed nodes" }
            );
        }
    }
}

/// Builds the tree into a node pool and a chunk pool.
pub struct SvoGenerator<'a, F: ChunkFill + ?Sized> {
    pyramid: &'a HeightPyramid,
    heightmap: &'a Heightmap,
    node_pool: &'a mut PoolAllocator,
    chunk_pool: &'a mut PoolAllocator,
    fill: &'a mut F,
    stats: GenerationStats,
}

impl<'a, F: ChunkFill + ?Sized> SvoGenerator<'a, F> {
    pub fn new(
        pyramid: &'a HeightPyramid,
        heightmap: &'a Heightmap,
        node_pool: &'a mut PoolAllocator,
        chunk_pool: &'a mut PoolAllocator,
        fill: &'a mut F,
    ) -> Self {
        let stats = GenerationStats::new(pyramid.depth());
        Self {
            pyramid,
            heightmap,
            node_pool,
            chunk_pool,
            fill,
            stats,
        }
    }

    /// Allocate a root node and generate the whole tree under it.
    pub fn generate(mut self) -> Result<(NodeId, GenerationStats)> {
        let depth = self.pyramid.depth();
        if depth < 1 {
            return Err(Error::InvalidConfig("minimum SVO depth is 1".to_string()));
        }
        let root = self.alloc_node()?;
        self.generate_node(UVec3::ZERO, depth, root)?;
        Ok((root, self.stats))
    }

    /// Fill `node`, whose first child sits at `cell` in the grid one level below `level`.
    fn generate_node(&mut self, cell: UVec3, level: u32, node: NodeId) -> Result<()> {
        let level = level - 1;
        let span = CHUNK_WIDTH * NODE_WIDTH.pow(level);
        let slot = level as usize;

        for dx in 0..NODE_WIDTH {
            for dy in 0..NODE_WIDTH {
                for dz in 0..NODE_WIDTH {
                    let child = cell + UVec3::new(dx, dy, dz);
                    let bound = self.pyramid.level(level)?.get(child.x, child.y).ok_or_else(|| {
                        Error::OutOfBounds(format!(
                            "cell ({}, {}) outside heightmap level {level}",
                            child.x, child.y
                        ))
                    })?;

                    let z_low = child.z * span;
                    let word = match classify(z_low, z_low + span, bound) {
                        CellKind::Solid => {
                            self.stats.uniform[slot] += 1;
                            TaggedAddress::STONE
                        }
                        CellKind::Empty => {
                            self.stats.empty[slot] += 1;
                            TaggedAddress::AIR
                        }
                        CellKind::Mixed if level == 0 => {
                            let chunk = self.alloc_chunk()?;
                            let view = self.chunk_pool.get_as_mut::<Chunk>(chunk.0)?;
                            self.fill.fill(child * span, self.heightmap, view);
                            self.stats.mixed[slot] += 1;
                            TaggedAddress::chunk(chunk)?
                        }
                        CellKind::Mixed => {
                            let subnode = self.alloc_node()?;
                            self.stats.mixed[slot] += 1;
                            self.generate_node(child * NODE_WIDTH, level, subnode)?;
                            TaggedAddress::node(subnode)?
                        }
                    };

                    // Allocations above may have moved the pool; fetch the parent fresh.
                    self.node_pool
                        .get_as_mut::<Node>(node.0)?
                        .set_child(dx, dy, dz, word);
                }
            }
        }
        Ok(())
    }

    fn alloc_node(&mut self) -> Result<NodeId> {
        let index = self.node_pool.alloc()?;
        TaggedAddress::branch(index)?;
        Ok(NodeId(index))
    }

    fn alloc_chunk(&mut self) -> Result<ChunkId> {
        let index = self.chunk_pool.alloc()?;
        TaggedAddress::branch(index)?;
        Ok(ChunkId(index))
    }
}
