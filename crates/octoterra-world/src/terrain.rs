//! The terrain aggregate: both pools, the heightmaps, and the tree root.

use std::time::Instant;

use octoterra_core::constants::{CHUNK_WIDTH, NODE_WIDTH};
use octoterra_core::{ChunkId, Error, Material, NodeId, Result};
use octoterra_voxel::{Chunk, Node, PoolAllocator};
use tracing::info;

use crate::config::TerrainConfig;
use crate::fill::{ChunkFill, SurfaceFill};
use crate::generation::{HeightSource, NoiseHeight};
use crate::heightmap::{HeightPyramid, Heightmap};
use crate::svo::{GenerationStats, SvoGenerator};

/// A generated world, immutable once built.
///
/// Construction is all-or-nothing: on error nothing partially built escapes.
pub struct Terrain {
    chunk_pool: PoolAllocator,
    node_pool: PoolAllocator,
    root: NodeId,
    depth: u32,
    width: u32,
    width_chunks: u32,
    heightmap: Heightmap,
    pyramid: HeightPyramid,
    stats: GenerationStats,
    dirty: bool,
}

impl Terrain {
    /// Generate ridged-noise terrain with grass, dirt and stone chunks.
    pub fn new(config: &TerrainConfig) -> Result<Self> {
        config.validate()?;
        let width = world_width(config.depth);
        let heights = NoiseHeight::new(&config.noise, config.seed, width);
        Self::generate(config, &heights, &mut SurfaceFill::default())
    }

    /// Generate terrain from an arbitrary height oracle and chunk fill.
    pub fn generate<H, F>(config: &TerrainConfig, heights: &H, fill: &mut F) -> Result<Self>
    where
        H: HeightSource + ?Sized,
        F: ChunkFill + ?Sized,
    {
        config.validate()?;
        let depth = config.depth;
        let width_chunks = NODE_WIDTH.pow(depth);
        let width = world_width(depth);
        info!("SVO depth is set at {depth}. World is {width}x{width}x{width} voxels");

        let mut chunk_pool = PoolAllocator::for_type::<Chunk>(config.initial_pool_capacity)?;
        let mut node_pool = PoolAllocator::for_type::<Node>(config.initial_pool_capacity)?;

        let start = Instant::now();
        let (heightmap, pyramid) = HeightPyramid::build(heights, depth)?;
        let bound = pyramid.root();
        info!(
            "Generating heightmaps took {:.2}ms. Min height is {}, max height is {}.",
            start.elapsed().as_secs_f64() * 1e3,
            bound.min,
            bound.max
        );

        let start = Instant::now();
        let (root, stats) =
            SvoGenerator::new(&pyramid, &heightmap, &mut node_pool, &mut chunk_pool, fill)
                .generate()?;
        stats.log();
        info!(
            "Generating SVO from heightmaps took {:.2}ms ({} nodes, {} chunks)",
            start.elapsed().as_secs_f64() * 1e3,
            node_pool.len(),
            chunk_pool.len()
        );

        Ok(Self {
            chunk_pool,
            node_pool,
            root,
            depth,
            width,
            width_chunks,
            heightmap,
            pyramid,
            stats,
            dirty: true,
        })
    }

    /// Root node address.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Octree depth.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// World size in voxels per axis.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// World size in chunks per axis.
    pub fn width_chunks(&self) -> u32 {
        self.width_chunks
    }

    pub fn node_pool(&self) -> &PoolAllocator {
        &self.node_pool
    }

    pub fn chunk_pool(&self) -> &PoolAllocator {
        &self.chunk_pool
    }

    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    pub fn pyramid(&self) -> &HeightPyramid {
        &self.pyramid
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.node_pool.get_as(id.0)
    }

    pub fn chunk(&self, id: ChunkId) -> Result<&Chunk> {
        self.chunk_pool.get_as(id.0)
    }

    /// Whether pool contents changed since the renderer last uploaded them.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledge an upload. Only the renderer side calls this.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Material of the voxel at `(x, y, z)`. Positions outside the world are air.
    pub fn material_at(&self, x: u32, y: u32, z: u32) -> Result<Material> {
        if x >= self.width || y >= self.width || z >= self.width {
            return Ok(Material::AIR);
        }

        let mut node = self.node(self.root)?;
        let mut level = self.depth;
        loop {
            level -= 1;
            let span = CHUNK_WIDTH * NODE_WIDTH.pow(level);
            let word = node.child(
                (x / span) % NODE_WIDTH,
                (y / span) % NODE_WIDTH,
                (z / span) % NODE_WIDTH,
            );
            let tag = word.tag();
            if !tag.is_known() {
                return Err(Error::InvalidData(format!(
                    "node word {word:?} carries unknown tag {}",
                    tag.0
                )));
            }
            if !word.is_branch() {
                return Ok(tag);
            }
            if level == 0 {
                let chunk = self.chunk(ChunkId(word.address()))?;
                return Ok(chunk.get(x % CHUNK_WIDTH, y % CHUNK_WIDTH, z % CHUNK_WIDTH));
            }
            node = self.node(NodeId(word.address()))?;
        }
    }

    /// Get memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.node_pool.heap_usage()
            + self.chunk_pool.heap_usage()
            + std::mem::size_of_val(self.heightmap.as_slice())
            + self
                .pyramid
                .levels()
                .iter()
                .map(|level| std::mem::size_of_val(level.cells()))
                .sum::<usize>()
    }
}

fn world_width(depth: u32) -> u32 {
    CHUNK_WIDTH * NODE_WIDTH.pow(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::EmptyFill;
    use crate::generation::ConstantHeight;
    use glam::UVec3;
    use octoterra_core::TaggedAddress;

    fn config(depth: u32) -> TerrainConfig {
        TerrainConfig::default()
            .with_depth(depth)
            .with_initial_pool_capacity(4)
    }

    #[test]
    fn zero_depth_is_a_configuration_error() {
        let result = Terrain::generate(&config(0), &ConstantHeight(1), &mut EmptyFill);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn dimensions_follow_depth() {
        let terrain = Terrain::generate(&config(3), &ConstantHeight(0), &mut EmptyFill).unwrap();
        assert_eq!(terrain.depth(), 3);
        assert_eq!(terrain.width_chunks(), 8);
        assert_eq!(terrain.width(), 64);
        assert_eq!(terrain.heightmap().width(), 64);
        assert_eq!(terrain.pyramid().levels().len(), 4);
        assert!(terrain.is_dirty());
    }

    #[test]
    fn ground_level_world_is_all_air() {
        let terrain = Terrain::generate(&config(1), &ConstantHeight(0), &mut EmptyFill).unwrap();
        assert_eq!(terrain.stats().empty, vec![8]);
        assert_eq!(terrain.stats().uniform, vec![0]);
        assert_eq!(terrain.stats().mixed, vec![0]);
        assert_eq!(terrain.node_pool().len(), 1);
        assert_eq!(terrain.chunk_pool().len(), 0);

        let root = terrain.node(terrain.root()).unwrap();
        assert!(root.children.iter().all(|&w| w == TaggedAddress::AIR));
    }

    #[test]
    fn overfull_world_is_all_stone() {
        let terrain = Terrain::generate(&config(1), &ConstantHeight(1000), &mut EmptyFill).unwrap();
        assert_eq!(terrain.stats().uniform, vec![8]);
        assert_eq!(terrain.stats().empty, vec![0]);
        assert_eq!(terrain.chunk_pool().len(), 0);
        assert_eq!(terrain.node_pool().len(), 1);

        let root = terrain.node(terrain.root()).unwrap();
        assert!(root.children[..8].iter().all(|&w| w == TaggedAddress::STONE));
        assert_eq!(terrain.material_at(15, 15, 15).unwrap(), Material::STONE);
    }

    #[test]
    fn surface_in_upper_half_allocates_one_layer() {
        // Depth 2: 32 voxels tall. The surface at 20 sits inside the upper level-1 cells
        // and inside the lower of their level-0 cells.
        let terrain = Terrain::generate(&config(2), &ConstantHeight(20), &mut EmptyFill).unwrap();
        let stats = terrain.stats();

        assert_eq!(stats.uniform[1], 4);
        assert_eq!(stats.mixed[1], 4);
        assert_eq!(stats.empty[1], 0);
        assert_eq!(terrain.node_pool().len(), 1 + stats.mixed[1]);

        assert_eq!(stats.mixed[0], 16);
        assert_eq!(stats.empty[0], 16);
        assert_eq!(terrain.chunk_pool().len(), stats.mixed[0]);
    }

    #[test]
    fn surface_at_midpoint_lands_on_cell_boundary() {
        // Depth 2: 32 voxels tall, surface at 16. Columns are solid for z < 16, so every
        // level-1 cell is either fully below or fully above and nothing is mixed.
        let terrain = Terrain::generate(&config(2), &ConstantHeight(16), &mut EmptyFill).unwrap();
        let stats = terrain.stats();

        assert_eq!(stats.empty, vec![0, 4]);
        assert_eq!(stats.uniform, vec![0, 4]);
        assert_eq!(stats.mixed, vec![0, 0]);
        assert_eq!(terrain.node_pool().len(), 1);
        assert!(terrain.chunk_pool().is_empty());
        assert_eq!(terrain.material_at(5, 9, 15).unwrap(), Material::STONE);
        assert_eq!(terrain.material_at(5, 9, 16).unwrap(), Material::AIR);
    }

    #[test]
    fn material_lookup_matches_surface_fill() {
        let terrain = Terrain::generate(
            &config(2),
            &|x: u32, y: u32| 10 + (x + y) / 4,
            &mut SurfaceFill { dirt_depth: 2 },
        )
        .unwrap();
        let fill = SurfaceFill { dirt_depth: 2 };

        for x in (0..terrain.width()).step_by(3) {
            for y in (0..terrain.width()).step_by(5) {
                let height = terrain.heightmap().get(x, y).unwrap();
                for z in 0..terrain.width() {
                    let expected = fill.material_at(z, height);
                    let actual = terrain.material_at(x, y, z).unwrap();
                    // Collapsed solid cells report plain stone.
                    if actual == Material::STONE && expected.is_solid() {
                        continue;
                    }
                    assert_eq!(actual, expected, "voxel ({x}, {y}, {z}) height {height}");
                }
            }
        }
    }

    #[test]
    fn outside_positions_are_air() {
        let terrain = Terrain::generate(&config(1), &ConstantHeight(1000), &mut EmptyFill).unwrap();
        assert_eq!(terrain.material_at(16, 0, 0).unwrap(), Material::AIR);
        assert_eq!(terrain.material_at(0, 0, u32::MAX).unwrap(), Material::AIR);
    }

    #[test]
    fn fill_sees_absolute_origins() {
        let mut origins = Vec::new();
        let terrain = Terrain::generate(
            &config(2),
            &ConstantHeight(12),
            &mut |origin: UVec3, _: &Heightmap, _: &mut Chunk| origins.push(origin),
        )
        .unwrap();
        // Surface at 12 crosses the second chunk layer of every column.
        assert_eq!(origins.len(), 16);
        assert_eq!(terrain.chunk_pool().len(), 16);
        assert!(origins.iter().all(|o| o.z == 8));
        assert!(origins.contains(&UVec3::new(24, 24, 8)));
    }

    #[test]
    fn noise_terrain_builds() {
        let terrain = Terrain::new(&config(3)).unwrap();
        let bound = terrain.pyramid().root();
        assert!(bound.min >= terrain.width() / 4);
        assert!(bound.max <= terrain.width() * 3 / 4);
        assert!(!terrain.chunk_pool().is_empty());
        assert_eq!(terrain.chunk_pool().len(), terrain.stats().chunks());
        assert!(terrain.memory_usage() > 0);
    }

    #[test]
    fn memory_usage_sums_owned_storage() {
        let terrain = Terrain::generate(&config(2), &ConstantHeight(20), &mut EmptyFill).unwrap();
        let heightmaps: usize = std::mem::size_of_val(terrain.heightmap().as_slice())
            + terrain
                .pyramid()
                .levels()
                .iter()
                .map(|level| std::mem::size_of_val(level.cells()))
                .sum::<usize>();
        assert_eq!(
            terrain.memory_usage(),
            std::mem::size_of::<Terrain>()
                + terrain.node_pool().heap_usage()
                + terrain.chunk_pool().heap_usage()
                + heightmaps
        );
    }

    #[test]
    fn clearing_dirty_is_explicit() {
        let mut terrain = Terrain::generate(&config(1), &ConstantHeight(3), &mut EmptyFill).unwrap();
        assert!(terrain.is_dirty());
        terrain.clear_dirty();
        assert!(!terrain.is_dirty());
    }
}
