//! Voxelization of mixed leaf chunks.

use glam::UVec3;
use octoterra_core::constants::CHUNK_WIDTH;
use octoterra_core::Material;
use octoterra_voxel::Chunk;

use crate::heightmap::Heightmap;

/// Fills one freshly allocated, zeroed chunk slot.
///
/// The generator calls this exactly once per mixed leaf chunk, with the absolute voxel
/// coordinates of the chunk's origin corner.
pub trait ChunkFill {
    fn fill(&mut self, origin: UVec3, heightmap: &Heightmap, chunk: &mut Chunk);
}

impl<F> ChunkFill for F
where
    F: FnMut(UVec3, &Heightmap, &mut Chunk),
{
    fn fill(&mut self, origin: UVec3, heightmap: &Heightmap, chunk: &mut Chunk) {
        self(origin, heightmap, chunk);
    }
}

/// Leaves chunks as allocated (all air).
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyFill;

impl ChunkFill for EmptyFill {
    fn fill(&mut self, _origin: UVec3, _heightmap: &Heightmap, _chunk: &mut Chunk) {}
}

/// Grass over a dirt layer over stone, following the retained heightmap.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceFill {
    /// Dirt voxels between the grass top and the stone below.
    pub dirt_depth: u32,
}

impl Default for SurfaceFill {
    fn default() -> Self {
        Self { dirt_depth: 3 }
    }
}

impl SurfaceFill {
    /// Material at height `z` of a column holding `height` solid voxels.
    pub fn material_at(&self, z: u32, height: u32) -> Material {
        if z >= height {
            Material::AIR
        } else if z + 1 == height {
            Material::GRASS
        } else if z + 1 + self.dirt_depth >= height {
            Material::DIRT
        } else {
            Material::STONE
        }
    }
}

impl ChunkFill for SurfaceFill {
    fn fill(&mut self, origin: UVec3, heightmap: &Heightmap, chunk: &mut Chunk) {
        for y in 0..CHUNK_WIDTH {
            for x in 0..CHUNK_WIDTH {
                let height = heightmap.get(origin.x + x, origin.y + y).unwrap_or(0);
                for z in 0..CHUNK_WIDTH {
                    chunk.set(x, y, z, self.material_at(origin.z + z, height));
                }
            }
        }
    }
}
