//! Voxel material values.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Material byte shared by chunk voxels and node tags.
///
/// Material 0 is reserved for air so that zeroed pool memory decodes as empty space.
/// In the tag byte of a node word, [`Material::GRASS`] doubles as the "descend" marker:
/// the low 24 bits then address a child node or chunk.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct Material(pub u8);

impl Material {
    /// Air (empty space)
    pub const AIR: Self = Self(0);
    /// Stone
    pub const STONE: Self = Self(1);
    /// Dirt
    pub const DIRT: Self = Self(2);
    /// Grass, also the mixed-region tag in node words
    pub const GRASS: Self = Self(3);

    /// Returns true if this material is air (empty)
    #[inline]
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this material is solid (not air)
    #[inline]
    pub const fn is_solid(self) -> bool {
        self.0 != 0
    }

    /// Returns true for the materials the generator knows how to produce.
    #[inline]
    pub const fn is_known(self) -> bool {
        self.0 <= Self::GRASS.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_zero() {
        assert!(Material::AIR.is_air());
        assert!(!Material::AIR.is_solid());
        assert_eq!(Material::default(), Material::AIR);
    }

    #[test]
    fn solid_materials() {
        for material in [Material::STONE, Material::DIRT, Material::GRASS] {
            assert!(material.is_solid());
            assert!(material.is_known());
        }
        assert!(!Material(200).is_known());
    }
}
