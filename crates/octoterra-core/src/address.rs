//! Pool addresses and the packed node word format.
//!
//! Children are never linked by pointer. A node word carries an 8-bit material tag in its
//! top byte and a pool index in its low 24 bits, so the flat pools can be copied to the GPU
//! as-is and survive reallocation of their backing storage.

use bytemuck::{Pod, Zeroable};

use crate::constants::{ADDRESS_BITS, ADDRESS_MASK};
use crate::error::{Error, Result};
use crate::types::Material;

/// Index of a node slot in the node pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(pub u32);

/// Index of a chunk slot in the chunk pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ChunkId(pub u32);

/// One 32-bit node word: material tag (top 8 bits) and child index (low 24 bits).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct TaggedAddress(pub u32);

impl TaggedAddress {
    /// Uniform empty region.
    pub const AIR: Self = Self::uniform(Material::AIR);
    /// Uniform solid region.
    pub const STONE: Self = Self::uniform(Material::STONE);

    /// A collapsed region made entirely of `material`. The address bits are zero.
    #[inline]
    pub const fn uniform(material: Material) -> Self {
        Self((material.0 as u32) << ADDRESS_BITS)
    }

    /// A mixed region whose content lives at `index` in the next pool down.
    ///
    /// Fails with [`Error::AddressSpaceExhausted`] instead of masking when `index`
    /// needs more than 24 bits.
    pub fn branch(index: u32) -> Result<Self> {
        if index & !ADDRESS_MASK != 0 {
            return Err(Error::AddressSpaceExhausted { index });
        }
        Ok(Self(Self::uniform(Material::GRASS).0 | index))
    }

    /// Branch word pointing at a child node.
    #[inline]
    pub fn node(id: NodeId) -> Result<Self> {
        Self::branch(id.0)
    }

    /// Branch word pointing at a leaf chunk.
    #[inline]
    pub fn chunk(id: ChunkId) -> Result<Self> {
        Self::branch(id.0)
    }

    /// Material tag in the top byte.
    #[inline]
    pub const fn tag(self) -> Material {
        Material((self.0 >> ADDRESS_BITS) as u8)
    }

    /// Child index in the low 24 bits. Only meaningful for branch words.
    #[inline]
    pub const fn address(self) -> u32 {
        self.0 & ADDRESS_MASK
    }

    /// Whether this word descends into a child node or chunk.
    #[inline]
    pub const fn is_branch(self) -> bool {
        self.tag().0 == Material::GRASS.0
    }
}

impl std::fmt::Debug for TaggedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_branch() {
            write!(f, "Branch({})", self.address())
        } else {
            write!(f, "Uniform({})", self.tag().0)
        }
    }
}
