//! Flat, GPU-uploadable voxel storage for the Octoterra terrain.
//!
//! Tree nodes and leaf chunks live in [`PoolAllocator`]s and reference each other by
//! 24-bit pool index, never by pointer.

pub mod node;
pub mod pool;

pub use node::{Chunk, Node};
pub use pool::PoolAllocator;
