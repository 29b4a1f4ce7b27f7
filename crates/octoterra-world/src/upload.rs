//! Bridge between the terrain pools and a renderer's GPU buffers.
//!
//! The renderer owns one storage buffer per pool. Whenever the terrain is dirty the used
//! prefix of each pool is pushed again: a buffer whose byte length changed is
//! reallocated, otherwise its contents are overwritten in place.

use tracing::debug;

use crate::terrain::Terrain;

/// Which pool a buffer mirrors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// 256-byte tree nodes.
    Node,
    /// 512-byte leaf chunks.
    Chunk,
}

/// GPU-side storage the pools are mirrored into.
pub trait UploadTarget {
    type Error;

    /// Replace the buffer with a new one holding exactly `bytes`.
    fn allocate(&mut self, kind: PoolKind, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Overwrite the existing buffer, which already has `bytes.len()` bytes.
    fn write(&mut self, kind: PoolKind, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Tracks what the target currently holds so unchanged sizes skip reallocation.
#[derive(Debug, Default)]
pub struct PoolUploader {
    node_bytes: Option<usize>,
    chunk_bytes: Option<usize>,
}

impl PoolUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload both pools if the terrain is dirty, then clear the flag.
    ///
    /// Returns `Ok(false)` when there was nothing to do. On error the terrain stays dirty
    /// so the next call retries.
    pub fn sync<T: UploadTarget>(
        &mut self,
        terrain: &mut Terrain,
        target: &mut T,
    ) -> Result<bool, T::Error> {
        if !terrain.is_dirty() {
            return Ok(false);
        }

        Self::push(
            &mut self.node_bytes,
            PoolKind::Node,
            terrain.node_pool().as_bytes(),
            target,
        )?;
        Self::push(
            &mut self.chunk_bytes,
            PoolKind::Chunk,
            terrain.chunk_pool().as_bytes(),
            target,
        )?;

        terrain.clear_dirty();
        Ok(true)
    }

    /// Byte length last sent for `kind`, if any.
    pub fn uploaded_bytes(&self, kind: PoolKind) -> Option<usize> {
        match kind {
            PoolKind::Node => self.node_bytes,
            PoolKind::Chunk => self.chunk_bytes,
        }
    }

    fn push<T: UploadTarget>(
        held: &mut Option<usize>,
        kind: PoolKind,
        bytes: &[u8],
        target: &mut T,
    ) -> Result<(), T::Error> {
        if *held == Some(bytes.len()) {
            target.write(kind, bytes)?;
        } else {
            debug!(?kind, bytes = bytes.len(), "Reallocating pool buffer");
            target.allocate(kind, bytes)?;
            *held = Some(bytes.len());
        }
        Ok(())
    }
}
