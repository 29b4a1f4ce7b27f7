//! Fixed-slot pool allocator.
//!
//! A pool is one contiguous buffer of equally sized slots handed out as `u32` indices.
//! Indices stay valid across growth because they are offsets, not pointers, and the used
//! prefix of the buffer is exactly what gets uploaded to a GPU storage buffer.
//!
//! Slots are never freed. A view returned by [`PoolAllocator::get_mut`] borrows the pool
//! mutably, so the borrow checker rejects holding it across an [`PoolAllocator::alloc`]
//! that could move the backing storage.

use bytemuck::Pod;
use octoterra_core::{Error, Result};
use tracing::debug;

const WORD: usize = std::mem::size_of::<u32>();

/// Growable arena of fixed-size slots addressed by index.
#[derive(Clone, Debug)]
pub struct PoolAllocator {
    /// Bytes per slot.
    unit_size: usize,
    /// Slots in use, which is also the next index handed out.
    size: u32,
    /// Slots currently backed by reserved storage.
    max_size: u32,
    /// Backing storage. Kept as words so typed views of `u32`-aligned records are valid.
    /// Its length is always `size * unit_size / 4`.
    memory: Vec<u32>,
}

impl PoolAllocator {
    /// Create a pool with room for `initial_capacity` slots of `unit_size` bytes.
    ///
    /// `unit_size` must be a non-zero multiple of 4.
    pub fn new(initial_capacity: u32, unit_size: usize) -> Result<Self> {
        if unit_size == 0 || unit_size % WORD != 0 {
            return Err(Error::InvalidConfig(format!(
                "pool unit size must be a non-zero multiple of {WORD} bytes, got {unit_size}"
            )));
        }

        let mut pool = Self {
            unit_size,
            size: 0,
            max_size: 0,
            memory: Vec::new(),
        };
        pool.reserve_slots(initial_capacity)?;
        Ok(pool)
    }

    /// Create a pool whose slots hold one `T` each.
    pub fn for_type<T: Pod>(initial_capacity: u32) -> Result<Self> {
        Self::new(initial_capacity, std::mem::size_of::<T>())
    }

    /// Hand out the next free slot, growing the pool if it is full.
    ///
    /// The new slot is zeroed. All previously returned indices stay valid.
    pub fn alloc(&mut self) -> Result<u32> {
        if self.size == self.max_size {
            let grown = self.max_size.saturating_mul(2).max(1);
            if grown == self.max_size {
                return Err(Error::OutOfMemory(format!(
                    "pool of {}-byte slots cannot index more than {} slots",
                    self.unit_size, self.max_size
                )));
            }
            debug!(
                unit_size = self.unit_size,
                from = self.max_size,
                to = grown,
                "Growing pool"
            );
            self.reserve_slots(grown)?;
        }

        let index = self.size;
        self.memory.resize(self.memory.len() + self.unit_words(), 0);
        self.size += 1;
        Ok(index)
    }

    /// Read-only view of a slot's bytes.
    pub fn get(&self, index: u32) -> Result<&[u8]> {
        let range = self.slot_range(index)?;
        Ok(bytemuck::cast_slice(&self.memory[range]))
    }

    /// Mutable view of a slot's bytes.
    ///
    /// The view must be dropped before the next [`alloc`](Self::alloc) on this pool.
    pub fn get_mut(&mut self, index: u32) -> Result<&mut [u8]> {
        let range = self.slot_range(index)?;
        Ok(bytemuck::cast_slice_mut(&mut self.memory[range]))
    }

    /// Slot viewed as a `T`. `T` must be exactly `unit_size` bytes.
    pub fn get_as<T: Pod>(&self, index: u32) -> Result<&T> {
        let bytes = self.get(index)?;
        bytemuck::try_from_bytes(bytes)
            .map_err(|e| Error::InvalidData(format!("slot {index} is not a valid record: {e}")))
    }

    /// Slot viewed as a mutable `T`. `T` must be exactly `unit_size` bytes.
    pub fn get_as_mut<T: Pod>(&mut self, index: u32) -> Result<&mut T> {
        let bytes = self.get_mut(index)?;
        bytemuck::try_from_bytes_mut(bytes)
            .map_err(|e| Error::InvalidData(format!("slot {index} is not a valid record: {e}")))
    }

    /// Bytes of every slot in use, `len() * unit_size()` long. This is the GPU upload payload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.memory)
    }

    /// Number of slots in use.
    pub fn len(&self) -> u32 {
        self.size
    }

    /// Whether no slot has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of slots backed by reserved storage.
    pub fn capacity(&self) -> u32 {
        self.max_size
    }

    /// Bytes per slot.
    pub fn unit_size(&self) -> usize {
        self.unit_size
    }

    /// Get memory usage in bytes, including reserved but unused slots.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.heap_usage()
    }

    /// Bytes reserved for slot storage, excluding the pool struct itself.
    pub fn heap_usage(&self) -> usize {
        self.memory.capacity() * WORD
    }

    fn unit_words(&self) -> usize {
        self.unit_size / WORD
    }

    fn slot_range(&self, index: u32) -> Result<std::ops::Range<usize>> {
        if index >= self.size {
            return Err(Error::OutOfBounds(format!(
                "slot {index} requested from a pool of {} slots",
                self.size
            )));
        }
        let start = index as usize * self.unit_words();
        Ok(start..start + self.unit_words())
    }

    /// Make sure storage for `slots` slots is reserved without moving `size`.
    fn reserve_slots(&mut self, slots: u32) -> Result<()> {
        let words = (slots as usize)
            .checked_mul(self.unit_words())
            .ok_or_else(|| {
                Error::OutOfMemory(format!(
                    "{slots} slots of {} bytes overflow the address space",
                    self.unit_size
                ))
            })?;
        let additional = words.saturating_sub(self.memory.len());
        self.memory.try_reserve_exact(additional).map_err(|e| {
            Error::OutOfMemory(format!(
                "reserving {slots} slots of {} bytes: {e}",
                self.unit_size
            ))
        })?;
        self.max_size = slots.max(self.max_size);
        Ok(())
    }
}
