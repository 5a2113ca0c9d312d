// SPDX-License-Identifier: Apache-2.0
//! Chunk-aligned spatial indices over compiled artifacts.
//!
//! One generic index serves all five caches; they differ only in payload
//! (a world box, or a position for support nodes). Entries live in a single
//! array in canonical lexicographic order by `(chunk, struct_id,
//! artifact_id)`, so walking an index is walking the canonical order.
//!
//! Capacity is fixed at `reserve` time. An insert that finds the index full
//! bumps `probe_refused` and reports a partial outcome instead of failing
//! the stage: results are never reordered to make room, and sizing the index
//! is host tuning, not engine correctness.

use super::chunk::{chunk_of_pos, chunk_range_for_aabb, ChunkCoord};
use crate::error::{CompileError, StageStatus};
use crate::ident::StructId;
use crate::math::{Aabb, Q, Vec3Q};

/// One index entry: canonical key plus payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpatialEntry<P> {
    /// Chunk cell this entry lives in.
    pub chunk: ChunkCoord,
    /// Owning structure.
    pub struct_id: StructId,
    /// Compiled artifact id (raw; the cache fixes the id class).
    pub artifact_id: u64,
    /// The artifact's box or position.
    pub payload: P,
}

/// Outcome of a single entry insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AddOutcome {
    Inserted,
    /// Key already present; payload overwritten (last wins).
    Updated,
    /// Index at capacity; entry dropped and `probe_refused` bumped.
    Refused,
}

/// Fixed-capacity sorted spatial index.
#[derive(Clone, Debug, Default)]
pub struct SpatialIndex<P> {
    entries: Vec<SpatialEntry<P>>,
    capacity: usize,
    probe_refused: u32,
}

impl<P: Copy> SpatialIndex<P> {
    /// New index with no storage; `reserve` before use.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            capacity: 0,
            probe_refused: 0,
        }
    }

    /// Allocate storage for exactly `capacity` entries, discarding any
    /// previous contents and counters.
    ///
    /// # Errors
    /// [`CompileError::AllocationFailed`] if the allocator refuses; prior
    /// state is left intact in that case.
    pub fn reserve(&mut self, capacity: u32) -> Result<(), CompileError> {
        let cap = capacity as usize;
        let mut fresh: Vec<SpatialEntry<P>> = Vec::new();
        fresh
            .try_reserve_exact(cap)
            .map_err(|_| CompileError::AllocationFailed)?;
        self.entries = fresh;
        self.capacity = cap;
        self.probe_refused = 0;
        Ok(())
    }

    /// Drop all entries, keeping storage and counters.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.entries.len() as u32
    }

    /// True when no entries are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reserved entry capacity.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    /// Total inserts refused for capacity since the last `reserve`.
    #[must_use]
    pub fn probe_refused(&self) -> u32 {
        self.probe_refused
    }

    /// All entries in canonical `(chunk, struct_id, artifact_id)` order.
    #[must_use]
    pub fn entries(&self) -> &[SpatialEntry<P>] {
        &self.entries
    }

    /// Remove every entry owned by `struct_id` in one pass. Returns the
    /// number removed.
    pub fn remove_struct(&mut self, struct_id: StructId) -> u32 {
        if struct_id.is_none() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|e| e.struct_id != struct_id);
        (before - self.entries.len()) as u32
    }

    fn lower_bound(&self, chunk: ChunkCoord, struct_id: StructId, artifact_id: u64) -> usize {
        self.entries.partition_point(|e| {
            (e.chunk, e.struct_id, e.artifact_id) < (chunk, struct_id, artifact_id)
        })
    }

    fn add_entry(
        &mut self,
        chunk: ChunkCoord,
        struct_id: StructId,
        artifact_id: u64,
        payload: P,
    ) -> Result<AddOutcome, CompileError> {
        if self.capacity == 0 {
            return Err(CompileError::SpatialUnreserved);
        }
        let pos = self.lower_bound(chunk, struct_id, artifact_id);
        if let Some(e) = self.entries.get_mut(pos) {
            if (e.chunk, e.struct_id, e.artifact_id) == (chunk, struct_id, artifact_id) {
                // TODO: next format revision should report hash-derived
                // artifact-id collisions instead of overwriting; last-wins
                // is the current compiled-state format.
                e.payload = payload;
                return Ok(AddOutcome::Updated);
            }
        }
        if self.entries.len() >= self.capacity {
            self.probe_refused += 1;
            return Ok(AddOutcome::Refused);
        }
        self.entries.insert(
            pos,
            SpatialEntry {
                chunk,
                struct_id,
                artifact_id,
                payload,
            },
        );
        Ok(AddOutcome::Inserted)
    }
}

impl SpatialIndex<Aabb> {
    /// Insert an artifact into every chunk its box overlaps.
    ///
    /// Stops at the first capacity refusal (remaining chunks for this
    /// artifact are skipped) and reports `Partial`; other artifacts are
    /// unaffected.
    ///
    /// # Errors
    /// [`CompileError::SpatialUnreserved`] when the index has no storage.
    pub(crate) fn add_spanning(
        &mut self,
        struct_id: StructId,
        artifact_id: u64,
        bbox: &Aabb,
        chunk_size: Q,
    ) -> Result<StageStatus, CompileError> {
        let (lo, hi) = chunk_range_for_aabb(bbox, chunk_size);
        for cz in lo.cz..=hi.cz {
            for cy in lo.cy..=hi.cy {
                for cx in lo.cx..=hi.cx {
                    let chunk = ChunkCoord::new(cx, cy, cz);
                    if self.add_entry(chunk, struct_id, artifact_id, *bbox)?
                        == AddOutcome::Refused
                    {
                        return Ok(StageStatus::Partial);
                    }
                }
            }
        }
        Ok(StageStatus::Complete)
    }
}

impl SpatialIndex<Vec3Q> {
    /// Insert a point artifact into the single chunk containing it.
    ///
    /// # Errors
    /// [`CompileError::SpatialUnreserved`] when the index has no storage.
    pub(crate) fn add_at(
        &mut self,
        struct_id: StructId,
        artifact_id: u64,
        pos: Vec3Q,
        chunk_size: Q,
    ) -> Result<StageStatus, CompileError> {
        let chunk = chunk_of_pos(pos, chunk_size);
        match self.add_entry(chunk, struct_id, artifact_id, pos)? {
            AddOutcome::Refused => Ok(StageStatus::Partial),
            AddOutcome::Inserted | AddOutcome::Updated => Ok(StageStatus::Complete),
        }
    }
}
