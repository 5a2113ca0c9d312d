// SPDX-License-Identifier: Apache-2.0
//! Per-structure dirty tracking with dependency expansion.
//!
//! Hosts mark which authoring aspects of a structure changed; the tracker
//! expands the mark through the derived-cache dependency table and stores
//! the result as a bit set per struct, optionally with an affected chunk
//! range. Records live in an array sorted by struct id.
//!
//! Dependency expansion (applied once per mark, before storage):
//!
//! | mark       | also sets                              |
//! |------------|----------------------------------------|
//! | FOOTPRINT  | VOLUME, ENCLOSURE, SURFACE, SUPPORT    |
//! | VOLUME     | ENCLOSURE, SURFACE, SUPPORT            |
//! | ENCLOSURE  | SURFACE                                |
//! | others     | (no further expansion)                 |

use crate::compile::chunk::ChunkCoord;
use crate::ident::StructId;

/// Bit set of stale compiled aspects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirtyFlags(u32);

impl DirtyFlags {
    /// Nothing stale.
    pub const NONE: Self = Self(0);
    /// Footprint geometry changed.
    pub const FOOTPRINT: Self = Self(0x01);
    /// Volume definitions changed.
    pub const VOLUME: Self = Self(0x02);
    /// Enclosure definitions changed.
    pub const ENCLOSURE: Self = Self(0x04);
    /// Surface templates or sockets changed.
    pub const SURFACE: Self = Self(0x08);
    /// Carrier intents changed.
    pub const CARRIER: Self = Self(0x10);
    /// Support inputs changed.
    pub const SUPPORT: Self = Self(0x20);
    /// Every aspect.
    pub const ALL: Self = Self(0x3F);

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when any bit of `other` is set in `self`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Apply the dependency expansion table.
    #[must_use]
    pub fn expand(self) -> Self {
        let mut out = self.0;
        if self.intersects(Self::FOOTPRINT) {
            out |= Self::VOLUME.0 | Self::ENCLOSURE.0 | Self::SURFACE.0 | Self::SUPPORT.0;
        }
        if self.intersects(Self::VOLUME) {
            out |= Self::ENCLOSURE.0 | Self::SURFACE.0 | Self::SUPPORT.0;
        }
        if self.intersects(Self::ENCLOSURE) {
            out |= Self::SURFACE.0;
        }
        Self(out)
    }
}

impl std::ops::BitOr for DirtyFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for DirtyFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Inclusive chunk range touched by a mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRange {
    /// Componentwise lower corner.
    pub min: ChunkCoord,
    /// Componentwise upper corner.
    pub max: ChunkCoord,
}

impl ChunkRange {
    fn normalized(a: ChunkCoord, b: ChunkCoord) -> Self {
        Self {
            min: ChunkCoord::new(a.cx.min(b.cx), a.cy.min(b.cy), a.cz.min(b.cz)),
            max: ChunkCoord::new(a.cx.max(b.cx), a.cy.max(b.cy), a.cz.max(b.cz)),
        }
    }

    fn merge(&mut self, other: Self) {
        self.min = ChunkCoord::new(
            self.min.cx.min(other.min.cx),
            self.min.cy.min(other.min.cy),
            self.min.cz.min(other.min.cz),
        );
        self.max = ChunkCoord::new(
            self.max.cx.max(other.max.cx),
            self.max.cy.max(other.max.cy),
            self.max.cz.max(other.max.cz),
        );
    }
}

/// One struct's dirty state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRecord {
    /// The marked structure.
    pub struct_id: StructId,
    /// Expanded stale-aspect bits.
    pub flags: DirtyFlags,
    /// Affected chunks, when the host knows them.
    pub chunks: Option<ChunkRange>,
}

/// Sorted-by-struct-id dirty record store.
#[derive(Clone, Debug, Default)]
pub struct DirtyTracker {
    records: Vec<DirtyRecord>,
}

impl DirtyTracker {
    /// New empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, ascending by struct id.
    #[must_use]
    pub fn records(&self) -> &[DirtyRecord] {
        &self.records
    }

    fn record_mut_or_add(&mut self, struct_id: StructId) -> &mut DirtyRecord {
        match self
            .records
            .binary_search_by(|r| r.struct_id.cmp(&struct_id))
        {
            Ok(i) => &mut self.records[i],
            Err(i) => {
                self.records.insert(
                    i,
                    DirtyRecord {
                        struct_id,
                        flags: DirtyFlags::NONE,
                        chunks: None,
                    },
                );
                &mut self.records[i]
            }
        }
    }

    /// OR-merge expanded flags into the struct's record. Zero struct ids and
    /// empty flag sets are ignored.
    pub fn mark(&mut self, struct_id: StructId, flags: DirtyFlags) {
        if struct_id.is_none() || flags.is_empty() {
            return;
        }
        let expanded = flags.expand();
        self.record_mut_or_add(struct_id).flags |= expanded;
    }

    /// Like [`Self::mark`], also merging an affected chunk range.
    pub fn mark_chunks(
        &mut self,
        struct_id: StructId,
        flags: DirtyFlags,
        a: ChunkCoord,
        b: ChunkCoord,
    ) {
        if struct_id.is_none() || flags.is_empty() {
            return;
        }
        let expanded = flags.expand();
        let range = ChunkRange::normalized(a, b);
        let rec = self.record_mut_or_add(struct_id);
        rec.flags |= expanded;
        match rec.chunks.as_mut() {
            Some(existing) => existing.merge(range),
            None => rec.chunks = Some(range),
        }
    }

    /// The record for a struct, if one exists.
    #[must_use]
    pub fn get(&self, struct_id: StructId) -> Option<&DirtyRecord> {
        if struct_id.is_none() {
            return None;
        }
        self.records
            .binary_search_by(|r| r.struct_id.cmp(&struct_id))
            .ok()
            .map(|i| &self.records[i])
    }

    /// Clear the masked flags. A record whose flags reach zero also loses
    /// its chunk range.
    pub fn clear_flags(&mut self, struct_id: StructId, mask: DirtyFlags) {
        if struct_id.is_none() {
            return;
        }
        if let Ok(i) = self
            .records
            .binary_search_by(|r| r.struct_id.cmp(&struct_id))
        {
            let rec = &mut self.records[i];
            rec.flags = DirtyFlags(rec.flags.0 & !mask.0);
            if rec.flags.is_empty() {
                rec.chunks = None;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn expansion_follows_dependency_table() {
        assert_eq!(DirtyFlags::FOOTPRINT.expand(), DirtyFlags(0x2F));
        assert_eq!(DirtyFlags::VOLUME.expand(), DirtyFlags(0x2E));
        assert_eq!(
            DirtyFlags::ENCLOSURE.expand(),
            DirtyFlags::ENCLOSURE | DirtyFlags::SURFACE
        );
        assert_eq!(DirtyFlags::SURFACE.expand(), DirtyFlags::SURFACE);
        assert_eq!(DirtyFlags::CARRIER.expand(), DirtyFlags::CARRIER);
        assert_eq!(DirtyFlags::SUPPORT.expand(), DirtyFlags::SUPPORT);
    }

    #[test]
    fn marks_merge_and_records_stay_sorted() {
        let mut t = DirtyTracker::new();
        t.mark(StructId(200), DirtyFlags::CARRIER);
        t.mark(StructId(100), DirtyFlags::ENCLOSURE);
        t.mark(StructId(200), DirtyFlags::SURFACE);
        let ids: Vec<_> = t.records().iter().map(|r| r.struct_id).collect();
        assert_eq!(ids, [StructId(100), StructId(200)]);
        assert_eq!(
            t.get(StructId(200)).unwrap().flags,
            DirtyFlags::CARRIER | DirtyFlags::SURFACE
        );
        t.mark(StructId::NONE, DirtyFlags::ALL);
        assert_eq!(t.records().len(), 2);
    }

    #[test]
    fn chunk_ranges_normalize_and_merge() {
        let mut t = DirtyTracker::new();
        t.mark_chunks(
            StructId(1),
            DirtyFlags::VOLUME,
            ChunkCoord::new(3, 0, 0),
            ChunkCoord::new(1, 2, 0),
        );
        let r = t.get(StructId(1)).unwrap().chunks.unwrap();
        assert_eq!(r.min, ChunkCoord::new(1, 0, 0));
        assert_eq!(r.max, ChunkCoord::new(3, 2, 0));
        t.mark_chunks(
            StructId(1),
            DirtyFlags::VOLUME,
            ChunkCoord::new(-1, 0, 0),
            ChunkCoord::new(-1, 0, 5),
        );
        let r = t.get(StructId(1)).unwrap().chunks.unwrap();
        assert_eq!(r.min, ChunkCoord::new(-1, 0, 0));
        assert_eq!(r.max, ChunkCoord::new(3, 2, 5));
    }

    #[test]
    fn clearing_all_flags_drops_chunk_range() {
        let mut t = DirtyTracker::new();
        t.mark_chunks(
            StructId(1),
            DirtyFlags::CARRIER,
            ChunkCoord::new(0, 0, 0),
            ChunkCoord::new(1, 1, 1),
        );
        t.clear_flags(StructId(1), DirtyFlags::CARRIER);
        let rec = t.get(StructId(1)).unwrap();
        assert!(rec.flags.is_empty());
        assert!(rec.chunks.is_none());
    }
}
