// SPDX-License-Identifier: Apache-2.0
//! Enclosure stage: room nodes and canonicalized aperture edges.
//!
//! One room per referenced enclosure; the room box is the union of the boxes
//! of the enclosure's volumes as compiled by the occupancy stage. Each
//! aperture becomes one edge, canonicalized so `room_a <= room_b` before
//! sorting by `(room_a, room_b, kind, id)`.

use super::occupancy::{find_region_by_volume, OccRegion};
use super::spatial::SpatialIndex;
use crate::error::{CompileError, StageStatus};
use crate::ident::{self, EnclosureId, RoomEdgeId, RoomId, StructId};
use crate::math::Aabb;
use crate::model::{ApertureKind, Instance};

/// One compiled room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomNode {
    /// Derived room id.
    pub id: RoomId,
    /// Owning structure.
    pub struct_id: StructId,
    /// Source enclosure.
    pub enclosure_id: EnclosureId,
    /// Union of the member volumes' world boxes; degenerate when none
    /// resolved.
    pub bbox_world: Aabb,
}

/// One compiled adjacency edge between rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomEdge {
    /// Derived edge id (hashed from the authored aperture identity).
    pub id: RoomEdgeId,
    /// Lower endpoint; [`RoomId::EXTERIOR`] for outside.
    pub room_a: RoomId,
    /// Upper endpoint (`room_a <= room_b`).
    pub room_b: RoomId,
    /// Aperture kind.
    pub kind: ApertureKind,
}

impl RoomEdge {
    fn sort_key(&self) -> (RoomId, RoomId, u32, RoomEdgeId) {
        (self.room_a, self.room_b, self.kind.as_u32(), self.id)
    }
}

/// Rebuild one struct's room graph and room spatial entries.
pub(crate) fn rebuild(
    rooms: &mut Vec<RoomNode>,
    edges: &mut Vec<RoomEdge>,
    spatial: &mut SpatialIndex<Aabb>,
    inst: &Instance,
    occupancy: &[OccRegion],
    ctx: super::StageCtx<'_, '_>,
) -> Result<StageStatus, CompileError> {
    let super::StageCtx {
        struct_id,
        resolver,
        chunk_size,
        ..
    } = ctx;
    if struct_id.is_none() {
        return Err(CompileError::NullStructId);
    }
    if !chunk_size.is_positive() {
        return Err(CompileError::ChunkSizeInvalid);
    }

    // One allocation per rebuild: edge capacity is the aperture sum.
    let edge_cap: usize = inst
        .enclosure_ids()
        .iter()
        .filter_map(|&eid| resolver.enclosure(eid))
        .map(|e| e.apertures().len())
        .sum();
    rooms.clear();
    rooms.reserve(inst.enclosure_ids().len());
    edges.clear();
    edges.reserve(edge_cap);

    spatial.remove_struct(struct_id);

    for &eid in inst.enclosure_ids() {
        let e = resolver
            .enclosure(eid)
            .ok_or(CompileError::MissingEnclosure(eid))?;
        let mut bbox: Option<Aabb> = None;
        for &vid in e.volume_ids() {
            if let Some(region) = find_region_by_volume(occupancy, vid) {
                match bbox.as_mut() {
                    Some(b) => b.union_with(&region.bbox_world),
                    None => bbox = Some(region.bbox_world),
                }
            }
        }
        let room = RoomNode {
            id: ident::room_id(struct_id, eid),
            struct_id,
            enclosure_id: eid,
            bbox_world: bbox.unwrap_or_default(),
        };
        // Rooms sort by hashed id, not enclosure order; insert in place.
        match rooms.binary_search_by(|r| r.id.cmp(&room.id)) {
            Ok(i) => rooms[i] = room,
            Err(i) => rooms.insert(i, room),
        }
    }

    for &eid in inst.enclosure_ids() {
        let e = resolver
            .enclosure(eid)
            .ok_or(CompileError::MissingEnclosure(eid))?;
        for ap in e.apertures() {
            let ra = ident::room_id(struct_id, eid);
            let dst = ap.to_enclosure;
            let rb = if !dst.is_none() && inst.enclosure_ids().binary_search(&dst).is_ok() {
                ident::room_id(struct_id, dst)
            } else {
                RoomId::EXTERIOR
            };
            let (lo, hi) = if rb < ra { (rb, ra) } else { (ra, rb) };
            let edge = RoomEdge {
                id: ident::room_edge_id(struct_id, eid, ap.aperture_id, dst, ap.kind.as_u32()),
                room_a: lo,
                room_b: hi,
                kind: ap.kind,
            };
            let pos = edges.partition_point(|x| x.sort_key() < edge.sort_key());
            edges.insert(pos, edge);
        }
    }

    let mut status = StageStatus::Complete;
    for room in rooms.as_slice() {
        status =
            status.merge(spatial.add_spanning(struct_id, room.id.0, &room.bbox_world, chunk_size)?);
    }
    Ok(status)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::super::StageCtx;
    use super::*;
    use crate::ident::VolumeId;
    use crate::math::{Q, Vec3Q};
    use crate::model::input::Resolver;
    use crate::model::{Aperture, AuthoringInput, Enclosure};

    fn ctx<'r, 'a>(resolver: &'r Resolver<'a>) -> StageCtx<'r, 'a> {
        StageCtx {
            struct_id: StructId(100),
            resolver,
            tick: 1,
            chunk_size: Q::from_int(16),
        }
    }

    fn region(struct_id: u64, volume: u64, lo: i64, hi: i64) -> OccRegion {
        OccRegion {
            id: ident::region_id(StructId(struct_id), VolumeId(volume), true),
            struct_id: StructId(struct_id),
            volume_id: VolumeId(volume),
            is_void: true,
            bbox_world: Aabb::new(Vec3Q::from_int(lo, lo, lo), Vec3Q::from_int(hi, hi, hi)),
        }
    }

    #[test]
    fn rooms_union_member_volume_boxes() {
        let mut enc = Enclosure::new(EnclosureId(30));
        enc.add_volume(VolumeId(20));
        enc.add_volume(VolumeId(21));
        let enclosures = [enc];
        let mut inst = Instance::new(StructId(100));
        inst.add_enclosure(EnclosureId(30));
        let input = AuthoringInput {
            enclosures: &enclosures,
            ..AuthoringInput::default()
        };
        let resolver = Resolver::new(input);
        let occ = [region(100, 20, 0, 4), region(100, 21, 2, 8)];
        let (mut rooms, mut edges) = (Vec::new(), Vec::new());
        let mut spatial = SpatialIndex::new();
        spatial.reserve(64).unwrap();
        rebuild(
            &mut rooms,
            &mut edges,
            &mut spatial,
            &inst,
            &occ,
            ctx(&resolver),
        )
        .unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].bbox_world.min, Vec3Q::from_int(0, 0, 0));
        assert_eq!(rooms[0].bbox_world.max, Vec3Q::from_int(8, 8, 8));
    }

    #[test]
    fn edges_canonicalize_endpoints_and_sort() {
        let mut a = Enclosure::new(EnclosureId(30));
        a.add_volume(VolumeId(20));
        a.set_aperture(Aperture {
            aperture_id: 1,
            to_enclosure: EnclosureId(31),
            kind: ApertureKind::Door,
        });
        let mut b = Enclosure::new(EnclosureId(31));
        b.add_volume(VolumeId(21));
        b.set_aperture(Aperture {
            aperture_id: 1,
            to_enclosure: EnclosureId(30),
            kind: ApertureKind::Vent,
        });
        let enclosures = [a, b];
        let mut inst = Instance::new(StructId(100));
        inst.add_enclosure(EnclosureId(30));
        inst.add_enclosure(EnclosureId(31));
        let input = AuthoringInput {
            enclosures: &enclosures,
            ..AuthoringInput::default()
        };
        let resolver = Resolver::new(input);
        let occ = [region(100, 20, 0, 4), region(100, 21, 4, 8)];
        let (mut rooms, mut edges) = (Vec::new(), Vec::new());
        let mut spatial = SpatialIndex::new();
        spatial.reserve(64).unwrap();
        rebuild(
            &mut rooms,
            &mut edges,
            &mut spatial,
            &inst,
            &occ,
            ctx(&resolver),
        )
        .unwrap();
        assert_eq!(edges.len(), 2);
        for e in &edges {
            assert!(e.room_a <= e.room_b);
        }
        assert!(edges[0].sort_key() <= edges[1].sort_key());
    }

    #[test]
    fn aperture_to_unlisted_enclosure_targets_exterior() {
        let mut a = Enclosure::new(EnclosureId(30));
        a.add_volume(VolumeId(20));
        a.set_aperture(Aperture {
            aperture_id: 1,
            to_enclosure: EnclosureId(77),
            kind: ApertureKind::Opening,
        });
        let enclosures = [a];
        let mut inst = Instance::new(StructId(100));
        inst.add_enclosure(EnclosureId(30));
        let input = AuthoringInput {
            enclosures: &enclosures,
            ..AuthoringInput::default()
        };
        let resolver = Resolver::new(input);
        let occ = [region(100, 20, 0, 4)];
        let (mut rooms, mut edges) = (Vec::new(), Vec::new());
        let mut spatial = SpatialIndex::new();
        spatial.reserve(64).unwrap();
        rebuild(
            &mut rooms,
            &mut edges,
            &mut spatial,
            &inst,
            &occ,
            ctx(&resolver),
        )
        .unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].room_a, RoomId::EXTERIOR);
    }
}
