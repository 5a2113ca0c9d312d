// SPDX-License-Identifier: Apache-2.0
//! Occupancy stage: per-volume world-space regions.
//!
//! Occupancy is a derived cache built from authored volumes. It is not
//! authoritative truth and must be rebuildable deterministically under
//! budget; every rebuild recomputes the whole struct's regions and replaces
//! its spatial entries wholesale.

use super::spatial::SpatialIndex;
use super::volume_aabb::volume_local_aabb;
use crate::error::{CompileError, StageStatus};
use crate::ident::{self, RegionId, StructId, VolumeId};
use crate::math::Aabb;
use crate::model::Instance;

/// One compiled occupancy region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OccRegion {
    /// Derived region id.
    pub id: RegionId,
    /// Owning structure.
    pub struct_id: StructId,
    /// Source volume.
    pub volume_id: VolumeId,
    /// True when the region carves void.
    pub is_void: bool,
    /// World-space bounds.
    pub bbox_world: Aabb,
}

/// Regions sorted by `volume_id`, found by binary search.
#[must_use]
pub(crate) fn find_region_by_volume(regions: &[OccRegion], volume_id: VolumeId) -> Option<&OccRegion> {
    if volume_id.is_none() {
        return None;
    }
    regions
        .binary_search_by(|r| r.volume_id.cmp(&volume_id))
        .ok()
        .map(|i| &regions[i])
}

/// Rebuild one struct's occupancy regions and spatial entries.
///
/// Regions are emitted in the instance's sorted volume order, so the list is
/// ascending by `volume_id` without a sort pass.
pub(crate) fn rebuild(
    regions: &mut Vec<OccRegion>,
    spatial: &mut SpatialIndex<Aabb>,
    inst: &Instance,
    ctx: super::StageCtx<'_, '_>,
) -> Result<StageStatus, CompileError> {
    let super::StageCtx {
        struct_id,
        resolver,
        tick,
        chunk_size,
    } = ctx;
    if struct_id.is_none() {
        return Err(CompileError::NullStructId);
    }
    if !chunk_size.is_positive() {
        return Err(CompileError::ChunkSizeInvalid);
    }

    let anchor_pose = inst.anchor.eval(resolver.frames(), tick)?;
    let world_pose = anchor_pose.compose(inst.local_pose);

    regions.clear();
    regions.reserve(inst.volume_ids().len());
    spatial.remove_struct(struct_id);

    for &vid in inst.volume_ids() {
        let v = resolver.volume(vid).ok_or(CompileError::MissingVolume(vid))?;
        let local = volume_local_aabb(v, resolver, 0)?;
        regions.push(OccRegion {
            id: ident::region_id(struct_id, v.id, v.is_void),
            struct_id,
            volume_id: v.id,
            is_void: v.is_void,
            bbox_world: world_pose.transform_aabb(&local),
        });
    }

    let mut status = StageStatus::Complete;
    for r in regions.as_slice() {
        status = status.merge(spatial.add_spanning(struct_id, r.id.0, &r.bbox_world, chunk_size)?);
    }
    Ok(status)
}
