// SPDX-License-Identifier: Apache-2.0
//! Carrier stage: endpoint-pair artifacts.
//!
//! A carrier intent's two anchors are evaluated to world poses; the artifact
//! box spans both anchor positions, expanded by half the width on X and Y
//! and by `max(height, depth)` on Z.

use super::spatial::SpatialIndex;
use crate::error::{CompileError, StageStatus};
use crate::ident::{self, CarrierArtifactId, CarrierIntentId, StructId};
use crate::math::{Aabb, Pose, Q, Vec3Q};
use crate::model::{CarrierKind, Instance};

/// One compiled carrier artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarrierArtifact {
    /// Derived artifact id.
    pub id: CarrierArtifactId,
    /// Owning structure.
    pub struct_id: StructId,
    /// Source intent.
    pub intent_id: CarrierIntentId,
    /// Carrier kind.
    pub kind: CarrierKind,
    /// First endpoint in world space.
    pub a0_world: Pose,
    /// Second endpoint in world space.
    pub a1_world: Pose,
    /// Envelope width.
    pub width: Q,
    /// Envelope height.
    pub height: Q,
    /// Envelope depth.
    pub depth: Q,
    /// Expanded world bounds.
    pub bbox_world: Aabb,
}

fn span_with_extents(p0: Vec3Q, p1: Vec3Q, ex: Q, ey: Q, ez: Q) -> Aabb {
    let lo = p0.min(p1);
    let hi = p0.max(p1);
    Aabb::new(
        Vec3Q::new(lo.x - ex, lo.y - ey, lo.z - ez),
        Vec3Q::new(hi.x + ex, hi.y + ey, hi.z + ez),
    )
}

/// Rebuild one struct's carrier artifacts and carrier spatial entries.
pub(crate) fn rebuild(
    artifacts: &mut Vec<CarrierArtifact>,
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

    artifacts.clear();
    artifacts.reserve(inst.carrier_intent_ids().len());
    spatial.remove_struct(struct_id);

    for &cid in inst.carrier_intent_ids() {
        let intent = resolver
            .carrier_intent(cid)
            .ok_or(CompileError::MissingCarrierIntent(cid))?;
        let p0 = intent.a0.eval(resolver.frames(), tick)?;
        let p1 = intent.a1.eval(resolver.frames(), tick)?;
        let half_w = intent.width.halve();
        let ez = intent.height.max(intent.depth);
        artifacts.push(CarrierArtifact {
            id: ident::carrier_artifact_id(struct_id, intent.id),
            struct_id,
            intent_id: intent.id,
            kind: intent.kind,
            a0_world: p0,
            a1_world: p1,
            width: intent.width,
            height: intent.height,
            depth: intent.depth,
            bbox_world: span_with_extents(p0.pos, p1.pos, half_w, half_w, ez),
        });
    }

    artifacts.sort_by_key(|a| a.id);

    let mut status = StageStatus::Complete;
    for a in artifacts.as_slice() {
        status = status.merge(spatial.add_spanning(struct_id, a.id.0, &a.bbox_world, chunk_size)?);
    }
    Ok(status)
}
