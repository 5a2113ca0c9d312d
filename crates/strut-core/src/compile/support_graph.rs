// SPDX-License-Identifier: Apache-2.0
//! Support stage: vertical load-path stubs per solid region.
//!
//! Each non-void occupancy region contributes two support nodes — at the
//! region's min corner and vertically above it at the region's top — and one
//! vertical edge between them. Capacities are unit placeholders for the load
//! solver downstream.

use super::occupancy::OccRegion;
use super::spatial::SpatialIndex;
use crate::error::{CompileError, StageStatus};
use crate::ident::{self, StructId, SupportEdgeId, SupportNodeId};
use crate::math::{Q, Vec3Q};

/// One compiled support node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupportNode {
    /// Derived node id.
    pub id: SupportNodeId,
    /// Owning structure.
    pub struct_id: StructId,
    /// World position.
    pub pos_world: Vec3Q,
    /// Load capacity (unit placeholder).
    pub capacity: Q,
}

/// One compiled vertical support edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupportEdge {
    /// Derived edge id.
    pub id: SupportEdgeId,
    /// Owning structure.
    pub struct_id: StructId,
    /// Base node.
    pub a: SupportNodeId,
    /// Top node.
    pub b: SupportNodeId,
    /// Load capacity (unit placeholder).
    pub capacity: Q,
}

/// Rebuild one struct's support graph and support spatial entries.
pub(crate) fn rebuild(
    nodes: &mut Vec<SupportNode>,
    edges: &mut Vec<SupportEdge>,
    spatial: &mut SpatialIndex<Vec3Q>,
    occupancy: &[OccRegion],
    ctx: super::StageCtx<'_, '_>,
) -> Result<StageStatus, CompileError> {
    let super::StageCtx {
        struct_id,
        chunk_size,
        ..
    } = ctx;
    if struct_id.is_none() {
        return Err(CompileError::NullStructId);
    }
    if !chunk_size.is_positive() {
        return Err(CompileError::ChunkSizeInvalid);
    }

    let solid_count = occupancy.iter().filter(|r| !r.is_void).count();
    nodes.clear();
    nodes.reserve(solid_count * 2);
    edges.clear();
    edges.reserve(solid_count);
    spatial.remove_struct(struct_id);

    let capacity = Q::ONE;
    for r in occupancy {
        if r.is_void {
            continue;
        }
        let base = SupportNode {
            id: ident::support_node_id(struct_id, r.id, 0),
            struct_id,
            pos_world: r.bbox_world.min,
            capacity,
        };
        let top = SupportNode {
            id: ident::support_node_id(struct_id, r.id, 1),
            struct_id,
            pos_world: Vec3Q::new(r.bbox_world.min.x, r.bbox_world.min.y, r.bbox_world.max.z),
            capacity,
        };
        edges.push(SupportEdge {
            id: ident::support_edge_id(struct_id, r.id),
            struct_id,
            a: base.id,
            b: top.id,
            capacity,
        });
        nodes.push(base);
        nodes.push(top);
    }

    nodes.sort_by_key(|n| n.id);
    edges.sort_by_key(|e| e.id);

    let mut status = StageStatus::Complete;
    for n in nodes.as_slice() {
        status = status.merge(spatial.add_at(struct_id, n.id.0, n.pos_world, chunk_size)?);
    }
    Ok(status)
}
