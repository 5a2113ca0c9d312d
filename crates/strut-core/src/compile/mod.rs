// SPDX-License-Identifier: Apache-2.0
//! Per-stage rebuild algorithms and the shared spatial machinery.
//!
//! Each stage recomputes one struct's derived cache wholesale — there is no
//! diff-patching — and replaces that struct's spatial entries in the same
//! pass. The driver in [`crate::compiler`] decides when stages run.

pub mod chunk;
pub mod spatial;

pub(crate) mod carrier;
pub(crate) mod enclosure_graph;
pub(crate) mod occupancy;
pub(crate) mod support_graph;
pub(crate) mod surface_graph;
pub(crate) mod volume_aabb;

pub use carrier::CarrierArtifact;
pub use chunk::{chunk_of_pos, chunk_range_for_aabb, ChunkCoord};
pub use enclosure_graph::{RoomEdge, RoomNode};
pub use occupancy::OccRegion;
pub use spatial::{SpatialEntry, SpatialIndex};
pub use support_graph::{SupportEdge, SupportNode};
pub use surface_graph::{CompiledSocket, CompiledSurface};

use crate::ident::StructId;
use crate::math::Q;
use crate::model::input::Resolver;

/// Parameters every stage rebuild receives from the driver.
#[derive(Clone, Copy)]
pub(crate) struct StageCtx<'r, 'a> {
    /// The struct being rebuilt.
    pub struct_id: StructId,
    /// Authoring lookup view for this `process` call.
    pub resolver: &'r Resolver<'a>,
    /// Tick forwarded to anchor evaluation.
    pub tick: u64,
    /// Configured chunk size (positive).
    pub chunk_size: Q,
}
