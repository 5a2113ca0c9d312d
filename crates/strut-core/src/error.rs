// SPDX-License-Identifier: Apache-2.0
//! Stage error taxonomy and outcome types.

use thiserror::Error;

use crate::ident::{
    CarrierIntentId, EnclosureId, FootprintId, FrameId, SocketId, StructId, SurfaceTemplateId,
    VolumeId,
};

/// Which derived cache (and spatial index) an event or violation refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// Per-volume occupancy regions.
    Occupancy,
    /// Room nodes of the enclosure graph.
    Room,
    /// Compiled surfaces.
    Surface,
    /// Support nodes.
    Support,
    /// Carrier artifacts.
    Carrier,
}

/// Outcome of a successful stage rebuild.
///
/// `Partial` means one or more spatial inserts were refused for capacity; the
/// compiled records themselves are complete and correct. Hosts treat this as
/// a tuning signal, not a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageStatus {
    /// All records and all spatial entries were written.
    Complete,
    /// Records written; at least one spatial insert refused for capacity.
    Partial,
}

impl StageStatus {
    /// Combine two outcomes; `Partial` dominates.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        if self == Self::Partial || other == Self::Partial {
            Self::Partial
        } else {
            Self::Complete
        }
    }
}

/// Hard errors a stage rebuild or driver operation can raise.
///
/// Each variant names the authoring condition that produced it. Stages never
/// retry; `process` surfaces the first error to the host and leaves the
/// remaining queue untouched so the host can fix the authoring set and
/// resume.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A structure id of zero was supplied where a real id is required.
    #[error("structure id zero is reserved")]
    NullStructId,
    /// `set_params` was called with a non-positive chunk size.
    #[error("chunk size must be positive")]
    ChunkSizeInvalid,
    /// The work queue has reached its reserved capacity.
    #[error("work queue is at capacity")]
    QueueFull,
    /// A spatial index was used before `reserve` gave it storage.
    #[error("spatial index used before reserve")]
    SpatialUnreserved,
    /// An instance references a volume absent from the authoring set.
    #[error("volume {0:?} is not in the authoring set")]
    MissingVolume(VolumeId),
    /// A volume references a footprint absent from the authoring set.
    #[error("footprint {0:?} is not in the authoring set")]
    MissingFootprint(FootprintId),
    /// An instance references an enclosure absent from the authoring set.
    #[error("enclosure {0:?} is not in the authoring set")]
    MissingEnclosure(EnclosureId),
    /// An instance references a surface template absent from the authoring set.
    #[error("surface template {0:?} is not in the authoring set")]
    MissingSurfaceTemplate(SurfaceTemplateId),
    /// An instance references a socket absent from the authoring set.
    #[error("socket {0:?} is not in the authoring set")]
    MissingSocket(SocketId),
    /// A socket's surface template is not in the owning instance's template list.
    #[error("socket {socket:?} binds template {template:?} outside its instance")]
    SocketTemplateUnbound {
        /// The offending socket.
        socket: SocketId,
        /// The template it names.
        template: SurfaceTemplateId,
    },
    /// An instance references a carrier intent absent from the authoring set.
    #[error("carrier intent {0:?} is not in the authoring set")]
    MissingCarrierIntent(CarrierIntentId),
    /// An anchor references a frame absent from the frame table.
    #[error("frame {0:?} is not in the frame table")]
    MissingFrame(FrameId),
    /// A boolean volume term references the volume being evaluated.
    #[error("volume {0:?} references itself")]
    VolumeSelfReference(VolumeId),
    /// Boolean volume nesting exceeded the depth limit of 8.
    #[error("volume {0:?} exceeds the boolean nesting limit")]
    VolumeRecursionTooDeep(VolumeId),
    /// A boolean volume has no terms, so it has no bounds.
    #[error("boolean volume {0:?} has no terms")]
    BoolTermsEmpty(VolumeId),
    /// A footprint has no vertices, so it has no bounds.
    #[error("footprint {0:?} has no vertices")]
    FootprintEmpty(FootprintId),
    /// The allocator refused a `reserve`; prior state is intact.
    #[error("allocation failed while reserving storage")]
    AllocationFailed,
}

impl CompileError {
    /// Stable negative code for hosts that log numeric stage results.
    ///
    /// The assignment is part of the host contract and never reshuffles.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::NullStructId => -2,
            Self::ChunkSizeInvalid => -3,
            Self::QueueFull => -4,
            Self::SpatialUnreserved => -5,
            Self::MissingVolume(_) => -6,
            Self::MissingFootprint(_) => -7,
            Self::MissingEnclosure(_) => -8,
            Self::MissingSurfaceTemplate(_) => -9,
            Self::MissingSocket(_) => -10,
            Self::SocketTemplateUnbound { .. } => -11,
            Self::MissingCarrierIntent(_) => -12,
            Self::MissingFrame(_) => -13,
            Self::VolumeSelfReference(_) => -14,
            Self::VolumeRecursionTooDeep(_) => -15,
            Self::BoolTermsEmpty(_) => -16,
            Self::FootprintEmpty(_) => -17,
            Self::AllocationFailed => -18,
        }
    }
}

/// First violation found by [`crate::Compiler::check_invariants`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The per-struct compiled table is not strictly ascending by struct id.
    #[error("compiled table out of order")]
    CompiledTableOrder,
    /// A compiled record carries the reserved zero struct id.
    #[error("compiled record with zero struct id")]
    NullStructRecord,
    /// A per-struct compiled list is not strictly ascending by its key.
    #[error("{cache:?} list out of order in struct {struct_id:?}")]
    ListOrder {
        /// Which cache the list belongs to.
        cache: CacheKind,
        /// The struct whose list is malformed.
        struct_id: StructId,
    },
    /// Support edges out of order (reported separately from nodes).
    #[error("support edge list out of order in struct {struct_id:?}")]
    SupportEdgeOrder {
        /// The struct whose list is malformed.
        struct_id: StructId,
    },
    /// Room edges violate the `(room_a, room_b, kind, id)` order.
    #[error("room edge list out of order in struct {struct_id:?}")]
    RoomEdgeOrder {
        /// The struct whose list is malformed.
        struct_id: StructId,
    },
    /// Compiled sockets out of order (reported separately from surfaces).
    #[error("socket list out of order in struct {struct_id:?}")]
    SocketOrder {
        /// The struct whose list is malformed.
        struct_id: StructId,
    },
    /// A spatial index is not strictly ascending by its full key tuple.
    #[error("{0:?} spatial index out of order")]
    IndexOrder(CacheKind),
}
