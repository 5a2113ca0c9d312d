// SPDX-License-Identifier: Apache-2.0
//! strut-core: deterministic incremental structure compilation engine.
//!
//! The engine takes an authored set of parametric building blocks
//! (footprints, volumes, enclosures, surface templates, sockets, carrier
//! intents) attached to placed instances and compiles them into derived
//! caches — occupancy regions, room/aperture graphs, surface graphs,
//! support graphs, carrier artifacts — plus chunk-aligned spatial indices
//! over each cache.
//!
//! Compiled output is a pure function of the authored inputs: independent of
//! insertion order, of how the work budget is sliced across ticks, and of
//! host floating-point behavior (there is none — all arithmetic is Q48.16
//! fixed-point integers). The engine does no I/O and no threading; it is a
//! state machine a host drives from its tick loop via [`Compiler`].
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

/// Deterministic fixed-point math (scalars, vectors, boxes, poses).
pub mod math;

/// Per-stage rebuild algorithms and spatial indices.
pub mod compile;
mod compiler;
mod digest;
mod dirty;
mod error;
mod frame;
/// Stable identifiers and the id-derivation hash.
pub mod ident;
/// Authoring model types.
pub mod model;
mod telemetry;
mod work;

// Re-exports for the stable public API.
/// Compiled record types, the chunk grid, and spatial indices.
pub use compile::{
    chunk_of_pos, chunk_range_for_aabb, CarrierArtifact, ChunkCoord, CompiledSocket,
    CompiledSurface, OccRegion, RoomEdge, RoomNode, SpatialEntry, SpatialIndex, SupportEdge,
    SupportNode,
};
/// The driver: sync, mark, enqueue, process, inspect.
pub use compiler::{CompiledStruct, Compiler, WorkType};
/// Canonical compiled-state digest for determinism and replay checks.
pub use digest::{digest_hex, state_digest, StateDigest};
/// Dirty tracking: flags, records, dependency expansion.
pub use dirty::{ChunkRange, DirtyFlags, DirtyRecord, DirtyTracker};
/// Error taxonomy and stage outcomes.
pub use error::{CacheKind, CompileError, InvariantViolation, StageStatus};
/// Anchors and world frames.
pub use frame::{Anchor, AnchorKind, WorldFrame};
/// Core id types used across authoring and compiled records.
pub use ident::{
    CarrierArtifactId, CarrierIntentId, EnclosureId, FootprintId, FrameId, RegionId, RoomEdgeId,
    RoomId, SocketId, StructId, SupportEdgeId, SupportNodeId, SurfaceId, SurfaceTemplateId,
    VolumeId,
};
/// Fixed-point scalar and geometry primitives.
pub use math::{Aabb, Pose, Q, QuatQ, Vec3Q};
/// Authoring model types and the borrowed input view.
pub use model::{
    Aperture, ApertureKind, AuthoringInput, BoolOp, BoolTerm, CarrierIntent, CarrierKind,
    Enclosure, FaceKind, Footprint, Instance, Socket, SurfaceTemplate, SurfaceTemplateKind,
    ValidationError, Volume, VolumeKind,
};
/// Telemetry sink boundary.
pub use telemetry::{NullTelemetrySink, TelemetrySink};
/// The deterministic work queue and its canonical key.
pub use work::{phase, OrderKey, WorkItem, WorkQueue};
