// SPDX-License-Identifier: Apache-2.0
//! The compilation driver: dirty marks in, compiled caches out.
//!
//! The compiler owns the per-struct compiled arena, the work queue, and the
//! five spatial indices. A host drives it in four moves per tick:
//! `sync` the authored set, `mark` what changed, `enqueue_dirty`, then
//! `process` under a budget. Every output is a pure function of
//! `(authoring state, tick, chunk_size, seed constants)` — never of
//! insertion order, schedule slicing, or wall-clock anything.

use std::sync::Arc;

use crate::compile::spatial::SpatialIndex;
use crate::compile::{
    carrier, enclosure_graph, occupancy, support_graph, surface_graph, CarrierArtifact,
    ChunkCoord, CompiledSocket, CompiledSurface, OccRegion, RoomEdge, RoomNode, StageCtx,
    SupportEdge, SupportNode,
};
use crate::dirty::{DirtyFlags, DirtyTracker};
use crate::error::{CacheKind, CompileError, InvariantViolation, StageStatus};
use crate::ident::StructId;
use crate::math::{Aabb, Q, Vec3Q};
use crate::model::input::Resolver;
use crate::model::AuthoringInput;
use crate::telemetry::{NullTelemetrySink, TelemetrySink};
use crate::work::{phase, OrderKey, WorkItem, WorkQueue};

/// The five rebuild stages, in dependency order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkType {
    /// Per-volume occupancy regions.
    Occupancy,
    /// Room graph.
    Enclosure,
    /// Surface graph and sockets.
    Surface,
    /// Support graph.
    Support,
    /// Carrier artifacts.
    Carrier,
}

impl WorkType {
    /// Wire discriminator used in order keys and work items.
    #[must_use]
    pub const fn type_id(self) -> u16 {
        match self {
            Self::Occupancy => 1,
            Self::Enclosure => 2,
            Self::Surface => 3,
            Self::Support => 4,
            Self::Carrier => 5,
        }
    }

    /// Inverse of [`Self::type_id`].
    #[must_use]
    pub const fn from_type_id(id: u16) -> Option<Self> {
        match id {
            1 => Some(Self::Occupancy),
            2 => Some(Self::Enclosure),
            3 => Some(Self::Surface),
            4 => Some(Self::Support),
            5 => Some(Self::Carrier),
            _ => None,
        }
    }

    /// Budget cost of one rebuild. These constants are observable through
    /// budget slicing and are part of the host contract.
    #[must_use]
    pub const fn cost_units(self) -> u32 {
        match self {
            Self::Occupancy => 5,
            Self::Enclosure => 3,
            Self::Surface | Self::Carrier => 4,
            Self::Support => 2,
        }
    }

    /// The cache this stage writes.
    #[must_use]
    pub const fn cache_kind(self) -> CacheKind {
        match self {
            Self::Occupancy => CacheKind::Occupancy,
            Self::Enclosure => CacheKind::Room,
            Self::Surface => CacheKind::Surface,
            Self::Support => CacheKind::Support,
            Self::Carrier => CacheKind::Carrier,
        }
    }
}

fn index_sorted<P: Copy>(idx: &SpatialIndex<P>) -> bool {
    idx.entries().windows(2).all(|w| {
        (w[0].chunk, w[0].struct_id, w[0].artifact_id)
            < (w[1].chunk, w[1].struct_id, w[1].artifact_id)
    })
}

/// All derived caches for one structure.
#[derive(Clone, Debug, Default)]
pub struct CompiledStruct {
    /// Owning struct id.
    pub struct_id: StructId,
    /// Occupancy regions, ascending by `volume_id`.
    pub occupancy: Vec<OccRegion>,
    /// Room nodes, ascending by id.
    pub rooms: Vec<RoomNode>,
    /// Room edges in `(room_a, room_b, kind, id)` order.
    pub room_edges: Vec<RoomEdge>,
    /// Compiled surfaces, ascending by id.
    pub surfaces: Vec<CompiledSurface>,
    /// Compiled sockets, ascending by id.
    pub sockets: Vec<CompiledSocket>,
    /// Support nodes, ascending by id.
    pub support_nodes: Vec<SupportNode>,
    /// Support edges, ascending by id.
    pub support_edges: Vec<SupportEdge>,
    /// Carrier artifacts, ascending by id.
    pub carriers: Vec<CarrierArtifact>,
}

impl CompiledStruct {
    fn new(struct_id: StructId) -> Self {
        Self {
            struct_id,
            ..Self::default()
        }
    }
}

/// Deterministic incremental structure compiler.
///
/// Single-threaded and cooperative: no call blocks, performs I/O, or
/// consults ambient state. Compiled records live until the compiler is
/// dropped; callers keep struct ids stable across syncs.
pub struct Compiler {
    compiled: Vec<CompiledStruct>,
    dirty: DirtyTracker,
    queue: WorkQueue,
    chunk_size: Q,

    occupancy_spatial: SpatialIndex<Aabb>,
    room_spatial: SpatialIndex<Aabb>,
    surface_spatial: SpatialIndex<Aabb>,
    support_spatial: SpatialIndex<Vec3Q>,
    carrier_spatial: SpatialIndex<Aabb>,

    telemetry: Arc<dyn TelemetrySink>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// New compiler with no storage; call [`Self::reserve`] and
    /// [`Self::set_params`] before use.
    #[must_use]
    pub fn new() -> Self {
        Self {
            compiled: Vec::new(),
            dirty: DirtyTracker::new(),
            queue: WorkQueue::new(),
            chunk_size: Q::ZERO,
            occupancy_spatial: SpatialIndex::new(),
            room_spatial: SpatialIndex::new(),
            surface_spatial: SpatialIndex::new(),
            support_spatial: SpatialIndex::new(),
            carrier_spatial: SpatialIndex::new(),
            telemetry: Arc::new(NullTelemetrySink),
        }
    }

    /// Install a telemetry sink (replaces the null sink).
    pub fn set_telemetry_sink(&mut self, sink: Arc<dyn TelemetrySink>) {
        self.telemetry = sink;
    }

    /// Reserve queue and spatial storage.
    ///
    /// # Errors
    /// [`CompileError::AllocationFailed`] if any reservation fails; prior
    /// state is left intact.
    pub fn reserve(&mut self, work_queue_capacity: u32, spatial_capacity: u32) -> Result<(), CompileError> {
        self.queue.reserve(work_queue_capacity)?;
        self.occupancy_spatial.reserve(spatial_capacity)?;
        self.room_spatial.reserve(spatial_capacity)?;
        self.surface_spatial.reserve(spatial_capacity)?;
        self.support_spatial.reserve(spatial_capacity)?;
        self.carrier_spatial.reserve(spatial_capacity)?;
        Ok(())
    }

    /// Set compile parameters.
    ///
    /// # Errors
    /// [`CompileError::ChunkSizeInvalid`] unless `chunk_size > 0`.
    pub fn set_params(&mut self, chunk_size: Q) -> Result<(), CompileError> {
        if !chunk_size.is_positive() {
            return Err(CompileError::ChunkSizeInvalid);
        }
        self.chunk_size = chunk_size;
        Ok(())
    }

    /// Configured chunk size.
    #[must_use]
    pub fn chunk_size(&self) -> Q {
        self.chunk_size
    }

    fn slot_index(&mut self, struct_id: StructId) -> usize {
        match self
            .compiled
            .binary_search_by(|cs| cs.struct_id.cmp(&struct_id))
        {
            Ok(i) => i,
            Err(i) => {
                self.compiled.insert(i, CompiledStruct::new(struct_id));
                i
            }
        }
    }

    /// Ensure a compiled slot exists for every authored instance.
    ///
    /// Slots are never destroyed here; callers keep struct ids stable and a
    /// vanished instance simply stops receiving rebuilds.
    ///
    /// # Errors
    /// [`CompileError::NullStructId`] when an instance carries id zero.
    pub fn sync(&mut self, input: &AuthoringInput<'_>) -> Result<(), CompileError> {
        for inst in input.instances {
            if inst.id.is_none() {
                return Err(CompileError::NullStructId);
            }
            let _ = self.slot_index(inst.id);
        }
        Ok(())
    }

    /// Mark authoring aspects of a struct stale. See [`DirtyTracker::mark`].
    pub fn mark(&mut self, struct_id: StructId, flags: DirtyFlags) {
        self.dirty.mark(struct_id, flags);
    }

    /// Mark with an affected chunk range. See [`DirtyTracker::mark_chunks`].
    pub fn mark_chunks(
        &mut self,
        struct_id: StructId,
        flags: DirtyFlags,
        a: ChunkCoord,
        b: ChunkCoord,
    ) {
        self.dirty.mark_chunks(struct_id, flags, a, b);
    }

    /// The dirty tracker (read-only).
    #[must_use]
    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    /// Convert dirty records into queued work items and clear the records.
    ///
    /// One item per required stage per struct, keyed at the topology phase
    /// with the struct id as entity and the stage as type, so drains order
    /// by struct first and dependency-ordered stage second.
    ///
    /// # Errors
    /// [`CompileError::QueueFull`] when the queue cannot take an item; the
    /// offending record keeps its flags so the host can retry after raising
    /// capacity.
    pub fn enqueue_dirty(&mut self, tick: u64) -> Result<(), CompileError> {
        let mut i = 0;
        while i < self.dirty.records().len() {
            let rec = self.dirty.records()[i];
            i += 1;
            if rec.struct_id.is_none() || rec.flags.is_empty() {
                continue;
            }
            let flags = rec.flags;
            let geometry = DirtyFlags::FOOTPRINT | DirtyFlags::VOLUME;
            let stages = [
                (WorkType::Occupancy, flags.intersects(geometry)),
                (
                    WorkType::Enclosure,
                    flags.intersects(geometry | DirtyFlags::ENCLOSURE),
                ),
                (
                    WorkType::Surface,
                    flags.intersects(geometry | DirtyFlags::ENCLOSURE | DirtyFlags::SURFACE),
                ),
                (
                    WorkType::Support,
                    flags.intersects(geometry | DirtyFlags::SUPPORT),
                ),
                (WorkType::Carrier, flags.intersects(DirtyFlags::CARRIER)),
            ];
            for (work, needed) in stages {
                if needed {
                    self.push_work(rec.struct_id, work, tick)?;
                }
            }
            self.dirty.clear_flags(rec.struct_id, DirtyFlags::ALL);
        }
        Ok(())
    }

    fn push_work(&mut self, struct_id: StructId, work: WorkType, tick: u64) -> Result<(), CompileError> {
        if struct_id.is_none() {
            return Err(CompileError::NullStructId);
        }
        self.queue.push(WorkItem {
            key: OrderKey {
                phase: phase::TOPOLOGY,
                domain_id: 0,
                chunk_id: 0,
                entity_id: struct_id.0,
                component_id: 0,
                type_id: work.type_id(),
                seq: 0,
            },
            work_type_id: work.type_id(),
            cost_units: work.cost_units(),
            enqueue_tick: tick,
        })
    }

    /// Queue depth.
    #[must_use]
    pub fn pending_work(&self) -> u32 {
        self.queue.len()
    }

    /// Pop and execute queued work until the budget runs out, the queue
    /// drains, or a stage fails. Returns the number of items processed.
    ///
    /// An item costing more than the remaining budget stays at the head for
    /// the next call (carryover, never skipped). A queued struct missing
    /// from the authoring set is popped and skipped silently: the dirty set
    /// was a snapshot and deletion between mark and process is legal and
    /// deterministic.
    ///
    /// # Errors
    /// The first stage error aborts processing immediately; the failing item
    /// is already popped and the rest of the queue is preserved for a retry
    /// after the host repairs the authoring set.
    pub fn process(
        &mut self,
        input: &AuthoringInput<'_>,
        tick: u64,
        budget_units: u32,
    ) -> Result<u32, CompileError> {
        let resolver = Resolver::new(*input);
        let mut processed = 0_u32;
        let mut remaining = budget_units;

        while remaining > 0 {
            let Some(next) = self.queue.peek_next() else {
                break;
            };
            if next.cost_units > remaining {
                break;
            }
            let Some(item) = self.queue.pop_next() else {
                break;
            };
            remaining -= item.cost_units;
            processed += 1;

            let struct_id = StructId(item.key.entity_id);
            let idx = self.slot_index(struct_id);
            let Some(inst) = input.instance(struct_id) else {
                continue;
            };
            let Some(work) = WorkType::from_type_id(item.work_type_id) else {
                continue;
            };

            let ctx = StageCtx {
                struct_id,
                resolver: &resolver,
                tick,
                chunk_size: self.chunk_size,
            };
            let cs = &mut self.compiled[idx];
            let status = match work {
                WorkType::Occupancy => occupancy::rebuild(
                    &mut cs.occupancy,
                    &mut self.occupancy_spatial,
                    inst,
                    ctx,
                )?,
                WorkType::Enclosure => enclosure_graph::rebuild(
                    &mut cs.rooms,
                    &mut cs.room_edges,
                    &mut self.room_spatial,
                    inst,
                    &cs.occupancy,
                    ctx,
                )?,
                WorkType::Surface => surface_graph::rebuild(
                    &mut cs.surfaces,
                    &mut cs.sockets,
                    &mut self.surface_spatial,
                    inst,
                    ctx,
                )?,
                WorkType::Support => support_graph::rebuild(
                    &mut cs.support_nodes,
                    &mut cs.support_edges,
                    &mut self.support_spatial,
                    &cs.occupancy,
                    ctx,
                )?,
                WorkType::Carrier => carrier::rebuild(
                    &mut cs.carriers,
                    &mut self.carrier_spatial,
                    inst,
                    ctx,
                )?,
            };

            self.telemetry.work_processed(struct_id, item.work_type_id);
            if status == StageStatus::Partial {
                let refused = match work.cache_kind() {
                    CacheKind::Occupancy => self.occupancy_spatial.probe_refused(),
                    CacheKind::Room => self.room_spatial.probe_refused(),
                    CacheKind::Surface => self.surface_spatial.probe_refused(),
                    CacheKind::Support => self.support_spatial.probe_refused(),
                    CacheKind::Carrier => self.carrier_spatial.probe_refused(),
                };
                self.telemetry.spatial_refused(work.cache_kind(), refused);
            }
        }

        Ok(processed)
    }

    /// Per-struct compiled records, ascending by struct id.
    #[must_use]
    pub fn structs(&self) -> &[CompiledStruct] {
        &self.compiled
    }

    /// One struct's compiled record, if a slot exists.
    #[must_use]
    pub fn compiled_struct(&self, struct_id: StructId) -> Option<&CompiledStruct> {
        self.compiled
            .binary_search_by(|cs| cs.struct_id.cmp(&struct_id))
            .ok()
            .map(|i| &self.compiled[i])
    }

    /// Occupancy spatial index.
    #[must_use]
    pub fn occupancy_spatial(&self) -> &SpatialIndex<Aabb> {
        &self.occupancy_spatial
    }

    /// Room spatial index.
    #[must_use]
    pub fn room_spatial(&self) -> &SpatialIndex<Aabb> {
        &self.room_spatial
    }

    /// Surface spatial index.
    #[must_use]
    pub fn surface_spatial(&self) -> &SpatialIndex<Aabb> {
        &self.surface_spatial
    }

    /// Support spatial index.
    #[must_use]
    pub fn support_spatial(&self) -> &SpatialIndex<Vec3Q> {
        &self.support_spatial
    }

    /// Carrier spatial index.
    #[must_use]
    pub fn carrier_spatial(&self) -> &SpatialIndex<Aabb> {
        &self.carrier_spatial
    }

    /// Check every documented ordering invariant over the compiled state.
    ///
    /// # Errors
    /// The first violation found, walking the per-struct table, then each
    /// struct's lists, then the five spatial indices.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for w in self.compiled.windows(2) {
            if w[0].struct_id >= w[1].struct_id {
                return Err(InvariantViolation::CompiledTableOrder);
            }
        }
        for cs in &self.compiled {
            if cs.struct_id.is_none() {
                return Err(InvariantViolation::NullStructRecord);
            }
            let sid = cs.struct_id;
            if !cs.occupancy.windows(2).all(|w| w[0].volume_id < w[1].volume_id) {
                return Err(InvariantViolation::ListOrder {
                    cache: CacheKind::Occupancy,
                    struct_id: sid,
                });
            }
            if !cs.rooms.windows(2).all(|w| w[0].id < w[1].id) {
                return Err(InvariantViolation::ListOrder {
                    cache: CacheKind::Room,
                    struct_id: sid,
                });
            }
            let edge_key =
                |e: &RoomEdge| (e.room_a, e.room_b, e.kind.as_u32(), e.id);
            if !cs
                .room_edges
                .windows(2)
                .all(|w| edge_key(&w[0]) <= edge_key(&w[1]))
            {
                return Err(InvariantViolation::RoomEdgeOrder { struct_id: sid });
            }
            if !cs.surfaces.windows(2).all(|w| w[0].id < w[1].id) {
                return Err(InvariantViolation::ListOrder {
                    cache: CacheKind::Surface,
                    struct_id: sid,
                });
            }
            if !cs.sockets.windows(2).all(|w| w[0].id < w[1].id) {
                return Err(InvariantViolation::SocketOrder { struct_id: sid });
            }
            if !cs.support_nodes.windows(2).all(|w| w[0].id < w[1].id) {
                return Err(InvariantViolation::ListOrder {
                    cache: CacheKind::Support,
                    struct_id: sid,
                });
            }
            if !cs.support_edges.windows(2).all(|w| w[0].id < w[1].id) {
                return Err(InvariantViolation::SupportEdgeOrder { struct_id: sid });
            }
            if !cs.carriers.windows(2).all(|w| w[0].id < w[1].id) {
                return Err(InvariantViolation::ListOrder {
                    cache: CacheKind::Carrier,
                    struct_id: sid,
                });
            }
        }

        if !index_sorted(&self.occupancy_spatial) {
            return Err(InvariantViolation::IndexOrder(CacheKind::Occupancy));
        }
        if !index_sorted(&self.room_spatial) {
            return Err(InvariantViolation::IndexOrder(CacheKind::Room));
        }
        if !index_sorted(&self.surface_spatial) {
            return Err(InvariantViolation::IndexOrder(CacheKind::Surface));
        }
        if !index_sorted(&self.support_spatial) {
            return Err(InvariantViolation::IndexOrder(CacheKind::Support));
        }
        if !index_sorted(&self.carrier_spatial) {
            return Err(InvariantViolation::IndexOrder(CacheKind::Carrier));
        }
        Ok(())
    }
}
