// SPDX-License-Identifier: Apache-2.0
//! Incremental rebuilds must land on the same bytes as fresh full compiles,
//! and spatial indices must never retain stale entries.
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{baseline_mark, compile_all, drain, fresh_compiler, q, Scenario};
use strut_core::{
    chunk_range_for_aabb, state_digest, Anchor, ApertureKind, ChunkCoord, DirtyFlags, Q, StructId,
};

#[test]
fn incremental_aperture_edit_matches_fresh_compile() {
    // Initial full compile.
    let mut scenario = Scenario::baseline();
    let mut partial = fresh_compiler();
    compile_all(&mut partial, &scenario, baseline_mark(), 1);

    // Mutate a single enclosure: the door becomes a vent.
    let mut aperture = scenario.enclosures[0].apertures()[0];
    aperture.kind = ApertureKind::Vent;
    scenario.enclosures[0].set_aperture(aperture);

    partial.mark(StructId(100), DirtyFlags::ENCLOSURE);
    // Enclosure dirt expands to surfaces, nothing else.
    let rec = partial.dirty().get(StructId(100)).unwrap();
    assert_eq!(rec.flags, DirtyFlags::ENCLOSURE | DirtyFlags::SURFACE);
    partial.enqueue_dirty(2).unwrap();
    // Constrained budget: takes multiple calls, must converge all the same.
    drain(&mut partial, &scenario.input(), 2, 4);
    assert!(partial.check_invariants().is_ok());

    // A from-scratch compile of the mutated set must agree byte-for-byte.
    let mut full = fresh_compiler();
    compile_all(&mut full, &scenario, baseline_mark(), 1);
    assert!(full.check_invariants().is_ok());
    assert_eq!(state_digest(&partial), state_digest(&full));
}

#[test]
fn anchor_move_replaces_all_spatial_entries() {
    let mut scenario = Scenario::baseline();
    let mut c = fresh_compiler();
    compile_all(&mut c, &scenario, baseline_mark(), 1);

    // Everything indexed belongs to struct 100.
    assert!(!c.occupancy_spatial().is_empty());
    assert!(c
        .occupancy_spatial()
        .entries()
        .iter()
        .all(|e| e.struct_id == StructId(100)));
    let old_chunks: Vec<ChunkCoord> = c
        .occupancy_spatial()
        .entries()
        .iter()
        .map(|e| e.chunk)
        .collect();

    // Move far away and rebuild the volume-derived caches.
    scenario.instances[0].anchor = Anchor::terrain(q(1000), q(2000), Q::ZERO);
    c.mark(StructId(100), DirtyFlags::VOLUME);
    c.enqueue_dirty(2).unwrap();
    drain(&mut c, &scenario.input(), 2, u32::MAX);
    assert!(c.check_invariants().is_ok());

    // No stale chunk coordinates survive the move.
    for e in c.occupancy_spatial().entries() {
        assert_eq!(e.struct_id, StructId(100));
        assert!(
            !old_chunks.contains(&e.chunk),
            "stale chunk {:?} survived the rebuild",
            e.chunk
        );
    }

    // Entry count equals the sum of chunks overlapped by each region's new
    // box.
    let cs = c.compiled_struct(StructId(100)).unwrap();
    let expected: u32 = cs
        .occupancy
        .iter()
        .map(|r| {
            let (lo, hi) = chunk_range_for_aabb(&r.bbox_world, c.chunk_size());
            let nx = (hi.cx - lo.cx + 1) as u32;
            let ny = (hi.cy - lo.cy + 1) as u32;
            let nz = (hi.cz - lo.cz + 1) as u32;
            nx * ny * nz
        })
        .sum();
    assert_eq!(c.occupancy_spatial().len(), expected);
}

#[test]
fn carrier_add_is_incremental() {
    // Compile the base structure, then author a bridge on a second instance
    // and mark only CARRIER.
    let mut scenario = Scenario::baseline();
    let bridge = Scenario::bridge_only();
    scenario
        .carrier_intents
        .extend(bridge.carrier_intents.iter().cloned());
    scenario.instances.extend(bridge.instances.iter().cloned());

    let mut c = fresh_compiler();
    let input = scenario.input();
    c.sync(&input).unwrap();
    c.mark(StructId(100), baseline_mark());
    c.mark(StructId(300), DirtyFlags::CARRIER);
    c.enqueue_dirty(1).unwrap();
    drain(&mut c, &input, 1, u32::MAX);
    assert!(c.check_invariants().is_ok());

    // The carrier landed without disturbing the base struct's caches.
    assert_eq!(c.compiled_struct(StructId(300)).unwrap().carriers.len(), 1);
    assert_eq!(c.compiled_struct(StructId(100)).unwrap().carriers.len(), 0);
    assert!(!c.compiled_struct(StructId(100)).unwrap().occupancy.is_empty());
}
