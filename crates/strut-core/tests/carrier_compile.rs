// SPDX-License-Identifier: Apache-2.0
//! Carrier artifacts: literal envelope geometry and determinism.
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{compile_all, fresh_compiler, q, Scenario};
use strut_core::{state_digest, CarrierKind, DirtyFlags, StructId, Vec3Q};

#[test]
fn bridge_compiles_to_one_artifact_with_the_documented_envelope() {
    let scenario = Scenario::bridge_only();
    let mut c = fresh_compiler();
    compile_all(&mut c, &scenario, DirtyFlags::CARRIER, 1);
    assert!(c.check_invariants().is_ok());

    let cs = c.compiled_struct(StructId(300)).unwrap();
    assert_eq!(cs.carriers.len(), 1);
    let a = &cs.carriers[0];
    assert_eq!(a.kind, CarrierKind::Bridge);
    // Span (0,0,0)..(32,0,0), half-width 3 on x/y, max(height,depth)=2 on z.
    assert_eq!(a.bbox_world.min, Vec3Q::new(q(-3), q(-3), q(-2)));
    assert_eq!(a.bbox_world.max, Vec3Q::new(q(35), q(3), q(2)));
    assert_eq!(a.a0_world.pos, Vec3Q::new(q(0), q(0), q(0)));
    assert_eq!(a.a1_world.pos, Vec3Q::new(q(32), q(0), q(0)));

    // The other caches stay empty: only CARRIER was marked.
    assert!(cs.occupancy.is_empty());
    assert!(cs.surfaces.is_empty());
    assert!(!c.carrier_spatial().is_empty());
    assert!(c.occupancy_spatial().is_empty());
}

#[test]
fn carrier_compilation_is_deterministic() {
    let scenario = Scenario::bridge_only();
    let mut c1 = fresh_compiler();
    compile_all(&mut c1, &scenario, DirtyFlags::CARRIER, 1);
    let mut c2 = fresh_compiler();
    compile_all(&mut c2, &scenario, DirtyFlags::CARRIER, 1);
    assert_eq!(state_digest(&c1), state_digest(&c2));
}

#[test]
fn carrier_spatial_entries_cover_the_envelope_chunks() {
    let scenario = Scenario::bridge_only();
    let mut c = fresh_compiler();
    compile_all(&mut c, &scenario, DirtyFlags::CARRIER, 1);
    // x spans chunks -1..=2 with chunk size 16; y and z span chunk -1..=0.
    let chunks: Vec<_> = c.carrier_spatial().entries().iter().map(|e| e.chunk).collect();
    assert_eq!(chunks.len(), 16);
    assert!(chunks.windows(2).all(|w| w[0] < w[1]));
}
