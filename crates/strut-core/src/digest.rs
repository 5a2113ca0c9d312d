// SPDX-License-Identifier: Apache-2.0
//! Canonical digest of the full compiled state.
//!
//! Used by the determinism test suite and by hosts for replay parity checks.
//! Every field is fed to BLAKE3 little-endian in a documented fixed order
//! (never via platform struct memory), so the digest is byte-identical
//! across architectures and endiannesses. The walk covers all per-struct
//! records and all five spatial indices, which are exactly the bytes the
//! determinism contract quantifies over.

use blake3::Hasher;

use crate::compiler::{CompiledStruct, Compiler};
use crate::compile::spatial::SpatialIndex;
use crate::math::{Aabb, Pose, Q, Vec3Q};

/// 256-bit canonical state digest.
pub type StateDigest = [u8; 32];

/// Domain prefix; versioned with the compiled-state format.
const DOMAIN: &[u8] = b"strut:state:v1";

fn put_u64(h: &mut Hasher, v: u64) {
    h.update(&v.to_le_bytes());
}

fn put_i64(h: &mut Hasher, v: i64) {
    h.update(&v.to_le_bytes());
}

fn put_i32(h: &mut Hasher, v: i32) {
    h.update(&v.to_le_bytes());
}

fn put_q(h: &mut Hasher, q: Q) {
    put_i64(h, q.raw());
}

fn put_vec3(h: &mut Hasher, v: Vec3Q) {
    put_q(h, v.x);
    put_q(h, v.y);
    put_q(h, v.z);
}

fn put_aabb(h: &mut Hasher, b: &Aabb) {
    put_vec3(h, b.min);
    put_vec3(h, b.max);
}

fn put_pose(h: &mut Hasher, p: &Pose) {
    put_vec3(h, p.pos);
    put_q(h, p.rot.x);
    put_q(h, p.rot.y);
    put_q(h, p.rot.z);
    put_q(h, p.rot.w);
}

fn put_struct(h: &mut Hasher, cs: &CompiledStruct) {
    put_u64(h, cs.struct_id.0);

    put_u64(h, cs.occupancy.len() as u64);
    for r in &cs.occupancy {
        put_u64(h, r.id.0);
        put_u64(h, r.struct_id.0);
        put_u64(h, r.volume_id.0);
        put_u64(h, u64::from(r.is_void));
        put_aabb(h, &r.bbox_world);
    }

    put_u64(h, cs.rooms.len() as u64);
    put_u64(h, cs.room_edges.len() as u64);
    for room in &cs.rooms {
        put_u64(h, room.id.0);
        put_u64(h, room.struct_id.0);
        put_u64(h, room.enclosure_id.0);
        put_aabb(h, &room.bbox_world);
    }
    for e in &cs.room_edges {
        put_u64(h, e.id.0);
        put_u64(h, e.room_a.0);
        put_u64(h, e.room_b.0);
        put_u64(h, u64::from(e.kind.as_u32()));
    }

    put_u64(h, cs.surfaces.len() as u64);
    put_u64(h, cs.sockets.len() as u64);
    for s in &cs.surfaces {
        put_u64(h, s.id.0);
        put_u64(h, s.template_id.0);
        put_u64(h, s.volume_id.0);
        put_u64(h, s.enclosure_id.0);
        put_u64(h, u64::from(s.face_kind.as_u32()));
        put_u64(h, u64::from(s.face_index));
        put_vec3(h, s.origin_world);
        put_vec3(h, s.u_vec_world);
        put_vec3(h, s.v_vec_world);
        put_q(h, s.u_len);
        put_q(h, s.v_len);
        put_aabb(h, &s.bbox_world);
    }
    for s in &cs.sockets {
        put_u64(h, s.id.0);
        put_u64(h, s.surface_id.0);
        put_q(h, s.u);
        put_q(h, s.v);
        put_q(h, s.offset);
    }

    put_u64(h, cs.support_nodes.len() as u64);
    put_u64(h, cs.support_edges.len() as u64);
    for n in &cs.support_nodes {
        put_u64(h, n.id.0);
        put_vec3(h, n.pos_world);
        put_q(h, n.capacity);
    }
    for e in &cs.support_edges {
        put_u64(h, e.id.0);
        put_u64(h, e.a.0);
        put_u64(h, e.b.0);
        put_q(h, e.capacity);
    }

    put_u64(h, cs.carriers.len() as u64);
    for a in &cs.carriers {
        put_u64(h, a.id.0);
        put_u64(h, a.intent_id.0);
        put_u64(h, u64::from(a.kind.as_u32()));
        put_pose(h, &a.a0_world);
        put_pose(h, &a.a1_world);
        put_q(h, a.width);
        put_q(h, a.height);
        put_q(h, a.depth);
        put_aabb(h, &a.bbox_world);
    }
}

fn put_index<P: Copy>(h: &mut Hasher, idx: &SpatialIndex<P>, put_payload: impl Fn(&mut Hasher, &P)) {
    put_u64(h, u64::from(idx.len()));
    for e in idx.entries() {
        put_i32(h, e.chunk.cx);
        put_i32(h, e.chunk.cy);
        put_i32(h, e.chunk.cz);
        put_u64(h, e.struct_id.0);
        put_u64(h, e.artifact_id);
        put_payload(h, &e.payload);
    }
}

/// Digest the compiler's full compiled state.
#[must_use]
pub fn state_digest(c: &Compiler) -> StateDigest {
    let mut h = Hasher::new();
    h.update(DOMAIN);

    put_u64(&mut h, c.structs().len() as u64);
    for cs in c.structs() {
        put_struct(&mut h, cs);
    }

    put_index(&mut h, c.occupancy_spatial(), put_aabb);
    put_index(&mut h, c.room_spatial(), put_aabb);
    put_index(&mut h, c.surface_spatial(), put_aabb);
    put_index(&mut h, c.support_spatial(), |h, p| put_vec3(h, *p));
    put_index(&mut h, c.carrier_spatial(), put_aabb);

    h.finalize().into()
}

/// Hex rendering for logs and test failure messages.
#[must_use]
pub fn digest_hex(d: &StateDigest) -> String {
    hex::encode(d)
}
