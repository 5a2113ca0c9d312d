// SPDX-License-Identifier: Apache-2.0
//! Chunk grid: world positions to integer chunk coordinates.

use crate::math::{clamp_i64_i32, floor_div, Aabb, Q, Vec3Q};

/// Integer chunk coordinate triple with canonical lexicographic ordering.
#[repr(C)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkCoord {
    /// Chunk X.
    pub cx: i32,
    /// Chunk Y.
    pub cy: i32,
    /// Chunk Z.
    pub cz: i32,
}

impl ChunkCoord {
    /// Construct from components.
    #[must_use]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }
}

/// Chunk containing a world position: componentwise `floor(coord / size)`
/// with saturation into the i32 range.
///
/// `chunk_size` must be positive; a non-positive size maps everything to the
/// origin chunk (the driver rejects such sizes up front).
#[must_use]
pub fn chunk_of_pos(p: Vec3Q, chunk_size: Q) -> ChunkCoord {
    let d = chunk_size.raw();
    if d <= 0 {
        return ChunkCoord::default();
    }
    ChunkCoord {
        cx: clamp_i64_i32(floor_div(p.x.raw(), d)),
        cy: clamp_i64_i32(floor_div(p.y.raw(), d)),
        cz: clamp_i64_i32(floor_div(p.z.raw(), d)),
    }
}

/// Inclusive chunk range covered by a box.
#[must_use]
pub fn chunk_range_for_aabb(b: &Aabb, chunk_size: Q) -> (ChunkCoord, ChunkCoord) {
    let c0 = chunk_of_pos(b.min, chunk_size);
    let c1 = chunk_of_pos(b.max, chunk_size);
    (
        ChunkCoord::new(c0.cx.min(c1.cx), c0.cy.min(c1.cy), c0.cz.min(c1.cz)),
        ChunkCoord::new(c0.cx.max(c1.cx), c0.cy.max(c1.cy), c0.cz.max(c1.cz)),
    )
}
