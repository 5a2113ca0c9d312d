// SPDX-License-Identifier: Apache-2.0
//! Footprints: parametric polygons in the local structure frame.
//!
//! A footprint is a set of rings sorted by `ring_index` (0 is the outer ring,
//! higher indices are holes), each an ordered set of fixed-point vertices
//! sorted by `vertex_index`. Winding is canonicalized deterministically:
//! outer rings counter-clockwise (positive signed area), holes clockwise
//! (negative signed area).

use super::ValidationError;
use crate::ident::FootprintId;
use crate::math::Q;

/// One polygon vertex keyed by its local ordering index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FootprintVertex {
    /// Local ordering key; monotonic within a ring by convention.
    pub vertex_index: u32,
    /// X coordinate in the local frame.
    pub x: Q,
    /// Y coordinate in the local frame.
    pub y: Q,
}

/// One ring of a footprint polygon.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FootprintRing {
    /// Ring key; 0 is the outer ring by convention.
    pub ring_index: u32,
    /// Whether this ring cuts a hole.
    pub is_hole: bool,
    verts: Vec<FootprintVertex>,
}

impl FootprintRing {
    /// Vertices in ascending `vertex_index` order.
    #[must_use]
    pub fn vertices(&self) -> &[FootprintVertex] {
        &self.verts
    }

    /// Twice the signed area, exact in wide integers.
    ///
    /// Positive means counter-clockwise. Computed on raw Q48.16 coordinates,
    /// so only the sign is meaningful to callers.
    #[must_use]
    pub fn signed_area_x2(&self) -> i128 {
        let n = self.verts.len();
        if n < 3 {
            return 0;
        }
        let mut acc: i128 = 0;
        for i in 0..n {
            let a = &self.verts[i];
            let b = &self.verts[(i + 1) % n];
            acc += i128::from(a.x.raw()) * i128::from(b.y.raw())
                - i128::from(b.x.raw()) * i128::from(a.y.raw());
        }
        acc
    }

    /// Reverse the coordinate sequence in place, keeping `vertex_index` keys
    /// ascending. Flips the winding without disturbing the sorted layout.
    fn reverse_coords(&mut self) {
        let n = self.verts.len();
        for i in 0..n / 2 {
            let j = n - 1 - i;
            let (ax, ay) = (self.verts[i].x, self.verts[i].y);
            let (bx, by) = (self.verts[j].x, self.verts[j].y);
            self.verts[i].x = bx;
            self.verts[i].y = by;
            self.verts[j].x = ax;
            self.verts[j].y = ay;
        }
    }
}

/// Local-frame 2-D bounds of a footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aabb2 {
    /// Lower X bound.
    pub min_x: Q,
    /// Lower Y bound.
    pub min_y: Q,
    /// Upper X bound.
    pub max_x: Q,
    /// Upper Y bound.
    pub max_y: Q,
}

/// A parametric polygon with optional holes. No baked geometry is stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Footprint {
    /// Stable nonzero id.
    pub id: FootprintId,
    rings: Vec<FootprintRing>,
}

impl Footprint {
    /// New empty footprint.
    #[must_use]
    pub fn new(id: FootprintId) -> Self {
        Self {
            id,
            rings: Vec::new(),
        }
    }

    /// Rings in ascending `ring_index` order.
    #[must_use]
    pub fn rings(&self) -> &[FootprintRing] {
        &self.rings
    }

    /// The ring with the given index, if present.
    #[must_use]
    pub fn ring(&self, ring_index: u32) -> Option<&FootprintRing> {
        self.rings
            .binary_search_by(|r| r.ring_index.cmp(&ring_index))
            .ok()
            .map(|i| &self.rings[i])
    }

    fn ring_mut_or_add(&mut self, ring_index: u32) -> &mut FootprintRing {
        match self
            .rings
            .binary_search_by(|r| r.ring_index.cmp(&ring_index))
        {
            Ok(i) => &mut self.rings[i],
            Err(i) => {
                self.rings.insert(
                    i,
                    FootprintRing {
                        ring_index,
                        is_hole: ring_index != 0,
                        verts: Vec::new(),
                    },
                );
                &mut self.rings[i]
            }
        }
    }

    /// Create or update a ring's hole flag.
    pub fn set_ring(&mut self, ring_index: u32, is_hole: bool) {
        self.ring_mut_or_add(ring_index).is_hole = is_hole;
    }

    /// Create or update a vertex, keeping the ring sorted by `vertex_index`.
    pub fn set_vertex(&mut self, ring_index: u32, vertex_index: u32, x: Q, y: Q) {
        let ring = self.ring_mut_or_add(ring_index);
        match ring
            .verts
            .binary_search_by(|v| v.vertex_index.cmp(&vertex_index))
        {
            Ok(i) => {
                ring.verts[i].x = x;
                ring.verts[i].y = y;
            }
            Err(i) => ring.verts.insert(
                i,
                FootprintVertex {
                    vertex_index,
                    x,
                    y,
                },
            ),
        }
    }

    /// Reverse rings whose winding violates the convention (outer CCW, hole
    /// CW). Rings with fewer than three vertices are left untouched.
    pub fn canonicalize_winding(&mut self) {
        for ring in &mut self.rings {
            if ring.verts.len() < 3 {
                continue;
            }
            let area = ring.signed_area_x2();
            let wrong = if ring.is_hole { area > 0 } else { area < 0 };
            if wrong {
                ring.reverse_coords();
            }
        }
    }

    /// Local 2-D bounds over all rings; `None` when no vertices exist.
    #[must_use]
    pub fn aabb2(&self) -> Option<Aabb2> {
        let mut out: Option<Aabb2> = None;
        for ring in &self.rings {
            for v in &ring.verts {
                match out.as_mut() {
                    None => {
                        out = Some(Aabb2 {
                            min_x: v.x,
                            min_y: v.y,
                            max_x: v.x,
                            max_y: v.y,
                        });
                    }
                    Some(b) => {
                        b.min_x = b.min_x.min(v.x);
                        b.min_y = b.min_y.min(v.y);
                        b.max_x = b.max_x.max(v.x);
                        b.max_y = b.max_y.max(v.y);
                    }
                }
            }
        }
        out
    }

    /// Check structural and winding invariants.
    ///
    /// # Errors
    /// Reports the first violated invariant; see [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_none() {
            return Err(ValidationError::ZeroId);
        }
        let Some(outer) = self.ring(0) else {
            return Err(ValidationError::OuterRingMissing);
        };
        if outer.vertices().len() < 3 {
            return Err(ValidationError::RingTooSmall { ring_index: 0 });
        }
        for ring in &self.rings {
            if ring.vertices().len() < 3 {
                return Err(ValidationError::RingTooSmall {
                    ring_index: ring.ring_index,
                });
            }
            let area = ring.signed_area_x2();
            if ring.is_hole {
                if area >= 0 {
                    return Err(ValidationError::HoleRingWinding {
                        ring_index: ring.ring_index,
                    });
                }
            } else if area <= 0 {
                return Err(ValidationError::OuterRingWinding {
                    ring_index: ring.ring_index,
                });
            }
        }
        Ok(())
    }
}
