// SPDX-License-Identifier: Apache-2.0
//! Fixed-point quaternion pose algebra.
//!
//! Positions and rotations are Q48.16; every multiply rounds to nearest with
//! ties-to-even (see [`Q::mul`]), which is the NEAR rounding mode required of
//! the pose contract. No float ever enters these paths, so composition and
//! point transforms are bitwise reproducible.

use super::fixed::Q;
use super::vec::Vec3Q;

/// Unit quaternion in Q48.16 components.
///
/// The algebra does not renormalize; callers author rotations in fixed point
/// and the compiler carries them through verbatim.
#[repr(C)]
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuatQ {
    /// i component.
    pub x: Q,
    /// j component.
    pub y: Q,
    /// k component.
    pub z: Q,
    /// Scalar component.
    pub w: Q,
}

impl QuatQ {
    /// The identity rotation.
    pub const IDENTITY: Self = Self {
        x: Q::ZERO,
        y: Q::ZERO,
        z: Q::ZERO,
        w: Q::ONE,
    };

    /// Hamilton product `self * rhs`.
    #[must_use]
    pub fn mul(self, rhs: Self) -> Self {
        let (ax, ay, az, aw) = (self.x, self.y, self.z, self.w);
        let (bx, by, bz, bw) = (rhs.x, rhs.y, rhs.z, rhs.w);
        Self {
            x: aw.mul(bx) + ax.mul(bw) + ay.mul(bz) - az.mul(by),
            y: aw.mul(by) - ax.mul(bz) + ay.mul(bw) + az.mul(bx),
            z: aw.mul(bz) + ax.mul(by) - ay.mul(bx) + az.mul(bw),
            w: aw.mul(bw) - ax.mul(bx) - ay.mul(by) - az.mul(bz),
        }
    }

    /// Rotate a vector: `v + 2w·(q×v) + 2·(q×(q×v))`.
    #[must_use]
    pub fn rotate(self, v: Vec3Q) -> Vec3Q {
        let qv = Vec3Q::new(self.x, self.y, self.z);
        let t = cross(qv, v);
        let t2 = Vec3Q::new(t.x + t.x, t.y + t.y, t.z + t.z);
        let wt = Vec3Q::new(self.w.mul(t2.x), self.w.mul(t2.y), self.w.mul(t2.z));
        let qt = cross(qv, t2);
        v + wt + qt
    }
}

impl Default for QuatQ {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn cross(a: Vec3Q, b: Vec3Q) -> Vec3Q {
    Vec3Q::new(
        a.y.mul(b.z) - a.z.mul(b.y),
        a.z.mul(b.x) - a.x.mul(b.z),
        a.x.mul(b.y) - a.y.mul(b.x),
    )
}

/// Position plus rotation in fixed point.
#[repr(C)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// Translation.
    pub pos: Vec3Q,
    /// Rotation.
    pub rot: QuatQ,
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        pos: Vec3Q::ZERO,
        rot: QuatQ::IDENTITY,
    };

    /// Construct from a translation with identity rotation.
    #[must_use]
    pub const fn from_pos(pos: Vec3Q) -> Self {
        Self {
            pos,
            rot: QuatQ::IDENTITY,
        }
    }

    /// Compose two poses: apply `local` in the frame of `self`.
    #[must_use]
    pub fn compose(self, local: Self) -> Self {
        Self {
            pos: self.pos + self.rot.rotate(local.pos),
            rot: self.rot.mul(local.rot),
        }
    }

    /// Transform a point from local space into this pose's frame.
    #[must_use]
    pub fn transform_point(self, p: Vec3Q) -> Vec3Q {
        self.rot.rotate(p) + self.pos
    }

    /// Transform a local box by transforming its eight corners and taking
    /// componentwise bounds.
    #[must_use]
    pub fn transform_aabb(self, b: &crate::math::Aabb) -> crate::math::Aabb {
        let corners = b.corners();
        let first = self.transform_point(corners[0]);
        let mut out = crate::math::Aabb::new(first, first);
        for &c in &corners[1..] {
            out.extend(self.transform_point(c));
        }
        out
    }
}
