// SPDX-License-Identifier: Apache-2.0
//! Fixed-point vectors and axis-aligned boxes.

use super::fixed::Q;

/// 3D vector in Q48.16 fixed-point.
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
pub struct Vec3Q {
    /// X component.
    pub x: Q,
    /// Y component.
    pub y: Q,
    /// Z component.
    pub z: Q,
}

impl Vec3Q {
    /// The zero vector.
    pub const ZERO: Self = Self {
        x: Q::ZERO,
        y: Q::ZERO,
        z: Q::ZERO,
    };

    /// Construct from components.
    #[must_use]
    pub const fn new(x: Q, y: Q, z: Q) -> Self {
        Self { x, y, z }
    }

    /// Construct from integer components (each converted to Q48.16).
    #[must_use]
    pub fn from_int(x: i64, y: i64, z: i64) -> Self {
        Self::new(Q::from_int(x), Q::from_int(y), Q::from_int(z))
    }

    /// Componentwise minimum.
    #[must_use]
    pub fn min(self, rhs: Self) -> Self {
        Self::new(self.x.min(rhs.x), self.y.min(rhs.y), self.z.min(rhs.z))
    }

    /// Componentwise maximum.
    #[must_use]
    pub fn max(self, rhs: Self) -> Self {
        Self::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }
}

impl std::ops::Add for Vec3Q {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3Q {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Axis-aligned box in world or local space.
///
/// `min`/`max` are componentwise bounds; a default box is the degenerate box
/// at the origin, which matches the zero-initialized records in the compiled
/// caches.
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
pub struct Aabb {
    /// Componentwise lower bound.
    pub min: Vec3Q,
    /// Componentwise upper bound.
    pub max: Vec3Q,
}

impl Aabb {
    /// Construct from bounds.
    #[must_use]
    pub const fn new(min: Vec3Q, max: Vec3Q) -> Self {
        Self { min, max }
    }

    /// The tightest box containing a set of points. `None` for an empty set.
    #[must_use]
    pub fn from_points(points: &[Vec3Q]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let mut b = Self::new(first, first);
        for &p in rest {
            b.extend(p);
        }
        Some(b)
    }

    /// Grow to contain `p`.
    pub fn extend(&mut self, p: Vec3Q) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow to contain another box.
    pub fn union_with(&mut self, b: &Self) {
        self.min = self.min.min(b.min);
        self.max = self.max.max(b.max);
    }

    /// The eight corners, enumerated z-major then y then x.
    ///
    /// The enumeration order is part of the deterministic contract: world
    /// boxes are built by transforming exactly these corners in this order.
    #[must_use]
    pub fn corners(&self) -> [Vec3Q; 8] {
        let lo = self.min;
        let hi = self.max;
        [
            Vec3Q::new(lo.x, lo.y, lo.z),
            Vec3Q::new(hi.x, lo.y, lo.z),
            Vec3Q::new(lo.x, hi.y, lo.z),
            Vec3Q::new(hi.x, hi.y, lo.z),
            Vec3Q::new(lo.x, lo.y, hi.z),
            Vec3Q::new(hi.x, lo.y, hi.z),
            Vec3Q::new(lo.x, hi.y, hi.z),
            Vec3Q::new(hi.x, hi.y, hi.z),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn from_points_spans_extremes() {
        let pts = [
            Vec3Q::from_int(1, 5, -2),
            Vec3Q::from_int(-3, 0, 4),
            Vec3Q::from_int(2, 2, 2),
        ];
        let b = Aabb::from_points(&pts).unwrap();
        assert_eq!(b.min, Vec3Q::from_int(-3, 0, -2));
        assert_eq!(b.max, Vec3Q::from_int(2, 5, 4));
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn union_is_componentwise() {
        let mut a = Aabb::new(Vec3Q::from_int(0, 0, 0), Vec3Q::from_int(1, 1, 1));
        let b = Aabb::new(Vec3Q::from_int(-1, 0, 0), Vec3Q::from_int(0, 3, 1));
        a.union_with(&b);
        assert_eq!(a.min, Vec3Q::from_int(-1, 0, 0));
        assert_eq!(a.max, Vec3Q::from_int(1, 3, 1));
    }
}
