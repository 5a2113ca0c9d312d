// SPDX-License-Identifier: Apache-2.0
//! World frames and anchors.
//!
//! An anchor is a parametric reference to a host frame plus local offset
//! coordinates; it resolves to an absolute [`Pose`] given the frame table and
//! a tick. Resolution is a pure function of its arguments — the same anchor,
//! table, and tick always produce the same pose bits.

use crate::error::CompileError;
use crate::ident::FrameId;
use crate::math::{Pose, Q, Vec3Q};

/// One host frame. Tables are sorted by `id` and looked up by binary search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldFrame {
    /// Stable nonzero frame id.
    pub id: FrameId,
    /// Absolute pose of the frame.
    pub pose: Pose,
}

/// How an anchor locates its host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorKind {
    /// The world origin.
    World,
    /// A point on the terrain parameterization of the world frame.
    Terrain {
        /// Terrain u coordinate.
        u: Q,
        /// Terrain v coordinate.
        v: Q,
        /// Height offset above the terrain reference.
        h: Q,
    },
    /// A pose relative to a table frame.
    Frame {
        /// Host frame looked up in the frame table.
        frame: FrameId,
        /// Local offset applied in the host frame.
        local: Pose,
    },
}

/// A parametric reference that evaluates to an absolute pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anchor {
    /// Host resolution rule.
    pub kind: AnchorKind,
}

impl Anchor {
    /// An anchor pinned to the world origin.
    pub const WORLD: Self = Self {
        kind: AnchorKind::World,
    };

    /// Terrain anchor at `(u, v)` with height offset `h`.
    #[must_use]
    pub const fn terrain(u: Q, v: Q, h: Q) -> Self {
        Self {
            kind: AnchorKind::Terrain { u, v, h },
        }
    }

    /// Frame anchor with a local offset pose.
    #[must_use]
    pub const fn frame(frame: FrameId, local: Pose) -> Self {
        Self {
            kind: AnchorKind::Frame { frame, local },
        }
    }

    /// Resolve to an absolute pose.
    ///
    /// `frames` must be sorted ascending by frame id. `tick` is part of the
    /// contract so hosts can supply time-varying frames; the built-in kinds
    /// are static and ignore it.
    ///
    /// # Errors
    /// Returns [`CompileError::MissingFrame`] when a `Frame` anchor names an
    /// id absent from the table (or no table was supplied).
    pub fn eval(&self, frames: Option<&[WorldFrame]>, _tick: u64) -> Result<Pose, CompileError> {
        match self.kind {
            AnchorKind::World => Ok(Pose::IDENTITY),
            AnchorKind::Terrain { u, v, h } => Ok(Pose::from_pos(Vec3Q::new(u, v, h))),
            AnchorKind::Frame { frame, local } => {
                let table = frames.ok_or(CompileError::MissingFrame(frame))?;
                let idx = table
                    .binary_search_by(|f| f.id.cmp(&frame))
                    .map_err(|_| CompileError::MissingFrame(frame))?;
                Ok(table[idx].pose.compose(local))
            }
        }
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::WORLD
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn terrain_anchor_is_translation() {
        let a = Anchor::terrain(Q::from_int(100), Q::from_int(200), Q::ZERO);
        let p = a.eval(None, 1).unwrap();
        assert_eq!(p.pos, Vec3Q::from_int(100, 200, 0));
        assert_eq!(p.rot, crate::math::QuatQ::IDENTITY);
    }

    #[test]
    fn frame_anchor_requires_table_entry() {
        let frames = [
            WorldFrame {
                id: FrameId(1),
                pose: Pose::from_pos(Vec3Q::from_int(10, 0, 0)),
            },
            WorldFrame {
                id: FrameId(5),
                pose: Pose::IDENTITY,
            },
        ];
        let a = Anchor::frame(FrameId(1), Pose::from_pos(Vec3Q::from_int(1, 2, 3)));
        let p = a.eval(Some(&frames), 0).unwrap();
        assert_eq!(p.pos, Vec3Q::from_int(11, 2, 3));

        let missing = Anchor::frame(FrameId(9), Pose::IDENTITY);
        assert_eq!(
            missing.eval(Some(&frames), 0),
            Err(CompileError::MissingFrame(FrameId(9)))
        );
        assert_eq!(
            missing.eval(None, 0),
            Err(CompileError::MissingFrame(FrameId(9)))
        );
    }

    #[test]
    fn eval_ignores_tick_for_static_kinds() {
        let a = Anchor::terrain(Q::ONE, Q::ONE, Q::ONE);
        assert_eq!(a.eval(None, 0).unwrap(), a.eval(None, 77).unwrap());
    }
}
