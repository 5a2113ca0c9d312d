// SPDX-License-Identifier: Apache-2.0
//! Volumes: parametric solid/void definitions derived into occupancy.

use super::ValidationError;
use crate::ident::{FootprintId, VolumeId};
use crate::math::Q;

/// Operator a boolean term applies against the accumulated shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoolOp {
    /// Add the operand.
    Union,
    /// Remove the operand.
    Subtract,
    /// Keep only the overlap.
    Intersect,
}

/// One ordered operand of a boolean volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoolTerm {
    /// Local ordering key.
    pub term_index: u32,
    /// Referenced operand volume; must not be the owning volume.
    pub volume: VolumeId,
    /// Operator applied against the accumulator.
    pub op: BoolOp,
}

/// The parametric shape of a volume.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VolumeKind {
    /// A footprint extruded along local Z from `base_z` by `height`.
    Extrude {
        /// Profile polygon.
        footprint: FootprintId,
        /// Local Z offset of the base.
        base_z: Q,
        /// Extrusion height (≥ 0).
        height: Q,
    },
    /// A footprint swept along local +X.
    ///
    /// Only the trivial +X sweep exists; `length` extends the footprint
    /// bounds along local X and the swept solid spans `0..height` on Z.
    Sweep {
        /// Profile polygon.
        footprint: FootprintId,
        /// Sweep length along local +X (≥ 0).
        length: Q,
        /// Solid height (≥ 0).
        height: Q,
    },
    /// A combination of other volumes, terms sorted by `term_index`.
    Bool {
        /// Ordered operands.
        terms: Vec<BoolTerm>,
    },
}

/// A parametric solid or void definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Volume {
    /// Stable nonzero id.
    pub id: VolumeId,
    /// True when this volume carves void instead of adding solid.
    pub is_void: bool,
    /// Parametric shape.
    pub kind: VolumeKind,
}

impl Volume {
    /// An extruded footprint volume.
    #[must_use]
    pub fn extrude(id: VolumeId, footprint: FootprintId, base_z: Q, height: Q, is_void: bool) -> Self {
        Self {
            id,
            is_void,
            kind: VolumeKind::Extrude {
                footprint,
                base_z,
                height,
            },
        }
    }

    /// A swept footprint volume.
    #[must_use]
    pub fn sweep(id: VolumeId, footprint: FootprintId, length: Q, height: Q, is_void: bool) -> Self {
        Self {
            id,
            is_void,
            kind: VolumeKind::Sweep {
                footprint,
                length,
                height,
            },
        }
    }

    /// An empty boolean volume; fill in operands with [`Self::set_bool_term`].
    #[must_use]
    pub fn boolean(id: VolumeId, is_void: bool) -> Self {
        Self {
            id,
            is_void,
            kind: VolumeKind::Bool { terms: Vec::new() },
        }
    }

    /// Create or replace a boolean term, keeping terms sorted by
    /// `term_index`.
    ///
    /// # Errors
    /// [`ValidationError::NotBoolean`] when the volume is not a boolean.
    pub fn set_bool_term(
        &mut self,
        term_index: u32,
        volume: VolumeId,
        op: BoolOp,
    ) -> Result<(), ValidationError> {
        let VolumeKind::Bool { terms } = &mut self.kind else {
            return Err(ValidationError::NotBoolean);
        };
        match terms.binary_search_by(|t| t.term_index.cmp(&term_index)) {
            Ok(i) => {
                terms[i].volume = volume;
                terms[i].op = op;
            }
            Err(i) => terms.insert(
                i,
                BoolTerm {
                    term_index,
                    volume,
                    op,
                },
            ),
        }
        Ok(())
    }

    /// Check local invariants (does not resolve references).
    ///
    /// # Errors
    /// Reports the first violated invariant; see [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_none() {
            return Err(ValidationError::ZeroId);
        }
        match &self.kind {
            VolumeKind::Extrude { height, .. } => {
                if *height < Q::ZERO {
                    return Err(ValidationError::NegativeExtent);
                }
            }
            VolumeKind::Sweep { length, height, .. } => {
                if *length < Q::ZERO || *height < Q::ZERO {
                    return Err(ValidationError::NegativeExtent);
                }
            }
            VolumeKind::Bool { terms } => {
                if terms.is_empty() {
                    return Err(ValidationError::NoBoolTerms);
                }
            }
        }
        Ok(())
    }
}
