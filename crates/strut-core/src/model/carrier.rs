// SPDX-License-Identifier: Apache-2.0
//! Carrier intents: parametric terrain/corridor interaction requests.
//!
//! Bridges, viaducts, tunnels, cuts, and fills are authored as two anchors
//! plus generic size parameters. The compiler derives artifacts from these;
//! no baked geometry is stored.

use bytes::Bytes;

use super::ValidationError;
use crate::frame::Anchor;
use crate::ident::CarrierIntentId;
use crate::math::Q;

/// What the carrier does where it meets terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CarrierKind {
    /// Spans above terrain between the anchors.
    Bridge,
    /// A multi-segment elevated span.
    Viaduct,
    /// Bores below terrain.
    Tunnel,
    /// Removes terrain down to the carrier envelope.
    Cut,
    /// Raises terrain up to the carrier envelope.
    Fill,
}

impl CarrierKind {
    /// Stable wire value fed into the state digest.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Bridge => 1,
            Self::Viaduct => 2,
            Self::Tunnel => 3,
            Self::Cut => 4,
            Self::Fill => 5,
        }
    }
}

/// An authored carrier request between two anchors.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarrierIntent {
    /// Stable nonzero id.
    pub id: CarrierIntentId,
    /// Carrier kind.
    pub kind: CarrierKind,
    /// First endpoint.
    pub a0: Anchor,
    /// Second endpoint.
    pub a1: Anchor,
    /// Envelope width (≥ 0); interpretation depends on kind.
    pub width: Q,
    /// Envelope height (≥ 0).
    pub height: Q,
    /// Envelope depth (≥ 0).
    pub depth: Q,
    /// Opaque TLV parameter extension; carried through untouched.
    pub params: Bytes,
}

impl CarrierIntent {
    /// New intent with zero extents and empty params.
    #[must_use]
    pub fn new(id: CarrierIntentId, kind: CarrierKind, a0: Anchor, a1: Anchor) -> Self {
        Self {
            id,
            kind,
            a0,
            a1,
            width: Q::ZERO,
            height: Q::ZERO,
            depth: Q::ZERO,
            params: Bytes::new(),
        }
    }

    /// Check local invariants (does not resolve referenced ids).
    ///
    /// # Errors
    /// Reports the first violated invariant; see [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_none() {
            return Err(ValidationError::ZeroId);
        }
        if self.width < Q::ZERO || self.height < Q::ZERO || self.depth < Q::ZERO {
            return Err(ValidationError::NegativeExtent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_negative_extents() {
        let mut c = CarrierIntent::new(
            CarrierIntentId(500),
            CarrierKind::Bridge,
            Anchor::WORLD,
            Anchor::WORLD,
        );
        assert!(c.validate().is_ok());
        c.depth = -Q::ONE;
        assert_eq!(c.validate(), Err(ValidationError::NegativeExtent));
    }
}
