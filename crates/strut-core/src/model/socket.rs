// SPDX-License-Identifier: Apache-2.0
//! Sockets: authored attachment points on compiled surfaces.
//!
//! Sockets host other subsystems (decor, agents) via surface
//! parameterization: `(u, v)` on the surface plus an offset along its normal.

use super::ValidationError;
use crate::ident::{SocketId, SurfaceTemplateId};
use crate::math::Q;

/// An authored attachment point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Socket {
    /// Stable nonzero id.
    pub id: SocketId,
    /// Surface template this socket binds to; must be listed by the owning
    /// instance.
    pub surface_template: SurfaceTemplateId,
    /// Surface u parameter.
    pub u: Q,
    /// Surface v parameter.
    pub v: Q,
    /// Offset along the surface normal.
    pub offset: Q,
}

impl Socket {
    /// Check local invariants (does not resolve referenced ids).
    ///
    /// # Errors
    /// Reports the first violated invariant; see [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_none() {
            return Err(ValidationError::ZeroId);
        }
        if self.surface_template.is_none() {
            return Err(ValidationError::NoSurfaceTemplate);
        }
        Ok(())
    }
}
