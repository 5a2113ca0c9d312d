// SPDX-License-Identifier: Apache-2.0
//! Structure instances: the authoritative source of truth for placement.
//!
//! An instance carries its placement (anchor plus local pose) and references
//! to the parametric templates it is built from. All id lists are kept
//! sorted unique, so iteration order can never depend on authoring order.

use bytes::Bytes;

use super::{insert_sorted_unique, ValidationError};
use crate::frame::Anchor;
use crate::ident::{
    CarrierIntentId, EnclosureId, FootprintId, SocketId, StructId, SurfaceTemplateId, VolumeId,
};
use crate::math::Pose;

/// One placed structure.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instance {
    /// Stable nonzero id; doubles as the compiled struct id.
    pub id: StructId,
    /// Authoritative host reference.
    pub anchor: Anchor,
    /// Local offset pose from the anchor.
    pub local_pose: Pose,
    /// Primary footprint reference.
    pub footprint: FootprintId,
    volume_ids: Vec<VolumeId>,
    enclosure_ids: Vec<EnclosureId>,
    surface_template_ids: Vec<SurfaceTemplateId>,
    socket_ids: Vec<SocketId>,
    carrier_intent_ids: Vec<CarrierIntentId>,
    /// Opaque TLV parameter overrides; carried through untouched.
    pub overrides: Bytes,
}

impl Instance {
    /// New instance at the world origin with no references.
    #[must_use]
    pub fn new(id: StructId) -> Self {
        Self {
            id,
            anchor: Anchor::WORLD,
            local_pose: Pose::IDENTITY,
            footprint: FootprintId::NONE,
            volume_ids: Vec::new(),
            enclosure_ids: Vec::new(),
            surface_template_ids: Vec::new(),
            socket_ids: Vec::new(),
            carrier_intent_ids: Vec::new(),
            overrides: Bytes::new(),
        }
    }

    /// Referenced volumes, sorted ascending.
    #[must_use]
    pub fn volume_ids(&self) -> &[VolumeId] {
        &self.volume_ids
    }

    /// Referenced enclosures, sorted ascending.
    #[must_use]
    pub fn enclosure_ids(&self) -> &[EnclosureId] {
        &self.enclosure_ids
    }

    /// Referenced surface templates, sorted ascending.
    #[must_use]
    pub fn surface_template_ids(&self) -> &[SurfaceTemplateId] {
        &self.surface_template_ids
    }

    /// Referenced sockets, sorted ascending.
    #[must_use]
    pub fn socket_ids(&self) -> &[SocketId] {
        &self.socket_ids
    }

    /// Referenced carrier intents, sorted ascending.
    #[must_use]
    pub fn carrier_intent_ids(&self) -> &[CarrierIntentId] {
        &self.carrier_intent_ids
    }

    /// Add a volume reference; idempotent.
    pub fn add_volume(&mut self, id: VolumeId) {
        insert_sorted_unique(&mut self.volume_ids, id);
    }

    /// Add an enclosure reference; idempotent.
    pub fn add_enclosure(&mut self, id: EnclosureId) {
        insert_sorted_unique(&mut self.enclosure_ids, id);
    }

    /// Add a surface template reference; idempotent.
    pub fn add_surface_template(&mut self, id: SurfaceTemplateId) {
        insert_sorted_unique(&mut self.surface_template_ids, id);
    }

    /// Add a socket reference; idempotent.
    pub fn add_socket(&mut self, id: SocketId) {
        insert_sorted_unique(&mut self.socket_ids, id);
    }

    /// Add a carrier intent reference; idempotent.
    pub fn add_carrier_intent(&mut self, id: CarrierIntentId) {
        insert_sorted_unique(&mut self.carrier_intent_ids, id);
    }

    /// Check local invariants (does not resolve referenced ids).
    ///
    /// # Errors
    /// Reports the first violated invariant; see [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_none() {
            return Err(ValidationError::ZeroId);
        }
        Ok(())
    }
}
