// SPDX-License-Identifier: Apache-2.0
//! Enclosures: interior spaces and their apertures.
//!
//! Enclosures reference volumes (typically void volumes) and define apertures
//! (doors, vents, openings) from which the room graph is compiled.

use super::{insert_sorted_unique, ValidationError};
use crate::ident::{EnclosureId, VolumeId};

/// What kind of opening an aperture is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ApertureKind {
    /// A passable doorway.
    Door,
    /// An airflow vent.
    Vent,
    /// An unframed opening.
    Opening,
}

impl ApertureKind {
    /// Stable wire value fed into edge id derivation and the state digest.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Door => 1,
            Self::Vent => 2,
            Self::Opening => 3,
        }
    }
}

/// One opening out of an enclosure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aperture {
    /// Stable id within the owning enclosure.
    pub aperture_id: u64,
    /// Destination enclosure; zero means the exterior.
    pub to_enclosure: EnclosureId,
    /// Opening kind.
    pub kind: ApertureKind,
}

/// An interior space definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Enclosure {
    /// Stable nonzero id.
    pub id: EnclosureId,
    volume_ids: Vec<VolumeId>,
    apertures: Vec<Aperture>,
}

impl Enclosure {
    /// New empty enclosure.
    #[must_use]
    pub fn new(id: EnclosureId) -> Self {
        Self {
            id,
            volume_ids: Vec::new(),
            apertures: Vec::new(),
        }
    }

    /// Referenced volumes, sorted ascending.
    #[must_use]
    pub fn volume_ids(&self) -> &[VolumeId] {
        &self.volume_ids
    }

    /// Apertures, sorted ascending by `aperture_id`.
    #[must_use]
    pub fn apertures(&self) -> &[Aperture] {
        &self.apertures
    }

    /// Add a volume reference; idempotent.
    pub fn add_volume(&mut self, volume_id: VolumeId) {
        insert_sorted_unique(&mut self.volume_ids, volume_id);
    }

    /// Create or replace an aperture, keyed by `aperture_id`.
    pub fn set_aperture(&mut self, aperture: Aperture) {
        match self
            .apertures
            .binary_search_by(|a| a.aperture_id.cmp(&aperture.aperture_id))
        {
            Ok(i) => self.apertures[i] = aperture,
            Err(i) => self.apertures.insert(i, aperture),
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
        if self.volume_ids.is_empty() {
            return Err(ValidationError::NoVolumes);
        }
        Ok(())
    }
}
