// SPDX-License-Identifier: Apache-2.0
//! Surface templates: parametric selection rules for compiled surfaces.
//!
//! Templates describe which derived surfaces to expose (facades, panels,
//! room faces); they are selection rules, never baked geometry.

use super::ValidationError;
use crate::ident::{EnclosureId, SurfaceTemplateId, VolumeId};

/// Which family of host the template selects a face from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceTemplateKind {
    /// Unset; the template selects nothing yet.
    #[default]
    None,
    /// A face of the referenced volume's local bounds.
    VolumeFace,
    /// A face of the referenced enclosure.
    EnclosureFace,
}

/// Which face of an axis-aligned bound a template selects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaceKind {
    /// The +Z face.
    #[default]
    Top,
    /// The -Z face.
    Bottom,
    /// One of the four side faces, selected by `face_index % 4`.
    Side,
}

impl FaceKind {
    /// Stable wire value fed into the state digest.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Top => 0,
            Self::Bottom => 1,
            Self::Side => 2,
        }
    }
}

/// A parametric surface selection rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceTemplate {
    /// Stable nonzero id.
    pub id: SurfaceTemplateId,
    /// Host family.
    pub kind: SurfaceTemplateKind,
    /// Referenced volume; required for [`SurfaceTemplateKind::VolumeFace`].
    pub volume: VolumeId,
    /// Referenced enclosure; optional (zero allowed).
    pub enclosure: EnclosureId,
    /// Face selector.
    pub face_kind: FaceKind,
    /// Side selector for [`FaceKind::Side`]; `face_index % 4` picks the face.
    pub face_index: u32,
}

impl SurfaceTemplate {
    /// A volume-face template.
    #[must_use]
    pub fn volume_face(
        id: SurfaceTemplateId,
        volume: VolumeId,
        face_kind: FaceKind,
        face_index: u32,
    ) -> Self {
        Self {
            id,
            kind: SurfaceTemplateKind::VolumeFace,
            volume,
            enclosure: EnclosureId::NONE,
            face_kind,
            face_index,
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
        if matches!(self.kind, SurfaceTemplateKind::VolumeFace) && self.volume.is_none() {
            return Err(ValidationError::NoVolumes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_face_requires_a_volume() {
        let t = SurfaceTemplate::volume_face(SurfaceTemplateId(40), VolumeId(20), FaceKind::Top, 0);
        assert!(t.validate().is_ok());
        let bad = SurfaceTemplate::volume_face(
            SurfaceTemplateId(40),
            VolumeId::NONE,
            FaceKind::Side,
            2,
        );
        assert_eq!(bad.validate(), Err(ValidationError::NoVolumes));
    }
}
