// SPDX-License-Identifier: Apache-2.0
//! Authoring model: the caller-owned parametric definitions the compiler
//! consumes.
//!
//! Everything here is plain data with stable ids. The types expose
//! deterministic mutators (sorted-by-key, get-or-insert) so hosts can build
//! and edit authoring sets without ever producing an order-dependent layout;
//! the compiler itself only ever holds immutable views of these objects.

pub mod carrier;
pub mod enclosure;
pub mod footprint;
pub mod input;
pub mod instance;
pub mod socket;
pub mod surface;
pub mod volume;

pub use carrier::{CarrierIntent, CarrierKind};
pub use enclosure::{Aperture, ApertureKind, Enclosure};
pub use footprint::{Aabb2, Footprint, FootprintRing, FootprintVertex};
pub use input::AuthoringInput;
pub use instance::Instance;
pub use socket::Socket;
pub use surface::{FaceKind, SurfaceTemplate, SurfaceTemplateKind};
pub use volume::{BoolOp, BoolTerm, Volume, VolumeKind};

use thiserror::Error;

/// Structural problems `validate` reports on authoring objects.
///
/// Validation checks local invariants only; dangling cross-references are the
/// compiler's concern and surface as [`crate::CompileError`] during rebuild.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The object carries the reserved zero id.
    #[error("authoring object has the reserved zero id")]
    ZeroId,
    /// A footprint has no ring with index 0.
    #[error("footprint has no outer ring")]
    OuterRingMissing,
    /// A ring has fewer than three vertices.
    #[error("footprint ring {ring_index} has fewer than three vertices")]
    RingTooSmall {
        /// Index of the degenerate ring.
        ring_index: u32,
    },
    /// An outer ring winds clockwise (run winding canonicalization first).
    #[error("outer ring {ring_index} is not counter-clockwise")]
    OuterRingWinding {
        /// Index of the offending ring.
        ring_index: u32,
    },
    /// A hole ring winds counter-clockwise (run winding canonicalization first).
    #[error("hole ring {ring_index} is not clockwise")]
    HoleRingWinding {
        /// Index of the offending ring.
        ring_index: u32,
    },
    /// A volume extent (height, length, width, depth) is negative.
    #[error("negative extent on an authoring object")]
    NegativeExtent,
    /// A boolean volume has no terms.
    #[error("boolean volume has no terms")]
    NoBoolTerms,
    /// A boolean-only mutator was called on a non-boolean volume.
    #[error("volume is not a boolean volume")]
    NotBoolean,
    /// An enclosure references no volumes.
    #[error("enclosure references no volumes")]
    NoVolumes,
    /// A socket names the zero surface template.
    #[error("socket has no surface template")]
    NoSurfaceTemplate,
}

/// Insert into a sorted vec keeping elements unique; returns whether the
/// value was newly added.
pub(crate) fn insert_sorted_unique<T: Ord + Copy>(items: &mut Vec<T>, value: T) -> bool {
    match items.binary_search(&value) {
        Ok(_) => false,
        Err(pos) => {
            items.insert(pos, value);
            true
        }
    }
}
