// SPDX-License-Identifier: Apache-2.0
//! The immutable authoring view the compiler consumes.

use rustc_hash::FxHashMap;

use super::carrier::CarrierIntent;
use super::enclosure::Enclosure;
use super::footprint::Footprint;
use super::instance::Instance;
use super::socket::Socket;
use super::surface::SurfaceTemplate;
use super::volume::Volume;
use crate::frame::WorldFrame;
use crate::ident::{
    CarrierIntentId, EnclosureId, FootprintId, SocketId, StructId, SurfaceTemplateId, VolumeId,
};

/// Borrowed view over the caller-owned authoring sets.
///
/// Slices may be in any order; the compiler resolves by id and iterates only
/// the instances' sorted id lists, so slice order can never reach compiled
/// output. `frames` is optional and only required when anchors reference
/// table frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthoringInput<'a> {
    /// Placed structures.
    pub instances: &'a [Instance],
    /// Footprint definitions.
    pub footprints: &'a [Footprint],
    /// Volume definitions.
    pub volumes: &'a [Volume],
    /// Enclosure definitions.
    pub enclosures: &'a [Enclosure],
    /// Surface template definitions.
    pub surface_templates: &'a [SurfaceTemplate],
    /// Socket definitions.
    pub sockets: &'a [Socket],
    /// Carrier intent definitions.
    pub carrier_intents: &'a [CarrierIntent],
    /// Optional world-frame table, sorted by frame id.
    pub frames: Option<&'a [WorldFrame]>,
}

impl AuthoringInput<'_> {
    /// The instance with the given struct id, if present.
    #[must_use]
    pub fn instance(&self, id: StructId) -> Option<&Instance> {
        if id.is_none() {
            return None;
        }
        self.instances.iter().find(|i| i.id == id)
    }
}

/// Per-`process` lookup acceleration over an [`AuthoringInput`].
///
/// Maps ids to slice indices. The maps are consulted for point lookups only
/// and never iterated, so their internal ordering is invisible to compiled
/// output.
pub(crate) struct Resolver<'a> {
    input: AuthoringInput<'a>,
    footprints: FxHashMap<u64, usize>,
    volumes: FxHashMap<u64, usize>,
    enclosures: FxHashMap<u64, usize>,
    surface_templates: FxHashMap<u64, usize>,
    sockets: FxHashMap<u64, usize>,
    carrier_intents: FxHashMap<u64, usize>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(input: AuthoringInput<'a>) -> Self {
        fn index_by<T>(items: &[T], id_of: impl Fn(&T) -> u64) -> FxHashMap<u64, usize> {
            let mut map = FxHashMap::default();
            for (i, item) in items.iter().enumerate() {
                map.insert(id_of(item), i);
            }
            map
        }
        Self {
            footprints: index_by(input.footprints, |f| f.id.0),
            volumes: index_by(input.volumes, |v| v.id.0),
            enclosures: index_by(input.enclosures, |e| e.id.0),
            surface_templates: index_by(input.surface_templates, |t| t.id.0),
            sockets: index_by(input.sockets, |s| s.id.0),
            carrier_intents: index_by(input.carrier_intents, |c| c.id.0),
            input,
        }
    }

    pub(crate) fn frames(&self) -> Option<&'a [WorldFrame]> {
        self.input.frames
    }

    pub(crate) fn footprint(&self, id: FootprintId) -> Option<&'a Footprint> {
        if id.is_none() {
            return None;
        }
        self.footprints
            .get(&id.0)
            .map(|&i| &self.input.footprints[i])
    }

    pub(crate) fn volume(&self, id: VolumeId) -> Option<&'a Volume> {
        if id.is_none() {
            return None;
        }
        self.volumes.get(&id.0).map(|&i| &self.input.volumes[i])
    }

    pub(crate) fn enclosure(&self, id: EnclosureId) -> Option<&'a Enclosure> {
        if id.is_none() {
            return None;
        }
        self.enclosures
            .get(&id.0)
            .map(|&i| &self.input.enclosures[i])
    }

    pub(crate) fn surface_template(&self, id: SurfaceTemplateId) -> Option<&'a SurfaceTemplate> {
        if id.is_none() {
            return None;
        }
        self.surface_templates
            .get(&id.0)
            .map(|&i| &self.input.surface_templates[i])
    }

    pub(crate) fn socket(&self, id: SocketId) -> Option<&'a Socket> {
        if id.is_none() {
            return None;
        }
        self.sockets.get(&id.0).map(|&i| &self.input.sockets[i])
    }

    pub(crate) fn carrier_intent(&self, id: CarrierIntentId) -> Option<&'a CarrierIntent> {
        if id.is_none() {
            return None;
        }
        self.carrier_intents
            .get(&id.0)
            .map(|&i| &self.input.carrier_intents[i])
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Q;

    #[test]
    fn resolver_finds_by_id_not_position() {
        let fps = [
            Footprint::new(FootprintId(11)),
            Footprint::new(FootprintId(10)),
        ];
        let input = AuthoringInput {
            footprints: &fps,
            ..AuthoringInput::default()
        };
        let r = Resolver::new(input);
        assert_eq!(r.footprint(FootprintId(10)).unwrap().id, FootprintId(10));
        assert!(r.footprint(FootprintId(12)).is_none());
        assert!(r.footprint(FootprintId::NONE).is_none());
    }

    #[test]
    fn zero_ids_never_resolve() {
        let vols = [Volume::extrude(
            VolumeId(20),
            FootprintId(10),
            Q::ZERO,
            Q::ONE,
            false,
        )];
        let input = AuthoringInput {
            volumes: &vols,
            ..AuthoringInput::default()
        };
        let r = Resolver::new(input);
        assert!(r.volume(VolumeId::NONE).is_none());
        assert!(r.volume(VolumeId(20)).is_some());
    }
}
