// SPDX-License-Identifier: Apache-2.0
//! Stable identifiers and the deterministic id-derivation hash.
//!
//! Authoring objects carry caller-chosen nonzero `u64` ids. Compiled
//! artifacts derive their ids from identity fields alone through a fixed
//! 64-bit avalanche chain, so an artifact's id never depends on insertion
//! order, schedule slicing, or anything positional.
//!
//! The hash step is `H(acc, v) = mix64(acc ^ v)` folded left over a seed and
//! a fixed sequence of `u64` values. [`mix64`] is the splitmix64 finalizer —
//! an integer-only bijection. The seeds and the mix constants are part of the
//! compiled-state format: changing any of them is a format revision.

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[repr(transparent)]
        #[derive(
            Clone,
            Copy,
            Debug,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            bytemuck::Pod,
            bytemuck::Zeroable,
        )]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u64);

        impl $name {
            /// The reserved "no object" id.
            pub const NONE: Self = Self(0);

            /// True when this is the reserved zero id.
            #[must_use]
            pub const fn is_none(self) -> bool {
                self.0 == 0
            }
        }
    };
}

id_type!(
    /// Stable id of an authored structure instance.
    StructId
);
id_type!(
    /// Stable id of an authored footprint.
    FootprintId
);
id_type!(
    /// Stable id of an authored volume.
    VolumeId
);
id_type!(
    /// Stable id of an authored enclosure.
    EnclosureId
);
id_type!(
    /// Stable id of an authored surface template.
    SurfaceTemplateId
);
id_type!(
    /// Stable id of an authored socket.
    SocketId
);
id_type!(
    /// Stable id of an authored carrier intent.
    CarrierIntentId
);
id_type!(
    /// Stable id of a world frame in the host frame table.
    FrameId
);

id_type!(
    /// Derived id of a compiled occupancy region.
    RegionId
);
id_type!(
    /// Derived id of a compiled room node. Zero is the exterior room.
    RoomId
);
id_type!(
    /// Derived id of a compiled room edge.
    RoomEdgeId
);
id_type!(
    /// Derived id of a compiled surface.
    SurfaceId
);
id_type!(
    /// Derived id of a compiled support node.
    SupportNodeId
);
id_type!(
    /// Derived id of a compiled support edge.
    SupportEdgeId
);
id_type!(
    /// Derived id of a compiled carrier artifact.
    CarrierArtifactId
);

impl FrameId {
    /// The root world frame.
    pub const WORLD: Self = Self(1);
}

impl RoomId {
    /// The exterior pseudo-room apertures may open onto.
    pub const EXTERIOR: Self = Self(0);
}

/// splitmix64 finalizer: a published integer bijection with strong avalanche.
///
/// Constants are format-baked; see module docs.
#[must_use]
pub fn mix64(v: u64) -> u64 {
    let mut z = v;
    z ^= z >> 30;
    z = z.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z ^= z >> 27;
    z = z.wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    z
}

/// Left fold of `H(acc, v) = mix64(acc ^ v)` over a per-class seed.
#[derive(Clone, Copy, Debug)]
pub struct IdHasher(u64);

impl IdHasher {
    /// Start a chain from a per-class seed.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self(seed)
    }

    /// Absorb one value.
    #[must_use]
    pub fn step(self, v: u64) -> Self {
        Self(mix64(self.0 ^ v))
    }

    /// The accumulated 64-bit id.
    #[must_use]
    pub const fn finish(self) -> u64 {
        self.0
    }
}

/// Per-class id seeds. Format constants; never reorder or renumber.
mod seed {
    pub const OCC_REGION: u64 = 0x53A2_E9D1_6B5A_3C1D;
    pub const ROOM: u64 = 0x9E9B_54E9_A3C6_7B51;
    pub const ROOM_EDGE: u64 = 0xC3A5_C85C_97CB_3127;
    pub const SURFACE: u64 = 0x6A09_E667_F3BC_C909;
    pub const SUPPORT_NODE: u64 = 0xA54F_F53A_5F1D_36F1;
    pub const SUPPORT_EDGE: u64 = 0x510E_527F_ADE6_82D1;
    pub const CARRIER: u64 = 0xBB67_AE85_84CA_A73B;
}

/// Derive an occupancy region id.
#[must_use]
pub fn region_id(struct_id: StructId, volume_id: VolumeId, is_void: bool) -> RegionId {
    RegionId(
        IdHasher::with_seed(seed::OCC_REGION)
            .step(struct_id.0)
            .step(volume_id.0)
            .step(u64::from(is_void))
            .finish(),
    )
}

/// Derive a room id.
#[must_use]
pub fn room_id(struct_id: StructId, enclosure_id: EnclosureId) -> RoomId {
    RoomId(
        IdHasher::with_seed(seed::ROOM)
            .step(struct_id.0)
            .step(enclosure_id.0)
            .finish(),
    )
}

/// Derive a room edge id from the authored aperture identity.
///
/// The destination enclosure id is hashed as authored even when the edge
/// resolves to the exterior room, so edge identity survives the target
/// enclosure leaving and re-entering the instance's set.
#[must_use]
pub fn room_edge_id(
    struct_id: StructId,
    src_enclosure: EnclosureId,
    aperture_id: u64,
    dst_enclosure: EnclosureId,
    kind: u32,
) -> RoomEdgeId {
    RoomEdgeId(
        IdHasher::with_seed(seed::ROOM_EDGE)
            .step(struct_id.0)
            .step(src_enclosure.0)
            .step(aperture_id)
            .step(dst_enclosure.0)
            .step(u64::from(kind))
            .finish(),
    )
}

/// Derive a compiled surface id.
#[must_use]
pub fn surface_id(struct_id: StructId, template_id: SurfaceTemplateId) -> SurfaceId {
    SurfaceId(
        IdHasher::with_seed(seed::SURFACE)
            .step(struct_id.0)
            .step(template_id.0)
            .finish(),
    )
}

/// Derive a support node id. `local_index` is 0 for the base node, 1 for the
/// top node.
#[must_use]
pub fn support_node_id(struct_id: StructId, region: RegionId, local_index: u64) -> SupportNodeId {
    SupportNodeId(
        IdHasher::with_seed(seed::SUPPORT_NODE)
            .step(struct_id.0)
            .step(region.0)
            .step(local_index)
            .finish(),
    )
}

/// Derive a support edge id.
#[must_use]
pub fn support_edge_id(struct_id: StructId, region: RegionId) -> SupportEdgeId {
    SupportEdgeId(
        IdHasher::with_seed(seed::SUPPORT_EDGE)
            .step(struct_id.0)
            .step(region.0)
            .finish(),
    )
}

/// Derive a carrier artifact id.
#[must_use]
pub fn carrier_artifact_id(struct_id: StructId, intent_id: CarrierIntentId) -> CarrierArtifactId {
    CarrierArtifactId(
        IdHasher::with_seed(seed::CARRIER)
            .step(struct_id.0)
            .step(intent_id.0)
            .finish(),
    )
}
