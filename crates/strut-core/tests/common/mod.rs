// SPDX-License-Identifier: Apache-2.0
//! Shared fixtures for the compiler integration tests.
//!
//! The scenario mirrors a small inhabited structure: a solid slab with a
//! carved void room, one door to the exterior, a roof surface and one side
//! surface carrying a socket, placed on terrain with a 45° yaw.
#![allow(dead_code)]

use strut_core::{
    Anchor, Aperture, ApertureKind, AuthoringInput, CarrierIntent, CarrierIntentId, CarrierKind,
    Compiler, DirtyFlags, Enclosure, EnclosureId, FaceKind, Footprint, FootprintId, Instance,
    Pose, Q, QuatQ, Socket, SocketId, StructId, SurfaceTemplate, SurfaceTemplateId, Volume,
    VolumeId,
};

/// `sin(pi/4)` in Q16 raw, as authored poses carry it.
pub const ROT_HALF_SQRT2: i64 = 46340;

#[must_use]
pub fn q(n: i64) -> Q {
    Q::from_int(n)
}

#[must_use]
pub fn square_footprint(id: u64, x0: i64, y0: i64, x1: i64, y1: i64) -> Footprint {
    let mut fp = Footprint::new(FootprintId(id));
    fp.set_ring(0, false);
    fp.set_vertex(0, 0, q(x0), q(y0));
    fp.set_vertex(0, 1, q(x1), q(y0));
    fp.set_vertex(0, 2, q(x1), q(y1));
    fp.set_vertex(0, 3, q(x0), q(y1));
    fp.canonicalize_winding();
    fp
}

#[must_use]
pub fn yawed_pose() -> Pose {
    Pose {
        pos: strut_core::Vec3Q::ZERO,
        rot: QuatQ {
            x: Q::ZERO,
            y: Q::ZERO,
            z: Q::from_raw(ROT_HALF_SQRT2),
            w: Q::from_raw(ROT_HALF_SQRT2),
        },
    }
}

/// Owned authoring set for the baseline scenario.
pub struct Scenario {
    pub footprints: Vec<Footprint>,
    pub volumes: Vec<Volume>,
    pub enclosures: Vec<Enclosure>,
    pub surface_templates: Vec<SurfaceTemplate>,
    pub sockets: Vec<Socket>,
    pub carrier_intents: Vec<CarrierIntent>,
    pub instances: Vec<Instance>,
}

impl Scenario {
    /// The baseline: struct 100, two volumes (solid 20, void 21), enclosure
    /// 30 with a door to the exterior, templates 40 (top) and 41 (side 0),
    /// socket 50 on template 41.
    #[must_use]
    pub fn baseline() -> Self {
        let footprints = vec![
            square_footprint(10, 0, 0, 10, 10),
            square_footprint(11, 2, 2, 8, 8),
        ];
        let volumes = vec![
            Volume::extrude(VolumeId(20), FootprintId(10), Q::ZERO, q(6), false),
            Volume::extrude(VolumeId(21), FootprintId(11), Q::ZERO, q(5), true),
        ];
        let mut enc = Enclosure::new(EnclosureId(30));
        enc.add_volume(VolumeId(21));
        enc.set_aperture(Aperture {
            aperture_id: 1,
            to_enclosure: EnclosureId::NONE,
            kind: ApertureKind::Door,
        });
        let surface_templates = vec![
            SurfaceTemplate::volume_face(SurfaceTemplateId(40), VolumeId(20), FaceKind::Top, 0),
            SurfaceTemplate::volume_face(SurfaceTemplateId(41), VolumeId(20), FaceKind::Side, 0),
        ];
        let sockets = vec![Socket {
            id: SocketId(50),
            surface_template: SurfaceTemplateId(41),
            u: q(1),
            v: q(2),
            offset: Q::ZERO,
        }];

        let mut inst = Instance::new(StructId(100));
        inst.anchor = Anchor::terrain(q(100), q(200), Q::ZERO);
        inst.local_pose = yawed_pose();
        inst.footprint = FootprintId(10);
        inst.add_volume(VolumeId(20));
        inst.add_volume(VolumeId(21));
        inst.add_enclosure(EnclosureId(30));
        inst.add_surface_template(SurfaceTemplateId(40));
        inst.add_surface_template(SurfaceTemplateId(41));
        inst.add_socket(SocketId(50));

        Self {
            footprints,
            volumes,
            enclosures: vec![enc],
            surface_templates,
            sockets,
            carrier_intents: Vec::new(),
            instances: vec![inst],
        }
    }

    /// A bridge intent (500) on its own instance (300), as a carrier-only
    /// authoring set.
    #[must_use]
    pub fn bridge_only() -> Self {
        let mut intent = CarrierIntent::new(
            CarrierIntentId(500),
            CarrierKind::Bridge,
            Anchor::terrain(Q::ZERO, Q::ZERO, Q::ZERO),
            Anchor::terrain(q(32), Q::ZERO, Q::ZERO),
        );
        intent.width = q(6);
        intent.height = q(2);
        let mut inst = Instance::new(StructId(300));
        inst.add_carrier_intent(CarrierIntentId(500));
        Self {
            footprints: Vec::new(),
            volumes: Vec::new(),
            enclosures: Vec::new(),
            surface_templates: Vec::new(),
            sockets: Vec::new(),
            carrier_intents: vec![intent],
            instances: vec![inst],
        }
    }

    /// Borrowed compiler input over this scenario.
    #[must_use]
    pub fn input(&self) -> AuthoringInput<'_> {
        AuthoringInput {
            instances: &self.instances,
            footprints: &self.footprints,
            volumes: &self.volumes,
            enclosures: &self.enclosures,
            surface_templates: &self.surface_templates,
            sockets: &self.sockets,
            carrier_intents: &self.carrier_intents,
            frames: None,
        }
    }

    /// The same authoring data with every list reversed.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut out = Self {
            footprints: self.footprints.clone(),
            volumes: self.volumes.clone(),
            enclosures: self.enclosures.clone(),
            surface_templates: self.surface_templates.clone(),
            sockets: self.sockets.clone(),
            carrier_intents: self.carrier_intents.clone(),
            instances: self.instances.clone(),
        };
        out.footprints.reverse();
        out.volumes.reverse();
        out.enclosures.reverse();
        out.surface_templates.reverse();
        out.sockets.reverse();
        out.carrier_intents.reverse();
        out.instances.reverse();
        out
    }
}

/// A reserved, parameterized compiler (queue 64, spatial 1024, chunk q16).
#[must_use]
pub fn fresh_compiler() -> Compiler {
    let mut c = Compiler::new();
    c.reserve(64, 1024).unwrap();
    c.set_params(q(16)).unwrap();
    c
}

/// All authoring aspects the baseline scenario exercises.
#[must_use]
pub fn baseline_mark() -> DirtyFlags {
    DirtyFlags::FOOTPRINT | DirtyFlags::VOLUME | DirtyFlags::ENCLOSURE | DirtyFlags::SURFACE
}

/// Repeatedly process until the queue drains.
pub fn drain(c: &mut Compiler, input: &AuthoringInput<'_>, tick: u64, budget: u32) {
    while c.pending_work() != 0 {
        c.process(input, tick, budget).unwrap();
    }
}

/// Full compile: sync, mark, enqueue, drain with an effectively unbounded
/// budget.
pub fn compile_all(c: &mut Compiler, scenario: &Scenario, mark: DirtyFlags, tick: u64) {
    let input = scenario.input();
    c.sync(&input).unwrap();
    for inst in &scenario.instances {
        c.mark(inst.id, mark);
    }
    c.enqueue_dirty(tick).unwrap();
    drain(c, &input, tick, u32::MAX);
}

/// Tiny deterministic shuffler for permutation tests.
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        let n = items.len();
        for i in (1..n).rev() {
            let j = (self.next_u64() % (i as u64 + 1)) as usize;
            items.swap(i, j);
        }
    }
}
