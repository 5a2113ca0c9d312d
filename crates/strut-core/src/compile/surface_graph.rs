// SPDX-License-Identifier: Apache-2.0
//! Surface stage: parameterized face frames and bound sockets.
//!
//! Each surface template selects one face of its volume's local bounds. The
//! face becomes an `(origin, u, v)` frame: axes are chosen per face so the
//! `u x v` basis is right-handed with respect to the outward normal, then
//! origin and axis endpoints are transformed into world space.

use super::spatial::SpatialIndex;
use super::volume_aabb::volume_local_aabb;
use crate::error::{CompileError, StageStatus};
use crate::ident::{self, EnclosureId, SocketId, StructId, SurfaceId, SurfaceTemplateId, VolumeId};
use crate::math::{Aabb, Q, Vec3Q};
use crate::model::{FaceKind, Instance};

/// One compiled surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompiledSurface {
    /// Derived surface id.
    pub id: SurfaceId,
    /// Owning structure.
    pub struct_id: StructId,
    /// Source template.
    pub template_id: SurfaceTemplateId,
    /// Volume the face was taken from.
    pub volume_id: VolumeId,
    /// Enclosure reference carried from the template (zero allowed).
    pub enclosure_id: EnclosureId,
    /// Face selector.
    pub face_kind: FaceKind,
    /// Side selector (`face_index % 4` for sides).
    pub face_index: u32,
    /// World-space frame origin.
    pub origin_world: Vec3Q,
    /// World-space u axis scaled to the face extent.
    pub u_vec_world: Vec3Q,
    /// World-space v axis scaled to the face extent.
    pub v_vec_world: Vec3Q,
    /// Face extent along u.
    pub u_len: Q,
    /// Face extent along v.
    pub v_len: Q,
    /// World bounds of the four face corners.
    pub bbox_world: Aabb,
}

/// One compiled socket bound to a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompiledSocket {
    /// The authored socket id (sockets keep their identity).
    pub id: SocketId,
    /// Owning structure.
    pub struct_id: StructId,
    /// Host surface (derived id).
    pub surface_id: SurfaceId,
    /// Surface u parameter.
    pub u: Q,
    /// Surface v parameter.
    pub v: Q,
    /// Offset along the surface normal.
    pub offset: Q,
}

struct FaceFrame {
    origin: Vec3Q,
    u_axis: Vec3Q,
    v_axis: Vec3Q,
    u_len: Q,
    v_len: Q,
}

/// Select a face frame from a local box.
///
/// Side index mapping (`face_index % 4`): 0 = +X, 1 = -X, 2 = +Y, 3 = -Y.
fn face_from_aabb(b: &Aabb, face_kind: FaceKind, face_index: u32) -> FaceFrame {
    let one = Q::ONE;
    let dx = (b.max.x - b.min.x).abs();
    let dy = (b.max.y - b.min.y).abs();
    let dz = (b.max.z - b.min.z).abs();
    match face_kind {
        FaceKind::Top => FaceFrame {
            origin: Vec3Q::new(b.min.x, b.min.y, b.max.z),
            u_axis: Vec3Q::new(one, Q::ZERO, Q::ZERO),
            v_axis: Vec3Q::new(Q::ZERO, one, Q::ZERO),
            u_len: dx,
            v_len: dy,
        },
        FaceKind::Bottom => FaceFrame {
            origin: Vec3Q::new(b.min.x, b.min.y, b.min.z),
            u_axis: Vec3Q::new(one, Q::ZERO, Q::ZERO),
            v_axis: Vec3Q::new(Q::ZERO, one, Q::ZERO),
            u_len: dx,
            v_len: dy,
        },
        FaceKind::Side => match face_index % 4 {
            0 => FaceFrame {
                // +X
                origin: Vec3Q::new(b.max.x, b.min.y, b.min.z),
                u_axis: Vec3Q::new(Q::ZERO, one, Q::ZERO),
                v_axis: Vec3Q::new(Q::ZERO, Q::ZERO, one),
                u_len: dy,
                v_len: dz,
            },
            1 => FaceFrame {
                // -X
                origin: Vec3Q::new(b.min.x, b.max.y, b.min.z),
                u_axis: Vec3Q::new(Q::ZERO, -one, Q::ZERO),
                v_axis: Vec3Q::new(Q::ZERO, Q::ZERO, one),
                u_len: dy,
                v_len: dz,
            },
            2 => FaceFrame {
                // +Y
                origin: Vec3Q::new(b.max.x, b.max.y, b.min.z),
                u_axis: Vec3Q::new(-one, Q::ZERO, Q::ZERO),
                v_axis: Vec3Q::new(Q::ZERO, Q::ZERO, one),
                u_len: dx,
                v_len: dz,
            },
            _ => FaceFrame {
                // -Y
                origin: Vec3Q::new(b.min.x, b.min.y, b.min.z),
                u_axis: Vec3Q::new(one, Q::ZERO, Q::ZERO),
                v_axis: Vec3Q::new(Q::ZERO, Q::ZERO, one),
                u_len: dx,
                v_len: dz,
            },
        },
    }
}

/// Step one coordinate by `len` in the direction of its axis component.
fn axis_step(v: Q, axis: Q, len: Q) -> Q {
    if axis > Q::ZERO {
        v + len
    } else if axis < Q::ZERO {
        v - len
    } else {
        v
    }
}

/// Walk `origin` along a signed unit axis by `len`.
fn offset_along(origin: Vec3Q, axis: Vec3Q, len: Q) -> Vec3Q {
    Vec3Q::new(
        axis_step(origin.x, axis.x, len),
        axis_step(origin.y, axis.y, len),
        axis_step(origin.z, axis.z, len),
    )
}

/// Rebuild one struct's surface graph and surface spatial entries.
pub(crate) fn rebuild(
    surfaces: &mut Vec<CompiledSurface>,
    sockets: &mut Vec<CompiledSocket>,
    spatial: &mut SpatialIndex<Aabb>,
    inst: &Instance,
    ctx: super::StageCtx<'_, '_>,
) -> Result<StageStatus, CompileError> {
    let super::StageCtx {
        struct_id,
        resolver,
        tick,
        chunk_size,
    } = ctx;
    if struct_id.is_none() {
        return Err(CompileError::NullStructId);
    }
    if !chunk_size.is_positive() {
        return Err(CompileError::ChunkSizeInvalid);
    }

    let anchor_pose = inst.anchor.eval(resolver.frames(), tick)?;
    let world_pose = anchor_pose.compose(inst.local_pose);

    surfaces.clear();
    surfaces.reserve(inst.surface_template_ids().len());
    sockets.clear();
    sockets.reserve(inst.socket_ids().len());
    spatial.remove_struct(struct_id);

    for &tid in inst.surface_template_ids() {
        let t = resolver
            .surface_template(tid)
            .ok_or(CompileError::MissingSurfaceTemplate(tid))?;
        let v = resolver
            .volume(t.volume)
            .ok_or(CompileError::MissingVolume(t.volume))?;
        let local = volume_local_aabb(v, resolver, 0)?;
        let face = face_from_aabb(&local, t.face_kind, t.face_index);

        let u_end = offset_along(face.origin, face.u_axis, face.u_len);
        let v_end = offset_along(face.origin, face.v_axis, face.v_len);
        let uv_end = offset_along(u_end, face.v_axis, face.v_len);

        let origin_w = world_pose.transform_point(face.origin);
        let u_end_w = world_pose.transform_point(u_end);
        let v_end_w = world_pose.transform_point(v_end);
        let uv_end_w = world_pose.transform_point(uv_end);

        let mut bbox = Aabb::new(origin_w, origin_w);
        bbox.extend(u_end_w);
        bbox.extend(v_end_w);
        bbox.extend(uv_end_w);

        surfaces.push(CompiledSurface {
            id: ident::surface_id(struct_id, t.id),
            struct_id,
            template_id: t.id,
            volume_id: t.volume,
            enclosure_id: t.enclosure,
            face_kind: t.face_kind,
            face_index: t.face_index,
            origin_world: origin_w,
            u_vec_world: u_end_w - origin_w,
            v_vec_world: v_end_w - origin_w,
            u_len: face.u_len,
            v_len: face.v_len,
            bbox_world: bbox,
        });
    }

    for &sid in inst.socket_ids() {
        let s = resolver.socket(sid).ok_or(CompileError::MissingSocket(sid))?;
        if inst
            .surface_template_ids()
            .binary_search(&s.surface_template)
            .is_err()
        {
            return Err(CompileError::SocketTemplateUnbound {
                socket: s.id,
                template: s.surface_template,
            });
        }
        sockets.push(CompiledSocket {
            id: s.id,
            struct_id,
            surface_id: ident::surface_id(struct_id, s.surface_template),
            u: s.u,
            v: s.v,
            offset: s.offset,
        });
    }

    surfaces.sort_by_key(|s| s.id);
    sockets.sort_by_key(|s| s.id);

    let mut status = StageStatus::Complete;
    for s in surfaces.as_slice() {
        status = status.merge(spatial.add_spanning(struct_id, s.id.0, &s.bbox_world, chunk_size)?);
    }
    Ok(status)
}
