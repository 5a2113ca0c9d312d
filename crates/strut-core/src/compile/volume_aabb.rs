// SPDX-License-Identifier: Apache-2.0
//! Local-space bounds of parametric volumes.
//!
//! Shared by the occupancy and surface stages. Boolean volumes take the
//! union of their operands' boxes regardless of operator — subtract and
//! intersect too. That is intentionally conservative and observable in
//! downstream hashes, so it must not be tightened.

use crate::error::CompileError;
use crate::math::{Aabb, Vec3Q};
use crate::model::input::Resolver;
use crate::model::{Volume, VolumeKind};

const MAX_BOOL_DEPTH: u32 = 8;

/// Resolve a volume's local axis-aligned bounds.
///
/// # Errors
/// Reference errors for missing footprints/volumes, structural errors for
/// empty footprints or term lists, [`CompileError::VolumeSelfReference`] for
/// a term naming its owner, and [`CompileError::VolumeRecursionTooDeep`]
/// past eight levels of boolean nesting.
pub(crate) fn volume_local_aabb(
    v: &Volume,
    resolver: &Resolver<'_>,
    depth: u32,
) -> Result<Aabb, CompileError> {
    if depth > MAX_BOOL_DEPTH {
        return Err(CompileError::VolumeRecursionTooDeep(v.id));
    }
    match &v.kind {
        VolumeKind::Extrude {
            footprint,
            base_z,
            height,
        } => {
            let fp = resolver
                .footprint(*footprint)
                .ok_or(CompileError::MissingFootprint(*footprint))?;
            let b2 = fp.aabb2().ok_or(CompileError::FootprintEmpty(fp.id))?;
            Ok(Aabb::new(
                Vec3Q::new(b2.min_x, b2.min_y, *base_z),
                Vec3Q::new(b2.max_x, b2.max_y, *base_z + *height),
            ))
        }
        VolumeKind::Sweep {
            footprint,
            length,
            height,
        } => {
            let fp = resolver
                .footprint(*footprint)
                .ok_or(CompileError::MissingFootprint(*footprint))?;
            let b2 = fp.aabb2().ok_or(CompileError::FootprintEmpty(fp.id))?;
            // Sweep axis is local +X; the profile bounds extend by `length`.
            Ok(Aabb::new(
                Vec3Q::new(b2.min_x, b2.min_y, crate::math::Q::ZERO),
                Vec3Q::new(b2.max_x + *length, b2.max_y, *height),
            ))
        }
        VolumeKind::Bool { terms } => {
            if terms.is_empty() {
                return Err(CompileError::BoolTermsEmpty(v.id));
            }
            let mut acc: Option<Aabb> = None;
            for term in terms {
                let operand = resolver
                    .volume(term.volume)
                    .ok_or(CompileError::MissingVolume(term.volume))?;
                if operand.id == v.id {
                    return Err(CompileError::VolumeSelfReference(v.id));
                }
                let b = volume_local_aabb(operand, resolver, depth + 1)?;
                match acc.as_mut() {
                    Some(u) => u.union_with(&b),
                    None => acc = Some(b),
                }
            }
            acc.ok_or(CompileError::BoolTermsEmpty(v.id))
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ident::{FootprintId, VolumeId};
    use crate::math::Q;
    use crate::model::{AuthoringInput, BoolOp, Footprint};

    fn square_fp(id: u64, x0: i64, y0: i64, x1: i64, y1: i64) -> Footprint {
        let mut fp = Footprint::new(FootprintId(id));
        fp.set_vertex(0, 0, Q::from_int(x0), Q::from_int(y0));
        fp.set_vertex(0, 1, Q::from_int(x1), Q::from_int(y0));
        fp.set_vertex(0, 2, Q::from_int(x1), Q::from_int(y1));
        fp.set_vertex(0, 3, Q::from_int(x0), Q::from_int(y1));
        fp
    }

    #[test]
    fn extrude_bounds_span_base_to_height() {
        let fps = [square_fp(10, 0, 0, 10, 10)];
        let vols = [Volume::extrude(
            VolumeId(20),
            FootprintId(10),
            Q::from_int(2),
            Q::from_int(6),
            false,
        )];
        let input = AuthoringInput {
            footprints: &fps,
            volumes: &vols,
            ..AuthoringInput::default()
        };
        let r = Resolver::new(input);
        let b = volume_local_aabb(&vols[0], &r, 0).unwrap();
        assert_eq!(b.min, Vec3Q::from_int(0, 0, 2));
        assert_eq!(b.max, Vec3Q::from_int(10, 10, 8));
    }

    #[test]
    fn sweep_extends_along_plus_x() {
        let fps = [square_fp(10, 1, 2, 3, 4)];
        let vols = [Volume::sweep(
            VolumeId(20),
            FootprintId(10),
            Q::from_int(5),
            Q::from_int(2),
            false,
        )];
        let input = AuthoringInput {
            footprints: &fps,
            volumes: &vols,
            ..AuthoringInput::default()
        };
        let r = Resolver::new(input);
        let b = volume_local_aabb(&vols[0], &r, 0).unwrap();
        assert_eq!(b.min, Vec3Q::from_int(1, 2, 0));
        assert_eq!(b.max, Vec3Q::from_int(8, 4, 2));
    }

    #[test]
    fn bool_unions_operands_regardless_of_op() {
        let fps = [square_fp(10, 0, 0, 4, 4), square_fp(11, 2, 2, 8, 8)];
        let mut boolean = Volume::boolean(VolumeId(30), false);
        boolean
            .set_bool_term(0, VolumeId(20), BoolOp::Union)
            .unwrap();
        boolean
            .set_bool_term(1, VolumeId(21), BoolOp::Subtract)
            .unwrap();
        let vols = [
            Volume::extrude(VolumeId(20), FootprintId(10), Q::ZERO, Q::from_int(3), false),
            Volume::extrude(VolumeId(21), FootprintId(11), Q::ZERO, Q::from_int(5), true),
            boolean,
        ];
        let input = AuthoringInput {
            footprints: &fps,
            volumes: &vols,
            ..AuthoringInput::default()
        };
        let r = Resolver::new(input);
        let b = volume_local_aabb(&vols[2], &r, 0).unwrap();
        // Subtract still widens the box: conservative union.
        assert_eq!(b.min, Vec3Q::from_int(0, 0, 0));
        assert_eq!(b.max, Vec3Q::from_int(8, 8, 5));
    }

    #[test]
    fn self_reference_is_an_error() {
        let fps = [square_fp(10, 0, 0, 4, 4)];
        let mut boolean = Volume::boolean(VolumeId(30), false);
        boolean
            .set_bool_term(0, VolumeId(30), BoolOp::Union)
            .unwrap();
        let vols = [boolean];
        let input = AuthoringInput {
            footprints: &fps,
            volumes: &vols,
            ..AuthoringInput::default()
        };
        let r = Resolver::new(input);
        assert_eq!(
            volume_local_aabb(&vols[0], &r, 0),
            Err(CompileError::VolumeSelfReference(VolumeId(30)))
        );
    }

    #[test]
    fn deep_nesting_stops_at_the_limit() {
        // Chain of booleans: 40 -> 41 -> ... -> extrude.
        let fps = [square_fp(10, 0, 0, 1, 1)];
        let mut vols = vec![Volume::extrude(
            VolumeId(100),
            FootprintId(10),
            Q::ZERO,
            Q::ONE,
            false,
        )];
        for i in 0..10_u64 {
            let mut b = Volume::boolean(VolumeId(40 + i), false);
            let target = if i == 0 { VolumeId(100) } else { VolumeId(40 + i - 1) };
            b.set_bool_term(0, target, BoolOp::Union).unwrap();
            vols.push(b);
        }
        let input = AuthoringInput {
            footprints: &fps,
            volumes: &vols,
            ..AuthoringInput::default()
        };
        let r = Resolver::new(input);
        assert_eq!(
            volume_local_aabb(&vols[vols.len() - 1], &r, 0),
            Err(CompileError::VolumeRecursionTooDeep(VolumeId(40)))
        );
    }
}
