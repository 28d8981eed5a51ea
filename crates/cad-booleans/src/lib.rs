#![warn(missing_docs)]

//! Exact planar boolean operations (union, subtract, intersect) on B-rep
//! solids.
//!
//! Every face-pair intersection in this engine is computed in the plane
//! the faces actually live in, never by projecting through a mesh or
//! casting rays against triangles: plane-plane intersection gives the
//! line two crossing faces share, [`cad_math::orient2d`]-based clipping
//! cuts each face's polygon along that line (or, for coplanar faces,
//! along the other face's boundary directly), and the resulting
//! sub-faces are classified against the other solid by a planar
//! point-in-solid test before a per-operation keep-rule decides which
//! survive into the result.
//!
//! The pipeline:
//! 1. **Broadphase** ([`bbox`]) — AABB overlap narrows face pairs.
//! 2. **Cut-line collection** ([`planar`]) — plane-plane intersection
//!    for crossing faces, boundary-edge lines for coplanar faces.
//! 3. **Split** ([`planar::split_polygon_by_line`]) — each face's
//!    polygon is partitioned into sub-faces by its collected cut lines.
//! 4. **Classify** ([`classify`]) — each sub-face is tested against the
//!    other body: outside, inside, or coincident with matching/opposing
//!    orientation.
//! 5. **Assemble** ([`assemble`]) — the operation's keep-rule selects
//!    surviving sub-faces, rebuilds them into a fresh topology, and
//!    records the face history the host feeds to its naming tracker.
//!
//! Only faces on planar surfaces are supported; a body with a curved
//! face fails the operation with [`BooleanError::NonPlanarFace`] rather
//! than approximating one.

pub mod assemble;
pub mod bbox;
pub mod classify;
pub mod planar;

use cad_geom::{GeometryStore, Surface};
use cad_math::NumericContext;
use cad_primitives::BRepBody;
use cad_topo::{FaceId, Topology};
use thiserror::Error;

use assemble::{ClassifiedSubFace, FaceHistoryEntry, SourceBody};
use classify::classify_subface;
use planar::{face_plane, face_poly, line_polygon_intervals, plane_plane_intersect, planes_coincide, project_direction, signed_area, vertex_centroid, FacePoly};

/// Which CSG operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// `A ∪ B`.
    Union,
    /// `A \ B`.
    Subtract,
    /// `A ∩ B`.
    Intersect,
}

/// Failure modes specific to the boolean engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BooleanError {
    /// One of the operands has a non-planar face; this engine only
    /// handles planar-faced solids.
    #[error("face {0:?} is not planar")]
    NonPlanarFace(FaceId),
    /// The operation produced no faces at all.
    #[error("operation produced an empty result")]
    EmptyResult,
}

/// Outcome of a boolean operation: the result body plus the face history
/// the host's naming tracker needs (`§4.F`/`§4.G`: the engine reports
/// `faceHistory[]`, the host calls `NamingTracker::record_step`).
#[derive(Debug)]
pub struct BooleanResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The resulting body, present iff `success`.
    pub body: Option<BRepBody>,
    /// Per-original-face fate: which result faces it became.
    pub face_history: Vec<FaceHistoryEntry>,
    /// The error, present iff `!success`.
    pub error: Option<BooleanError>,
}

impl BooleanResult {
    fn failure(error: BooleanError) -> Self {
        Self {
            success: false,
            body: None,
            face_history: Vec::new(),
            error: Some(error),
        }
    }
}

/// Run a boolean operation between two planar-faced solids.
pub fn boolean(a: &BRepBody, b: &BRepBody, op: BooleanOp, ctx: &NumericContext) -> BooleanResult {
    if let Err(e) = check_all_planar(&a.topology, &a.geometry) {
        return BooleanResult::failure(e);
    }
    if let Err(e) = check_all_planar(&b.topology, &b.geometry) {
        return BooleanResult::failure(e);
    }

    let subfaces_a = split_and_classify(&a.topology, &a.geometry, SourceBody::A, &b.topology, &b.geometry, b.body, ctx);
    let subfaces_b = split_and_classify(&b.topology, &b.geometry, SourceBody::B, &a.topology, &a.geometry, a.body, ctx);

    let (topo, geom, body, history) = assemble::assemble(op, ctx, &subfaces_a, &subfaces_b);

    if topo.faces.is_empty() {
        return BooleanResult::failure(BooleanError::EmptyResult);
    }

    BooleanResult {
        success: true,
        body: Some(assemble::into_brep_body(topo, geom, body)),
        face_history: history,
        error: None,
    }
}

fn check_all_planar(topo: &Topology, geom: &GeometryStore) -> Result<(), BooleanError> {
    for (face_id, _) in topo.faces.iter() {
        if face_plane(topo, geom, face_id).is_none() {
            return Err(BooleanError::NonPlanarFace(face_id));
        }
    }
    Ok(())
}

/// Split every face of `(topo, geom)` against the other body's faces,
/// then classify every resulting sub-face against that other body.
fn split_and_classify(
    topo: &Topology,
    geom: &GeometryStore,
    source_body: SourceBody,
    other_topo: &Topology,
    other_geom: &GeometryStore,
    other_body: cad_topo::BodyId,
    ctx: &NumericContext,
) -> Vec<ClassifiedSubFace> {
    let mut out = Vec::new();

    for (face_id, _) in topo.faces.iter() {
        let plane = face_plane(topo, geom, face_id).expect("checked planar upfront");
        let face = face_poly(topo, &plane, face_id);
        let own_aabb = bbox::face_aabb(topo, face_id).expanded(ctx.length);

        let cut_lines = collect_cut_lines(&plane, &face, own_aabb, other_topo, other_geom, ctx);

        let pieces = partition(&face.outer, &cut_lines);
        for outer in pieces {
            if outer.len() < 3 || signed_area(&outer).abs() <= ctx.length * ctx.length {
                continue;
            }
            let holes: Vec<_> = face
                .holes
                .iter()
                .filter(|h| !h.is_empty() && planar::point_in_polygon(&outer, vertex_centroid(h)))
                .cloned()
                .collect();

            let centroid2 = vertex_centroid(&outer);
            let centroid3 = plane.evaluate(centroid2);
            let normal = *plane.normal_dir.as_ref();
            let side = classify_subface(other_topo, other_geom, other_body, centroid3, normal, ctx);

            out.push(ClassifiedSubFace {
                source_body,
                source_face: face_id,
                plane: plane.clone(),
                outer,
                holes,
                side,
            });
        }
    }

    out
}

fn collect_cut_lines(
    plane: &cad_geom::Plane,
    face: &FacePoly,
    own_aabb: bbox::Aabb3,
    other_topo: &Topology,
    other_geom: &GeometryStore,
    ctx: &NumericContext,
) -> Vec<(cad_math::Point2, cad_math::Vec2)> {
    let mut lines = Vec::new();

    for (other_face_id, _) in other_topo.faces.iter() {
        let other_aabb = bbox::face_aabb(other_topo, other_face_id);
        if !own_aabb.overlaps(&other_aabb) {
            continue;
        }
        let Some(other_plane) = face_plane(other_topo, other_geom, other_face_id) else { continue };

        if planes_coincide(plane, &other_plane, ctx) {
            let other_face = face_poly(other_topo, &other_plane, other_face_id);
            for ring in std::iter::once(&other_face.outer).chain(other_face.holes.iter()) {
                let n = ring.len();
                for i in 0..n {
                    let p3 = other_plane.evaluate(ring[i]);
                    let q3 = other_plane.evaluate(ring[(i + 1) % n]);
                    let a = plane.project(&p3);
                    let b = plane.project(&q3);
                    let dir = b - a;
                    if dir.norm() > 1e-12 {
                        // Only a real cut if the line actually crosses this
                        // face's interior somewhere, not merely its bbox.
                        if !line_polygon_intervals(a, dir, face).is_empty() {
                            lines.push((a, dir));
                        }
                    }
                }
            }
        } else if let Some((p0, dir3)) = plane_plane_intersect(plane, &other_plane) {
            let origin = plane.project(&p0);
            let dir = project_direction(plane, dir3);
            if dir.norm() > 1e-12 && !line_polygon_intervals(origin, dir, face).is_empty() {
                lines.push((origin, dir));
            }
        }
    }

    lines
}

/// Recursively partition a polygon by a set of cut lines via successive
/// half-plane splits, discarding empty/degenerate pieces.
fn partition(outer: &[cad_math::Point2], cut_lines: &[(cad_math::Point2, cad_math::Vec2)]) -> Vec<Vec<cad_math::Point2>> {
    let mut current = vec![outer.to_vec()];
    for &(origin, dir) in cut_lines {
        let mut next = Vec::with_capacity(current.len());
        for poly in current {
            let (left, right) = planar::split_polygon_by_line(&poly, origin, dir);
            if left.len() >= 3 {
                next.push(left);
            }
            if right.len() >= 3 {
                next.push(right);
            }
            if left.len() < 3 && right.len() < 3 {
                // Neither side survives the clip: the line didn't actually
                // separate this piece (degenerate/grazing cut). Keep the
                // original so the face isn't silently dropped.
                next.push(poly);
            }
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_math::NumericContext;
    use cad_primitives::make_box;

    fn volume_via_tessellation(b: &BRepBody) -> f64 {
        let mesh = cad_tessellate::tessellate_body(b, &cad_tessellate::TessellationParams::default());
        let verts = &mesh.vertices;
        let mut vol = 0.0;
        for tri in mesh.indices.chunks(3) {
            let i0 = tri[0] as usize * 3;
            let i1 = tri[1] as usize * 3;
            let i2 = tri[2] as usize * 3;
            let v0 = [verts[i0] as f64, verts[i0 + 1] as f64, verts[i0 + 2] as f64];
            let v1 = [verts[i1] as f64, verts[i1 + 1] as f64, verts[i1 + 2] as f64];
            let v2 = [verts[i2] as f64, verts[i2 + 1] as f64, verts[i2 + 2] as f64];
            vol += v0[0] * (v1[1] * v2[2] - v2[1] * v1[2]) - v1[0] * (v0[1] * v2[2] - v2[1] * v0[2]) + v2[0] * (v0[1] * v1[2] - v1[1] * v0[2]);
        }
        (vol / 6.0).abs()
    }

    #[test]
    fn union_of_disjoint_boxes_keeps_all_faces() {
        let a = make_box(2.0, 2.0, 2.0, true);
        let mut b = make_box(2.0, 2.0, 2.0, true);
        for v in b.topology.vertices.values_mut() {
            v.point.x += 10.0;
        }
        for s in b.geometry.surfaces.iter_mut() {
            if let Some(p) = s.as_any().downcast_ref::<cad_geom::Plane>() {
                let mut moved = p.clone();
                moved.origin.x += 10.0;
                *s = Box::new(moved);
            }
        }
        let result = boolean(&a, &b, BooleanOp::Union, &NumericContext::DEFAULT);
        assert!(result.success);
        assert_eq!(result.body.unwrap().topology.faces.len(), 12);
    }

    #[test]
    fn subtract_overlapping_box_leaves_nonempty_result() {
        let a = make_box(4.0, 4.0, 4.0, true);
        let b = make_box(2.0, 2.0, 6.0, true);
        let result = boolean(&a, &b, BooleanOp::Subtract, &NumericContext::DEFAULT);
        assert!(result.success);
        let body = result.body.unwrap();
        assert!(!body.topology.faces.is_empty());
        let vol = volume_via_tessellation(&body);
        // A full through-hole removes 2x2x4=16 from a 4x4x4=64 box.
        assert!((vol - 48.0).abs() < 1.0, "unexpected volume {vol}");
    }

    #[test]
    fn intersect_overlapping_boxes_is_smaller_than_either() {
        let a = make_box(4.0, 4.0, 4.0, true);
        let b = make_box(2.0, 2.0, 2.0, true);
        let result = boolean(&a, &b, BooleanOp::Intersect, &NumericContext::DEFAULT);
        assert!(result.success);
        let body = result.body.unwrap();
        let vol = volume_via_tessellation(&body);
        assert!((vol - 8.0).abs() < 1.0, "unexpected volume {vol}");
    }

    #[test]
    fn non_planar_body_is_rejected() {
        let a = cad_primitives::make_cylinder(1.0, 2.0, 8, true);
        let b = make_box(1.0, 1.0, 1.0, true);
        let result = boolean(&a, &b, BooleanOp::Union, &NumericContext::DEFAULT);
        assert!(!result.success);
        assert!(matches!(result.error, Some(BooleanError::NonPlanarFace(_))));
    }

    #[test]
    fn face_history_accounts_for_every_source_face() {
        let a = make_box(4.0, 4.0, 4.0, true);
        let b = make_box(2.0, 2.0, 6.0, true);
        let result = boolean(&a, &b, BooleanOp::Subtract, &NumericContext::DEFAULT);
        assert!(result.success);
        // Every face of both operands appears exactly once in the history.
        let a_count = result.face_history.iter().filter(|e| e.source_body == SourceBody::A).count();
        let b_count = result.face_history.iter().filter(|e| e.source_body == SourceBody::B).count();
        assert_eq!(a_count, a.topology.faces.len());
        assert_eq!(b_count, b.topology.faces.len());
    }
}
