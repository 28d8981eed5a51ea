//! Revolve feature operator (§4.E): sweep a sketch profile's outer loop
//! around an axis. A line segment parallel to the axis sweeps a
//! cylinder, perpendicular sweeps a plane, and any other angle sweeps a
//! cone; an arc segment sweeps a torus patch.

use std::f64::consts::PI;

use cad_geom::{ConeSurface, CylinderSurface, GeometryStore, Plane, TorusSurface};
use cad_math::{debug_trace, Dir3, Point3, Tolerance, Vec3};
use cad_naming::{FeatureId, Fingerprint, NamingTracker, PersistentRef, Selector, SubshapeRef, SubshapeType};
use cad_primitives::BRepBody;
use cad_topo::{FaceId, HalfEdgeId, Orientation, Topology, VertexId};

use crate::profile::{SketchProfile, SketchSegment};
use crate::SketchError;

/// One face produced by [`revolve`], tagged with the selector a caller
/// should register it under.
#[derive(Debug, Clone, Copy)]
pub struct RevolveFace {
    /// The face in [`RevolveOutput::body`]'s topology.
    pub face: FaceId,
    /// The selector this face was born under.
    pub selector: Selector,
}

/// The faces produced by one revolve call.
pub struct RevolveOutput {
    /// The new solid.
    pub body: BRepBody,
    /// One face per profile segment.
    pub side_faces: Vec<RevolveFace>,
    /// The face closing the sweep at `angle = 0`, present only when the
    /// revolution is partial (`angle < 2*PI`).
    pub start_cap: Option<RevolveFace>,
    /// The face closing the sweep at `angle = angle_degrees`, present
    /// only when the revolution is partial.
    pub end_cap: Option<RevolveFace>,
}

/// How a profile segment relates to the revolution axis, which fixes
/// the surface type of the face it sweeps into.
#[derive(Debug)]
enum RevolveSurfaceKind {
    /// Parallel to the axis at a fixed radius: a true cylinder.
    Cylinder { radius: f64 },
    /// Perpendicular to the axis: a flat annular plane.
    Plane,
    /// At an angle to the axis: a true cone, apex and half-angle derived
    /// from where the segment's line crosses the axis.
    Cone { apex: Point3, axis: Dir3, half_angle: f64 },
    /// An arc whose plane contains the revolution axis: a torus patch.
    Torus { center: Point3, major_radius: f64, minor_radius: f64 },
}

fn classify_line_segment(p_start: Point3, p_end: Point3, axis_origin: Point3, axis: &Vec3) -> RevolveSurfaceKind {
    let tol = Tolerance::DEFAULT;
    let t_start = (p_start - axis_origin).dot(axis);
    let t_end = (p_end - axis_origin).dot(axis);
    let r_start = (p_start - (axis_origin + t_start * axis)).norm();
    let r_end = (p_end - (axis_origin + t_end * axis)).norm();

    let delta_t = t_end - t_start;
    let delta_r = r_end - r_start;

    if delta_t.abs() < tol.length && delta_r.abs() > tol.length {
        RevolveSurfaceKind::Plane
    } else if delta_r.abs() < tol.length && delta_t.abs() > tol.length {
        RevolveSurfaceKind::Cylinder { radius: r_start }
    } else {
        // The generator line crosses r = 0 (the axis) at a single
        // point, the apex: r(t) is linear in t along the segment, so
        // interpolate to find where it vanishes.
        let t_apex = t_start - r_start * delta_t / delta_r;
        let half_angle = (delta_r / delta_t).abs().atan();
        // Axis direction from apex toward increasing radius, so that
        // `ConeSurface::evaluate` with v >= 0 reproduces this segment.
        let sign = (t_start - t_apex).signum();
        let cone_axis = Dir3::new_normalize(sign * axis);
        RevolveSurfaceKind::Cone {
            apex: axis_origin + t_apex * axis,
            axis: cone_axis,
            half_angle,
        }
    }
}

/// Build the torus a rotated arc sweeps: the arc's own center projects
/// onto the revolution axis at the torus center, the perpendicular
/// distance from that projection to the arc center is the major radius,
/// and the arc's own radius is the minor (tube) radius.
fn torus_for_arc(center_3d: Point3, arc_radius: f64, axis_origin: Point3, axis: &Vec3) -> RevolveSurfaceKind {
    let t = (center_3d - axis_origin).dot(axis);
    let projected = axis_origin + t * axis;
    let major_radius = (center_3d - projected).norm();
    RevolveSurfaceKind::Torus { center: projected, major_radius, minor_radius: arc_radius }
}

fn rotate_point(point: Point3, axis_origin: Point3, axis: &Vec3, angle: f64) -> Point3 {
    let v = point - axis_origin;
    let (sin_a, cos_a) = angle.sin_cos();
    let one_minus_cos = 1.0 - cos_a;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    let rotated = Vec3::new(
        (cos_a + one_minus_cos * x * x) * v.x
            + (one_minus_cos * x * y - sin_a * z) * v.y
            + (one_minus_cos * x * z + sin_a * y) * v.z,
        (one_minus_cos * x * y + sin_a * z) * v.x
            + (cos_a + one_minus_cos * y * y) * v.y
            + (one_minus_cos * y * z - sin_a * x) * v.z,
        (one_minus_cos * x * z - sin_a * y) * v.x
            + (one_minus_cos * y * z + sin_a * x) * v.y
            + (cos_a + one_minus_cos * z * z) * v.z,
    );
    axis_origin + rotated
}

fn point_to_line_distance(point: Point3, line_origin: Point3, line_dir: &Vec3) -> f64 {
    let v = point - line_origin;
    let proj = v.dot(line_dir) * line_dir;
    (v - proj).norm()
}

/// Revolve `profile`'s outer loop (it must have no holes — see
/// `RevolveHolesNotSupported`) around the axis through `axis_origin` in
/// direction `axis_dir`, by `angle_radians` in `(0, 2*PI]`.
pub fn revolve(
    profile: &SketchProfile,
    axis_origin: Point3,
    axis_dir: Vec3,
    angle_radians: f64,
) -> Result<RevolveOutput, SketchError> {
    if axis_dir.norm() < 1e-12 {
        return Err(SketchError::ZeroAxis);
    }
    let axis = Dir3::new_normalize(axis_dir);
    let axis_vec = *axis.as_ref();

    if angle_radians <= 0.0 || angle_radians > 2.0 * PI + 1e-9 {
        return Err(SketchError::InvalidAngle(angle_radians));
    }
    if !profile.hole_loops().is_empty() {
        return Err(SketchError::RevolveHolesNotSupported);
    }
    let loop_ = profile.outer_loop();

    let tol = Tolerance::DEFAULT;
    let is_full = (angle_radians - 2.0 * PI).abs() < 1e-9;

    for seg in &loop_.segments {
        let p = profile.to_3d(seg.start());
        if point_to_line_distance(p, axis_origin, &axis_vec) < tol.length {
            return Err(SketchError::AxisIntersection);
        }
    }

    let mut topo = Topology::new();
    let mut geom = GeometryStore::new();

    debug_trace!("revolve: sweeping {} segment(s) through {angle_radians:.4} rad", loop_.segments.len());

    let n = loop_.segments.len();
    let mut start_verts: Vec<VertexId> = Vec::with_capacity(n);
    let mut end_verts: Vec<VertexId> = Vec::with_capacity(n);
    for seg in &loop_.segments {
        let p = profile.to_3d(seg.start());
        let v_start = topo.add_vertex(p);
        let v_end = if is_full {
            v_start
        } else {
            topo.add_vertex(rotate_point(p, axis_origin, &axis_vec, angle_radians))
        };
        start_verts.push(v_start);
        end_verts.push(v_end);
    }

    let mut all_half_edges: Vec<HalfEdgeId> = Vec::new();
    let mut side_faces = Vec::with_capacity(n);

    for (i, seg) in loop_.segments.iter().enumerate() {
        let j = (i + 1) % n;
        let p_start = profile.to_3d(seg.start());
        let p_end = profile.to_3d(seg.end());

        let kind = match seg {
            SketchSegment::Line { .. } => classify_line_segment(p_start, p_end, axis_origin, &axis_vec),
            SketchSegment::Arc { center, .. } => {
                let center_3d = profile.to_3d(*center);
                torus_for_arc(center_3d, seg.radius(), axis_origin, &axis_vec)
            }
        };

        let surface_idx = match kind {
            RevolveSurfaceKind::Cylinder { radius } => {
                geom.add_surface(Box::new(CylinderSurface::with_axis(axis_origin, axis, radius)))
            }
            RevolveSurfaceKind::Plane => {
                geom.add_surface(Box::new(Plane::from_normal(p_start, (p_end - p_start).normalize())))
            }
            RevolveSurfaceKind::Cone { apex, axis: cone_axis, half_angle } => {
                let arbitrary = if cone_axis.as_ref().x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
                let ref_dir =
                    Dir3::new_normalize(arbitrary - arbitrary.dot(cone_axis.as_ref()) * cone_axis.as_ref());
                geom.add_surface(Box::new(ConeSurface { apex, axis: cone_axis, ref_dir, half_angle }))
            }
            RevolveSurfaceKind::Torus { center, major_radius, minor_radius } => geom.add_surface(Box::new(
                TorusSurface::with_axis(center, axis_vec, major_radius, minor_radius),
            )),
        };

        let he_start = topo.add_half_edge(start_verts[i]);
        let he_seam_fwd = topo.add_half_edge(start_verts[j]);
        let he_end = topo.add_half_edge(end_verts[j]);
        let he_seam_back = topo.add_half_edge(end_verts[i]);
        let loop_id = topo.add_loop(&[he_start, he_seam_fwd, he_end, he_seam_back]);
        let face = topo.add_face(loop_id, surface_idx, Orientation::Forward);
        all_half_edges.extend([he_start, he_seam_fwd, he_end, he_seam_back]);

        side_faces.push(RevolveFace {
            face,
            selector: Selector::with("revolve.side", [("segment", i as i64)]),
        });
    }

    let (start_cap, end_cap) = if is_full {
        (None, None)
    } else {
        let start_face = build_cap_face(&mut topo, &mut geom, &start_verts, true);
        let end_face = build_cap_face(&mut topo, &mut geom, &end_verts, false);
        all_half_edges.extend(topo.loop_half_edges(topo.faces[start_face].outer_loop()));
        all_half_edges.extend(topo.loop_half_edges(topo.faces[end_face].outer_loop()));
        (
            Some(RevolveFace { face: start_face, selector: Selector::simple("revolve.startCap") }),
            Some(RevolveFace { face: end_face, selector: Selector::simple("revolve.endCap") }),
        )
    };

    topo.pair_unlinked_half_edges(&all_half_edges)
        .expect("ring construction pairs every half-edge with exactly one twin");

    let mut all_faces: Vec<FaceId> = side_faces.iter().map(|f| f.face).collect();
    if let Some(f) = start_cap {
        all_faces.push(f.face);
    }
    if let Some(f) = end_cap {
        all_faces.push(f.face);
    }
    let shell = topo.add_shell(all_faces, true);
    let body = topo.add_body(shell);

    Ok(RevolveOutput {
        body: BRepBody { topology: topo, geometry: geom, body },
        side_faces,
        start_cap,
        end_cap,
    })
}

/// Build the planar face closing a partial revolve's sweep at one end.
/// `reverse` flips the winding so the face's outward normal points away
/// from the swept material, matching extrude's cap convention.
fn build_cap_face(topo: &mut Topology, geom: &mut GeometryStore, ring: &[VertexId], reverse: bool) -> FaceId {
    let verts: Vec<VertexId> = if reverse { ring.iter().rev().cloned().collect() } else { ring.to_vec() };
    let p0 = topo.vertices[verts[0]].point;
    let p1 = topo.vertices[verts[1]].point;
    let p_last = topo.vertices[*verts.last().unwrap()].point;
    let surface_idx = geom.add_surface(Box::new(Plane::new(p0, p1 - p0, p_last - p0)));

    let hes: Vec<_> = verts.iter().map(|&v| topo.add_half_edge(v)).collect();
    let loop_id = topo.add_loop(&hes);
    topo.add_face(loop_id, surface_idx, Orientation::Forward)
}

/// Naming records produced by [`revolve_with_naming`].
pub struct RevolveRegistration {
    /// The feature id every face below was born under.
    pub feature_id: FeatureId,
    /// Persistent references to the side faces, same order as
    /// [`RevolveOutput::side_faces`].
    pub side_faces: Vec<PersistentRef>,
    /// Persistent reference to the start cap, if the revolution is partial.
    pub start_cap: Option<PersistentRef>,
    /// Persistent reference to the end cap, if the revolution is partial.
    pub end_cap: Option<PersistentRef>,
}

/// Run [`revolve`] and register a birth for every face it produces.
pub fn revolve_with_naming(
    profile: &SketchProfile,
    axis_origin: Point3,
    axis_dir: Vec3,
    angle_radians: f64,
    tracker: &mut NamingTracker,
) -> Result<(RevolveOutput, RevolveRegistration), SketchError> {
    let output = revolve(profile, axis_origin, axis_dir, angle_radians)?;
    let feature_id = tracker.allocate_feature_id();

    let side_faces = output
        .side_faces
        .iter()
        .map(|sf| register_face(tracker, feature_id, &output.body, sf.face, sf.selector.clone()))
        .collect();
    let start_cap = output
        .start_cap
        .map(|f| register_face(tracker, feature_id, &output.body, f.face, f.selector.clone()));
    let end_cap = output
        .end_cap
        .map(|f| register_face(tracker, feature_id, &output.body, f.face, f.selector.clone()));

    Ok((output, RevolveRegistration { feature_id, side_faces, start_cap, end_cap }))
}

fn register_face(
    tracker: &mut NamingTracker,
    feature_id: FeatureId,
    body: &BRepBody,
    face: FaceId,
    selector: Selector,
) -> PersistentRef {
    let outer = body.topology.faces[face].outer_loop();
    let verts: Vec<_> = body
        .topology
        .loop_half_edges(outer)
        .map(|he| body.topology.vertices[body.topology.half_edges[he].origin].point)
        .collect();
    let n = (verts.len().max(1)) as f64;
    let centroid = verts.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords) / n;
    let fingerprint = Fingerprint::basic([centroid.x, centroid.y, centroid.z], n);

    tracker.record_birth(feature_id, selector, SubshapeRef::new(format!("{face:?}")), SubshapeType::Face, Some(fingerprint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_math::{NumericContext, Point2};

    #[test]
    fn full_revolution_has_no_side_caps() {
        let profile = SketchProfile::rectangle(Point3::new(5.0, 0.0, 0.0), Vec3::x(), Vec3::z(), 3.0, 10.0);
        let out = revolve(&profile, Point3::origin(), Vec3::z(), 2.0 * PI).unwrap();
        assert_eq!(out.side_faces.len(), 4);
        assert!(out.start_cap.is_none());
        assert!(out.end_cap.is_none());
        assert_eq!(out.body.topology.faces.len(), 4);
    }

    #[test]
    fn partial_revolution_adds_two_caps() {
        let profile = SketchProfile::rectangle(Point3::new(5.0, 0.0, 0.0), Vec3::x(), Vec3::z(), 3.0, 10.0);
        let out = revolve(&profile, Point3::origin(), Vec3::z(), PI / 2.0).unwrap();
        assert_eq!(out.body.topology.faces.len(), 6);
        assert!(out.start_cap.is_some());
        assert!(out.end_cap.is_some());
    }

    #[test]
    fn parallel_segment_yields_cylinder_surface() {
        let profile = SketchProfile::rectangle(Point3::new(5.0, 0.0, 0.0), Vec3::x(), Vec3::z(), 3.0, 10.0);
        let out = revolve(&profile, Point3::origin(), Vec3::z(), 2.0 * PI).unwrap();
        let has_cylinder = out
            .side_faces
            .iter()
            .any(|f| out.body.geometry.surfaces[out.body.topology.faces[f.face].surface_index].surface_type() == cad_geom::SurfaceKind::Cylinder);
        assert!(has_cylinder);
    }

    #[test]
    fn zero_axis_is_rejected() {
        let profile = SketchProfile::rectangle(Point3::new(5.0, 0.0, 0.0), Vec3::x(), Vec3::z(), 3.0, 10.0);
        assert!(matches!(
            revolve(&profile, Point3::origin(), Vec3::zeros(), PI),
            Err(SketchError::ZeroAxis)
        ));
    }

    #[test]
    fn invalid_angle_is_rejected() {
        let profile = SketchProfile::rectangle(Point3::new(5.0, 0.0, 0.0), Vec3::x(), Vec3::z(), 3.0, 10.0);
        assert!(matches!(
            revolve(&profile, Point3::origin(), Vec3::z(), 0.0),
            Err(SketchError::InvalidAngle(_))
        ));
        assert!(matches!(
            revolve(&profile, Point3::origin(), Vec3::z(), 3.0 * PI),
            Err(SketchError::InvalidAngle(_))
        ));
    }

    #[test]
    fn axis_intersecting_profile_is_rejected() {
        let profile = SketchProfile::rectangle(Point3::origin(), Vec3::x(), Vec3::z(), 5.0, 5.0);
        assert!(matches!(
            revolve(&profile, Point3::origin(), Vec3::z(), PI),
            Err(SketchError::AxisIntersection)
        ));
    }

    #[test]
    fn arc_segment_sweeps_torus_patch() {
        let profile = SketchProfile::circle(Point3::new(10.0, 0.0, 0.0), Vec3::x(), 3.0, 4);
        let out = revolve(&profile, Point3::origin(), Vec3::z(), PI).unwrap();
        assert!(out
            .side_faces
            .iter()
            .all(|f| out.body.geometry.surfaces[out.body.topology.faces[f.face].surface_index].surface_type()
                == cad_geom::SurfaceKind::Torus));
    }

    #[test]
    fn angled_segment_yields_cone_surface() {
        let segments = vec![
            SketchSegment::Line { start: Point2::new(3.0, 0.0), end: Point2::new(6.0, 0.0) },
            SketchSegment::Line { start: Point2::new(6.0, 0.0), end: Point2::new(5.0, 10.0) },
            SketchSegment::Line { start: Point2::new(5.0, 10.0), end: Point2::new(4.0, 10.0) },
            SketchSegment::Line { start: Point2::new(4.0, 10.0), end: Point2::new(3.0, 0.0) },
        ];
        let profile = SketchProfile::single_loop(Point3::origin(), Vec3::x(), Vec3::z(), segments).unwrap();
        let out = revolve(&profile, Point3::origin(), Vec3::z(), 2.0 * PI).unwrap();
        let has_cone = out
            .side_faces
            .iter()
            .any(|f| out.body.geometry.surfaces[out.body.topology.faces[f.face].surface_index].surface_type()
                == cad_geom::SurfaceKind::Cone);
        assert!(has_cone);
    }

    #[test]
    fn revolved_solid_has_no_validation_issues() {
        let profile = SketchProfile::rectangle(Point3::new(5.0, 0.0, 0.0), Vec3::x(), Vec3::z(), 3.0, 10.0);
        let out = revolve(&profile, Point3::origin(), Vec3::z(), 2.0 * PI).unwrap();
        let issues = cad_topo::validate_topology(&out.body.topology, &NumericContext::DEFAULT);
        assert!(issues.is_empty(), "unexpected validation issues: {issues:?}");
    }

    #[test]
    fn naming_registers_caps_only_when_partial() {
        let profile = SketchProfile::rectangle(Point3::new(5.0, 0.0, 0.0), Vec3::x(), Vec3::z(), 3.0, 10.0);
        let mut tracker = NamingTracker::new();
        let (_out, reg) = revolve_with_naming(&profile, Point3::origin(), Vec3::z(), PI / 2.0, &mut tracker).unwrap();
        assert!(reg.start_cap.is_some());
        assert!(reg.end_cap.is_some());
        assert_eq!(reg.side_faces.len(), 4);
    }
}
