#![warn(missing_docs)]

//! Hand-coded B-rep primitive solid construction.
//!
//! Builds the primitive solids the kernel core hands-codes directly,
//! bypassing extrude/revolve: box, cylinder, cone, and sphere. Each
//! constructor builds vertices, half-edges, loops, and faces straight
//! into a fresh [`Topology`]/[`GeometryStore`] pair the way a feature
//! operator would, then pairs twins and closes the shell.
//!
//! This crate also carries the geometry-aware validation that
//! `cad-topo` defers one layer up: the `SameParameter` checker and
//! sliver-face detection, both of which need a [`GeometryStore`]
//! alongside the topology to evaluate surfaces and curves.

mod validate;

pub use validate::{sliver_faces, validate_same_parameter, SameParameterViolation, SliverFace};

use std::f64::consts::PI;

use cad_geom::{ConeSurface, CylinderSurface, GeometryStore, Line3d, Plane, SphereSurface};
use cad_math::{Point3, Vec3};
use cad_topo::{BodyId, FaceId, HalfEdgeId, Orientation, Topology, VertexId};

/// A freshly built B-rep solid: the topology plus the geometry store that
/// backs its surfaces and curves, and the body handle identifying it
/// within the topology.
#[derive(Debug, Clone)]
pub struct BRepBody {
    /// The topological structure.
    pub topology: Topology,
    /// The geometric data (surfaces, curves) referenced by `topology`.
    pub geometry: GeometryStore,
    /// The body entity.
    pub body: BodyId,
}

/// Build a B-rep box with the given width (x), depth (y), and height (z).
///
/// Eight vertices, twelve edges, six planar faces, laid out by a
/// hand-coded winding table so every face's outer loop is CCW when
/// viewed from outside (§4.E). When `centered` is `false` one corner
/// sits at the origin and the box extends into `+x, +y, +z`; when `true`
/// the box is centered on the origin.
pub fn make_box(width: f64, depth: f64, height: f64, centered: bool) -> BRepBody {
    let (x0, x1) = if centered {
        (-width / 2.0, width / 2.0)
    } else {
        (0.0, width)
    };
    let (y0, y1) = if centered {
        (-depth / 2.0, depth / 2.0)
    } else {
        (0.0, depth)
    };
    let (z0, z1) = if centered {
        (-height / 2.0, height / 2.0)
    } else {
        (0.0, height)
    };

    let mut topo = Topology::new();
    let mut geom = GeometryStore::new();

    // Corner-aligned vertex layout:
    //     v4----v5
    //    /|    /|
    //   v7----v6|    z
    //   | v0--|-v1   | y
    //   |/    |/     |/
    //   v3----v2     +---x
    let v0 = topo.add_vertex(Point3::new(x0, y0, z0));
    let v1 = topo.add_vertex(Point3::new(x1, y0, z0));
    let v2 = topo.add_vertex(Point3::new(x1, y1, z0));
    let v3 = topo.add_vertex(Point3::new(x0, y1, z0));
    let v4 = topo.add_vertex(Point3::new(x0, y0, z1));
    let v5 = topo.add_vertex(Point3::new(x1, y0, z1));
    let v6 = topo.add_vertex(Point3::new(x1, y1, z1));
    let v7 = topo.add_vertex(Point3::new(x0, y1, z1));

    // Each row: the 4 vertices of one face in CCW order viewed from
    // outside, plus a plane origin/x_dir/y_dir so normal = x_dir x y_dir
    // points outward.
    let face_defs: [[cad_topo::VertexId; 4]; 6] = [
        [v0, v3, v2, v1], // bottom z=z0, normal -Z
        [v4, v5, v6, v7], // top z=z1, normal +Z
        [v0, v1, v5, v4], // front y=y0, normal -Y
        [v2, v3, v7, v6], // back y=y1, normal +Y
        [v0, v4, v7, v3], // left x=x0, normal -X
        [v1, v2, v6, v5], // right x=x1, normal +X
    ];

    let mut all_faces: Vec<FaceId> = Vec::with_capacity(6);
    let mut half_edges_by_face: Vec<Vec<cad_topo::HalfEdgeId>> = Vec::with_capacity(6);

    for verts in face_defs.iter() {
        let p0 = topo.vertices[verts[0]].point;
        let p1 = topo.vertices[verts[1]].point;
        let p3 = topo.vertices[verts[3]].point;
        let x_dir = p1 - p0;
        let y_dir = p3 - p0;
        let surface_idx = geom.add_surface(Box::new(Plane::new(p0, x_dir, y_dir)));

        let hes: Vec<_> = verts.iter().map(|&v| topo.add_half_edge(v)).collect();
        let loop_id = topo.add_loop(&hes);
        let face_id = topo.add_face(loop_id, surface_idx, Orientation::Forward);
        all_faces.push(face_id);
        half_edges_by_face.push(hes);
    }

    let all_half_edges: Vec<_> = half_edges_by_face.into_iter().flatten().collect();
    topo.pair_unlinked_half_edges(&all_half_edges)
        .expect("box face winding guarantees exactly two half-edges per edge");

    for &face_id in &all_faces {
        let outer = topo.faces[face_id].outer_loop();
        for he_id in topo.loop_half_edges(outer).collect::<Vec<_>>() {
            let origin = topo.vertices[topo.half_edges[he_id].origin].point;
            let dest = topo.vertices[topo.half_edge_dest(he_id).unwrap()].point;
            geom.add_curve_3d(Box::new(Line3d::from_points(origin, dest)));
        }
    }

    let shell = topo.add_shell(all_faces, true);
    let body = topo.add_body(shell);

    BRepBody {
        topology: topo,
        geometry: geom,
        body,
    }
}

/// Convenience constructor matching the common CAD-app call shape
/// `createBox(width, height, depth, centered)` (§8.4 scenario 1), where
/// `height` is the sketch-plane-normal dimension (z) and `depth` is the
/// in-plane y extent.
pub fn create_box(width: f64, height: f64, depth: f64, centered: bool) -> BRepBody {
    make_box(width, depth, height, centered)
}

/// Build the planar cap closing one end of a ring of vertices, reusing
/// the winding convention every ringed primitive below shares: `reverse`
/// walks the ring backward so the resulting loop's outward normal points
/// away from the solid (§4.E's cap-reversal convention for extrude).
fn build_ring_cap(topo: &mut Topology, geom: &mut GeometryStore, ring: &[VertexId], reverse: bool) -> (FaceId, Vec<HalfEdgeId>) {
    let verts: Vec<VertexId> = if reverse {
        ring.iter().rev().cloned().collect()
    } else {
        ring.to_vec()
    };
    let p0 = topo.vertices[verts[0]].point;
    let p1 = topo.vertices[verts[1]].point;
    let p_last = topo.vertices[*verts.last().unwrap()].point;
    let surface_idx = geom.add_surface(Box::new(Plane::new(p0, p1 - p0, p_last - p0)));
    let hes: Vec<HalfEdgeId> = verts.iter().map(|&v| topo.add_half_edge(v)).collect();
    let loop_id = topo.add_loop(&hes);
    let face = topo.add_face(loop_id, surface_idx, Orientation::Forward);
    (face, hes)
}

/// Ring of `n` vertices around the Z axis at height `z`, starting at
/// angle zero along +X.
fn ring_vertices(topo: &mut Topology, radius: f64, z: f64, n: usize) -> Vec<VertexId> {
    (0..n)
        .map(|i| {
            let theta = 2.0 * PI * (i as f64) / (n as f64);
            topo.add_vertex(Point3::new(radius * theta.cos(), radius * theta.sin(), z))
        })
        .collect()
}

/// Build a B-rep cylinder of the given `radius` and `height`, centered
/// on the Z axis, approximated by `segments` planar-bounded cylindrical
/// side faces (minimum 3) plus two planar caps. When `centered` is
/// `false` the base sits at `z = 0`; when `true` the solid is centered
/// on the origin.
pub fn make_cylinder(radius: f64, height: f64, segments: u32, centered: bool) -> BRepBody {
    let n = segments.max(3) as usize;
    let (z0, z1) = if centered { (-height / 2.0, height / 2.0) } else { (0.0, height) };

    let mut topo = Topology::new();
    let mut geom = GeometryStore::new();

    let bottom = ring_vertices(&mut topo, radius, z0, n);
    let top = ring_vertices(&mut topo, radius, z1, n);

    let mut all_half_edges = Vec::new();
    let mut all_faces = Vec::with_capacity(n + 2);

    for i in 0..n {
        let j = (i + 1) % n;
        let surface_idx = geom.add_surface(Box::new(CylinderSurface::with_axis(Point3::new(0.0, 0.0, z0), Vec3::z(), radius)));
        let hes = [
            topo.add_half_edge(bottom[i]),
            topo.add_half_edge(bottom[j]),
            topo.add_half_edge(top[j]),
            topo.add_half_edge(top[i]),
        ];
        let loop_id = topo.add_loop(&hes);
        all_faces.push(topo.add_face(loop_id, surface_idx, Orientation::Forward));
        all_half_edges.extend(hes);
    }

    let (bottom_face, bottom_hes) = build_ring_cap(&mut topo, &mut geom, &bottom, true);
    let (top_face, top_hes) = build_ring_cap(&mut topo, &mut geom, &top, false);
    all_faces.push(bottom_face);
    all_faces.push(top_face);
    all_half_edges.extend(bottom_hes);
    all_half_edges.extend(top_hes);

    topo.pair_unlinked_half_edges(&all_half_edges)
        .expect("cylinder ring winding guarantees exactly two half-edges per edge");

    let shell = topo.add_shell(all_faces, true);
    let body = topo.add_body(shell);
    BRepBody { topology: topo, geometry: geom, body }
}

/// Build a B-rep cone (or frustum) of the given bottom/top radii and
/// `height`, centered on the Z axis. A zero radius at either end
/// collapses that ring to a single apex vertex shared by every side
/// face, producing a true cone rather than a very thin frustum.
pub fn make_cone(radius_bottom: f64, radius_top: f64, height: f64, segments: u32, centered: bool) -> BRepBody {
    let n = segments.max(3) as usize;
    let (z0, z1) = if centered { (-height / 2.0, height / 2.0) } else { (0.0, height) };

    let mut topo = Topology::new();
    let mut geom = GeometryStore::new();

    let apex_bottom = radius_bottom.abs() < 1e-12;
    let apex_top = radius_top.abs() < 1e-12;

    let bottom: Vec<VertexId> = if apex_bottom {
        vec![topo.add_vertex(Point3::new(0.0, 0.0, z0))]
    } else {
        ring_vertices(&mut topo, radius_bottom, z0, n)
    };
    let top: Vec<VertexId> = if apex_top {
        vec![topo.add_vertex(Point3::new(0.0, 0.0, z1))]
    } else {
        ring_vertices(&mut topo, radius_top, z1, n)
    };

    let mut all_half_edges = Vec::new();
    let mut all_faces = Vec::with_capacity(n + 2);

    let surface = cone_surface_between(radius_bottom, radius_top, z0, z1);

    for i in 0..n {
        let j = (i + 1) % n;
        let surface_idx = geom.add_surface(surface.clone_box());
        let b_i = if apex_bottom { bottom[0] } else { bottom[i] };
        let b_j = if apex_bottom { bottom[0] } else { bottom[j] };
        let t_i = if apex_top { top[0] } else { top[i] };
        let t_j = if apex_top { top[0] } else { top[j] };

        let hes = if apex_bottom {
            vec![topo.add_half_edge(b_i), topo.add_half_edge(t_j), topo.add_half_edge(t_i)]
        } else if apex_top {
            vec![topo.add_half_edge(b_i), topo.add_half_edge(b_j), topo.add_half_edge(t_i)]
        } else {
            vec![topo.add_half_edge(b_i), topo.add_half_edge(b_j), topo.add_half_edge(t_j), topo.add_half_edge(t_i)]
        };
        let loop_id = topo.add_loop(&hes);
        all_faces.push(topo.add_face(loop_id, surface_idx, Orientation::Forward));
        all_half_edges.extend(hes);
    }

    if !apex_bottom {
        let (face, hes) = build_ring_cap(&mut topo, &mut geom, &bottom, true);
        all_faces.push(face);
        all_half_edges.extend(hes);
    }
    if !apex_top {
        let (face, hes) = build_ring_cap(&mut topo, &mut geom, &top, false);
        all_faces.push(face);
        all_half_edges.extend(hes);
    }

    topo.pair_unlinked_half_edges(&all_half_edges)
        .expect("cone ring winding guarantees exactly two half-edges per edge");

    let shell = topo.add_shell(all_faces, true);
    let body = topo.add_body(shell);
    BRepBody { topology: topo, geometry: geom, body }
}

/// Build the single cone (or cylinder, for equal radii) surface shared
/// by every side face of [`make_cone`].
fn cone_surface_between(radius_bottom: f64, radius_top: f64, z0: f64, z1: f64) -> Box<dyn cad_geom::Surface> {
    let height = z1 - z0;
    match ConeSurface::from_frustum(Point3::new(0.0, 0.0, z0), radius_bottom, radius_top, height) {
        Some(cone) => Box::new(cone),
        None => Box::new(CylinderSurface::with_axis(Point3::new(0.0, 0.0, z0), Vec3::z(), radius_bottom)),
    }
}

/// Build a B-rep sphere of the given `radius` centered at the origin
/// (or at `z = radius` when `centered` is `false`, so the sphere sits
/// on the XY plane), latitude-longitude tessellated into `segments`
/// longitude divisions and `rings` latitude divisions, with the two
/// pole rings collapsed to single vertices.
pub fn make_sphere(radius: f64, segments: u32, rings: u32, centered: bool) -> BRepBody {
    let n = segments.max(3) as usize;
    let m = rings.max(2) as usize;
    let center_z = if centered { 0.0 } else { radius };
    let center = Point3::new(0.0, 0.0, center_z);

    let mut topo = Topology::new();
    let mut geom = GeometryStore::new();

    let south_pole = topo.add_vertex(Point3::new(0.0, 0.0, center_z - radius));
    let north_pole = topo.add_vertex(Point3::new(0.0, 0.0, center_z + radius));

    // Interior latitude rings, excluding the poles: m-1 rings for m
    // poloidal divisions.
    let mut rings_verts: Vec<Vec<VertexId>> = Vec::with_capacity(m - 1);
    for k in 1..m {
        let phi = -PI / 2.0 + PI * (k as f64) / (m as f64);
        let z = center_z + radius * phi.sin();
        let r = radius * phi.cos();
        rings_verts.push(ring_vertices(&mut topo, r, z, n));
    }

    let mut all_half_edges = Vec::new();
    let mut all_faces = Vec::new();

    let surface_for = |geom: &mut GeometryStore| geom.add_surface(Box::new(SphereSurface::with_center(center, radius)));

    // South cap: triangle fan from the south pole to the first ring.
    let first_ring = &rings_verts[0];
    for i in 0..n {
        let j = (i + 1) % n;
        let surface_idx = surface_for(&mut geom);
        let hes = [
            topo.add_half_edge(south_pole),
            topo.add_half_edge(first_ring[i]),
            topo.add_half_edge(first_ring[j]),
        ];
        let loop_id = topo.add_loop(&hes);
        all_faces.push(topo.add_face(loop_id, surface_idx, Orientation::Forward));
        all_half_edges.extend(hes);
    }

    // Quad strips between consecutive interior rings.
    for k in 0..rings_verts.len().saturating_sub(1) {
        let lower = &rings_verts[k];
        let upper = &rings_verts[k + 1];
        for i in 0..n {
            let j = (i + 1) % n;
            let surface_idx = surface_for(&mut geom);
            let hes = [
                topo.add_half_edge(lower[i]),
                topo.add_half_edge(lower[j]),
                topo.add_half_edge(upper[j]),
                topo.add_half_edge(upper[i]),
            ];
            let loop_id = topo.add_loop(&hes);
            all_faces.push(topo.add_face(loop_id, surface_idx, Orientation::Forward));
            all_half_edges.extend(hes);
        }
    }

    // North cap: triangle fan from the last ring to the north pole.
    let last_ring = rings_verts.last().unwrap();
    for i in 0..n {
        let j = (i + 1) % n;
        let surface_idx = surface_for(&mut geom);
        let hes = [
            topo.add_half_edge(last_ring[i]),
            topo.add_half_edge(last_ring[j]),
            topo.add_half_edge(north_pole),
        ];
        let loop_id = topo.add_loop(&hes);
        all_faces.push(topo.add_face(loop_id, surface_idx, Orientation::Forward));
        all_half_edges.extend(hes);
    }

    topo.pair_unlinked_half_edges(&all_half_edges)
        .expect("sphere ring winding guarantees exactly two half-edges per edge");

    let shell = topo.add_shell(all_faces, true);
    let body = topo.add_body(shell);
    BRepBody { topology: topo, geometry: geom, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_math::NumericContext;

    #[test]
    fn box_has_expected_counts() {
        let b = make_box(10.0, 20.0, 30.0, false);
        assert_eq!(b.topology.vertices.len(), 8);
        assert_eq!(b.topology.faces.len(), 6);
        assert_eq!(b.topology.half_edges.len(), 24);
        assert_eq!(b.topology.edges.len(), 12);
        assert_eq!(b.topology.shells.len(), 1);
        assert_eq!(b.topology.bodies.len(), 1);
    }

    #[test]
    fn box_faces_are_planar() {
        let b = make_box(10.0, 20.0, 30.0, false);
        for s in &b.geometry.surfaces {
            assert_eq!(s.surface_type(), cad_geom::SurfaceKind::Plane);
        }
    }

    #[test]
    fn box_vertex_extents_match_dimensions() {
        let b = make_box(10.0, 20.0, 30.0, false);
        let positions: Vec<_> = b.topology.vertices.values().map(|v| v.point).collect();
        let min_x = positions.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        let max_x = positions.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        assert!((min_x - 0.0).abs() < 1e-12);
        assert!((max_x - 10.0).abs() < 1e-12);
    }

    #[test]
    fn centered_box_is_symmetric_about_origin() {
        let b = create_box(1.0, 1.0, 1.0, true);
        let positions: Vec<_> = b.topology.vertices.values().map(|v| v.point).collect();
        let min_x = positions.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        let max_x = positions.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        assert!((min_x + 0.5).abs() < 1e-12);
        assert!((max_x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn box_shell_is_closed_with_no_validation_errors() {
        let b = make_box(1.0, 1.0, 1.0, true);
        let issues = cad_topo::validate_topology(&b.topology, &NumericContext::DEFAULT);
        assert!(issues.is_empty(), "unexpected validation issues: {issues:?}");
    }

    #[test]
    fn cylinder_has_expected_counts() {
        let b = make_cylinder(2.0, 5.0, 8, false);
        // 8 side faces + 2 caps, 16 vertices (8 per ring).
        assert_eq!(b.topology.faces.len(), 10);
        assert_eq!(b.topology.vertices.len(), 16);
        assert_eq!(b.topology.shells.len(), 1);
    }

    #[test]
    fn cylinder_side_faces_are_cylindrical() {
        let b = make_cylinder(2.0, 5.0, 8, false);
        let kinds: Vec<_> = b.geometry.surfaces.iter().map(|s| s.surface_type()).collect();
        assert_eq!(kinds.iter().filter(|k| **k == cad_geom::SurfaceKind::Cylinder).count(), 8);
        assert_eq!(kinds.iter().filter(|k| **k == cad_geom::SurfaceKind::Plane).count(), 2);
    }

    #[test]
    fn cylinder_has_no_validation_errors() {
        let b = make_cylinder(2.0, 5.0, 12, true);
        let issues = cad_topo::validate_topology(&b.topology, &NumericContext::DEFAULT);
        assert!(issues.is_empty(), "unexpected validation issues: {issues:?}");
    }

    #[test]
    fn cone_apex_collapses_bottom_ring_to_one_vertex() {
        let b = make_cone(0.0, 3.0, 4.0, 8, false);
        // One apex vertex + 8 top-ring vertices.
        assert_eq!(b.topology.vertices.len(), 9);
        // 8 triangular side faces + 1 top cap, no bottom cap.
        assert_eq!(b.topology.faces.len(), 9);
    }

    #[test]
    fn cone_frustum_has_two_caps() {
        let b = make_cone(2.0, 1.0, 4.0, 8, false);
        assert_eq!(b.topology.vertices.len(), 16);
        assert_eq!(b.topology.faces.len(), 10);
    }

    #[test]
    fn cone_has_no_validation_errors() {
        let b = make_cone(0.0, 3.0, 4.0, 10, false);
        let issues = cad_topo::validate_topology(&b.topology, &NumericContext::DEFAULT);
        assert!(issues.is_empty(), "unexpected validation issues: {issues:?}");
    }

    #[test]
    fn sphere_has_expected_counts() {
        // n=8 longitude, m=4 latitude divisions: 3 interior rings.
        let b = make_sphere(1.0, 8, 4, true);
        // 2 poles + 3 interior rings of 8.
        assert_eq!(b.topology.vertices.len(), 2 + 3 * 8);
        // 2 triangle fans (8 each) + 2 quad strips (8 each).
        assert_eq!(b.topology.faces.len(), 8 + 8 + 8 + 8);
    }

    #[test]
    fn sphere_faces_are_spherical() {
        let b = make_sphere(1.0, 8, 4, true);
        for s in &b.geometry.surfaces {
            assert_eq!(s.surface_type(), cad_geom::SurfaceKind::Sphere);
        }
    }

    #[test]
    fn sphere_vertex_extents_match_radius() {
        let b = make_sphere(2.0, 16, 8, true);
        let max_r = b
            .topology
            .vertices
            .values()
            .map(|v| v.point.coords.norm())
            .fold(0.0_f64, f64::max);
        assert!(max_r <= 2.0 + 1e-9);
        assert!((max_r - 2.0).abs() < 1e-9);
    }

    #[test]
    fn sphere_has_no_validation_errors() {
        let b = make_sphere(1.0, 12, 6, false);
        let issues = cad_topo::validate_topology(&b.topology, &NumericContext::DEFAULT);
        assert!(issues.is_empty(), "unexpected validation issues: {issues:?}");
    }
}
