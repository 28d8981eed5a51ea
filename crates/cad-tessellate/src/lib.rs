#![warn(missing_docs)]

//! B-rep to triangle mesh tessellation (§4.H).
//!
//! Converts a tessellated body into a render/export-ready triangle mesh by
//! dispatching per face on its surface kind: planar faces go through
//! ear-clipping (with hole bridging for faces that carry inner loops),
//! curved faces (cylinder, cone, sphere, torus, bilinear patch) are grid-
//! sampled in their own parameter space via `Surface::evaluate`/`normal`
//! and stitched into quad strips.
//!
//! This crate only reads topology and geometry; it never mutates a
//! `BRepBody`.

use std::f64::consts::PI;

use cad_geom::{
    BilinearSurface, ConeSurface, CylinderSurface, GeometryStore, SphereSurface, Surface,
    SurfaceKind, TorusSurface,
};
use cad_math::{Point2, Point3};
use cad_primitives::BRepBody;
use cad_topo::{FaceId, Topology};

/// Output triangle mesh for rendering and export.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]` (u32).
    pub indices: Vec<u32>,
    /// Flat array of vertex normals: `[nx0, ny0, nz0, ...]` (f32). Same length as `vertices`.
    pub normals: Vec<f32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    fn push_vertex(&mut self, p: Point3, n: cad_math::Vec3) {
        self.vertices.push(p.x as f32);
        self.vertices.push(p.y as f32);
        self.vertices.push(p.z as f32);
        self.normals.push(n.x as f32);
        self.normals.push(n.y as f32);
        self.normals.push(n.z as f32);
    }

    /// Merge another mesh into this one, offsetting its indices.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }
}

/// Tessellation parameters controlling mesh density.
#[derive(Debug, Clone, Copy)]
pub struct TessellationParams {
    /// Number of segments for a full-circle sweep (cylinder/cone/torus u, sphere longitude).
    pub circle_segments: u32,
    /// Number of segments along a cylinder/cone's axial extent.
    pub height_segments: u32,
    /// Number of segments for a sphere's latitude or a torus's poloidal angle.
    pub latitude_segments: u32,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            circle_segments: 32,
            height_segments: 8,
            latitude_segments: 16,
        }
    }
}

impl TessellationParams {
    /// Build params from a single segment-count hint, used for quick previews.
    pub fn from_segments(segments: u32) -> Self {
        let segments = segments.max(3);
        Self {
            circle_segments: segments,
            height_segments: (segments / 2).max(1),
            latitude_segments: (segments / 2).max(4),
        }
    }
}

/// Tessellate every shell/face of a body into a single triangle mesh.
pub fn tessellate_body(body: &BRepBody, params: &TessellationParams) -> TriangleMesh {
    let topo = &body.topology;
    let geom = &body.geometry;
    let mut mesh = TriangleMesh::new();
    for &shell_id in &topo.bodies[body.body].shells {
        for &face_id in &topo.shells[shell_id].faces {
            mesh.merge(&tessellate_face(topo, geom, face_id, params));
        }
    }
    mesh
}

fn tessellate_face(
    topo: &Topology,
    geom: &GeometryStore,
    face_id: FaceId,
    params: &TessellationParams,
) -> TriangleMesh {
    let face = &topo.faces[face_id];
    let surface = geom.surfaces[face.surface_index].as_ref();
    let reversed = face.reversed;

    match surface.surface_type() {
        SurfaceKind::Plane => tessellate_planar_face(topo, face_id, reversed),
        SurfaceKind::Cylinder | SurfaceKind::Cone | SurfaceKind::Sphere | SurfaceKind::Torus => {
            tessellate_curved_face(topo, surface, face_id, params, reversed)
        }
        SurfaceKind::Bilinear => tessellate_bilinear_face(topo, surface, face_id, params, reversed),
        // No concrete B-spline surface exists in the geometry store yet; a
        // face that somehow carries this kind contributes nothing rather
        // than panicking.
        SurfaceKind::BSpline => TriangleMesh::new(),
    }
}

fn loop_points(topo: &Topology, loop_id: cad_topo::LoopId) -> Vec<Point3> {
    topo.loop_half_edges(loop_id)
        .map(|he| topo.vertices[topo.half_edges[he].origin].point)
        .collect()
}

// =============================================================================
// Planar faces: ear-clipping with hole bridging
// =============================================================================

fn tessellate_planar_face(topo: &Topology, face_id: FaceId, reversed: bool) -> TriangleMesh {
    let face = &topo.faces[face_id];
    let outer = loop_points(topo, face.outer_loop());
    if outer.len() < 3 {
        return TriangleMesh::new();
    }

    let e1 = outer[1] - outer[0];
    let e2 = outer[2] - outer[0];
    let mut normal = e1.cross(&e2);
    if normal.norm() < 1e-12 {
        return TriangleMesh::new();
    }
    normal = normal.normalize();
    let out_normal = if reversed { -normal } else { normal };

    let u_axis = e1.normalize();
    let v_axis = normal.cross(&u_axis);
    let origin = outer[0];
    let project = |p: &Point3| -> (f64, f64) {
        let d = *p - origin;
        (d.dot(&u_axis), d.dot(&v_axis))
    };

    let holes: Vec<Vec<Point3>> = face
        .inner_loops()
        .iter()
        .map(|&l| loop_points(topo, l))
        .filter(|pts| pts.len() >= 3)
        .collect();

    let outer_2d: Vec<(f64, f64)> = outer.iter().map(&project).collect();
    let holes_2d: Vec<Vec<(f64, f64)>> = holes
        .iter()
        .map(|h| h.iter().map(&project).collect())
        .collect();

    let mut mesh = TriangleMesh::new();

    let mut all_points_3d = outer.clone();
    let mut all_points_2d = outer_2d.clone();
    for h in &holes {
        all_points_3d.extend_from_slice(h);
    }
    for h in &holes_2d {
        all_points_2d.extend_from_slice(h);
    }
    for p in &all_points_3d {
        mesh.push_vertex(*p, out_normal);
    }

    let polygon = bridge_holes(&outer_2d, &holes_2d);
    ear_clip_triangulate(&all_points_2d, &polygon, &mut mesh.indices, reversed);

    mesh
}

/// Merge each hole loop into the outer polygon by bridging it at the
/// hole vertex nearest to the outer boundary, producing a single simple
/// polygon (outer with zero-width slits cut to each hole) ready for plain
/// ear-clipping.
fn bridge_holes(outer_2d: &[(f64, f64)], holes_2d: &[Vec<(f64, f64)>]) -> Vec<usize> {
    let mut polygon: Vec<usize> = (0..outer_2d.len()).collect();
    let mut all_2d: Vec<(f64, f64)> = outer_2d.to_vec();

    for hole in holes_2d {
        let hole_start = all_2d.len();
        all_2d.extend_from_slice(hole);
        let hole_len = hole.len();

        let mut best = (f64::INFINITY, 0usize, 0usize); // (dist^2, poly_pos, hole_idx)
        for (poly_pos, &outer_idx) in polygon.iter().enumerate() {
            let o = all_2d[outer_idx];
            for hi in 0..hole_len {
                let h = hole[hi];
                let d = (o.0 - h.0).powi(2) + (o.1 - h.1).powi(2);
                if d < best.0 {
                    best = (d, poly_pos, hi);
                }
            }
        }

        let (_, poly_pos, hole_idx) = best;
        let bridge_outer = polygon[poly_pos];
        let hole_cycle: Vec<usize> = (0..=hole_len)
            .map(|k| hole_start + (hole_idx + k) % hole_len)
            .collect();

        let mut new_polygon = Vec::with_capacity(polygon.len() + hole_cycle.len() + 2);
        new_polygon.extend_from_slice(&polygon[..=poly_pos]);
        new_polygon.extend_from_slice(&hole_cycle);
        new_polygon.push(bridge_outer);
        new_polygon.extend_from_slice(&polygon[poly_pos + 1..]);
        polygon = new_polygon;
    }

    polygon
}

/// Ear-clipping triangulation of a (possibly non-convex, bridge-merged)
/// simple polygon given as indices into a shared vertex array.
fn ear_clip_triangulate(
    verts_2d: &[(f64, f64)],
    indices: &[usize],
    out_indices: &mut Vec<u32>,
    reversed: bool,
) {
    if indices.len() < 3 {
        return;
    }
    let mut remaining: Vec<usize> = indices.to_vec();

    while remaining.len() > 3 {
        let n = remaining.len();
        let mut clipped = false;

        for i in 0..n {
            let prev = (i + n - 1) % n;
            let next = (i + 1) % n;
            let a = verts_2d[remaining[prev]];
            let b = verts_2d[remaining[i]];
            let c = verts_2d[remaining[next]];

            let cross = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
            let convex = if reversed { cross < 0.0 } else { cross > 0.0 };
            if !convex {
                continue;
            }

            let is_ear = (0..n)
                .filter(|&j| j != prev && j != i && j != next)
                .all(|j| !point_in_triangle_2d(verts_2d[remaining[j]], a, b, c));

            if is_ear {
                push_triangle(out_indices, remaining[prev], remaining[i], remaining[next], reversed);
                remaining.remove(i);
                clipped = true;
                break;
            }
        }

        if !clipped {
            // Degenerate/collinear residue — fan the rest rather than loop forever.
            break;
        }
    }

    if remaining.len() == 3 {
        push_triangle(out_indices, remaining[0], remaining[1], remaining[2], reversed);
    }
}

fn push_triangle(out: &mut Vec<u32>, a: usize, b: usize, c: usize, reversed: bool) {
    if reversed {
        out.push(a as u32);
        out.push(c as u32);
        out.push(b as u32);
    } else {
        out.push(a as u32);
        out.push(b as u32);
        out.push(c as u32);
    }
}

fn point_in_triangle_2d(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let v0 = (c.0 - a.0, c.1 - a.1);
    let v1 = (b.0 - a.0, b.1 - a.1);
    let v2 = (p.0 - a.0, p.1 - a.1);

    let dot00 = v0.0 * v0.0 + v0.1 * v0.1;
    let dot01 = v0.0 * v1.0 + v0.1 * v1.1;
    let dot02 = v0.0 * v2.0 + v0.1 * v2.1;
    let dot11 = v1.0 * v1.0 + v1.1 * v1.1;
    let dot12 = v1.0 * v2.0 + v1.1 * v2.1;

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < 1e-18 {
        return false;
    }
    let inv_denom = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;
    let eps = 1e-10;
    u > eps && v > eps && (u + v) < 1.0 - eps
}

// =============================================================================
// Curved faces: parameter-space grid sampling
// =============================================================================

/// The angular/axial basis shared by cylinder, cone, sphere and torus —
/// enough to recover each face corner's `(u, v)` by inverse projection.
struct RevolutionBasis {
    center: Point3,
    axis: cad_math::Vec3,
    ref_dir: cad_math::Vec3,
}

fn revolution_basis(surface: &dyn Surface) -> Option<RevolutionBasis> {
    if let Some(s) = surface.as_any().downcast_ref::<CylinderSurface>() {
        Some(RevolutionBasis { center: s.center, axis: *s.axis.as_ref(), ref_dir: *s.ref_dir.as_ref() })
    } else if let Some(s) = surface.as_any().downcast_ref::<ConeSurface>() {
        Some(RevolutionBasis { center: s.apex, axis: *s.axis.as_ref(), ref_dir: *s.ref_dir.as_ref() })
    } else if let Some(s) = surface.as_any().downcast_ref::<SphereSurface>() {
        Some(RevolutionBasis { center: s.center, axis: *s.axis.as_ref(), ref_dir: *s.ref_dir.as_ref() })
    } else if let Some(s) = surface.as_any().downcast_ref::<TorusSurface>() {
        Some(RevolutionBasis { center: s.center, axis: *s.axis.as_ref(), ref_dir: *s.ref_dir.as_ref() })
    } else {
        None
    }
}

/// Angle of `p` around `basis`'s axis, measured from `ref_dir`, in `[0, 2π)`.
fn angle_of(p: Point3, basis: &RevolutionBasis) -> f64 {
    let d = p - basis.center;
    let y_dir = basis.axis.cross(&basis.ref_dir);
    let a = d.dot(&y_dir).atan2(d.dot(&basis.ref_dir));
    if a < 0.0 {
        a + 2.0 * PI
    } else {
        a
    }
}

/// Infer the angular `(u_min, u_max)` a face's corner vertices span: a
/// full sweep if the corners collapse to a single seam angle, otherwise
/// the shorter of the two arcs between the two seam angles.
fn angular_range(angles: &[f64]) -> (f64, f64) {
    let mut unique: Vec<f64> = Vec::new();
    for &a in angles {
        if !unique.iter().any(|&u: &f64| (u - a).abs() < 1e-3) {
            unique.push(a);
        }
    }
    if unique.len() < 2 {
        return (0.0, 2.0 * PI);
    }
    unique.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let a0 = unique[0];
    let a1 = *unique.last().unwrap();
    let direct = a1 - a0;
    let wrap = 2.0 * PI - direct;
    if direct <= wrap {
        (a0, a1)
    } else {
        (a1, a0 + 2.0 * PI)
    }
}

fn tessellate_curved_face(
    topo: &Topology,
    surface: &dyn Surface,
    face_id: FaceId,
    params: &TessellationParams,
    reversed: bool,
) -> TriangleMesh {
    let face = &topo.faces[face_id];
    let corners = loop_points(topo, face.outer_loop());
    if corners.len() < 3 {
        return TriangleMesh::new();
    }
    let Some(basis) = revolution_basis(surface) else {
        return TriangleMesh::new();
    };

    let angles: Vec<f64> = corners.iter().map(|&p| angle_of(p, &basis)).collect();
    let (u_min, u_max) = angular_range(&angles);
    let u_span = u_max - u_min;
    let full_sweep = (2.0 * PI - u_span).abs() < 1e-3;

    let (v_min, v_max) = match surface.surface_type() {
        SurfaceKind::Cylinder => {
            let vs: Vec<f64> = corners.iter().map(|&p| (p - basis.center).dot(&basis.axis)).collect();
            (vs.iter().cloned().fold(f64::MAX, f64::min), vs.iter().cloned().fold(f64::MIN, f64::max))
        }
        SurfaceKind::Cone => {
            // The cone's direction vector at (u, v) has unit length, so v is
            // simply the distance from the apex.
            let vs: Vec<f64> = corners.iter().map(|&p| (p - basis.center).norm()).collect();
            (vs.iter().cloned().fold(f64::MAX, f64::min), vs.iter().cloned().fold(f64::MIN, f64::max))
        }
        SurfaceKind::Sphere => {
            let radius = corners.iter().map(|&p| (p - basis.center).norm()).sum::<f64>() / corners.len() as f64;
            let vs: Vec<f64> = corners
                .iter()
                .map(|&p| {
                    let d = p - basis.center;
                    (d.dot(&basis.axis) / radius.max(1e-9)).clamp(-1.0, 1.0).asin()
                })
                .collect();
            (vs.iter().cloned().fold(f64::MAX, f64::min), vs.iter().cloned().fold(f64::MIN, f64::max))
        }
        SurfaceKind::Torus => {
            let torus = surface.as_any().downcast_ref::<TorusSurface>().expect("torus basis implies TorusSurface");
            let y_dir = basis.axis.cross(&basis.ref_dir);
            let poloidal: Vec<f64> = corners
                .iter()
                .map(|&p| {
                    let u = angle_of(p, &basis);
                    let tube_dir = u.cos() * basis.ref_dir + u.sin() * y_dir;
                    let tube_center = basis.center + torus.major_radius * tube_dir;
                    let w = p - tube_center;
                    let a = w.dot(&basis.axis).atan2(w.dot(&tube_dir));
                    if a < 0.0 { a + 2.0 * PI } else { a }
                })
                .collect();
            angular_range(&poloidal)
        }
        _ => unreachable!("revolution_basis only matches cylinder/cone/sphere/torus"),
    };
    let v_span = v_max - v_min;
    let v_full_sweep = surface.surface_type() == SurfaceKind::Torus && (2.0 * PI - v_span).abs() < 1e-3;

    let n_u = if full_sweep {
        params.circle_segments.max(3) as usize
    } else {
        ((params.circle_segments as f64 * (u_span / (2.0 * PI)).abs()).ceil() as usize).max(1)
    };
    let n_v = match surface.surface_type() {
        SurfaceKind::Sphere => params.latitude_segments.max(2) as usize,
        SurfaceKind::Torus => {
            if v_full_sweep {
                params.latitude_segments.max(3) as usize
            } else {
                ((params.latitude_segments as f64 * (v_span / (2.0 * PI)).abs()).ceil() as usize).max(1)
            }
        }
        _ => params.height_segments.max(1) as usize,
    };

    let mut mesh = TriangleMesh::new();
    for j in 0..=n_v {
        let v = v_min + v_span * (j as f64 / n_v as f64);
        for i in 0..=n_u {
            let u_raw = u_min + u_span * (i as f64 / n_u as f64);
            let u = u_raw.rem_euclid(2.0 * PI);
            let pt = surface.evaluate(Point2::new(u, v));
            let n = surface.normal(Point2::new(u, v));
            let n = if reversed { -n.into_inner() } else { n.into_inner() };
            mesh.push_vertex(pt, n);
        }
    }

    stitch_grid(&mut mesh.indices, n_u, n_v, reversed);
    mesh
}

fn tessellate_bilinear_face(
    topo: &Topology,
    surface: &dyn Surface,
    face_id: FaceId,
    params: &TessellationParams,
    reversed: bool,
) -> TriangleMesh {
    let face = &topo.faces[face_id];
    if loop_points(topo, face.outer_loop()).len() < 3 {
        return TriangleMesh::new();
    }
    let Some(bilinear) = surface.as_any().downcast_ref::<BilinearSurface>() else {
        return TriangleMesh::new();
    };

    let n_u = params.circle_segments.max(2) as usize;
    let n_v = params.height_segments.max(2) as usize;
    let mut mesh = TriangleMesh::new();

    for j in 0..=n_v {
        let v = j as f64 / n_v as f64;
        for i in 0..=n_u {
            let u = i as f64 / n_u as f64;
            let uv = Point2::new(u, v);
            let pt = bilinear.evaluate(uv);
            let n = surface.normal(uv);
            let n = if reversed { -n.into_inner() } else { n.into_inner() };
            mesh.push_vertex(pt, n);
        }
    }

    stitch_grid(&mut mesh.indices, n_u, n_v, reversed);
    mesh
}

/// Quad-strip a `(n_u + 1) x (n_v + 1)` vertex grid (row-major, u fastest)
/// into triangles.
fn stitch_grid(indices: &mut Vec<u32>, n_u: usize, n_v: usize, reversed: bool) {
    let stride = (n_u + 1) as u32;
    for j in 0..n_v {
        for i in 0..n_u {
            let bl = j as u32 * stride + i as u32;
            let br = bl + 1;
            let tl = bl + stride;
            let tr = tl + 1;
            if reversed {
                indices.extend_from_slice(&[bl, tl, br, br, tl, tr]);
            } else {
                indices.extend_from_slice(&[bl, br, tl, br, tr, tl]);
            }
        }
    }
}
