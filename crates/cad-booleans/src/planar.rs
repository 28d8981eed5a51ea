//! Planar face extraction, 2D projection, and polygon clipping.
//!
//! Every face this engine touches must be planar; curved faces make a
//! boolean operation bail out with [`crate::BooleanError::NonPlanarFace`]
//! rather than approximate. All polygon logic here — point-in-polygon,
//! line/polygon clipping — goes through [`cad_math::orient2d`] rather
//! than a raw cross product, per the same robustness discipline the
//! numeric predicates crate documents.

use cad_geom::{GeometryStore, Plane, Surface};
use cad_math::{orient2d, NumericContext, Orientation2d, Point2, Point3, Vec2, Vec3};
use cad_topo::{FaceId, Topology};

/// A face's boundary, projected into its own plane's `(u, v)` frame:
/// outer ring first, then zero or more hole rings.
#[derive(Debug, Clone)]
pub struct FacePoly {
    /// The plane this polygon is expressed in.
    pub plane: Plane,
    /// Outer boundary, wound counter-clockwise (positive signed area).
    pub outer: Vec<Point2>,
    /// Hole boundaries, each wound clockwise relative to the outer ring.
    pub holes: Vec<Vec<Point2>>,
}

/// Extract the supporting plane of a face, or `None` if its surface is
/// not a [`Plane`].
pub fn face_plane(topo: &Topology, geom: &GeometryStore, face_id: FaceId) -> Option<Plane> {
    let face = &topo.faces[face_id];
    geom.surfaces[face.surface_index]
        .as_any()
        .downcast_ref::<Plane>()
        .cloned()
}

/// Project a face's boundary loops into its own plane's 2D frame.
pub fn face_poly(topo: &Topology, plane: &Plane, face_id: FaceId) -> FacePoly {
    let face = &topo.faces[face_id];
    let outer = loop_points_2d(topo, plane, face.outer_loop());
    let holes = face.inner_loops().iter().map(|&l| loop_points_2d(topo, plane, l)).collect();
    FacePoly {
        plane: plane.clone(),
        outer,
        holes,
    }
}

fn loop_points_2d(topo: &Topology, plane: &Plane, loop_id: cad_topo::LoopId) -> Vec<Point2> {
    topo.loop_half_edges(loop_id)
        .map(|he| plane.project(&topo.vertices[topo.half_edges[he].origin].point))
        .collect()
}

/// Signed area of a 2D polygon (shoelace formula); positive for CCW.
pub fn signed_area(poly: &[Point2]) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    area * 0.5
}

/// Centroid of a polygon's vertices (not the area centroid; good enough
/// as a sample point for a face whose loop is reasonably convex, which
/// every sub-face this engine produces is by construction).
pub fn vertex_centroid(poly: &[Point2]) -> Point2 {
    let n = poly.len().max(1) as f64;
    let sum = poly.iter().fold(Vec2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / n)
}

/// Winding-number point-in-polygon test: counts only strictly-left
/// upward crossings and strictly-right downward crossings of a ray cast
/// along `+x` from `p`, via `orient2d` rather than a raw cross product.
/// Nonzero winding number means inside.
pub fn point_in_polygon(poly: &[Point2], p: Point2) -> bool {
    let mut winding = 0i32;
    let n = poly.len();
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        if a.y <= p.y {
            if b.y > p.y && orient2d(a, b, p) == Orientation2d::CounterClockwise {
                winding += 1;
            }
        } else if b.y <= p.y && orient2d(a, b, p) == Orientation2d::Clockwise {
            winding -= 1;
        }
    }
    winding != 0
}

/// Whether `p` lies inside a face's boundary: inside the outer ring and
/// outside every hole.
pub fn point_in_face(face: &FacePoly, p: Point2) -> bool {
    if !point_in_polygon(&face.outer, p) {
        return false;
    }
    !face.holes.iter().any(|h| point_in_polygon(h, p))
}

/// Split a simple polygon by the infinite line through `origin` with
/// direction `dir`, returning `(left, right)` where left is the side
/// `orient2d(origin, origin + dir, v) != Clockwise` and right is the
/// complement. Either side is empty if the polygon lies entirely on the
/// other. Standard Sutherland-Hodgman half-plane clip, run twice with
/// the inequality flipped; preserves the input winding order on both
/// outputs.
pub fn split_polygon_by_line(poly: &[Point2], origin: Point2, dir: Vec2) -> (Vec<Point2>, Vec<Point2>) {
    let far = origin + dir;
    let left = clip_half_plane(poly, origin, far, false);
    let right = clip_half_plane(poly, origin, far, true);
    (left, right)
}

fn clip_half_plane(poly: &[Point2], a: Point2, b: Point2, keep_right: bool) -> Vec<Point2> {
    if poly.len() < 3 {
        return Vec::new();
    }
    let inside = |p: Point2| {
        let o = orient2d(a, b, p);
        if keep_right {
            o != Orientation2d::CounterClockwise
        } else {
            o != Orientation2d::Clockwise
        }
    };
    let mut out = Vec::with_capacity(poly.len() + 2);
    let n = poly.len();
    for i in 0..n {
        let cur = poly[i];
        let prev = poly[(i + n - 1) % n];
        let cur_in = inside(cur);
        let prev_in = inside(prev);
        if cur_in != prev_in {
            if let Some(hit) = line_segment_intersection(a, b - a, prev, cur) {
                out.push(hit);
            }
        }
        if cur_in {
            out.push(cur);
        }
    }
    out
}

/// Intersect the infinite line `origin + t*dir` with the segment `p -> q`,
/// returning the intersection point when the segment actually crosses it.
fn line_segment_intersection(origin: Point2, dir: Vec2, p: Point2, q: Point2) -> Option<Point2> {
    let d2 = q - p;
    let denom = dir.x * d2.y - dir.y * d2.x;
    if denom.abs() < 1e-14 {
        return None;
    }
    let diff = p - origin;
    let s = (diff.x * dir.y - diff.y * dir.x) / denom;
    Some(p + d2 * s)
}

/// Intersection of the infinite line `origin + t*dir` with a closed
/// polygon boundary, expressed as the sorted set of `t`-intervals where
/// the line lies inside the polygon.
pub fn line_polygon_intervals(origin: Point2, dir: Vec2, face: &FacePoly) -> Vec<(f64, f64)> {
    let mut ts: Vec<f64> = Vec::new();
    let mut collect = |ring: &[Point2]| {
        let n = ring.len();
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            let d2 = b - a;
            let denom = dir.x * d2.y - dir.y * d2.x;
            if denom.abs() < 1e-14 {
                continue;
            }
            let diff = a - origin;
            let t = (diff.x * d2.y - diff.y * d2.x) / denom;
            let s = (diff.x * dir.y - diff.y * dir.x) / denom;
            if (0.0..=1.0).contains(&s) {
                ts.push(t);
            }
        }
    };
    collect(&face.outer);
    for h in &face.holes {
        collect(h);
    }
    ts.sort_by(|a, b| a.partial_cmp(b).unwrap());
    ts.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

    let mut intervals = Vec::new();
    for w in ts.windows(2) {
        let (t0, t1) = (w[0], w[1]);
        let mid = origin + dir * ((t0 + t1) * 0.5);
        if point_in_face(face, mid) {
            intervals.push((t0, t1));
        }
    }
    intervals
}

/// Intersection line of two non-parallel planes, as a point and unit
/// direction, via the standard three-plane intersection formula with the
/// third plane's normal set to the cross product of the other two
/// (`d3 = 0`). Returns `None` when the planes are parallel.
pub fn plane_plane_intersect(a: &Plane, b: &Plane) -> Option<(Point3, Vec3)> {
    let n1 = *a.normal_dir.as_ref();
    let n2 = *b.normal_dir.as_ref();
    let dir = n1.cross(&n2);
    let dir_len = dir.norm();
    if dir_len < 1e-12 {
        return None;
    }
    let dir = dir / dir_len;
    let d1 = n1.dot(&a.origin.coords);
    let d2 = n2.dot(&b.origin.coords);
    let det = n1.dot(&n2.cross(&dir));
    if det.abs() < 1e-12 {
        return None;
    }
    let p = (n2.cross(&dir) * d1 + dir.cross(&n1) * d2) / det;
    Some((Point3::from(p), dir))
}

/// Whether two planes are (within tolerance) the same plane: parallel
/// normals and a matching offset.
pub fn planes_coincide(a: &Plane, b: &Plane, ctx: &NumericContext) -> bool {
    let n1 = *a.normal_dir.as_ref();
    let n2 = *b.normal_dir.as_ref();
    if n1.cross(&n2).norm() > ctx.angle {
        return false;
    }
    a.signed_distance(&b.origin).abs() <= ctx.length
}

/// Project a 3D direction that is known to lie in `plane` into the
/// plane's 2D frame.
pub fn project_direction(plane: &Plane, dir: Vec3) -> Vec2 {
    Vec2::new(dir.dot(plane.x_dir.as_ref()), dir.dot(plane.y_dir.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ]
    }

    #[test]
    fn point_inside_square_is_detected() {
        assert!(point_in_polygon(&square(), Point2::new(2.0, 2.0)));
        assert!(!point_in_polygon(&square(), Point2::new(5.0, 2.0)));
    }

    #[test]
    fn split_by_vertical_line_bisects_square() {
        let (left, right) = split_polygon_by_line(&square(), Point2::new(2.0, 0.0), Vec2::new(0.0, 1.0));
        assert!((signed_area(&left).abs() - 8.0).abs() < 1e-9);
        assert!((signed_area(&right).abs() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn split_by_line_outside_polygon_keeps_it_whole() {
        let (left, right) = split_polygon_by_line(&square(), Point2::new(10.0, 0.0), Vec2::new(0.0, 1.0));
        assert!(left.is_empty() || right.is_empty());
    }

    #[test]
    fn coincident_planes_detected_regardless_of_frame() {
        let a = Plane::xy();
        let b = Plane::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0), Vec3::new(-1.0, 1.0, 0.0));
        assert!(planes_coincide(&a, &b, &NumericContext::DEFAULT));
    }

    #[test]
    fn parallel_offset_planes_are_not_coincident() {
        let a = Plane::xy();
        let b = Plane::new(Point3::new(0.0, 0.0, 5.0), Vec3::x(), Vec3::y());
        assert!(!planes_coincide(&a, &b, &NumericContext::DEFAULT));
    }

    #[test]
    fn crossing_planes_intersect_along_expected_axis() {
        let a = Plane::xy();
        let b = Plane::xz();
        let (_, dir) = plane_plane_intersect(&a, &b).unwrap();
        // xy ∩ xz = the x axis.
        assert!(dir.y.abs() < 1e-9 && dir.z.abs() < 1e-9);
    }
}
