//! Geometry-aware validation that needs both a [`Topology`] and a
//! [`GeometryStore`]: the `SameParameter` discipline (§3.3 invariant 5,
//! §4.C) and sliver-face detection (§4.C's validation battery).

use cad_geom::GeometryStore;
use cad_math::NumericContext;
use cad_topo::{FaceId, HalfEdgeId, Topology};

/// Number of points sampled along each half-edge's p-curve when checking
/// `SameParameter` agreement (§8.1 invariant 2's `N = 10`).
const SAMPLE_COUNT: usize = 10;

/// One half-edge whose 3D edge curve disagrees with its surface p-curve
/// by more than `ctx.length` at some sampled parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SameParameterViolation {
    /// The half-edge carrying the inconsistent p-curve.
    pub half_edge: HalfEdgeId,
    /// The largest deviation found across all sampled points.
    pub max_deviation: f64,
    /// The sample index (`0..SAMPLE_COUNT`) where `max_deviation` occurred.
    pub worst_sample: usize,
}

/// Sample every half-edge that carries both an edge curve and a p-curve
/// at `SAMPLE_COUNT` points along their shared parameter range, and
/// report every one whose 3D deviation from `surface(pcurve(s))`
/// exceeds `ctx.length`.
///
/// Half-edges with no p-curve (most straight edges in this kernel never
/// get one — only edges that must track a curved surface's parameter
/// space do) are skipped, not reported.
pub fn validate_same_parameter(
    topo: &Topology,
    geom: &GeometryStore,
    ctx: &NumericContext,
) -> Vec<SameParameterViolation> {
    let mut violations = Vec::new();

    for (he_id, he) in topo.half_edges.iter() {
        let Some(pcurve) = he.pcurve else { continue };
        let Some(edge_id) = he.edge else { continue };
        let edge = &topo.edges[edge_id];

        let surface = geom.surfaces[pcurve.surface_index].as_ref();
        let curve_2d = geom.curves_2d[pcurve.curve_2d_index].as_ref();

        let (t_start, t_end) = match edge.curve {
            Some((curve_idx, t_start, t_end)) => {
                let curve_3d = geom.curves_3d[curve_idx].as_ref();
                let (mut max_dev, mut worst) = (0.0_f64, 0usize);
                for i in 0..SAMPLE_COUNT {
                    let s = i as f64 / (SAMPLE_COUNT - 1) as f64;
                    let t = t_start + s * (t_end - t_start);
                    let edge_pt = curve_3d.evaluate(t);
                    let surface_pt = surface.evaluate(curve_2d.evaluate(t));
                    let dev = (edge_pt - surface_pt).norm();
                    if dev > max_dev {
                        max_dev = dev;
                        worst = i;
                    }
                }
                if max_dev > ctx.length {
                    violations.push(SameParameterViolation { half_edge: he_id, max_deviation: max_dev, worst_sample: worst });
                }
                continue;
            }
            // No explicit 3D curve: the edge is linear, so compare against
            // the straight interpolation between its vertex positions
            // (§4.C "for linear edges without an explicit 3D curve, it
            // uses linear interpolation between vertex positions").
            None => (0.0, 1.0),
        };

        let p0 = topo.vertices[edge.vertex_start].point;
        let p1 = topo.vertices[edge.vertex_end].point;
        let (mut max_dev, mut worst) = (0.0_f64, 0usize);
        for i in 0..SAMPLE_COUNT {
            let s = i as f64 / (SAMPLE_COUNT - 1) as f64;
            let t = t_start + s * (t_end - t_start);
            let edge_pt = p0 + t * (p1 - p0);
            let surface_pt = surface.evaluate(curve_2d.evaluate(t));
            let dev = (edge_pt - surface_pt).norm();
            if dev > max_dev {
                max_dev = dev;
                worst = i;
            }
        }
        if max_dev > ctx.length {
            violations.push(SameParameterViolation { half_edge: he_id, max_deviation: max_dev, worst_sample: worst });
        }
    }

    violations
}

/// A face flagged too thin to be numerically reliable: a high
/// perimeter-to-area ratio relative to its own size is a proxy for a
/// sliver without needing a full 2D projection and convex-hull pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SliverFace {
    /// The offending face.
    pub face: FaceId,
    /// `perimeter^2 / area`, dimensionless; large for slivers, `4*PI`
    /// (~12.6) for a circle, 16 for a square.
    pub aspect_ratio: f64,
}

/// Aspect-ratio threshold above which a planar face's outer loop is
/// reported as a sliver (§4.C "sliver faces below an aspect ratio
/// threshold" — the threshold here is expressed as an upper bound on
/// `perimeter^2 / area` since that ratio grows without bound as a
/// polygon degenerates into a thin wedge or needle).
const SLIVER_ASPECT_RATIO: f64 = 1.0e4;

/// Flag planar faces whose outer-loop polygon is degenerately thin.
/// Curved faces are skipped — their area/perimeter in 3D space doesn't
/// characterize the same kind of numerical hazard a thin planar facet
/// does for the boolean engine's clipping step.
pub fn sliver_faces(topo: &Topology, geom: &GeometryStore) -> Vec<SliverFace> {
    use cad_geom::SurfaceKind;

    let mut slivers = Vec::new();
    for (face_id, face) in topo.faces.iter() {
        let surface = geom.surfaces[face.surface_index].as_ref();
        if surface.surface_type() != SurfaceKind::Plane {
            continue;
        }
        let pts: Vec<_> = topo
            .loop_half_edges(face.outer_loop())
            .map(|he| topo.vertices[topo.half_edges[he].origin].point)
            .collect();
        if pts.len() < 3 {
            continue;
        }

        let perimeter: f64 = (0..pts.len())
            .map(|i| (pts[(i + 1) % pts.len()] - pts[i]).norm())
            .sum();

        let origin = pts[0];
        let normal = {
            let e1 = pts[1] - origin;
            let e2 = pts[2] - origin;
            e1.cross(&e2)
        };
        let n = normal.norm();
        if n < 1e-15 {
            // Degenerate to a line or point — report as the worst possible
            // sliver rather than dividing by zero area.
            slivers.push(SliverFace { face: face_id, aspect_ratio: f64::INFINITY });
            continue;
        }
        let u = (pts[1] - origin).normalize();
        let v = normal.normalize().cross(&u);
        let area = (0..pts.len())
            .map(|i| {
                let a = pts[i] - origin;
                let b = pts[(i + 1) % pts.len()] - origin;
                (a.dot(&u) * b.dot(&v) - b.dot(&u) * a.dot(&v)) * 0.5
            })
            .sum::<f64>()
            .abs();

        if area < 1e-15 {
            slivers.push(SliverFace { face: face_id, aspect_ratio: f64::INFINITY });
            continue;
        }
        let aspect_ratio = perimeter * perimeter / area;
        if aspect_ratio > SLIVER_ASPECT_RATIO {
            slivers.push(SliverFace { face: face_id, aspect_ratio });
        }
    }
    slivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_geom::{Line2d, Line3d, Plane};
    use cad_math::{Point2, Point3};
    use cad_topo::Orientation;

    #[test]
    fn clean_box_has_no_same_parameter_violations() {
        let b = crate::make_box(2.0, 3.0, 4.0, false);
        let violations = validate_same_parameter(&b.topology, &b.geometry, &NumericContext::DEFAULT);
        assert!(violations.is_empty());
    }

    #[test]
    fn clean_box_has_no_sliver_faces() {
        let b = crate::make_box(2.0, 3.0, 4.0, false);
        assert!(sliver_faces(&b.topology, &b.geometry).is_empty());
    }

    #[test]
    fn consistent_pcurve_passes_same_parameter() {
        let mut topo = Topology::new();
        let mut geom = GeometryStore::new();

        let plane = Plane::xy();
        let surface_idx = geom.add_surface(Box::new(plane));
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let p1 = Point3::new(3.0, 0.0, 0.0);
        let v0 = topo.add_vertex(p0);
        let v1 = topo.add_vertex(p1);

        let he0 = topo.add_half_edge(v0);
        let he1 = topo.add_half_edge(v1);
        topo.add_loop(&[he0, he1]);
        let edge = topo.add_edge(he0, he1).unwrap();
        let curve_idx = geom.add_curve_3d(Box::new(Line3d::from_points(p0, p1)));
        topo.set_edge_curve(edge, curve_idx, 0.0, 1.0);

        let curve_2d_idx = geom.add_curve_2d(Box::new(Line2d::from_points(Point2::new(0.0, 0.0), Point2::new(3.0, 0.0))));
        topo.set_half_edge_pcurve(he0, cad_topo::PCurve { surface_index: surface_idx, curve_2d_index: curve_2d_idx });

        let violations = validate_same_parameter(&topo, &geom, &NumericContext::DEFAULT);
        assert!(violations.is_empty());
    }

    #[test]
    fn inconsistent_pcurve_is_flagged() {
        let mut topo = Topology::new();
        let mut geom = GeometryStore::new();

        // A p-curve that drifts off the 3D edge's straight path by 1.0,
        // far beyond tolerance.
        let plane = Plane::xy();
        let surface_idx = geom.add_surface(Box::new(plane));
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let p1 = Point3::new(3.0, 0.0, 0.0);
        let v0 = topo.add_vertex(p0);
        let v1 = topo.add_vertex(p1);

        let he0 = topo.add_half_edge(v0);
        let he1 = topo.add_half_edge(v1);
        topo.add_loop(&[he0, he1]);
        let edge = topo.add_edge(he0, he1).unwrap();
        let curve_idx = geom.add_curve_3d(Box::new(Line3d::from_points(p0, p1)));
        topo.set_edge_curve(edge, curve_idx, 0.0, 1.0);

        let curve_2d_idx = geom.add_curve_2d(Box::new(Line2d::from_points(Point2::new(0.0, 1.0), Point2::new(3.0, 1.0))));
        topo.set_half_edge_pcurve(he0, cad_topo::PCurve { surface_index: surface_idx, curve_2d_index: curve_2d_idx });

        let violations = validate_same_parameter(&topo, &geom, &NumericContext::DEFAULT);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].max_deviation > 0.9);
    }

    #[test]
    fn needle_face_is_flagged_as_sliver() {
        let mut topo = Topology::new();
        let mut geom = GeometryStore::new();
        let surface_idx = geom.add_surface(Box::new(Plane::xy()));

        // A long, extremely thin triangle: perimeter^2/area is enormous.
        let verts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(100.0, 0.0001, 0.0),
            Point3::new(0.0, 0.0002, 0.0),
        ];
        let vids: Vec<_> = verts.iter().map(|&p| topo.add_vertex(p)).collect();
        let hes: Vec<_> = vids.iter().map(|&v| topo.add_half_edge(v)).collect();
        let loop_id = topo.add_loop(&hes);
        topo.add_face(loop_id, surface_idx, Orientation::Forward);

        let slivers = sliver_faces(&topo, &geom);
        assert_eq!(slivers.len(), 1);
    }
}
