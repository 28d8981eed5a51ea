//! Sub-face classification relative to the other solid.
//!
//! Classification never tessellates or ray-casts against a mesh: a
//! point's containment in a closed planar-faced solid is decided by
//! casting a ray along a fixed axis and counting planar-face crossings,
//! each crossing itself decided by the same winding-number polygon test
//! the coplanar imprint step uses.

use cad_geom::GeometryStore;
use cad_math::{NumericContext, Point3, Vec3};
use cad_topo::{BodyId, Topology};

use crate::planar::{face_plane, face_poly, point_in_face};

/// Where a sub-face sits relative to the other solid in a boolean
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSide {
    /// Outside the other solid's volume.
    Outside,
    /// Inside the other solid's volume.
    Inside,
    /// Coincident with a face of the other solid, with matching outward
    /// orientation (the two surfaces agree).
    OnSame,
    /// Coincident with a face of the other solid, with opposing outward
    /// orientation.
    OnOpposite,
}

/// Whether `p` lies inside the closed solid `body` (cast a ray along
/// `+z`, or `+x` if the point's `+z` ray would graze too many faces
/// edge-on, and count planar-face crossings beyond `p`).
pub fn point_in_solid(topo: &Topology, geom: &GeometryStore, body: BodyId, p: Point3) -> bool {
    count_crossings(topo, geom, body, p, Vec3::new(0.0, 0.0, 1.0)) % 2 == 1
}

fn count_crossings(topo: &Topology, geom: &GeometryStore, body: BodyId, p: Point3, ray_dir: Vec3) -> usize {
    let mut count = 0usize;
    for &shell_id in &topo.bodies[body].shells {
        for &face_id in &topo.shells[shell_id].faces {
            let Some(plane) = face_plane(topo, geom, face_id) else { continue };
            let n = *plane.normal_dir.as_ref();
            let denom = n.dot(&ray_dir);
            if denom.abs() < 1e-12 {
                continue;
            }
            let t = plane.signed_distance(&p) / -denom;
            if t <= 1e-9 {
                continue;
            }
            let hit = p + ray_dir * t;
            let poly = face_poly(topo, &plane, face_id);
            if point_in_face(&poly, plane.project(&hit)) {
                count += 1;
            }
        }
    }
    count
}

/// Classify a sub-face (given its centroid and outward normal, both in
/// 3D) against the other body.
pub fn classify_subface(
    topo: &Topology,
    geom: &GeometryStore,
    body: BodyId,
    centroid: Point3,
    normal: Vec3,
    ctx: &NumericContext,
) -> FaceSide {
    for &shell_id in &topo.bodies[body].shells {
        for &face_id in &topo.shells[shell_id].faces {
            let Some(plane) = face_plane(topo, geom, face_id) else { continue };
            if plane.signed_distance(&centroid).abs() > ctx.length {
                continue;
            }
            let poly = face_poly(topo, &plane, face_id);
            if !point_in_face(&poly, plane.project(&centroid)) {
                continue;
            }
            let dot = normal.dot(plane.normal_dir.as_ref());
            return if dot > 0.0 { FaceSide::OnSame } else { FaceSide::OnOpposite };
        }
    }
    if point_in_solid(topo, geom, body, centroid) {
        FaceSide::Inside
    } else {
        FaceSide::Outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_primitives::make_box;

    #[test]
    fn centroid_of_box_interior_is_inside() {
        let b = make_box(2.0, 2.0, 2.0, true);
        assert!(point_in_solid(&b.topology, &b.geometry, b.body, Point3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn point_far_outside_box_is_outside() {
        let b = make_box(2.0, 2.0, 2.0, true);
        assert!(!point_in_solid(&b.topology, &b.geometry, b.body, Point3::new(10.0, 10.0, 10.0)));
    }

    #[test]
    fn point_just_outside_face_is_outside() {
        let b = make_box(2.0, 2.0, 2.0, true);
        assert!(!point_in_solid(&b.topology, &b.geometry, b.body, Point3::new(0.0, 0.0, 1.5)));
    }
}
