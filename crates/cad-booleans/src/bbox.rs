//! Axis-aligned bounding box broadphase filter.
//!
//! Every candidate face pair considered by the engine is first cheaply
//! rejected or accepted by AABB overlap, before any plane-plane or
//! polygon-clipping work runs.

use cad_math::Point3;
use cad_topo::{FaceId, Topology};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// An inverted (empty) box, ready for `include_point` expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Expand the box to include `p`.
    pub fn include_point(&mut self, p: Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Grow the box outward by `tol` on every side, so touching-but-not-
    /// overlapping faces still register as candidates.
    pub fn expanded(mut self, tol: f64) -> Self {
        self.min.x -= tol;
        self.min.y -= tol;
        self.min.z -= tol;
        self.max.x += tol;
        self.max.y += tol;
        self.max.z += tol;
        self
    }

    /// Whether this box overlaps `other` (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Bounding box of a face's boundary vertices (outer loop plus holes).
pub fn face_aabb(topo: &Topology, face_id: FaceId) -> Aabb3 {
    let face = &topo.faces[face_id];
    let mut aabb = Aabb3::empty();
    for &loop_id in &face.loops {
        for he in topo.loop_half_edges(loop_id) {
            aabb.include_point(topo.vertices[topo.half_edges[he].origin].point);
        }
    }
    aabb
}
