//! Rebuilding a new [`BRepBody`] from the kept sub-faces of a boolean
//! operation, and the bookkeeping that becomes the operation's face
//! history.

use std::collections::HashMap;

use cad_geom::{GeometryStore, Plane, Surface};
use cad_math::{NumericContext, Point2, Point3};
use cad_naming::EvolutionKind;
use cad_primitives::BRepBody;
use cad_topo::{FaceId, Orientation, Topology, VertexId};

use crate::classify::FaceSide;

/// Which input body a sub-face traces back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBody {
    /// The base/first operand.
    A,
    /// The tool/second operand.
    B,
}

/// A sub-face produced by splitting one original face against the other
/// body, tagged with its classification.
#[derive(Debug, Clone)]
pub struct ClassifiedSubFace {
    /// Which body this sub-face came from.
    pub source_body: SourceBody,
    /// The face it was split from.
    pub source_face: FaceId,
    /// The plane the polygon below is expressed in.
    pub plane: Plane,
    /// Outer boundary, CCW in the plane's frame.
    pub outer: Vec<Point2>,
    /// Hole boundaries carried over from the original face.
    pub holes: Vec<Vec<Point2>>,
    /// Classification relative to the other body.
    pub side: FaceSide,
}

/// One entry in the face history an operation produces: an original
/// face's fate, expressed as the set of result faces it became (empty
/// for a pure death) and the kind of change that represents.
#[derive(Debug, Clone)]
pub struct FaceHistoryEntry {
    /// Which body the original face belonged to.
    pub source_body: SourceBody,
    /// The original face.
    pub source_face: FaceId,
    /// The faces it became in the result topology.
    pub result_faces: Vec<FaceId>,
    /// How this face changed.
    pub kind: EvolutionKind,
}

/// Whether, and with what winding, a classified sub-face survives a
/// given operation. `Some(true)` keeps it with its loop reversed (the
/// cavity-wall case in subtract).
pub fn keep_a(op: crate::BooleanOp, side: FaceSide) -> Option<bool> {
    use crate::BooleanOp::*;
    use FaceSide::*;
    match (op, side) {
        (Union, Outside) | (Union, OnSame) => Some(false),
        (Intersect, Inside) => Some(false),
        (Subtract, Outside) | (Subtract, OnSame) => Some(false),
        _ => None,
    }
}

/// The symmetric keep-rule for sub-faces of the tool body `B`.
pub fn keep_b(op: crate::BooleanOp, side: FaceSide) -> Option<bool> {
    use crate::BooleanOp::*;
    use FaceSide::*;
    match (op, side) {
        (Union, Outside) => Some(false),
        (Intersect, Inside) | (Intersect, OnSame) => Some(false),
        (Subtract, Inside) => Some(true),
        _ => None,
    }
}

/// Snaps nearby 3D points to a shared [`VertexId`] so independently
/// re-derived polygon vertices along a shared cut line merge back into
/// one manifold edge instead of two coincident-but-distinct ones.
struct VertexMerger {
    cell_size: f64,
    cells: HashMap<(i64, i64, i64), Vec<(Point3, VertexId)>>,
}

impl VertexMerger {
    fn new(tol: f64) -> Self {
        Self {
            cell_size: tol.max(1e-9),
            cells: HashMap::new(),
        }
    }

    fn key(&self, p: Point3) -> (i64, i64, i64) {
        let s = self.cell_size;
        ((p.x / s).round() as i64, (p.y / s).round() as i64, (p.z / s).round() as i64)
    }

    fn get_or_insert(&mut self, topo: &mut Topology, p: Point3) -> VertexId {
        let key = self.key(p);
        if let Some(bucket) = self.cells.get(&key) {
            for &(q, id) in bucket {
                if (q - p).norm() <= self.cell_size {
                    return id;
                }
            }
        }
        let id = topo.add_vertex(p);
        self.cells.entry(key).or_default().push((p, id));
        id
    }
}

/// Build a face (and its half-edges/loop) in `topo`/`geom` from a 2D
/// polygon in `plane`'s frame. `reverse` flips the loop winding (and
/// therefore the outward normal) from the plane's natural orientation.
fn build_face(
    topo: &mut Topology,
    geom: &mut GeometryStore,
    merger: &mut VertexMerger,
    plane: &Plane,
    outer: &[Point2],
    holes: &[Vec<Point2>],
    reverse: bool,
) -> Option<FaceId> {
    if outer.len() < 3 {
        return None;
    }
    let surface_index = geom.add_surface(Box::new(plane.clone()));
    let outer_loop = build_loop(topo, merger, plane, outer, reverse);
    let face = topo.add_face(outer_loop, surface_index, Orientation::Forward);
    for hole in holes {
        if hole.len() < 3 {
            continue;
        }
        let hole_loop = build_loop(topo, merger, plane, hole, !reverse);
        topo.add_inner_loop(face, hole_loop);
    }
    Some(face)
}

fn build_loop(topo: &mut Topology, merger: &mut VertexMerger, plane: &Plane, poly: &[Point2], reverse: bool) -> cad_topo::LoopId {
    let pts: Vec<Point2> = if reverse { poly.iter().rev().cloned().collect() } else { poly.to_vec() };
    let verts: Vec<VertexId> = pts.iter().map(|&uv| merger.get_or_insert(topo, plane.evaluate(uv))).collect();
    let hes: Vec<_> = verts.iter().map(|&v| topo.add_half_edge(v)).collect();
    topo.add_loop(&hes)
}

/// Reassemble the kept sub-faces of both operands into a single new
/// body, and record the face-history entries an operation reports.
pub fn assemble(
    op: crate::BooleanOp,
    ctx: &NumericContext,
    subfaces_a: &[ClassifiedSubFace],
    subfaces_b: &[ClassifiedSubFace],
) -> (Topology, GeometryStore, cad_topo::BodyId, Vec<FaceHistoryEntry>) {
    let mut topo = Topology::new();
    let mut geom = GeometryStore::new();
    let mut merger = VertexMerger::new(ctx.length);

    let mut history: HashMap<(SourceBody, FaceId), Vec<FaceId>> = HashMap::new();
    let mut all_faces = Vec::new();

    for sf in subfaces_a {
        if let Some(reverse) = keep_a(op, sf.side) {
            if let Some(fid) = build_face(&mut topo, &mut geom, &mut merger, &sf.plane, &sf.outer, &sf.holes, reverse) {
                all_faces.push(fid);
                history.entry((SourceBody::A, sf.source_face)).or_default().push(fid);
            }
        } else {
            history.entry((SourceBody::A, sf.source_face)).or_default();
        }
    }
    for sf in subfaces_b {
        if let Some(reverse) = keep_b(op, sf.side) {
            if let Some(fid) = build_face(&mut topo, &mut geom, &mut merger, &sf.plane, &sf.outer, &sf.holes, reverse) {
                all_faces.push(fid);
                history.entry((SourceBody::B, sf.source_face)).or_default().push(fid);
            }
        } else {
            history.entry((SourceBody::B, sf.source_face)).or_default();
        }
    }

    topo.pair_unlinked_half_edges(&collect_all_half_edges(&topo, &all_faces)).ok();

    let shell = topo.add_shell(all_faces, true);
    let body = topo.add_body(shell);

    let entries = history
        .into_iter()
        .map(|((source_body, source_face), result_faces)| {
            let kind = match result_faces.len() {
                0 => EvolutionKind::Death,
                1 => EvolutionKind::Modify,
                _ => EvolutionKind::Split,
            };
            FaceHistoryEntry {
                source_body,
                source_face,
                result_faces,
                kind,
            }
        })
        .collect();

    (topo, geom, body, entries)
}

fn collect_all_half_edges(topo: &Topology, faces: &[FaceId]) -> Vec<cad_topo::HalfEdgeId> {
    let mut hes = Vec::new();
    for &f in faces {
        for &loop_id in &topo.faces[f].loops {
            hes.extend(topo.loop_half_edges(loop_id));
        }
    }
    hes
}

/// Wrap the assembled pieces into a [`BRepBody`].
pub fn into_brep_body(topo: Topology, geom: GeometryStore, body: cad_topo::BodyId) -> BRepBody {
    BRepBody {
        topology: topo,
        geometry: geom,
        body,
    }
}
