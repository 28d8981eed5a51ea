#![warn(missing_docs)]

//! Struct-of-arrays B-rep topology store.
//!
//! Holds the body -> shell -> face -> loop -> half-edge -> edge -> vertex
//! hierarchy behind typed, generational handles (`slotmap` keys), so a
//! retired entity's id can never alias a freshly allocated one even if the
//! underlying slot is reused. Ownership flows strictly downward (body owns
//! shells, shells own faces, ...); back-references (face -> shell, shell ->
//! body, loop -> face) are plain handles, never reference-counted pointers,
//! so there are no ownership cycles to reason about.
//!
//! This crate only knows about topology: vertex positions and curve/surface
//! *indices* (not the curves/surfaces themselves, which live in the sibling
//! geometry store). Geometry-aware validation (the `SameParameter`
//! discipline, sliver-face detection) composes `Topology` with a geometry
//! store one layer up, in `cad-primitives`.

use cad_math::{NumericContext, Point3};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;
use thiserror::Error;

new_key_type! {
    /// Handle to a vertex.
    pub struct VertexId;
    /// Handle to an edge (the entity shared by at most two half-edges).
    pub struct EdgeId;
    /// Handle to a half-edge (a directed use of an edge by one loop).
    pub struct HalfEdgeId;
    /// Handle to a loop (closed half-edge cycle bounding a face).
    pub struct LoopId;
    /// Handle to a face.
    pub struct FaceId;
    /// Handle to a shell (maximal connected set of faces).
    pub struct ShellId;
    /// Handle to a body.
    pub struct BodyId;
}

/// Errors raised by topology-store operations. These are the
/// `InternalInvariant` category from the kernel's error design: a broken
/// invariant here is a bug in the caller (feature operator or boolean
/// engine), not a user-facing input error, so callers should treat these as
/// unrecoverable for the current build.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopoError {
    /// A half-edge already has a twin and a second pairing was attempted.
    #[error("half-edge already has a twin bound to a different half-edge")]
    TwinAlreadyBound,
    /// A loop was built from an empty half-edge list.
    #[error("a loop requires at least one half-edge")]
    EmptyLoop,
    /// `half_edge_dest` or a cycle walk hit a half-edge with no `next` set.
    #[error("half-edge cycle is broken: half-edge has no successor")]
    BrokenCycle,
}

/// A p-curve: a 2D curve in a surface's parameter space, bound to a
/// half-edge to describe its trace on that surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PCurve {
    /// Index into the geometry store's surface table.
    pub surface_index: usize,
    /// Index into the geometry store's 2D curve table.
    pub curve_2d_index: usize,
}

/// Whether a face/loop orientation agrees with or is reversed from its
/// surface's natural parameterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Agrees with the underlying surface/edge direction.
    Forward,
    /// Reversed from the underlying surface/edge direction.
    Reversed,
}

impl Orientation {
    /// The opposite orientation.
    pub fn flip(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reversed,
            Orientation::Reversed => Orientation::Forward,
        }
    }

    /// `+1` for `Forward`, `-1` for `Reversed`, matching the half-edge
    /// `direction` field's sign convention in §3.3.
    pub fn sign(self) -> i8 {
        match self {
            Orientation::Forward => 1,
            Orientation::Reversed => -1,
        }
    }
}

/// A vertex: a position in 3D space.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// World-space position.
    pub point: Point3,
}

/// An edge: the entity shared by at most two half-edges (one per side).
#[derive(Debug, Clone)]
pub struct Edge {
    /// Start vertex (matches the first-bound half-edge's origin).
    pub vertex_start: VertexId,
    /// End vertex.
    pub vertex_end: VertexId,
    /// Optional 3D curve backing this edge: `(curve index, t_start, t_end)`.
    pub curve: Option<(usize, f64, f64)>,
    /// The first half-edge bound to this edge.
    pub first_half_edge: HalfEdgeId,
}

/// A half-edge: a directed use of an edge by one loop, linked to its twin
/// on the other side.
#[derive(Debug, Clone)]
pub struct HalfEdge {
    /// Origin vertex of this directed use.
    pub origin: VertexId,
    /// The edge this half-edge uses, once paired.
    pub edge: Option<EdgeId>,
    /// `+1` if this half-edge traverses its edge in the edge's own
    /// direction, `-1` if reversed. `0` before pairing.
    pub direction: i8,
    /// The loop this half-edge belongs to.
    pub loop_id: Option<LoopId>,
    /// Next half-edge in the loop cycle.
    pub next: Option<HalfEdgeId>,
    /// Previous half-edge in the loop cycle.
    pub prev: Option<HalfEdgeId>,
    /// The half-edge using the same edge from the other side.
    pub twin: Option<HalfEdgeId>,
    /// Optional p-curve binding this half-edge's trace to its face's surface.
    pub pcurve: Option<PCurve>,
}

/// A loop: a closed cycle of half-edges bounding a face (outer boundary or
/// a hole).
#[derive(Debug, Clone)]
pub struct Loop {
    /// The face this loop belongs to, once attached.
    pub face: Option<FaceId>,
    /// The first half-edge in the cycle (iteration start point).
    pub first_half_edge: HalfEdgeId,
    /// Number of half-edges in the cycle.
    pub count: usize,
}

/// A face: one surface patch, bounded by an outer loop and zero or more
/// hole loops.
#[derive(Debug, Clone)]
pub struct Face {
    /// The shell this face belongs to, once attached.
    pub shell: Option<ShellId>,
    /// Index into the geometry store's surface table.
    pub surface_index: usize,
    /// Whether this face's surface normal is reversed from the surface's
    /// natural orientation.
    pub reversed: bool,
    /// Ordered loops; `loops[0]` is the outer boundary, the rest are holes.
    pub loops: Vec<LoopId>,
}

impl Face {
    /// The outer boundary loop.
    pub fn outer_loop(&self) -> LoopId {
        self.loops[0]
    }

    /// Hole loops (all but the outer boundary).
    pub fn inner_loops(&self) -> &[LoopId] {
        &self.loops[1..]
    }
}

/// A shell: a maximal connected set of faces. A closed shell bounds a solid
/// region.
#[derive(Debug, Clone)]
pub struct Shell {
    /// The body this shell belongs to, once attached.
    pub body: Option<BodyId>,
    /// Whether this shell has zero boundary half-edges.
    pub closed: bool,
    /// Ordered faces.
    pub faces: Vec<FaceId>,
}

/// A body: the top-level solid entity, owning one or more shells (an outer
/// shell plus optional inner void shells).
#[derive(Debug, Clone, Default)]
pub struct Body {
    /// Ordered shells.
    pub shells: Vec<ShellId>,
}

/// The struct-of-arrays B-rep topology store.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// Vertex table.
    pub vertices: SlotMap<VertexId, Vertex>,
    /// Edge table.
    pub edges: SlotMap<EdgeId, Edge>,
    /// Half-edge table.
    pub half_edges: SlotMap<HalfEdgeId, HalfEdge>,
    /// Loop table.
    pub loops: SlotMap<LoopId, Loop>,
    /// Face table.
    pub faces: SlotMap<FaceId, Face>,
    /// Shell table.
    pub shells: SlotMap<ShellId, Shell>,
    /// Body table.
    pub bodies: SlotMap<BodyId, Body>,
}

impl Topology {
    /// An empty topology store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh vertex at `p`.
    pub fn add_vertex(&mut self, p: Point3) -> VertexId {
        self.vertices.insert(Vertex { point: p })
    }

    /// Allocate a half-edge with the given origin vertex. It has no edge,
    /// loop, or twin until `add_loop` and `add_edge` are called.
    pub fn add_half_edge(&mut self, origin: VertexId) -> HalfEdgeId {
        self.half_edges.insert(HalfEdge {
            origin,
            edge: None,
            direction: 0,
            loop_id: None,
            next: None,
            prev: None,
            twin: None,
            pcurve: None,
        })
    }

    /// Build a loop from an ordered half-edge cycle: links `next`/`prev`
    /// cyclically and sets each half-edge's `loop_id`.
    pub fn add_loop(&mut self, half_edges: &[HalfEdgeId]) -> LoopId {
        assert!(!half_edges.is_empty(), "a loop requires at least one half-edge");
        let loop_id = self.loops.insert(Loop {
            face: None,
            first_half_edge: half_edges[0],
            count: half_edges.len(),
        });
        let n = half_edges.len();
        for (i, &he) in half_edges.iter().enumerate() {
            let next = half_edges[(i + 1) % n];
            let prev = half_edges[(i + n - 1) % n];
            let h = &mut self.half_edges[he];
            h.loop_id = Some(loop_id);
            h.next = Some(next);
            h.prev = Some(prev);
        }
        loop_id
    }

    /// Allocate a face whose outer boundary is `loop_id`, on the surface at
    /// `surface_index`, with the given orientation.
    pub fn add_face(&mut self, loop_id: LoopId, surface_index: usize, orientation: Orientation) -> FaceId {
        let face_id = self.faces.insert(Face {
            shell: None,
            surface_index,
            reversed: orientation == Orientation::Reversed,
            loops: vec![loop_id],
        });
        self.loops[loop_id].face = Some(face_id);
        face_id
    }

    /// Attach an additional (hole) loop to an existing face.
    pub fn add_inner_loop(&mut self, face: FaceId, loop_id: LoopId) {
        self.loops[loop_id].face = Some(face);
        self.faces[face].loops.push(loop_id);
    }

    /// Pair two half-edges as twins, creating the shared `Edge` entity.
    /// Fails if either half-edge already has a twin.
    pub fn add_edge(&mut self, he_a: HalfEdgeId, he_b: HalfEdgeId) -> Result<EdgeId, TopoError> {
        if self.half_edges[he_a].twin.is_some() || self.half_edges[he_b].twin.is_some() {
            return Err(TopoError::TwinAlreadyBound);
        }
        let start = self.half_edges[he_a].origin;
        let end = self.half_edge_dest(he_a)?;
        let edge_id = self.edges.insert(Edge {
            vertex_start: start,
            vertex_end: end,
            curve: None,
            first_half_edge: he_a,
        });
        self.half_edges[he_a].edge = Some(edge_id);
        self.half_edges[he_a].direction = 1;
        self.half_edges[he_a].twin = Some(he_b);
        self.half_edges[he_b].edge = Some(edge_id);
        self.half_edges[he_b].direction = -1;
        self.half_edges[he_b].twin = Some(he_a);
        Ok(edge_id)
    }

    /// Allocate an edge for a single half-edge with no twin yet (a boundary
    /// edge of an open shell). A later `set_half_edge_twin` call may still
    /// pair it.
    pub fn add_boundary_edge(&mut self, he: HalfEdgeId) -> Result<EdgeId, TopoError> {
        if self.half_edges[he].twin.is_some() {
            return Err(TopoError::TwinAlreadyBound);
        }
        let start = self.half_edges[he].origin;
        let end = self.half_edge_dest(he)?;
        let edge_id = self.edges.insert(Edge {
            vertex_start: start,
            vertex_end: end,
            curve: None,
            first_half_edge: he,
        });
        self.half_edges[he].edge = Some(edge_id);
        self.half_edges[he].direction = 1;
        Ok(edge_id)
    }

    /// Symmetric twin link between two half-edges that already share an
    /// edge allocated elsewhere (used by the twin-pairing pass below).
    /// Fails if either is already bound to a *different* twin.
    pub fn set_half_edge_twin(&mut self, a: HalfEdgeId, b: HalfEdgeId) -> Result<(), TopoError> {
        if let Some(existing) = self.half_edges[a].twin {
            if existing != b {
                return Err(TopoError::TwinAlreadyBound);
            }
        }
        if let Some(existing) = self.half_edges[b].twin {
            if existing != a {
                return Err(TopoError::TwinAlreadyBound);
            }
        }
        self.half_edges[a].twin = Some(b);
        self.half_edges[b].twin = Some(a);
        Ok(())
    }

    /// Attach a 3D curve (with parameter range) to an edge.
    pub fn set_edge_curve(&mut self, edge: EdgeId, curve_index: usize, t_start: f64, t_end: f64) {
        self.edges[edge].curve = Some((curve_index, t_start, t_end));
    }

    /// Attach a p-curve to a half-edge.
    pub fn set_half_edge_pcurve(&mut self, he: HalfEdgeId, pcurve: PCurve) {
        self.half_edges[he].pcurve = Some(pcurve);
    }

    /// Twin pairing after a feature build: group the given half-edges by
    /// shared edge (same vertex pair in either order) and pair any group
    /// of exactly two. Groups of size other than two inside a shell meant
    /// to be closed are a manifold violation — the caller (validation)
    /// reports those, this pass just leaves them unpaired.
    pub fn pair_unlinked_half_edges(&mut self, half_edges: &[HalfEdgeId]) -> Result<(), TopoError> {
        let mut groups: HashMap<(VertexId, VertexId), Vec<HalfEdgeId>> = HashMap::new();
        for &he in half_edges {
            if self.half_edges[he].twin.is_some() {
                continue;
            }
            let a = self.half_edges[he].origin;
            let b = self.half_edge_dest(he)?;
            let key = if a.cmp_key() <= b.cmp_key() { (a, b) } else { (b, a) };
            groups.entry(key).or_default().push(he);
        }
        for group in groups.into_values() {
            if group.len() == 2 {
                let a = group[0];
                let b = group[1];
                if self.half_edges[a].edge.is_none() {
                    self.add_edge(a, b)?;
                } else {
                    self.set_half_edge_twin(a, b)?;
                }
            }
        }
        Ok(())
    }

    /// Allocate a shell from an ordered face list.
    pub fn add_shell(&mut self, faces: Vec<FaceId>, closed: bool) -> ShellId {
        let shell_id = self.shells.insert(Shell {
            body: None,
            closed,
            faces: faces.clone(),
        });
        for face in faces {
            self.faces[face].shell = Some(shell_id);
        }
        shell_id
    }

    /// Append a face to an existing shell.
    pub fn add_face_to_shell(&mut self, shell: ShellId, face: FaceId) {
        self.faces[face].shell = Some(shell);
        self.shells[shell].faces.push(face);
    }

    /// Allocate a body owning a single (outer) shell.
    pub fn add_body(&mut self, shell: ShellId) -> BodyId {
        let body_id = self.bodies.insert(Body {
            shells: vec![shell],
        });
        self.shells[shell].body = Some(body_id);
        body_id
    }

    /// Attach an additional shell (e.g. an inner void) to an existing body.
    pub fn add_shell_to_body(&mut self, body: BodyId, shell: ShellId) {
        self.shells[shell].body = Some(body);
        self.bodies[body].shells.push(shell);
    }

    /// Iterate the half-edges of a loop in cycle order, starting from its
    /// first half-edge.
    pub fn loop_half_edges(&self, loop_id: LoopId) -> LoopHalfEdges<'_> {
        let l = &self.loops[loop_id];
        LoopHalfEdges {
            topo: self,
            current: Some(l.first_half_edge),
            start: l.first_half_edge,
            remaining: l.count,
        }
    }

    /// The destination vertex of a half-edge: the origin of its successor
    /// in the loop cycle.
    pub fn half_edge_dest(&self, he: HalfEdgeId) -> Result<VertexId, TopoError> {
        let next = self.half_edges[he].next.ok_or(TopoError::BrokenCycle)?;
        Ok(self.half_edges[next].origin)
    }

    /// The twin of a half-edge, if bound.
    pub fn twin(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.half_edges[he].twin
    }

    /// Remove a face and detach it from its shell's face list. Does not
    /// remove its loops/half-edges/vertices — callers that replace a face
    /// during splitting are expected to reuse or separately retire those.
    pub fn remove_face(&mut self, face: FaceId) {
        if let Some(shell) = self.faces[face].shell {
            self.shells[shell].faces.retain(|&f| f != face);
        }
        self.faces.remove(face);
    }
}

// slotmap keys don't implement Ord; give vertices a stable total order for
// the unordered-pair canonicalization above via their opaque debug key.
trait CmpKey {
    fn cmp_key(&self) -> u64;
}
impl CmpKey for VertexId {
    fn cmp_key(&self) -> u64 {
        let data = slotmap::Key::data(self);
        data.as_ffi()
    }
}

/// Iterator over a loop's half-edges in cycle order.
pub struct LoopHalfEdges<'a> {
    topo: &'a Topology,
    current: Option<HalfEdgeId>,
    start: HalfEdgeId,
    remaining: usize,
}

impl<'a> Iterator for LoopHalfEdges<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        if self.remaining == 0 {
            return None;
        }
        let cur = self.current?;
        self.remaining -= 1;
        self.current = self.topo.half_edges[cur].next;
        if self.remaining == 0 {
            debug_assert_eq!(self.topo.half_edges[cur].next, Some(self.start));
        }
        Some(cur)
    }
}

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The model is invalid; downstream operations may misbehave.
    Error,
    /// Suspicious but not necessarily invalid.
    Warning,
    /// Informational.
    Info,
}

/// One finding from `validate_topology`.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// How serious this finding is.
    pub severity: Severity,
    /// A short machine-readable kind tag.
    pub kind: &'static str,
    /// A human-readable message.
    pub message: String,
}

/// Run the structural validation battery against a topology store:
/// broken half-edge cycles, twin mismatches and direction mismatches,
/// non-manifold edges, boundary edges inside shells flagged closed,
/// zero-length edges, and faces missing a loop.
pub fn validate_topology(topo: &Topology, ctx: &NumericContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (he_id, he) in topo.half_edges.iter() {
        match he.twin {
            Some(t) => {
                if topo.half_edges[t].twin != Some(he_id) {
                    issues.push(ValidationIssue {
                        severity: Severity::Error,
                        kind: "twin_mismatch",
                        message: "half-edge twin link is not symmetric".into(),
                    });
                } else if he.direction != -topo.half_edges[t].direction {
                    issues.push(ValidationIssue {
                        severity: Severity::Error,
                        kind: "twin_direction_mismatch",
                        message: "half-edge and its twin do not have opposite direction".into(),
                    });
                }
            }
            None => {
                // Boundary half-edge: fine unless its shell is flagged closed.
                if let Some(loop_id) = he.loop_id {
                    if let Some(face_id) = topo.loops[loop_id].face {
                        if let Some(shell_id) = topo.faces[face_id].shell {
                            if topo.shells[shell_id].closed {
                                issues.push(ValidationIssue {
                                    severity: Severity::Error,
                                    kind: "boundary_in_closed_shell",
                                    message: "shell flagged closed has a boundary half-edge".into(),
                                });
                            }
                        }
                    }
                }
            }
        }
        if he.next.is_none() || he.prev.is_none() {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                kind: "broken_cycle",
                message: "half-edge is missing next/prev".into(),
            });
        }
    }

    // Non-manifold edges: count half-edges whose (unordered) vertex pair
    // matches each edge's endpoints; a valid edge has exactly the two
    // half-edges it was created from.
    let mut per_vertex_pair: HashMap<(u64, u64), usize> = HashMap::new();
    for he in topo.half_edges.values() {
        if let Ok(dest) = topo.half_edge_dest_of(he) {
            let a = he.origin.cmp_key();
            let b = dest.cmp_key();
            let key = if a <= b { (a, b) } else { (b, a) };
            *per_vertex_pair.entry(key).or_insert(0) += 1;
        }
    }
    for (_, count) in per_vertex_pair {
        if count > 2 {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                kind: "non_manifold_edge",
                message: format!("edge is used by {count} half-edges, expected at most 2"),
            });
        }
    }

    // Zero-length / duplicate-vertex checks from raw positions.
    for edge in topo.edges.values() {
        let p0 = topo.vertices[edge.vertex_start].point;
        let p1 = topo.vertices[edge.vertex_end].point;
        if ctx.points_equal(&p0, &p1) {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                kind: "zero_length_edge",
                message: "edge start and end vertices coincide within tolerance".into(),
            });
        }
    }

    for face in topo.faces.values() {
        if face.loops.is_empty() {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                kind: "face_without_loop",
                message: "face has no loops".into(),
            });
        }
    }

    issues
}

impl Topology {
    fn half_edge_dest_of(&self, he: &HalfEdge) -> Result<VertexId, TopoError> {
        let next = he.next.ok_or(TopoError::BrokenCycle)?;
        Ok(self.half_edges[next].origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Topology, FaceId) {
        let mut topo = Topology::new();
        let v0 = topo.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = topo.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let v2 = topo.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let h0 = topo.add_half_edge(v0);
        let h1 = topo.add_half_edge(v1);
        let h2 = topo.add_half_edge(v2);
        let loop_id = topo.add_loop(&[h0, h1, h2]);
        let face = topo.add_face(loop_id, 0, Orientation::Forward);
        let shell = topo.add_shell(vec![face], false);
        topo.add_body(shell);
        (topo, face)
    }

    #[test]
    fn loop_cycle_and_dest() {
        let (topo, face) = triangle();
        let l = topo.faces[face].outer_loop();
        let hes: Vec<_> = topo.loop_half_edges(l).collect();
        assert_eq!(hes.len(), 3);
        let dest0 = topo.half_edge_dest(hes[0]).unwrap();
        assert_eq!(dest0, topo.half_edges[hes[1]].origin);
    }

    #[test]
    fn add_edge_pairs_twin_and_sets_direction() {
        let mut topo = Topology::new();
        let a0 = topo.add_vertex(Point3::origin());
        let a1 = topo.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let hx = topo.add_half_edge(a0);
        let hy = topo.add_half_edge(a1);
        topo.add_loop(&[hx, hy]);
        let hx2 = topo.add_half_edge(a1);
        let hy2 = topo.add_half_edge(a0);
        topo.add_loop(&[hx2, hy2]);
        let edge = topo.add_edge(hx, hy2).unwrap();
        assert_eq!(topo.edges[edge].vertex_start, a0);
        assert_eq!(topo.half_edges[hx].direction, 1);
        assert_eq!(topo.half_edges[hy2].direction, -1);
        assert_eq!(topo.twin(hx), Some(hy2));
    }

    #[test]
    fn twin_already_bound_is_rejected() {
        let mut topo = Topology::new();
        let v0 = topo.add_vertex(Point3::origin());
        let v1 = topo.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let h0 = topo.add_half_edge(v0);
        let h1 = topo.add_half_edge(v1);
        topo.add_loop(&[h0, h1]);
        let h2 = topo.add_half_edge(v1);
        let h3 = topo.add_half_edge(v0);
        topo.add_loop(&[h2, h3]);
        topo.add_edge(h0, h3).unwrap();
        let h4 = topo.add_half_edge(v1);
        let h5 = topo.add_half_edge(v0);
        topo.add_loop(&[h4, h5]);
        assert_eq!(topo.add_edge(h0, h5), Err(TopoError::TwinAlreadyBound));
    }

    #[test]
    fn validate_flags_non_manifold_edge() {
        // Three half-edges all sharing the same vertex pair: non-manifold.
        let mut topo = Topology::new();
        let v0 = topo.add_vertex(Point3::origin());
        let v1 = topo.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let mut make_pair = || {
            let a = topo.add_half_edge(v0);
            let b = topo.add_half_edge(v1);
            topo.add_loop(&[a, b]);
            a
        };
        let _h1 = make_pair();
        let _h2 = make_pair();
        let _h3 = make_pair();
        let issues = validate_topology(&topo, &NumericContext::DEFAULT);
        assert!(issues.iter().any(|i| i.kind == "non_manifold_edge"));
    }

    #[test]
    fn closed_shell_with_boundary_half_edge_is_flagged() {
        let (mut topo, face) = triangle();
        let shell = topo.faces[face].shell.unwrap();
        topo.shells[shell].closed = true;
        let issues = validate_topology(&topo, &NumericContext::DEFAULT);
        assert!(issues.iter().any(|i| i.kind == "boundary_in_closed_shell"));
    }
}
