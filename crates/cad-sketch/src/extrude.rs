//! Extrude feature operator (§4.E): sweep a sketch profile along its
//! plane normal into a solid, or a symmetric solid about the sketch
//! plane, with planar caps and per-edge planar/cylindrical side faces.
//! Each loop is first sampled down to a polyline (§4.D): an arc becomes
//! several short cylindrical side faces rather than one patch spanning
//! its whole span, so the cap polygons stay straight-edged.

use cad_geom::{CylinderSurface, GeometryStore, Plane};
use cad_math::{debug_trace, Dir3, Tolerance, Vec3};
use cad_naming::{FeatureId, Fingerprint, NamingTracker, PersistentRef, Selector, SubshapeRef, SubshapeType};
use cad_primitives::BRepBody;
use cad_topo::{FaceId, HalfEdgeId, Orientation, Topology, VertexId};

use crate::profile::{sample_loop_for_extrude, SampledEdgeSource, SketchProfile};
use crate::SketchError;

/// Start/end offsets along the profile normal: `(0, distance)` for a
/// plain extrude, `(-distance/2, distance/2)` for a symmetric one.
fn extrusion_offsets(distance: f64, symmetric: bool) -> (f64, f64) {
    if symmetric {
        (-distance / 2.0, distance / 2.0)
    } else {
        (0.0, distance)
    }
}

/// One face produced by [`extrude`], tagged with the selector a caller
/// should register it under.
#[derive(Debug, Clone, Copy)]
pub struct ExtrudeFace {
    /// The face in [`ExtrudeOutput::body`]'s topology.
    pub face: FaceId,
    /// The selector this face was born under.
    pub selector: Selector,
}

/// One half-edge produced by [`extrude`], tagged with the selector a
/// caller should register it under (§6.3: `extrude.sideEdge`,
/// `extrude.topEdge`, `extrude.bottomEdge`).
#[derive(Debug, Clone, Copy)]
pub struct ExtrudeEdge {
    /// The half-edge representing this ring edge in [`ExtrudeOutput::body`].
    pub half_edge: HalfEdgeId,
    /// The selector this edge was born under.
    pub selector: Selector,
}

/// The faces produced by one extrude call. Field order matches the
/// declared emission order (bottom cap, top cap, then side faces
/// loop-major/segment-minor) so naming registration sees a stable order
/// (§5 "ordering guarantees").
pub struct ExtrudeOutput {
    /// The new solid.
    pub body: BRepBody,
    /// The face capping the start-offset end.
    pub bottom_cap: ExtrudeFace,
    /// The face capping the end-offset end.
    pub top_cap: ExtrudeFace,
    /// One face per profile segment, in loop-major/segment-minor order.
    pub side_faces: Vec<ExtrudeFace>,
    /// One vertical edge per ring vertex, in loop-major/vertex-minor order.
    pub side_edges: Vec<ExtrudeEdge>,
    /// One bottom-ring edge per profile segment, in loop-major/segment-minor order.
    pub bottom_edges: Vec<ExtrudeEdge>,
    /// One top-ring edge per profile segment, in loop-major/segment-minor order.
    pub top_edges: Vec<ExtrudeEdge>,
}

/// Sweep `profile` along its own plane normal by `distance`. When
/// `symmetric` is `true` the solid spans `distance/2` on either side of
/// the sketch plane instead of starting at it.
///
/// Builds one planar face per bottom/top cap (reusing the profile's
/// outer-plus-holes loop structure) and one side face per profile
/// segment: a plane for a line segment, a cylinder for an arc segment,
/// clipped between the bottom and top rings.
pub fn extrude(profile: &SketchProfile, distance: f64, symmetric: bool) -> Result<ExtrudeOutput, SketchError> {
    let tol = Tolerance::DEFAULT;
    if distance.abs() < tol.length {
        return Err(SketchError::ZeroExtrusion);
    }

    let (start_off, end_off) = extrusion_offsets(distance, symmetric);
    let normal_vec = *profile.normal.as_ref();

    let mut topo = Topology::new();
    let mut geom = GeometryStore::new();

    let sampled_loops: Vec<_> = profile.loops.iter().map(sample_loop_for_extrude).collect();
    debug_trace!("extrude: {} loop(s) sampled to polylines", sampled_loops.len());

    let mut bottom_rings: Vec<Vec<VertexId>> = Vec::with_capacity(sampled_loops.len());
    let mut top_rings: Vec<Vec<VertexId>> = Vec::with_capacity(sampled_loops.len());
    for sampled in &sampled_loops {
        let mut bv = Vec::with_capacity(sampled.vertices.len());
        let mut tv = Vec::with_capacity(sampled.vertices.len());
        for &p2 in &sampled.vertices {
            let p = profile.to_3d(p2);
            bv.push(topo.add_vertex(p + start_off * normal_vec));
            tv.push(topo.add_vertex(p + end_off * normal_vec));
        }
        bottom_rings.push(bv);
        top_rings.push(tv);
    }

    let mut all_half_edges: Vec<HalfEdgeId> = Vec::new();
    let mut side_faces = Vec::new();
    let mut side_edges = Vec::new();
    let mut bottom_edges = Vec::new();
    let mut top_edges = Vec::new();

    for (li, sampled) in sampled_loops.iter().enumerate() {
        let n = sampled.vertices.len();
        let bv = &bottom_rings[li];
        let tv = &top_rings[li];
        for (si, source) in sampled.edge_sources.iter().enumerate() {
            let j = (si + 1) % n;

            let surface_idx = match source {
                SampledEdgeSource::Line => {
                    let p0 = topo.vertices[bv[si]].point;
                    let p1 = topo.vertices[bv[j]].point;
                    let p3 = topo.vertices[tv[si]].point;
                    geom.add_surface(Box::new(Plane::new(p0, p1 - p0, p3 - p0)))
                }
                SampledEdgeSource::Arc { center, radius, .. } => {
                    let c3_bottom = profile.to_3d(*center) + start_off * normal_vec;
                    let axis_vec = if end_off >= start_off { normal_vec } else { -normal_vec };
                    let axis = Dir3::new_normalize(axis_vec);
                    geom.add_surface(Box::new(CylinderSurface::with_axis(c3_bottom, axis, *radius)))
                }
            };

            let he_bottom = topo.add_half_edge(bv[si]);
            let he_right = topo.add_half_edge(bv[j]);
            let he_top = topo.add_half_edge(tv[j]);
            let he_left = topo.add_half_edge(tv[si]);
            let loop_id = topo.add_loop(&[he_bottom, he_right, he_top, he_left]);
            let face = topo.add_face(loop_id, surface_idx, Orientation::Forward);
            all_half_edges.extend([he_bottom, he_right, he_top, he_left]);

            side_faces.push(ExtrudeFace {
                face,
                selector: Selector::with("extrude.side", [("loop", li as i64), ("segment", si as i64)]),
            });
            bottom_edges.push(ExtrudeEdge {
                half_edge: he_bottom,
                selector: Selector::with("extrude.bottomEdge", [("loop", li as i64), ("segment", si as i64)]),
            });
            top_edges.push(ExtrudeEdge {
                half_edge: he_top,
                selector: Selector::with("extrude.topEdge", [("loop", li as i64), ("segment", si as i64)]),
            });
            // he_left sits on ring vertex `si`; its twin is the next segment's
            // he_right on the same vertex, so recording only he_left here
            // yields exactly one ref per ring vertex, not one per segment.
            side_edges.push(ExtrudeEdge {
                half_edge: he_left,
                selector: Selector::with("extrude.sideEdge", [("loop", li as i64), ("segment", si as i64)]),
            });
        }
    }

    let bottom_face = build_cap_face(&mut topo, &mut geom, &bottom_rings, true);
    let top_face = build_cap_face(&mut topo, &mut geom, &top_rings, false);
    for &cap in &[bottom_face, top_face] {
        all_half_edges.extend(topo.loop_half_edges(topo.faces[cap].outer_loop()));
        for inner in topo.faces[cap].inner_loops().to_vec() {
            all_half_edges.extend(topo.loop_half_edges(inner));
        }
    }

    topo.pair_unlinked_half_edges(&all_half_edges)
        .expect("ring construction pairs every half-edge with exactly one twin");

    let mut all_faces = vec![bottom_face, top_face];
    all_faces.extend(side_faces.iter().map(|f| f.face));
    let shell = topo.add_shell(all_faces, true);
    let body = topo.add_body(shell);

    Ok(ExtrudeOutput {
        body: BRepBody { topology: topo, geometry: geom, body },
        bottom_cap: ExtrudeFace { face: bottom_face, selector: Selector::simple("extrude.bottomCap") },
        top_cap: ExtrudeFace { face: top_face, selector: Selector::simple("extrude.topCap") },
        side_faces,
        side_edges,
        bottom_edges,
        top_edges,
    })
}

/// Build one planar cap face from a set of rings (outer first, then
/// holes). When `reverse` is `true` every ring is traversed back to
/// front, flipping the resulting plane's outward normal — used for the
/// bottom cap, which faces `-normal` while the top cap faces `+normal`.
fn build_cap_face(topo: &mut Topology, geom: &mut GeometryStore, rings: &[Vec<VertexId>], reverse: bool) -> FaceId {
    let oriented: Vec<Vec<VertexId>> = rings
        .iter()
        .map(|r| if reverse { r.iter().rev().cloned().collect() } else { r.clone() })
        .collect();

    let outer = &oriented[0];
    let p0 = topo.vertices[outer[0]].point;
    let p1 = topo.vertices[outer[1]].point;
    let p_last = topo.vertices[*outer.last().unwrap()].point;
    let surface_idx = geom.add_surface(Box::new(Plane::new(p0, p1 - p0, p_last - p0)));

    let mut loop_ids = Vec::with_capacity(oriented.len());
    for ring in &oriented {
        let hes: Vec<_> = ring.iter().map(|&v| topo.add_half_edge(v)).collect();
        loop_ids.push(topo.add_loop(&hes));
    }

    let outer_loop = loop_ids[0];
    let face = topo.add_face(outer_loop, surface_idx, Orientation::Forward);
    for &inner in &loop_ids[1..] {
        topo.add_inner_loop(face, inner);
    }
    face
}

/// The persistent-naming records produced by [`extrude_with_naming`],
/// one per face born by the call.
pub struct ExtrudeRegistration {
    /// The feature id every face below was born under.
    pub feature_id: FeatureId,
    /// Persistent reference to the bottom cap.
    pub bottom_cap: PersistentRef,
    /// Persistent reference to the top cap.
    pub top_cap: PersistentRef,
    /// Persistent references to the side faces, in the same order as
    /// [`ExtrudeOutput::side_faces`].
    pub side_faces: Vec<PersistentRef>,
    /// Persistent references to the vertical side edges, in the same order
    /// as [`ExtrudeOutput::side_edges`].
    pub side_edges: Vec<PersistentRef>,
    /// Persistent references to the bottom-ring edges, in the same order
    /// as [`ExtrudeOutput::bottom_edges`].
    pub bottom_edges: Vec<PersistentRef>,
    /// Persistent references to the top-ring edges, in the same order as
    /// [`ExtrudeOutput::top_edges`].
    pub top_edges: Vec<PersistentRef>,
}

/// Run [`extrude`] and register a birth for every face it produces under
/// a freshly allocated feature id, so a host can hold onto a
/// [`PersistentRef`] across a later rebuild instead of a raw `FaceId`.
pub fn extrude_with_naming(
    profile: &SketchProfile,
    distance: f64,
    symmetric: bool,
    tracker: &mut NamingTracker,
) -> Result<(ExtrudeOutput, ExtrudeRegistration), SketchError> {
    let output = extrude(profile, distance, symmetric)?;
    let feature_id = tracker.allocate_feature_id();

    let bottom_cap = register_face(
        tracker,
        feature_id,
        &output.body,
        output.bottom_cap.face,
        output.bottom_cap.selector.clone(),
    );
    let top_cap = register_face(
        tracker,
        feature_id,
        &output.body,
        output.top_cap.face,
        output.top_cap.selector.clone(),
    );
    let side_faces = output
        .side_faces
        .iter()
        .map(|sf| register_face(tracker, feature_id, &output.body, sf.face, sf.selector.clone()))
        .collect();
    let side_edges = output
        .side_edges
        .iter()
        .map(|se| register_edge(tracker, feature_id, &output.body, se.half_edge, se.selector.clone()))
        .collect();
    let bottom_edges = output
        .bottom_edges
        .iter()
        .map(|se| register_edge(tracker, feature_id, &output.body, se.half_edge, se.selector.clone()))
        .collect();
    let top_edges = output
        .top_edges
        .iter()
        .map(|se| register_edge(tracker, feature_id, &output.body, se.half_edge, se.selector.clone()))
        .collect();

    Ok((
        output,
        ExtrudeRegistration { feature_id, bottom_cap, top_cap, side_faces, side_edges, bottom_edges, top_edges },
    ))
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

    tracker.record_birth(
        feature_id,
        selector,
        SubshapeRef::new(format!("{face:?}")),
        SubshapeType::Face,
        Some(fingerprint),
    )
}

fn register_edge(
    tracker: &mut NamingTracker,
    feature_id: FeatureId,
    body: &BRepBody,
    half_edge: HalfEdgeId,
    selector: Selector,
) -> PersistentRef {
    let he = &body.topology.half_edges[half_edge];
    let origin = body.topology.vertices[he.origin].point;
    let dest_vertex = body
        .topology
        .half_edge_dest(half_edge)
        .expect("ring half-edges sit in a closed loop cycle");
    let dest = body.topology.vertices[dest_vertex].point;
    let midpoint = (origin.coords + dest.coords) * 0.5;
    let length = (dest - origin).norm();
    let fingerprint = Fingerprint::basic([midpoint.x, midpoint.y, midpoint.z], length);

    let edge_id = he.edge.expect("ring half-edges are paired before registration");
    tracker.record_birth(
        feature_id,
        selector,
        SubshapeRef::new(format!("{edge_id:?}")),
        SubshapeType::Edge,
        Some(fingerprint),
    )
}
