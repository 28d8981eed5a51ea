#![warn(missing_docs)]

//! High-level parametric B-rep CAD kernel facade.
//!
//! [`Kernel`] is the single entry point a host program drives: primitive
//! constructors, the extrude/revolve feature operators, the boolean
//! engine, tessellation, validation, and persistent-naming resolution
//! all go through it. A `Kernel` owns the [`NamingTracker`] (`§5` "shared
//! resources" — the tracker is host-owned state that outlives any one
//! body, so it lives on the facade rather than inside a throwaway
//! per-call context) and the [`NumericContext`] every sub-crate needs.
//!
//! This crate does no geometry itself — it wires `cad-primitives`,
//! `cad-sketch`, `cad-booleans`, `cad-tessellate`, and `cad-naming`
//! together and translates between their native types and the
//! `{success, body, featureId, refs, error}` build-result shape (`§6.2`)
//! a host expects from every feature-producing call.

use cad_booleans::{BooleanError, BooleanResult};
use cad_math::{NumericContext, Vec3};
use cad_naming::{
    EvolutionMapping, FeatureId, Fingerprint, NamingError, NamingTracker, PersistentRef, ResolveResult, Selector,
    StepId, SubshapeRef, SubshapeType,
};
use cad_primitives::BRepBody;
use cad_sketch::extrude::{extrude_with_naming, ExtrudeRegistration};
use cad_sketch::revolve::{revolve_with_naming, RevolveRegistration};
use cad_sketch::{SketchError, SketchProfile};
use cad_tessellate::{TessellationParams, TriangleMesh};
use cad_topo::{Severity, TopoError};
use thiserror::Error;

pub use cad_booleans::BooleanOp;
pub use cad_naming::ResolveResult as ResolveOutcome;

/// Whether a sketch-based feature adds material to a fresh body or cuts
/// it out of an existing one (`§4.E`: "an operation (add or cut; cut is
/// an add followed by a boolean subtract on a target body)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureOperation {
    /// Build the swept solid as a standalone body.
    Add,
    /// Build the swept solid, then subtract it from `target`.
    Cut,
}

/// Errors the facade can surface, composed from every sub-crate it
/// wires together plus the handful of checks that only make sense once
/// they're combined.
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    /// A sketch/feature-operator failure (`§7` InvalidInput/Degenerate).
    #[error(transparent)]
    Sketch(#[from] SketchError),
    /// A boolean-engine failure (`§7` InvalidInput/InternalInvariant).
    #[error(transparent)]
    Boolean(#[from] BooleanError),
    /// A naming-tracker failure (`§7` ResolutionFailure).
    #[error(transparent)]
    Naming(#[from] NamingError),
    /// A topology-store invariant violation (`§7` InternalInvariant).
    #[error(transparent)]
    Topology(#[from] TopoError),
    /// `FeatureOperation::Cut` was requested with no target body.
    #[error("cut operation requires a target body to subtract from")]
    CutRequiresTarget,
    /// The boolean subtract step of a cut produced no faces.
    #[error("cut operation produced an empty result")]
    EmptyCutResult,
}

/// The collected [`PersistentRef`]s a build produces, organized by
/// selector category (`§6.2`: "organized by selector category"). The
/// variant matches the feature kind that produced them.
#[derive(Debug, Clone)]
pub enum FeatureRefs {
    /// Refs from [`Kernel::extrude`].
    Extrude {
        /// The face capping the start-offset end.
        top_cap: PersistentRef,
        /// The face capping the end-offset end.
        bottom_cap: PersistentRef,
        /// One ref per profile segment.
        side: Vec<PersistentRef>,
        /// One ref per ring vertex (the vertical edges).
        side_edge: Vec<PersistentRef>,
        /// One ref per profile segment (the top-ring edges).
        top_edge: Vec<PersistentRef>,
        /// One ref per profile segment (the bottom-ring edges).
        bottom_edge: Vec<PersistentRef>,
    },
    /// Refs from [`Kernel::revolve`].
    Revolve {
        /// One ref per profile segment.
        side: Vec<PersistentRef>,
        /// The cap at `angle = 0`, present only for a partial revolution.
        start_cap: Option<PersistentRef>,
        /// The cap at `angle = angleDegrees`, present only for a partial
        /// revolution.
        end_cap: Option<PersistentRef>,
    },
    /// Refs from a primitive constructor, one per face under
    /// `primitive.face`.
    Primitive(Vec<PersistentRef>),
    /// No refs were produced (a failed build).
    None,
}

/// Outcome of any feature-producing call: extrude, revolve, or a
/// primitive constructor (`§6.2` "Build result").
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Whether the build succeeded.
    pub success: bool,
    /// The resulting body, present iff `success`.
    pub body: Option<BRepBody>,
    /// The feature id this build was registered under, present iff
    /// `success`.
    pub feature_id: Option<FeatureId>,
    /// The persistent refs this build produced.
    pub refs: FeatureRefs,
    /// The error, present iff `!success`.
    pub error: Option<KernelError>,
}

impl BuildResult {
    fn failure(error: impl Into<KernelError>) -> Self {
        Self { success: false, body: None, feature_id: None, refs: FeatureRefs::None, error: Some(error.into()) }
    }
}

/// One finding from [`Kernel::validate`] (`§6.2` "Validation report":
/// "array of `{severity, kind, message, locationIds[]}`"). `locationIds`
/// is left empty here: `cad_topo::ValidationIssue::message` already
/// embeds the entity ids involved, so there is no separate structured
/// id list to surface without re-parsing that string.
#[derive(Debug, Clone)]
pub struct ValidationFinding {
    /// How serious this finding is.
    pub severity: Severity,
    /// A short machine-readable kind tag.
    pub kind: &'static str,
    /// A human-readable message.
    pub message: String,
    /// Entity ids the finding concerns, if the check provided any.
    pub location_ids: Vec<String>,
}

/// A full validation pass's findings.
pub type ValidationReport = Vec<ValidationFinding>;

/// The persistent-naming tracker plus the numeric tolerance every
/// sub-crate shares, bundled into the one object a host builds against.
///
/// A `Kernel` holds no topology of its own — every call takes and
/// returns [`BRepBody`] values the host owns (`§5` "a core instance owns
/// its topology store exclusively" reads here as: the *body*, not the
/// facade, is the unit of ownership). Only the naming tracker persists
/// across calls, because that's the one piece of state `§5` says must
/// survive a rebuild.
#[derive(Debug, Clone)]
pub struct Kernel {
    /// The persistent-naming tracker. Public so a host can snapshot or
    /// restore it across a session the way it would any other document
    /// state (`§5`: "owned by the host, not by the kernel core").
    pub tracker: NamingTracker,
    /// The numeric tolerance every operation below runs under.
    pub ctx: NumericContext,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    /// A fresh kernel with default tolerances (`NumericContext::DEFAULT`)
    /// and an empty naming tracker.
    pub fn new() -> Self {
        Self { tracker: NamingTracker::new(), ctx: NumericContext::DEFAULT }
    }

    /// A fresh kernel with an explicit tolerance context.
    pub fn with_tolerance(ctx: NumericContext) -> Self {
        Self { tracker: NamingTracker::new(), ctx }
    }

    /// Build a box (`§4.E` "Primitive box"), registering one
    /// `primitive.face{face}` birth per face.
    pub fn make_box(&mut self, width: f64, depth: f64, height: f64, centered: bool) -> BuildResult {
        self.register_primitive(cad_primitives::make_box(width, depth, height, centered))
    }

    /// Build a cylinder, registering one `primitive.face{face}` birth
    /// per face.
    pub fn make_cylinder(&mut self, radius: f64, height: f64, segments: u32, centered: bool) -> BuildResult {
        self.register_primitive(cad_primitives::make_cylinder(radius, height, segments, centered))
    }

    /// Build a cone, registering one `primitive.face{face}` birth per
    /// face.
    pub fn make_cone(
        &mut self,
        radius_bottom: f64,
        radius_top: f64,
        height: f64,
        segments: u32,
        centered: bool,
    ) -> BuildResult {
        self.register_primitive(cad_primitives::make_cone(radius_bottom, radius_top, height, segments, centered))
    }

    /// Build a sphere, registering one `primitive.face{face}` birth per
    /// face.
    pub fn make_sphere(&mut self, radius: f64, segments: u32, rings: u32, centered: bool) -> BuildResult {
        self.register_primitive(cad_primitives::make_sphere(radius, segments, rings, centered))
    }

    fn register_primitive(&mut self, body: BRepBody) -> BuildResult {
        let feature_id = self.tracker.allocate_feature_id();
        let face_ids: Vec<_> = body.topology.faces.keys().collect();
        let refs = face_ids
            .into_iter()
            .enumerate()
            .map(|(i, face)| {
                register_face(&mut self.tracker, feature_id, &body, face, Selector::with("primitive.face", [("face", i as i64)]))
            })
            .collect();
        BuildResult {
            success: true,
            body: Some(body),
            feature_id: Some(feature_id),
            refs: FeatureRefs::Primitive(refs),
            error: None,
        }
    }

    /// Sweep `profile` along its own plane normal by `distance` (`§4.E`
    /// "Extrude"). `FeatureOperation::Cut` additionally subtracts the
    /// swept solid from `target`, which must be `Some`.
    #[allow(clippy::too_many_arguments)]
    pub fn extrude(
        &mut self,
        profile: &SketchProfile,
        operation: FeatureOperation,
        distance: f64,
        symmetric: bool,
        target: Option<&BRepBody>,
    ) -> BuildResult {
        let (output, reg) = match extrude_with_naming(profile, distance, symmetric, &mut self.tracker) {
            Ok(ok) => ok,
            Err(e) => return BuildResult::failure(e),
        };
        let refs = extrude_refs(&reg);

        match operation {
            FeatureOperation::Add => BuildResult {
                success: true,
                body: Some(output.body),
                feature_id: Some(reg.feature_id),
                refs,
                error: None,
            },
            FeatureOperation::Cut => {
                let Some(target) = target else {
                    return BuildResult::failure(KernelError::CutRequiresTarget);
                };
                self.cut(target, &output.body, reg.feature_id, refs)
            }
        }
    }

    /// Revolve `profile`'s outer loop around an axis (`§4.E` "Revolve",
    /// "same contract as extrude"). `angle_radians` must be in
    /// `(0, 2*PI]`; full revolutions have no start/end caps.
    #[allow(clippy::too_many_arguments)]
    pub fn revolve(
        &mut self,
        profile: &SketchProfile,
        operation: FeatureOperation,
        axis_origin: cad_math::Point3,
        axis_dir: Vec3,
        angle_radians: f64,
        target: Option<&BRepBody>,
    ) -> BuildResult {
        let (output, reg) =
            match revolve_with_naming(profile, axis_origin, axis_dir, angle_radians, &mut self.tracker) {
                Ok(ok) => ok,
                Err(e) => return BuildResult::failure(e),
            };
        let refs = revolve_refs(&reg);

        match operation {
            FeatureOperation::Add => BuildResult {
                success: true,
                body: Some(output.body),
                feature_id: Some(reg.feature_id),
                refs,
                error: None,
            },
            FeatureOperation::Cut => {
                let Some(target) = target else {
                    return BuildResult::failure(KernelError::CutRequiresTarget);
                };
                self.cut(target, &output.body, reg.feature_id, refs)
            }
        }
    }

    /// Subtract `tool` from `target`, returning the subtract result
    /// under the same `feature_id`/`refs` the add step already
    /// registered (a host resolves those refs across the cut the same
    /// way it would across any other boolean step, by also calling
    /// [`Kernel::record_boolean_step`] with the returned result).
    fn cut(&mut self, target: &BRepBody, tool: &BRepBody, feature_id: FeatureId, refs: FeatureRefs) -> BuildResult {
        let result = cad_booleans::boolean(target, tool, BooleanOp::Subtract, &self.ctx);
        if !result.success {
            return BuildResult::failure(result.error.unwrap_or(BooleanError::EmptyResult));
        }
        BuildResult { success: true, body: result.body, feature_id: Some(feature_id), refs, error: None }
    }

    /// Run a boolean operation between two planar-faced solids (`§4.F`).
    /// Does not itself touch the naming tracker — pass the result to
    /// [`Kernel::record_boolean_step`] to fold its face history into the
    /// evolution log.
    pub fn boolean(&self, a: &BRepBody, b: &BRepBody, op: BooleanOp) -> BooleanResult {
        cad_booleans::boolean(a, b, op, &self.ctx)
    }

    /// Append a boolean result's face history to the evolution log under
    /// a freshly allocated step id (`§4.G` "`recordStep(stepId,
    /// mappings[])`"), returning that step id.
    pub fn record_boolean_step(&mut self, result: &BooleanResult) -> Result<StepId, KernelError> {
        let step = self.tracker.allocate_step_id();
        let mappings: Vec<EvolutionMapping> = result
            .face_history
            .iter()
            .map(|entry| EvolutionMapping {
                step,
                old: Some(SubshapeRef::new(format!("{:?}", entry.source_face))),
                news: entry.result_faces.iter().map(|f| SubshapeRef::new(format!("{f:?}"))).collect(),
                kind: entry.kind,
            })
            .collect();
        self.tracker.record_step(step, mappings)?;
        Ok(step)
    }

    /// Run the structural validation battery against a body (`§4.C`
    /// "Validation", `§6.2` "Validation report").
    pub fn validate(&self, body: &BRepBody) -> ValidationReport {
        cad_topo::validate_topology(&body.topology, &self.ctx)
            .into_iter()
            .map(|issue| ValidationFinding {
                severity: issue.severity,
                kind: issue.kind,
                message: issue.message,
                location_ids: Vec::new(),
            })
            .collect()
    }

    /// Tessellate a body into a renderable triangle mesh (`§4.H`,
    /// `§6.2` "Mesh").
    pub fn tessellate(&self, body: &BRepBody, params: &TessellationParams) -> TriangleMesh {
        cad_tessellate::tessellate_body(body, params)
    }

    /// Resolve a [`PersistentRef`] against the tracker's current state
    /// (`§4.G` "resolve(persistentRef, model)"). `model` is the body the
    /// surviving candidates live in — a split's successors are
    /// fingerprinted against it fresh, rather than trusting whatever
    /// fingerprint (if any) was cached at birth.
    pub fn resolve(&self, pref: &PersistentRef, model: &BRepBody) -> ResolveResult {
        self.tracker
            .resolve(pref, |subshape| subshape_fingerprint(model, pref.expected_type, subshape))
    }

    /// Point every record currently targeting `old_body` at `new_body`,
    /// for a host-driven rebuild that reallocates body ids for the same
    /// logical body (`§4.G` "updateBodyMapping").
    pub fn update_body_mapping(&mut self, old_body: SubshapeRef, new_body: SubshapeRef) {
        self.tracker.update_body_mapping(old_body, new_body);
    }
}

fn extrude_refs(reg: &ExtrudeRegistration) -> FeatureRefs {
    FeatureRefs::Extrude {
        top_cap: reg.top_cap.clone(),
        bottom_cap: reg.bottom_cap.clone(),
        side: reg.side_faces.clone(),
        side_edge: reg.side_edges.clone(),
        top_edge: reg.top_edges.clone(),
        bottom_edge: reg.bottom_edges.clone(),
    }
}

fn revolve_refs(reg: &RevolveRegistration) -> FeatureRefs {
    FeatureRefs::Revolve {
        side: reg.side_faces.clone(),
        start_cap: reg.start_cap.clone(),
        end_cap: reg.end_cap.clone(),
    }
}

fn register_face(
    tracker: &mut NamingTracker,
    feature_id: FeatureId,
    body: &BRepBody,
    face: cad_topo::FaceId,
    selector: Selector,
) -> PersistentRef {
    let fingerprint = face_fingerprint(body, face);
    tracker.record_birth(feature_id, selector, SubshapeRef::new(format!("{face:?}")), SubshapeType::Face, Some(fingerprint))
}

/// Centroid, area, and outward normal of a face's outer loop, the
/// fingerprint `§4.G` disambiguates splits with (`centroid, approxArea,
/// normal`). Computed by Newell's cross-product formula over the loop's
/// 3D vertices, so it works whether or not the face's surface happens
/// to be a plane.
fn face_fingerprint(body: &BRepBody, face: cad_topo::FaceId) -> Fingerprint {
    let outer = body.topology.faces[face].outer_loop();
    let verts: Vec<_> = body
        .topology
        .loop_half_edges(outer)
        .map(|he| body.topology.vertices[body.topology.half_edges[he].origin].point)
        .collect();
    let n = (verts.len().max(1)) as f64;
    let centroid = verts.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords) / n;

    let mut normal_sum = Vec3::zeros();
    for i in 0..verts.len() {
        let a = verts[i].coords;
        let b = verts[(i + 1) % verts.len()].coords;
        normal_sum += a.cross(&b);
    }
    let area = 0.5 * normal_sum.norm();
    let normal = (normal_sum.norm() > 1e-12).then(|| {
        let n = normal_sum.normalize();
        [n.x, n.y, n.z]
    });

    let mut fp = Fingerprint::basic([centroid.x, centroid.y, centroid.z], area.max(1e-9));
    fp.normal = normal;
    fp.adjacent_count = Some(body.topology.faces[face].loops.len());
    fp
}

/// Midpoint and length of an edge, the fingerprint `§4.G` disambiguates
/// edge splits/merges with.
fn edge_fingerprint(body: &BRepBody, edge: cad_topo::EdgeId) -> Fingerprint {
    let e = &body.topology.edges[edge];
    let start = body.topology.vertices[e.vertex_start].point;
    let end = body.topology.vertices[e.vertex_end].point;
    let midpoint = (start.coords + end.coords) * 0.5;
    let length = (end - start).norm();
    Fingerprint::basic([midpoint.x, midpoint.y, midpoint.z], length.max(1e-9))
}

/// Recompute a live candidate's fingerprint from `model` by matching its
/// [`SubshapeRef`] (a formatted handle debug string) against the body's
/// current faces/edges/vertices. Returns `None` when the candidate no
/// longer exists in `model` or `expected` names a kind this kernel does
/// not mint persistent refs for.
fn subshape_fingerprint(model: &BRepBody, expected: SubshapeType, subshape: &SubshapeRef) -> Option<Fingerprint> {
    match expected {
        SubshapeType::Face => model
            .topology
            .faces
            .keys()
            .find(|f| format!("{f:?}") == subshape.0)
            .map(|f| face_fingerprint(model, f)),
        SubshapeType::Edge => model
            .topology
            .edges
            .keys()
            .find(|e| format!("{e:?}") == subshape.0)
            .map(|e| edge_fingerprint(model, e)),
        SubshapeType::Vertex => model
            .topology
            .vertices
            .keys()
            .find(|v| format!("{v:?}") == subshape.0)
            .map(|v| {
                let p = model.topology.vertices[v].point;
                Fingerprint::basic([p.x, p.y, p.z], 0.0)
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_math::Point3;

    #[test]
    fn make_box_registers_six_primitive_face_refs() {
        let mut kernel = Kernel::new();
        let result = kernel.make_box(2.0, 2.0, 2.0, true);
        assert!(result.success);
        let FeatureRefs::Primitive(refs) = &result.refs else { panic!("expected primitive refs") };
        assert_eq!(refs.len(), 6);
        let body = result.body.unwrap();
        for r in refs {
            assert!(matches!(kernel.resolve(r, &body), ResolveOutcome::Found(_)));
        }
    }

    #[test]
    fn extrude_add_reports_cap_side_and_edge_refs() {
        let mut kernel = Kernel::new();
        let profile = SketchProfile::rectangle(Point3::origin(), Vec3::x(), Vec3::y(), 10.0, 10.0);
        let result = kernel.extrude(&profile, FeatureOperation::Add, 5.0, false, None);
        assert!(result.success);
        let FeatureRefs::Extrude { side, side_edge, top_edge, bottom_edge, .. } = &result.refs else {
            panic!("expected extrude refs")
        };
        assert_eq!(side.len(), 4);
        assert_eq!(side_edge.len(), 4);
        assert_eq!(top_edge.len(), 4);
        assert_eq!(bottom_edge.len(), 4);
    }

    #[test]
    fn extrude_cut_without_target_is_rejected() {
        let mut kernel = Kernel::new();
        let profile = SketchProfile::rectangle(Point3::origin(), Vec3::x(), Vec3::y(), 2.0, 2.0);
        let result = kernel.extrude(&profile, FeatureOperation::Cut, 1.0, false, None);
        assert!(!result.success);
        assert!(matches!(result.error, Some(KernelError::CutRequiresTarget)));
    }

    #[test]
    fn extrude_cut_subtracts_tool_from_target() {
        let mut kernel = Kernel::new();
        let base = kernel.make_box(4.0, 4.0, 2.0, true).body.unwrap();
        let profile = SketchProfile::rectangle(Point3::new(-1.0, -1.0, 0.0), Vec3::x(), Vec3::y(), 1.0, 1.0);
        let result = kernel.extrude(&profile, FeatureOperation::Cut, 1.0, true, Some(&base));
        assert!(result.success);
        let cut_body = result.body.unwrap();
        assert!(cut_body.topology.faces.len() > base.topology.faces.len());
    }

    #[test]
    fn boolean_union_then_record_step_extends_evolution() {
        let mut kernel = Kernel::new();
        let a = cad_primitives::make_box(2.0, 2.0, 2.0, true);
        let mut b = cad_primitives::make_box(2.0, 2.0, 2.0, true);
        for v in b.topology.vertices.values_mut() {
            v.point.x += 10.0;
        }
        for s in b.geometry.surfaces.iter_mut() {
            if let Some(p) = s.as_any().downcast_ref::<cad_geom::Plane>() {
                let mut moved = p.clone();
                moved.origin.x += 10.0;
                *s = Box::new(moved);
            }
        }
        let result = kernel.boolean(&a, &b, BooleanOp::Union);
        assert!(result.success);
        let step = kernel.record_boolean_step(&result).unwrap();
        assert_eq!(step, cad_naming::StepId(0));
    }

    #[test]
    fn validate_reports_no_issues_for_a_clean_box() {
        let mut kernel = Kernel::new();
        let body = kernel.make_box(1.0, 1.0, 1.0, true).body.unwrap();
        let report = kernel.validate(&body);
        assert!(report.is_empty(), "unexpected findings: {report:?}");
    }

    #[test]
    fn tessellate_unit_box_yields_twelve_triangles() {
        let mut kernel = Kernel::new();
        let body = kernel.make_box(1.0, 1.0, 1.0, true).body.unwrap();
        let mesh = kernel.tessellate(&body, &TessellationParams::default());
        assert_eq!(mesh.num_triangles(), 12);
    }
}
