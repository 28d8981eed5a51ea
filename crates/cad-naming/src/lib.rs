#![warn(missing_docs)]

//! Persistent-naming and evolution tracker.
//!
//! Feature operators and the boolean engine mint sub-shapes with no
//! durable identity of their own — a `FaceId` is only valid for the
//! lifetime of the `Topology` it lives in, and every rebuild allocates a
//! fresh one. This crate is what lets a host hang a dimension or a
//! subsequent cut off "the top face of extrude #3" and have that
//! selection survive a parameter edit: it records a birth the moment a
//! sub-shape is created, appends an `EvolutionMapping` every time a
//! boolean step splits, merges, or retires sub-shapes, and walks that
//! chain forward on `resolve`.
//!
//! No part of this crate touches `Topology` directly — it is handed
//! opaque subshape tokens (the caller's handle type, serialized to a
//! string) and fingerprints computed by the caller. This keeps the
//! naming layer decoupled from any one topology representation, the way
//! the rest of this workspace keeps geometry, topology, and naming in
//! separate crates.

use std::collections::HashMap;
use thiserror::Error;

/// Monotonic id allocated once per feature (one per extrude, revolve,
/// boolean step, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u64);

/// Monotonic id allocated once per boolean step (a step may touch many
/// faces; all of their evolution mappings share one `StepId`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

/// An opaque reference to a live sub-shape in the host's topology store,
/// carried as an owned string so this crate never depends on the
/// `cad-topo` handle types. Callers typically format a `FaceId`/`EdgeId`
/// debug key into this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubshapeRef(pub String);

impl SubshapeRef {
    /// Wrap any `Display`-able handle as a subshape reference.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

/// The declared type of a sub-shape a selector expects to resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubshapeType {
    /// A face.
    Face,
    /// An edge.
    Edge,
    /// A vertex.
    Vertex,
}

/// A selector: a tag kind plus a small ordered data map, matching the
/// closed enum of kind strings fixed by the outer kernel's selector
/// vocabulary (§6.3). New kinds may be added by callers but these
/// spellings must never be renamed or repurposed once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Fixed-spelling kind, e.g. `"extrude.topCap"`, `"boolean.faceFromA"`.
    pub kind: String,
    /// Small ordered key/value data distinguishing selectors of the same
    /// kind within one feature (e.g. `loop`, `segment`, `ring`).
    pub data: Vec<(String, i64)>,
}

impl Selector {
    /// Build a selector with no extra data (e.g. `revolve.startCap`).
    pub fn simple(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: Vec::new(),
        }
    }

    /// Build a selector tagged with ordered integer data, e.g.
    /// `Selector::with("extrude.side", [("loop", 0), ("segment", 3)])`.
    pub fn with(kind: impl Into<String>, data: impl IntoIterator<Item = (&'static str, i64)>) -> Self {
        Self {
            kind: kind.into(),
            data: data.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

/// Compact geometric/topological descriptor used to disambiguate
/// candidate survivors when a selector's chain forks.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    /// Centroid of the sub-shape at the time it was recorded.
    pub centroid: [f64; 3],
    /// Approximate area (faces) or length (edges).
    pub approx_measure: f64,
    /// Outward normal, for faces; `None` for edges/vertices.
    pub normal: Option<[f64; 3]>,
    /// Number of adjacent half-edges/faces, used as a coarse structural
    /// signature.
    pub adjacent_count: Option<usize>,
    /// Hash of sorted adjacent-entity identities, a tiebreaker after
    /// centroid/measure/normal have failed to separate candidates.
    pub adjacency_hash: Option<u64>,
}

impl Fingerprint {
    /// A fingerprint carrying only a centroid and measure — the minimum
    /// every caller can supply.
    pub fn basic(centroid: [f64; 3], approx_measure: f64) -> Self {
        Self {
            centroid,
            approx_measure,
            normal: None,
            adjacent_count: None,
            adjacency_hash: None,
        }
    }

    /// Weighted distance to another fingerprint: centroid distance
    /// normalized by `characteristic_length`, a symmetric log magnitude
    /// ratio, a normal-cosine term when both sides have a normal, and an
    /// adjacency-hash mismatch penalty as a tiebreaker. Lower is closer;
    /// `0.0` is an exact match.
    pub fn distance(&self, other: &Fingerprint, characteristic_length: f64) -> f64 {
        let cl = characteristic_length.max(1e-9);
        let dc = {
            let dx = self.centroid[0] - other.centroid[0];
            let dy = self.centroid[1] - other.centroid[1];
            let dz = self.centroid[2] - other.centroid[2];
            (dx * dx + dy * dy + dz * dz).sqrt() / cl
        };
        let dm = {
            let a = self.approx_measure.abs().max(1e-12);
            let b = other.approx_measure.abs().max(1e-12);
            (a / b).ln().abs()
        };
        let dn = match (self.normal, other.normal) {
            (Some(a), Some(b)) => {
                let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
                1.0 - dot.clamp(-1.0, 1.0)
            }
            _ => 0.0,
        };
        let dh = match (self.adjacency_hash, other.adjacency_hash) {
            (Some(a), Some(b)) if a != b => 0.5,
            _ => 0.0,
        };
        // Weights: centroid dominates, magnitude and normal refine,
        // adjacency hash only breaks remaining ties.
        1.0 * dc + 0.5 * dm + 0.5 * dn + dh
    }
}

/// A token the outside world stores across sessions/rebuilds: enough to
/// re-find a sub-shape without holding a live handle into any particular
/// `Topology` instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistentRef {
    /// The feature that first created this sub-shape.
    pub origin_feature_id: FeatureId,
    /// The selector distinguishing it among its feature's other births.
    pub selector: Selector,
    /// What kind of sub-shape this is expected to resolve to.
    pub expected_type: SubshapeType,
    /// A fingerprint captured at birth, used to disambiguate later.
    pub fingerprint: Option<Fingerprint>,
}

/// How a sub-shape changed across one modeling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionKind {
    /// Newly created; has no prior state.
    Birth,
    /// Consumed with no successor.
    Death,
    /// One prior sub-shape produced several successors.
    Split,
    /// Several prior sub-shapes produced one successor.
    Merge,
    /// Same identity, geometry changed.
    Modify,
    /// Same identity, nothing changed.
    Unchanged,
}

/// One entry in a step's evolution record: `old -> news[]` plus a kind
/// tag. `old` is `None` for a pure birth with no prior sub-shape.
#[derive(Debug, Clone)]
pub struct EvolutionMapping {
    /// The step this mapping was recorded under.
    pub step: StepId,
    /// The prior sub-shape, if any.
    pub old: Option<SubshapeRef>,
    /// The resulting sub-shape(s). Empty for a pure death.
    pub news: Vec<SubshapeRef>,
    /// The kind of change this mapping records.
    pub kind: EvolutionKind,
}

/// Errors raised by the naming tracker. These are all `InvalidInput` or
/// `ResolutionFailure` category per the kernel's error design — a naming
/// operation never aborts a build, it just fails to resolve a selection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NamingError {
    /// `recordStep` was given a mapping referencing an unknown step.
    #[error("step {0:?} was not allocated by this tracker")]
    UnknownStep(StepId),
    /// A fingerprint was required to disambiguate but none was supplied.
    #[error("resolution requires a fingerprint but none was provided")]
    FingerprintRequired,
}

/// The result of resolving a [`PersistentRef`] against the tracker's
/// current state.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveResult {
    /// Resolved to exactly one live sub-shape.
    Found(SubshapeRef),
    /// No live sub-shape could be found; carries a short reason.
    NotFound(String),
    /// Multiple sub-shapes remain within the fingerprint disambiguation
    /// radius; the host should ask the user or pick a convention.
    Ambiguous(Vec<SubshapeRef>),
}

/// One birth record: where a `(featureId, selector)` pair currently (or
/// originally) points, plus the fingerprint it was born with.
#[derive(Debug, Clone)]
struct BirthRecord {
    subshape: SubshapeRef,
    fingerprint: Option<Fingerprint>,
}

/// Characteristic length used to normalize fingerprint distances when the
/// caller does not supply one explicitly.
const DEFAULT_CHARACTERISTIC_LENGTH: f64 = 1.0;

/// Fingerprint-distance radius below which two candidates are considered
/// indistinguishable and reported as `Ambiguous` rather than picking one
/// arbitrarily.
const AMBIGUITY_RADIUS: f64 = 0.05;

/// Persistent-naming tracker: feature/step id allocation, birth records,
/// the append-only evolution log, body-remap table, and resolution.
///
/// Owned by the host, not by the kernel core (§5 "Shared resources") —
/// the core mutates only the records it creates during the call it is
/// currently servicing.
#[derive(Debug, Clone, Default)]
pub struct NamingTracker {
    next_feature_id: u64,
    next_step_id: u64,
    /// `(featureId, selector) -> birth record`, the latest known location.
    births: HashMap<(FeatureId, Selector), BirthRecord>,
    /// Append-only evolution log, insertion order preserved (a `Vec`, not
    /// a map — §9.1 "ordered sequence of mappings; append-only during a
    /// step; traversed forward during resolve").
    evolution: Vec<EvolutionMapping>,
    /// Body-to-body remap table for rebuilds that allocate a new body id
    /// for the same logical body.
    body_remap: HashMap<SubshapeRef, SubshapeRef>,
    /// Reverse index: subshape -> the persistent ref that last named it,
    /// for `lookup_ref_for_subshape`.
    reverse: HashMap<SubshapeRef, (FeatureId, Selector)>,
    characteristic_length: f64,
}

impl NamingTracker {
    /// A fresh tracker with no allocated ids and no records.
    pub fn new() -> Self {
        Self {
            characteristic_length: DEFAULT_CHARACTERISTIC_LENGTH,
            ..Default::default()
        }
    }

    /// A fresh tracker that normalizes fingerprint centroid distance by
    /// `characteristic_length` (e.g. the bounding-box diagonal of the
    /// model) instead of the default unit length.
    pub fn with_characteristic_length(characteristic_length: f64) -> Self {
        Self {
            characteristic_length: characteristic_length.max(1e-9),
            ..Default::default()
        }
    }

    /// Allocate a fresh, monotonically increasing feature id.
    pub fn allocate_feature_id(&mut self) -> FeatureId {
        let id = FeatureId(self.next_feature_id);
        self.next_feature_id += 1;
        id
    }

    /// Allocate a fresh, monotonically increasing step id.
    pub fn allocate_step_id(&mut self) -> StepId {
        let id = StepId(self.next_step_id);
        self.next_step_id += 1;
        id
    }

    /// Record the birth of a sub-shape under `(featureId, selector)`,
    /// returning the `PersistentRef` the host should store.
    pub fn record_birth(
        &mut self,
        feature_id: FeatureId,
        selector: Selector,
        subshape: SubshapeRef,
        expected_type: SubshapeType,
        fingerprint: Option<Fingerprint>,
    ) -> PersistentRef {
        self.reverse
            .insert(subshape.clone(), (feature_id, selector.clone()));
        self.births.insert(
            (feature_id, selector.clone()),
            BirthRecord {
                subshape,
                fingerprint: fingerprint.clone(),
            },
        );
        PersistentRef {
            origin_feature_id: feature_id,
            selector,
            expected_type,
            fingerprint,
        }
    }

    /// Append a batch of evolution mappings produced by a single boolean
    /// step, in the order sub-faces were emitted (§5 "Ordering
    /// guarantees"). Updates the reverse index for every mapping's
    /// surviving sub-shapes.
    pub fn record_step(
        &mut self,
        step: StepId,
        mappings: Vec<EvolutionMapping>,
    ) -> Result<(), NamingError> {
        if step.0 >= self.next_step_id {
            return Err(NamingError::UnknownStep(step));
        }
        for mapping in mappings {
            // Propagate the reverse-lookup origin from old to new so a
            // chain of modifies/splits still resolves `lookup_ref_for_subshape`.
            if let Some(old) = &mapping.old {
                if let Some(origin) = self.reverse.get(old).cloned() {
                    for new in &mapping.news {
                        self.reverse.insert(new.clone(), origin.clone());
                    }
                    // Keep births pointing at a single surviving subshape
                    // when there's exactly one (the common unchanged/modify
                    // case); splits are resolved explicitly via the
                    // evolution chain instead of collapsing the birth record.
                    if mapping.news.len() == 1 {
                        if let Some(rec) = self.births.get_mut(&origin) {
                            rec.subshape = mapping.news[0].clone();
                        }
                    }
                }
            }
            self.evolution.push(mapping);
        }
        Ok(())
    }

    /// Point every record currently targeting `old_body` at `new_body`,
    /// for host-driven rebuilds that reallocate body ids for the same
    /// logical body.
    pub fn update_body_mapping(&mut self, old_body: SubshapeRef, new_body: SubshapeRef) {
        self.body_remap.insert(old_body, new_body);
    }

    /// Reverse lookup: which feature/selector last named `subshape`, if
    /// any. Used by a host UI to show "this face came from Extrude #2".
    pub fn lookup_ref_for_subshape(&self, subshape: &SubshapeRef) -> Option<(FeatureId, Selector)> {
        self.reverse.get(subshape).cloned()
    }

    /// Resolve a [`PersistentRef`] against the tracker's current state.
    ///
    /// 1. Look up the last known location for `(originFeatureId, selector)`.
    /// 2. Walk the evolution chain forward from there.
    /// 3. If the chain dead-ends, consult the body remap table.
    /// 4. At a split, disambiguate the survivors using fingerprint
    ///    distance against `model`: the caller-supplied `fingerprint_of`
    ///    recomputes each live candidate's fingerprint from the current
    ///    topology (`§4.G`: "resolve(persistentRef, model)"). Only when
    ///    two or more survivors remain within the fingerprint
    ///    disambiguation radius of the best match is the result reported
    ///    ambiguous; this crate stays decoupled from any concrete
    ///    topology type by taking the lookup as a closure rather than a
    ///    `Topology` reference.
    pub fn resolve(&self, pref: &PersistentRef, fingerprint_of: impl Fn(&SubshapeRef) -> Option<Fingerprint>) -> ResolveResult {
        let key = (pref.origin_feature_id, pref.selector.clone());
        let Some(birth) = self.births.get(&key) else {
            return ResolveResult::NotFound("no birth record for this selector".into());
        };

        let mut frontier = vec![birth.subshape.clone()];
        loop {
            let mut next = Vec::new();
            let mut advanced = false;
            for shape in &frontier {
                let outgoing: Vec<&EvolutionMapping> = self
                    .evolution
                    .iter()
                    .filter(|m| m.old.as_ref() == Some(shape))
                    .collect();
                if outgoing.is_empty() {
                    next.push(shape.clone());
                    continue;
                }
                advanced = true;
                for mapping in outgoing {
                    next.extend(mapping.news.iter().cloned());
                }
            }
            if !advanced {
                frontier = next;
                break;
            }
            frontier = next;
        }

        // Dead ends that are themselves deaths vanish from the frontier
        // unless every path died, which is a genuine NotFound.
        let alive: Vec<SubshapeRef> = frontier
            .into_iter()
            .filter(|s| {
                !self
                    .evolution
                    .iter()
                    .any(|m| m.old.as_ref() == Some(s) && m.kind == EvolutionKind::Death && m.news.is_empty())
            })
            .collect();

        if alive.is_empty() {
            // Last resort: the body remap table, for hosts that rebuild
            // a whole body under a new id without the engine emitting an
            // evolution chain for it (e.g. a no-op rebuild).
            if let Some(mapped) = self.body_remap.get(&birth.subshape) {
                return ResolveResult::Found(mapped.clone());
            }
            return ResolveResult::NotFound("evolution chain ends in death".into());
        }

        if alive.len() == 1 {
            return ResolveResult::Found(alive.into_iter().next().unwrap());
        }

        // Multiple survivors: disambiguate by fingerprint distance
        // against the persistent ref's birth fingerprint. With no birth
        // fingerprint to compare against, there is nothing to rank.
        let Some(target) = &pref.fingerprint else {
            return ResolveResult::Ambiguous(alive);
        };

        let mut scored: Vec<(f64, SubshapeRef)> = alive
            .into_iter()
            .map(|s| {
                let d = fingerprint_of(&s)
                    .map(|fp| fp.distance(target, self.characteristic_length))
                    .unwrap_or(f64::MAX);
                (d, s)
            })
            .collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("fingerprint distance is never NaN"));

        let best = scored[0].0;
        let near_best: Vec<SubshapeRef> = scored
            .into_iter()
            .filter(|(d, _)| *d - best <= AMBIGUITY_RADIUS)
            .map(|(_, s)| s)
            .collect();

        if near_best.len() == 1 {
            ResolveResult::Found(near_best.into_iter().next().unwrap())
        } else {
            ResolveResult::Ambiguous(near_best)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocators_are_monotonic() {
        let mut t = NamingTracker::new();
        let f0 = t.allocate_feature_id();
        let f1 = t.allocate_feature_id();
        assert_ne!(f0, f1);
        assert!(f1.0 > f0.0);
    }

    #[test]
    fn birth_resolves_immediately() {
        let mut t = NamingTracker::new();
        let fid = t.allocate_feature_id();
        let sel = Selector::simple("extrude.topCap");
        let pref = t.record_birth(
            fid,
            sel,
            SubshapeRef::new("face#1"),
            SubshapeType::Face,
            Some(Fingerprint::basic([0.0, 0.0, 1.0], 4.0)),
        );
        match t.resolve(&pref, |_| None) {
            ResolveResult::Found(s) => assert_eq!(s, SubshapeRef::new("face#1")),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn unknown_selector_is_not_found() {
        let t = NamingTracker::new();
        let pref = PersistentRef {
            origin_feature_id: FeatureId(999),
            selector: Selector::simple("extrude.topCap"),
            expected_type: SubshapeType::Face,
            fingerprint: None,
        };
        assert!(matches!(t.resolve(&pref, |_| None), ResolveResult::NotFound(_)));
    }

    #[test]
    fn modify_follows_chain_to_new_face() {
        let mut t = NamingTracker::new();
        let fid = t.allocate_feature_id();
        let sel = Selector::simple("extrude.topCap");
        let pref = t.record_birth(fid, sel, SubshapeRef::new("face#1"), SubshapeType::Face, None);

        let step = t.allocate_step_id();
        t.record_step(
            step,
            vec![EvolutionMapping {
                step,
                old: Some(SubshapeRef::new("face#1")),
                news: vec![SubshapeRef::new("face#1-modified")],
                kind: EvolutionKind::Modify,
            }],
        )
        .unwrap();

        match t.resolve(&pref, |_| None) {
            ResolveResult::Found(s) => assert_eq!(s, SubshapeRef::new("face#1-modified")),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn split_is_ambiguous_without_a_birth_fingerprint() {
        let mut t = NamingTracker::new();
        let fid = t.allocate_feature_id();
        let sel = Selector::simple("extrude.side");
        let pref = t.record_birth(fid, sel, SubshapeRef::new("face#7"), SubshapeType::Face, None);

        let step = t.allocate_step_id();
        t.record_step(
            step,
            vec![EvolutionMapping {
                step,
                old: Some(SubshapeRef::new("face#7")),
                news: vec![SubshapeRef::new("face#7a"), SubshapeRef::new("face#7b")],
                kind: EvolutionKind::Split,
            }],
        )
        .unwrap();

        match t.resolve(&pref, |_| None) {
            ResolveResult::Ambiguous(candidates) => assert_eq!(candidates.len(), 2),
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn split_disambiguates_by_fingerprint_distance() {
        let mut t = NamingTracker::new();
        let fid = t.allocate_feature_id();
        let sel = Selector::simple("extrude.side");
        let pref = t.record_birth(
            fid,
            sel,
            SubshapeRef::new("face#7"),
            SubshapeType::Face,
            Some(Fingerprint::basic([0.0, 0.0, 0.0], 4.0)),
        );

        let step = t.allocate_step_id();
        t.record_step(
            step,
            vec![EvolutionMapping {
                step,
                old: Some(SubshapeRef::new("face#7")),
                news: vec![SubshapeRef::new("face#7a"), SubshapeRef::new("face#7b")],
                kind: EvolutionKind::Split,
            }],
        )
        .unwrap();

        let candidate_fingerprints = |s: &SubshapeRef| match s.0.as_str() {
            "face#7a" => Some(Fingerprint::basic([0.1, 0.0, 0.0], 4.0)),
            "face#7b" => Some(Fingerprint::basic([9.0, 0.0, 0.0], 4.0)),
            _ => None,
        };

        match t.resolve(&pref, candidate_fingerprints) {
            ResolveResult::Found(s) => assert_eq!(s, SubshapeRef::new("face#7a")),
            other => panic!("expected Found(face#7a), got {other:?}"),
        }
    }

    #[test]
    fn death_with_no_remap_is_not_found() {
        let mut t = NamingTracker::new();
        let fid = t.allocate_feature_id();
        let sel = Selector::simple("boolean.faceFromB");
        let pref = t.record_birth(fid, sel, SubshapeRef::new("face#3"), SubshapeType::Face, None);

        let step = t.allocate_step_id();
        t.record_step(
            step,
            vec![EvolutionMapping {
                step,
                old: Some(SubshapeRef::new("face#3")),
                news: vec![],
                kind: EvolutionKind::Death,
            }],
        )
        .unwrap();

        assert!(matches!(t.resolve(&pref, |_| None), ResolveResult::NotFound(_)));
    }

    #[test]
    fn death_with_body_remap_resolves() {
        let mut t = NamingTracker::new();
        let fid = t.allocate_feature_id();
        let sel = Selector::simple("primitive.face");
        let pref = t.record_birth(fid, sel, SubshapeRef::new("face#9"), SubshapeType::Face, None);
        t.update_body_mapping(SubshapeRef::new("face#9"), SubshapeRef::new("face#9-rebuilt"));

        match t.resolve(&pref, |_| None) {
            ResolveResult::Found(s) => assert_eq!(s, SubshapeRef::new("face#9-rebuilt")),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn fingerprint_distance_is_zero_for_identical() {
        let fp = Fingerprint::basic([1.0, 2.0, 3.0], 5.0);
        assert!(fp.distance(&fp, 1.0) < 1e-12);
    }

    #[test]
    fn fingerprint_distance_grows_with_centroid_offset() {
        let a = Fingerprint::basic([0.0, 0.0, 0.0], 5.0);
        let b = Fingerprint::basic([10.0, 0.0, 0.0], 5.0);
        assert!(a.distance(&b, 1.0) > a.distance(&a, 1.0));
    }

    #[test]
    fn reverse_lookup_finds_origin() {
        let mut t = NamingTracker::new();
        let fid = t.allocate_feature_id();
        let sel = Selector::with("extrude.side", [("loop", 0), ("segment", 2)]);
        t.record_birth(fid, sel.clone(), SubshapeRef::new("face#4"), SubshapeType::Face, None);
        let found = t.lookup_ref_for_subshape(&SubshapeRef::new("face#4"));
        assert_eq!(found, Some((fid, sel)));
    }

    #[test]
    fn unknown_step_is_rejected() {
        let mut t = NamingTracker::new();
        let bogus = StepId(42);
        let err = t.record_step(bogus, vec![]).unwrap_err();
        assert_eq!(err, NamingError::UnknownStep(bogus));
    }
}
