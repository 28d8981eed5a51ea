//! 2D sketch profile types: loops of line/arc segments on a datum plane,
//! pre-classified by winding (§3.4).

use std::f64::consts::PI;

use cad_math::{Dir3, Point2, Point3, Tolerance, Vec3};

use crate::SketchError;

/// A segment of a 2D sketch profile loop.
#[derive(Debug, Clone, Copy)]
pub enum SketchSegment {
    /// A line segment from start to end.
    Line {
        /// Start point in 2D sketch coordinates.
        start: Point2,
        /// End point in 2D sketch coordinates.
        end: Point2,
    },
    /// A circular arc from start to end around a center.
    Arc {
        /// Start point in 2D sketch coordinates.
        start: Point2,
        /// End point in 2D sketch coordinates.
        end: Point2,
        /// Center of the arc in 2D sketch coordinates.
        center: Point2,
        /// If true, arc goes counter-clockwise from start to end.
        ccw: bool,
    },
}

impl SketchSegment {
    /// The start point of this segment.
    pub fn start(&self) -> Point2 {
        match self {
            SketchSegment::Line { start, .. } => *start,
            SketchSegment::Arc { start, .. } => *start,
        }
    }

    /// The end point of this segment.
    pub fn end(&self) -> Point2 {
        match self {
            SketchSegment::Line { end, .. } => *end,
            SketchSegment::Arc { end, .. } => *end,
        }
    }

    /// Whether this segment is degenerate (zero length, or an arc with
    /// zero radius).
    pub fn is_degenerate(&self) -> bool {
        let tol = Tolerance::DEFAULT;
        match self {
            SketchSegment::Line { start, end } => (end - start).norm() < tol.length,
            SketchSegment::Arc {
                start, end, center, ..
            } => {
                let r1 = (start - center).norm();
                let r2 = (end - center).norm();
                r1 < tol.length || r2 < tol.length || (end - start).norm() < tol.length
            }
        }
    }

    /// Angular span of an arc segment, normalized into `(0, 2*PI]`
    /// according to its `ccw` flag (§4.B "arc angular-span computation").
    /// Zero for line segments.
    pub fn angular_span(&self) -> f64 {
        match self {
            SketchSegment::Line { .. } => 0.0,
            SketchSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => {
                let d_start = start - center;
                let d_end = end - center;
                let start_angle = d_start.y.atan2(d_start.x);
                let end_angle = d_end.y.atan2(d_end.x);
                let mut span = end_angle - start_angle;
                if *ccw {
                    if span <= 0.0 {
                        span += 2.0 * PI;
                    }
                } else {
                    if span >= 0.0 {
                        span -= 2.0 * PI;
                    }
                    span = -span;
                }
                span
            }
        }
    }

    /// The radius of an arc segment (distance from center to start).
    /// Zero for line segments.
    pub fn radius(&self) -> f64 {
        match self {
            SketchSegment::Line { .. } => 0.0,
            SketchSegment::Arc { start, center, .. } => (start - center).norm(),
        }
    }
}

/// One closed loop of a sketch profile: an ordered, end-to-start-chained
/// list of curves, tagged as the outer boundary or a hole (§3.4).
#[derive(Debug, Clone)]
pub struct ProfileLoop {
    /// The chained segments, each ending where the next starts, closing
    /// back to the first segment's start.
    pub segments: Vec<SketchSegment>,
    /// `true` for the outer boundary, `false` for a hole.
    pub is_outer: bool,
}

impl ProfileLoop {
    /// Build a loop from a chained segment list, validating closure and
    /// rejecting degenerate segments. Does not reorient for winding —
    /// call [`ProfileLoop::canonicalize_winding`] (done automatically by
    /// [`SketchProfile::new`]) once the loop's role is known.
    pub fn new(segments: Vec<SketchSegment>, is_outer: bool) -> Result<Self, SketchError> {
        if segments.is_empty() {
            return Err(SketchError::EmptyProfile);
        }
        for (i, seg) in segments.iter().enumerate() {
            if seg.is_degenerate() {
                return Err(SketchError::DegenerateSegment(i));
            }
        }
        let tol = Tolerance::DEFAULT;
        let first_start = segments[0].start();
        let last_end = segments.last().unwrap().end();
        let gap = (last_end - first_start).norm();
        if gap > tol.length {
            return Err(SketchError::NotClosed(gap));
        }
        for i in 0..segments.len() - 1 {
            let this_end = segments[i].end();
            let next_start = segments[i + 1].start();
            let continuity_gap = (next_start - this_end).norm();
            if continuity_gap > tol.length {
                return Err(SketchError::NotClosed(continuity_gap));
            }
        }
        Ok(Self { segments, is_outer })
    }

    /// Signed area of the polygon formed by each segment's start point
    /// (the shoelace formula), used to classify winding. Positive is
    /// counter-clockwise in the plane's (u, v) frame.
    pub fn signed_area(&self) -> f64 {
        let pts: Vec<Point2> = self.segments.iter().map(|s| s.start()).collect();
        let n = pts.len();
        let mut area = 0.0;
        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            area += a.x * b.y - b.x * a.y;
        }
        area / 2.0
    }

    /// Reverse every segment's direction and their order, flipping the
    /// loop's winding without changing the shape it encloses.
    pub fn reversed(&self) -> Self {
        let segments = self
            .segments
            .iter()
            .rev()
            .map(|s| match *s {
                SketchSegment::Line { start, end } => SketchSegment::Line { start: end, end: start },
                SketchSegment::Arc {
                    start,
                    end,
                    center,
                    ccw,
                } => SketchSegment::Arc {
                    start: end,
                    end: start,
                    center,
                    ccw: !ccw,
                },
            })
            .collect();
        Self {
            segments,
            is_outer: self.is_outer,
        }
    }

    /// Reorient so outer loops are CCW (`signed_area > 0`) and holes are
    /// CW (`signed_area < 0`), per §3.4.
    pub fn canonicalize_winding(self) -> Self {
        let area = self.signed_area();
        if self.is_outer {
            if area < 0.0 {
                self.reversed()
            } else {
                self
            }
        } else if area > 0.0 {
            self.reversed()
        } else {
            self
        }
    }
}

/// A 2D sketch profile on a datum plane: an outer loop plus zero or more
/// hole loops (§3.4). Multiple disjoint outer loops are not modeled here
/// — see §3.4 "this spec focuses on one-outer-plus-holes".
#[derive(Debug, Clone)]
pub struct SketchProfile {
    /// Origin point of the sketch plane in 3D.
    pub origin: Point3,
    /// Unit vector along the local X axis.
    pub x_dir: Dir3,
    /// Unit vector along the local Y axis.
    pub y_dir: Dir3,
    /// Unit normal to the sketch plane (x_dir x y_dir).
    pub normal: Dir3,
    /// The profile's loops; `loops[0]` is the outer boundary (enforced
    /// by `new`), the rest are holes.
    pub loops: Vec<ProfileLoop>,
}

impl SketchProfile {
    /// Build a profile from its datum plane and loops. Exactly one loop
    /// must be the outer boundary; it is moved to index 0. Every loop is
    /// reoriented to the canonical winding (outer CCW, holes CW).
    pub fn new(
        origin: Point3,
        x_dir: Vec3,
        y_dir: Vec3,
        mut loops: Vec<ProfileLoop>,
    ) -> Result<Self, SketchError> {
        if loops.is_empty() {
            return Err(SketchError::EmptyProfile);
        }
        let outer_count = loops.iter().filter(|l| l.is_outer).count();
        if outer_count != 1 {
            return Err(SketchError::MultipleOuterLoops(outer_count));
        }
        let outer_pos = loops.iter().position(|l| l.is_outer).unwrap();
        loops.swap(0, outer_pos);
        let loops: Vec<ProfileLoop> = loops.into_iter().map(ProfileLoop::canonicalize_winding).collect();

        Ok(Self {
            origin,
            x_dir: Dir3::new_normalize(x_dir),
            y_dir: Dir3::new_normalize(y_dir),
            normal: Dir3::new_normalize(x_dir.cross(&y_dir)),
            loops,
        })
    }

    /// Build a profile with a single outer loop and no holes.
    pub fn single_loop(
        origin: Point3,
        x_dir: Vec3,
        y_dir: Vec3,
        segments: Vec<SketchSegment>,
    ) -> Result<Self, SketchError> {
        let outer = ProfileLoop::new(segments, true)?;
        Self::new(origin, x_dir, y_dir, vec![outer])
    }

    /// Create a rectangular profile (outer loop only), CCW from
    /// `(0, 0)` viewed from `+normal`.
    pub fn rectangle(origin: Point3, x_dir: Vec3, y_dir: Vec3, width: f64, height: f64) -> Self {
        Self::single_loop(origin, x_dir, y_dir, rectangle_segments(0.0, 0.0, width, height))
            .expect("axis-aligned rectangle is always closed and non-degenerate")
    }

    /// Create a rectangular outer profile with a smaller rectangular
    /// hole centered at `hole_center` — used to exercise multi-loop
    /// extrude.
    pub fn rectangle_with_rectangular_hole(
        origin: Point3,
        x_dir: Vec3,
        y_dir: Vec3,
        width: f64,
        height: f64,
        hole_center: Point2,
        hole_width: f64,
        hole_height: f64,
    ) -> Result<Self, SketchError> {
        let outer = ProfileLoop::new(rectangle_segments(0.0, 0.0, width, height), true)?;
        let hx = hole_center.x - hole_width / 2.0;
        let hy = hole_center.y - hole_height / 2.0;
        let hole = ProfileLoop::new(rectangle_segments(hx, hy, hole_width, hole_height), false)?;
        Self::new(origin, x_dir, y_dir, vec![outer, hole])
    }

    /// Create a circular profile (outer loop only) approximated by
    /// `n_arcs` full-circle arc segments.
    pub fn circle(origin: Point3, normal: Vec3, radius: f64, n_arcs: u32) -> Self {
        let n = Dir3::new_normalize(normal);
        let arbitrary = if n.as_ref().x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
        let x_dir = arbitrary.cross(n.as_ref());
        let y_dir = n.as_ref().cross(&x_dir);

        let center = Point2::origin();
        let n_arcs = n_arcs.max(2) as usize;
        let mut segments = Vec::with_capacity(n_arcs);
        for i in 0..n_arcs {
            let theta_start = 2.0 * PI * (i as f64) / (n_arcs as f64);
            let theta_end = 2.0 * PI * ((i + 1) as f64) / (n_arcs as f64);
            let start = Point2::new(radius * theta_start.cos(), radius * theta_start.sin());
            let end = Point2::new(radius * theta_end.cos(), radius * theta_end.sin());
            segments.push(SketchSegment::Arc { start, end, center, ccw: true });
        }
        Self::single_loop(origin, x_dir, y_dir, segments)
            .expect("regular polygon of arcs is always closed and non-degenerate")
    }

    /// Map a 2D point in sketch coordinates to 3D.
    pub fn to_3d(&self, p: Point2) -> Point3 {
        self.origin + p.x * self.x_dir.as_ref() + p.y * self.y_dir.as_ref()
    }

    /// Map a 3D point to 2D sketch coordinates.
    pub fn to_2d(&self, p: Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(self.x_dir.as_ref()), d.dot(self.y_dir.as_ref()))
    }

    /// The outer boundary loop.
    pub fn outer_loop(&self) -> &ProfileLoop {
        &self.loops[0]
    }

    /// The hole loops (all but the outer boundary).
    pub fn hole_loops(&self) -> &[ProfileLoop] {
        &self.loops[1..]
    }
}

fn rectangle_segments(x0: f64, y0: f64, width: f64, height: f64) -> Vec<SketchSegment> {
    let p0 = Point2::new(x0, y0);
    let p1 = Point2::new(x0 + width, y0);
    let p2 = Point2::new(x0 + width, y0 + height);
    let p3 = Point2::new(x0, y0 + height);
    vec![
        SketchSegment::Line { start: p0, end: p1 },
        SketchSegment::Line { start: p1, end: p2 },
        SketchSegment::Line { start: p2, end: p3 },
        SketchSegment::Line { start: p3, end: p0 },
    ]
}

/// How a sampled polyline edge traces back to its source curve, so
/// feature operators know whether to build a planar or cylindrical
/// side face for it (§4.D).
#[derive(Debug, Clone, Copy)]
pub enum SampledEdgeSource {
    /// The edge came from a line segment (or a straight sub-chord with
    /// no meaningful curvature).
    Line,
    /// The edge is one sub-chord of an arc, keeping the arc's center,
    /// radius, and winding so a cylindrical surface can be built.
    Arc { center: Point2, radius: f64, ccw: bool },
}

/// A loop sampled down to a 2D polyline for extrude: one vertex per
/// polyline corner, one source tag per edge between consecutive
/// vertices (wrapping from the last vertex back to the first).
#[derive(Debug, Clone)]
pub struct SampledLoop {
    /// Polyline vertices in loop order.
    pub vertices: Vec<Point2>,
    /// `edge_sources[i]` describes the edge from `vertices[i]` to
    /// `vertices[(i+1) % n]`.
    pub edge_sources: Vec<SampledEdgeSource>,
    /// Carried through from the source [`ProfileLoop`].
    pub is_outer: bool,
}

/// Minimum polyline segments used to approximate one full-circle arc
/// (§4.D "minimum 12 segments per full arc").
const MIN_SEGMENTS_PER_FULL_ARC: f64 = 12.0;

/// Target angular resolution: roughly one polyline segment per 10
/// degrees of arc span (§4.D).
const DEGREES_PER_SEGMENT: f64 = 10.0;

/// Sample a loop's arcs into polyline vertices for extrude. Line
/// segments pass through as a single edge; arcs are subdivided into at
/// least `ceil(span_degrees / 10)` chords, and never fewer than the
/// share of 12 chords a full circle would need for the same span.
pub fn sample_loop_for_extrude(loop_: &ProfileLoop) -> SampledLoop {
    let mut vertices = Vec::new();
    let mut edge_sources = Vec::new();

    for seg in &loop_.segments {
        match seg {
            SketchSegment::Line { start, .. } => {
                vertices.push(*start);
                edge_sources.push(SampledEdgeSource::Line);
            }
            SketchSegment::Arc { start, center, ccw, .. } => {
                let span = seg.angular_span().abs();
                let radius = seg.radius();
                let per_ten_degrees = (span.to_degrees() / DEGREES_PER_SEGMENT).ceil();
                let full_circle_share = (span / (2.0 * PI) * MIN_SEGMENTS_PER_FULL_ARC).ceil();
                let n = per_ten_degrees.max(full_circle_share).max(1.0) as usize;

                let d_start = start - center;
                let start_angle = d_start.y.atan2(d_start.x);
                let signed_span = if *ccw { span } else { -span };
                for i in 0..n {
                    let t = i as f64 / n as f64;
                    let angle = start_angle + signed_span * t;
                    let pt = center + radius * Vec2_::new(angle.cos(), angle.sin());
                    vertices.push(pt);
                    edge_sources.push(SampledEdgeSource::Arc { center: *center, radius, ccw: *ccw });
                }
            }
        }
    }

    SampledLoop {
        vertices,
        edge_sources,
        is_outer: loop_.is_outer,
    }
}

// Local alias to avoid importing cad_math::Vec2 under a name that
// shadows `vec2` call sites below — kept private to this module.
use cad_math::Vec2 as Vec2_;
