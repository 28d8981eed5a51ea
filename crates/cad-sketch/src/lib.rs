#![warn(missing_docs)]

//! Sketch profile conversion and extrude/revolve feature operators
//! (§3.4, §4.E).
//!
//! A [`SketchProfile`] is a plane plus an outer loop and optional hole
//! loops of lines and arcs. [`extrude::extrude`] sweeps it along its own
//! normal into a solid; [`revolve::revolve`] sweeps its outer loop
//! around an axis. Both have a `_with_naming` variant that also
//! registers a birth in a [`cad_naming::NamingTracker`] for every face
//! produced, so a host can keep a stable handle across a later rebuild.
//!
//! # Example
//!
//! ```
//! use cad_sketch::{SketchProfile, extrude::extrude};
//! use cad_math::{Point3, Vec3};
//!
//! let profile = SketchProfile::rectangle(
//!     Point3::origin(),
//!     Vec3::x(),
//!     Vec3::y(),
//!     10.0,
//!     5.0,
//! );
//!
//! let output = extrude(&profile, 20.0, false).unwrap();
//! assert_eq!(output.body.topology.faces.len(), 6);
//! ```

pub mod extrude;
pub mod profile;
pub mod revolve;

pub use profile::{ProfileLoop, SampledEdgeSource, SampledLoop, SketchProfile, SketchSegment};

use thiserror::Error;

/// Errors from sketch-based operations.
#[derive(Debug, Clone, Error)]
pub enum SketchError {
    /// The profile is not closed (gap between first and last segment).
    #[error("profile is not closed: gap of {0:.6} mm")]
    NotClosed(f64),

    /// A segment is degenerate (zero length).
    #[error("degenerate segment at index {0}")]
    DegenerateSegment(usize),

    /// Extrusion direction has zero length.
    #[error("extrusion direction is zero")]
    ZeroExtrusion,

    /// Revolution axis has zero length.
    #[error("revolution axis is zero")]
    ZeroAxis,

    /// Revolution angle is invalid (must be in (0, 2π]).
    #[error("invalid revolution angle: {0} radians")]
    InvalidAngle(f64),

    /// Profile intersects the revolution axis.
    #[error("profile intersects the revolution axis")]
    AxisIntersection,

    /// Profile has no segments.
    #[error("profile has no segments")]
    EmptyProfile,

    /// A loop had zero or more than one segment/loop flagged as the outer
    /// boundary.
    #[error("profile must have exactly one outer loop, found {0}")]
    MultipleOuterLoops(usize),

    /// Revolve was given a profile with holes, which it does not yet
    /// support (only the outer loop sweeps into a solid).
    #[error("revolve does not support profiles with holes")]
    RevolveHolesNotSupported,
}
