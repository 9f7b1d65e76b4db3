//! Error handling for MechLogic
//!
//! Provides the error taxonomy shared by every layer:
//! - Specification errors (rejected before any geometry is computed)
//! - Degenerate profile errors (a single gear or tooth cannot be built)
//! - Mesh errors (two gears cannot be placed against each other)
//! - Kernel errors (the external solid modeler refused an operation)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Specification validation error
///
/// Raised before geometry is computed. Fatal for the whole layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecValidationError {
    /// A numeric field is outside its allowed range
    #[error("{name} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted field name, e.g. `gears.module`.
        name: String,
        /// The offending value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },

    /// A field holds a value that is not usable
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue {
        /// Dotted field name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two or more fields contradict each other
    #[error("Incompatible parameters: {0}")]
    Incompatible(String),

    /// A required entry is missing
    #[error("Missing required entry: {0}")]
    Missing(String),
}

impl SpecValidationError {
    /// Check `value` against an inclusive range.
    pub fn check_range(
        name: &str,
        value: f64,
        min: f64,
        max: f64,
    ) -> std::result::Result<(), SpecValidationError> {
        if !value.is_finite() || value < min || value > max {
            return Err(SpecValidationError::OutOfRange {
                name: name.to_string(),
                value,
                min,
                max,
            });
        }
        Ok(())
    }

    /// Check that `value` is finite and strictly positive.
    pub fn check_positive(name: &str, value: f64) -> std::result::Result<(), SpecValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(SpecValidationError::InvalidValue {
                name: name.to_string(),
                reason: format!("must be > 0, got {}", value),
            });
        }
        Ok(())
    }
}

/// Degenerate tooth profile error
///
/// The requested gear cannot produce a valid closed profile.
/// Aborts the affected part only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegenerateProfileError {
    /// Backlash consumed the whole tooth
    #[error("Tooth thickness {thickness:.4} mm is not positive (backlash {backlash} mm)")]
    NonPositiveThickness {
        /// Tooth thickness at the pitch circle after backlash.
        thickness: f64,
        /// Requested backlash.
        backlash: f64,
    },

    /// The flank start radius reaches the tip
    #[error("No involute flank range: flank start radius {start:.4} >= tip radius {tip:.4}")]
    NoFlankRange {
        /// Radius where the involute flank starts.
        start: f64,
        /// Radius where the involute flank ends.
        tip: f64,
    },

    /// The two flanks cross before reaching the tip
    #[error("Pointed tooth: flanks cross below the tip (tip half-angle {tip_half_angle:.6} rad)")]
    PointedTooth {
        /// Angular half width of the tooth at the tip, radians.
        tip_half_angle: f64,
    },

    /// Dedendum exceeds the pitch radius
    #[error("Root radius {root:.4} mm is not positive")]
    NonPositiveRoot {
        /// The computed root radius.
        root: f64,
    },

    /// Not enough samples for a flank
    #[error("Too few flank samples: {count} (minimum {min})")]
    TooFewSamples {
        /// Requested samples.
        count: usize,
        /// Minimum accepted.
        min: usize,
    },

    /// Bevel face width leaves no tooth length
    #[error("Face width {face_width:.4} mm is invalid for cone distance {cone_distance:.4} mm")]
    InvalidFaceWidth {
        /// Requested face width.
        face_width: f64,
        /// Cone distance of the gear.
        cone_distance: f64,
    },

    /// Bevel loft needs at least two sections
    #[error("Bevel section count {count} must be at least 2")]
    TooFewSections {
        /// Requested section count.
        count: usize,
    },
}

/// Mesh placement error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The angle between the shafts does not match the pitch cones
    #[error("Shaft angle mismatch: pitch cones need {expected_deg:.3}°, axes are {actual_deg:.3}° apart")]
    ShaftAngleMismatch {
        /// Sum of the two cone angles.
        expected_deg: f64,
        /// Angle between the supplied axes.
        actual_deg: f64,
    },

    /// The reference face would sit in front of the tooth back face
    #[error(
        "Mesh distance {mesh_distance:.4} mm is shorter than the back cone axial distance {back_cone_axial:.4} mm"
    )]
    MeshDistanceBehindBackCone {
        /// Requested distance from reference face to apex.
        mesh_distance: f64,
        /// Axial distance from apex to the back face pitch circle.
        back_cone_axial: f64,
    },

    /// Apexes of a bevel pair do not coincide
    #[error("Bevel apexes are {distance:.4} mm apart")]
    ApexMismatch {
        /// Distance between the two computed apex points.
        distance: f64,
    },

    /// Gear placement is geometrically meaningless
    #[error("Degenerate mesh: {0}")]
    Degenerate(String),
}

/// Solid kernel error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// A kernel operation failed
    #[error("Kernel operation '{operation}' failed: {reason}")]
    OperationFailed {
        /// Operation name, e.g. `loft`.
        operation: String,
        /// Kernel supplied reason.
        reason: String,
    },
}

impl KernelError {
    /// Create a failure for `operation`.
    pub fn failed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        KernelError::OperationFailed {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Why a single part could not be realized
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PartFailure {
    /// Profile could not be generated
    #[error(transparent)]
    Profile(#[from] DegenerateProfileError),

    /// Kernel refused an operation
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// Part could not be placed
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// A failure attributed to one named part
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Part '{part_id}' failed: {source}")]
pub struct PartError {
    /// Identifier of the part in the assembly layout.
    pub part_id: String,
    /// Underlying cause.
    pub source: PartFailure,
}

impl PartError {
    /// Attribute `source` to `part_id`.
    pub fn new(part_id: impl Into<String>, source: impl Into<PartFailure>) -> Self {
        Self {
            part_id: part_id.into(),
            source: source.into(),
        }
    }
}

/// Main error type for MechLogic
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Specification error
    #[error(transparent)]
    Spec(#[from] SpecValidationError),

    /// Profile error
    #[error(transparent)]
    Profile(#[from] DegenerateProfileError),

    /// Mesh error
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Kernel error
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// Part error
    #[error(transparent)]
    Part(#[from] PartError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a specification error
    pub fn is_spec_error(&self) -> bool {
        matches!(self, Error::Spec(_))
    }

    /// Check if this is a profile error
    pub fn is_profile_error(&self) -> bool {
        matches!(self, Error::Profile(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
