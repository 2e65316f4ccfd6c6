use thiserror::Error;

use crate::enums::AxisKind;
use crate::enums::SpaceFrame;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("The volume must have exactly 4 axes, found {found}")]
    Dimension { found: usize },

    #[error("Can only handle RAS, LAS and LPS world coordinate frames, found {frame}")]
    CoordinateFrame { frame: SpaceFrame },

    #[error("Cannot convert sample {index} to float: {reason}")]
    TypeConversion { index: usize, reason: String },

    #[error("Gradient {key} must have 3 components, got '{value}'")]
    MalformedGradient { key: String, value: String },

    #[error("No non-zero gradients in the data ({zero} zero gradients)")]
    NoDiffusionData { zero: usize },

    #[error("No zero gradients in the data ({non_zero} non-zero gradients)")]
    NoBaselineData { non_zero: usize },

    #[error("Too many list axes in the data: axis {first} and axis {second}")]
    AmbiguousAxis { first: usize, second: usize },

    #[error("Cannot find the list axis")]
    MissingGradientAxis,

    #[error("Unrecognizable axis kind: axis {axis} is of kind {kind}")]
    UnknownAxisKind { axis: usize, kind: AxisKind },

    #[error("Failed to write key/value pair '{key}': {reason}")]
    MetadataWrite { key: String, reason: String },

    #[error("Found {gradients} gradient entries but the gradient axis has size {axis_size}")]
    GradientCountMismatch { gradients: usize, axis_size: usize },

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
