//! # Error Handling
//!
//! Every failure the merge pipeline can produce is a [`MergeError`]. Errors fall
//! in two scopes:
//!
//! - **Batch-level**: raised to the caller before any work starts
//!   (`NoQualifyingGroups`, `Input`, `Config`)
//! - **Group-level**: caught by the session at the group boundary and turned
//!   into a failure record in the batch report (`Decode`, `Layout`, `Draw`,
//!   `Encode`, `OutputSink`)
//!
//! ## Classification
//!
//! Errors expose a category string, a severity and an optional recovery
//! suggestion, so front ends can render them without matching on variants.
//!
//! ```rust
//! use image_merge::error::{ErrorSeverity, HasSeverity, MergeError};
//!
//! let error = MergeError::NoQualifyingGroups { inputs: 1 };
//! assert_eq!(error.category(), "no_qualifying_groups");
//! assert_eq!(error.severity(), ErrorSeverity::Error);
//! assert!(!error.is_group_scoped());
//! ```

use std::path::PathBuf;

use merge_layout::cpu::DrawError;
use merge_layout::plan::LayoutError;
use thiserror::Error;

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Warnings that do not stop the batch
    Warning,
    /// Errors that cost one group its output
    Error,
    /// Errors that stop the batch before any output is written
    Fatal,
}

#[derive(Debug, Error)]
pub enum MergeError {
    /// No group reached the minimum of two members.
    #[error("No file groups with at least two images (e.g. A1.jpg, A2.jpg) among {inputs} input(s)")]
    NoQualifyingGroups { inputs: usize },

    /// An input could not be decoded as an image.
    #[error("Failed to decode '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// Geometry could not be computed for a merge.
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    /// Pixels could not be drawn onto the canvas.
    #[error("Drawing '{name}' failed: {source}")]
    Draw {
        name: String,
        #[source]
        source: DrawError,
    },

    /// The composited canvas could not be encoded.
    #[error("Failed to encode {format} output: {source}")]
    Encode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },

    /// The output sink rejected a finished image.
    #[error("Failed to write '{}': {source}", path.display())]
    OutputSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the input images failed.
    #[error("Failed to read input '{}': {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value was rejected.
    #[error("Configuration error in '{field}': {reason} (value: {value})")]
    Config {
        field: String,
        value: String,
        reason: String,
    },

    /// The batch was cancelled between groups.
    #[error("Merge cancelled")]
    Cancelled,
}

/// Result type alias using our custom error type
pub type MergeResult<T> = Result<T, MergeError>;

impl MergeError {
    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an input error for `path`
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Input {
            path: path.into(),
            source,
        }
    }

    /// Create an output sink error for `path`
    pub fn output_sink(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputSink {
            path: path.into(),
            source,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::NoQualifyingGroups { .. } => "no_qualifying_groups",
            Self::Decode { .. } => "decode",
            Self::Layout(_) => "layout",
            Self::Draw { .. } => "draw",
            Self::Encode { .. } => "encode",
            Self::OutputSink { .. } => "output_sink",
            Self::Input { .. } => "input",
            Self::Config { .. } => "config",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the session records this error against one group and moves on.
    pub fn is_group_scoped(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. }
                | Self::Layout(_)
                | Self::Draw { .. }
                | Self::Encode { .. }
                | Self::OutputSink { .. }
        )
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for MergeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled => ErrorSeverity::Warning,
            Self::Input { .. } | Self::Config { .. } => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for MergeError {
    fn recovery_suggestion(&self) -> Option<&str> {
        match self {
            Self::NoQualifyingGroups { .. } => {
                Some("Name related images with a shared letter prefix and a number, e.g. A1.jpg and A2.jpg")
            }
            Self::Decode { .. } => Some("Check that the file is a valid JPEG or PNG image"),
            Self::Layout(LayoutError::CanvasTooLarge { .. }) => {
                Some("Lower the target size, the gap or the grid column count")
            }
            Self::OutputSink { .. } => {
                Some("Check free disk space and write permission on the destination directory")
            }
            Self::Input { .. } => Some("Check that the input path exists and is readable"),
            Self::Config { .. } => Some("Run with --help to see the accepted values"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = MergeError::config("columns", "0", "must be greater than 0");
        assert_eq!(error.category(), "config");
        assert_eq!(error.severity(), ErrorSeverity::Fatal);
        assert_eq!(
            error.to_string(),
            "Configuration error in 'columns': must be greater than 0 (value: 0)"
        );
    }

    #[test]
    fn test_group_scope() {
        let sink = MergeError::output_sink(
            "/nowhere/A.jpg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(sink.is_group_scoped());
        assert!(sink.recovery_suggestion().is_some());
        assert!(std::error::Error::source(&sink).is_some());

        let layout = MergeError::from(LayoutError::Empty);
        assert!(layout.is_group_scoped());
        assert_eq!(layout.category(), "layout");

        assert!(!MergeError::NoQualifyingGroups { inputs: 0 }.is_group_scoped());
        assert!(!MergeError::Cancelled.is_group_scoped());
    }
}
