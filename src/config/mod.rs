//! # Configuration Module
//!
//! This module provides the flat, front-end facing [`config::MergeConfig`] and
//! the validated, tagged [`options::MergeOptions`] the merge pipeline consumes.

pub mod config;
pub mod options;

pub use config::{FormatChoice, LayoutMode, MergeConfig};
pub use options::{Arrangement, MergeOptions, OutputFormat, Rgba, TargetSize};
