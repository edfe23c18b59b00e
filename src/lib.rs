//! # Image Merge Library
//!
//! Combines images whose file names share a letter prefix (`A1.jpg`, `A2.jpg`,
//! `A10.png`) into one composite image per prefix, laid out horizontally,
//! vertically or in a grid.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `grouping`: Parses `<letters><digits>.<ext>` names and builds ordered groups
//! - `raster`: Decodes encoded bytes into RGBA pixel buffers
//! - `compositor`: Paints a layout onto a canvas behind a surface abstraction
//! - `encoder`: Serializes the canvas to PNG or JPEG
//! - `source` / `sink`: Reading inputs from disk and persisting results
//! - `config`: Configuration management and validation
//! - `session`: High-level batch orchestration
//!
//! Pure geometry (canvas size, placements, scaling) lives in the
//! `merge_layout` crate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use image_merge::{read_images_in_dir, DirectorySink, MergeOptions, MergeSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let batch = read_images_in_dir("Photos".as_ref()).await?;
//! let session = MergeSession::builder()
//!     .with_options(MergeOptions::default())
//!     .with_sink(DirectorySink::new("."))
//!     .build()?;
//!
//! let report = session.run(batch).await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod compositor;
pub mod config;
pub mod encoder;
pub mod error;
pub mod grouping;
pub mod raster;
pub mod session;
pub mod sink;
pub mod source;

/// Re-export error types for convenience
pub use error::{ErrorSeverity, HasRecoverySuggestion, HasSeverity, MergeError, MergeResult};

pub use compositor::{composite, CpuSurfaceProvider, Surface, SurfaceProvider};
pub use config::{Arrangement, MergeConfig, MergeOptions, OutputFormat, Rgba, TargetSize};
pub use grouping::{group_images, Group, RawImage};
pub use session::{merge_images, BatchReport, GroupFailure, MergeSession, MergeSessionBuilder};
pub use sink::{output_subdirectory, CompositeResult, DirectorySink, OutputSink};
pub use source::{read_image_files, read_images_in_dir, InputBatch};
