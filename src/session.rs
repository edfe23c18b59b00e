//! # Merge Session
//!
//! High-level orchestration of a grouped merge: group the inputs by name, then
//! run each group through decode → layout → composite → encode → sink, one
//! group at a time.
//!
//! ## Resource Model
//!
//! Groups run strictly one after another. A group's decoded images and its
//! canvas are dropped before the next group starts, so peak memory is one
//! group's worth of pixels no matter how large the batch is.
//!
//! ## Failure Model
//!
//! - No qualifying group: [`MergeError::NoQualifyingGroups`], nothing written
//! - Any per-group failure (decode, layout, draw, encode, sink): recorded in
//!   the [`BatchReport`] and the batch moves on to the next group
//! - Cancellation is checked between groups only

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use merge_layout::plan::build_plan;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::compositor::{composite, CpuSurfaceProvider, Surface, SurfaceProvider};
use crate::config::MergeOptions;
use crate::encoder::encode;
use crate::error::{MergeError, MergeResult};
use crate::grouping::{group_images, Group, RawImage};
use crate::raster::{decode, load_group, LoadedImage};
use crate::sink::{output_subdirectory, CompositeResult, OutputSink};
use crate::source::InputBatch;

/// One group that produced no output.
#[derive(Debug)]
pub struct GroupFailure {
    pub key: String,
    pub error: MergeError,
}

/// Outcome of a grouped merge.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Groups whose pipeline was started.
    pub attempted: usize,
    /// Groups whose image reached the sink.
    pub succeeded: usize,
    pub failures: Vec<GroupFailure>,
    /// Paths returned by the sink, in group order.
    pub outputs: Vec<PathBuf>,
    pub output_subdirectory: String,
    /// Set when the batch stopped early on request.
    pub cancelled: bool,
}

impl BatchReport {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Merged {} of {} group(s) into '{}'",
            self.succeeded, self.attempted, self.output_subdirectory
        );
        if !self.failures.is_empty() {
            let keys: Vec<&str> = self.failures.iter().map(|f| f.key.as_str()).collect();
            line.push_str(&format!("; failed: {}", keys.join(", ")));
        }
        if self.cancelled {
            line.push_str("; cancelled");
        }
        line
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "attempted": self.attempted,
            "succeeded": self.succeeded,
            "cancelled": self.cancelled,
            "output_subdirectory": self.output_subdirectory,
            "outputs": self.outputs.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            "failures": self.failures.iter().map(|f| json!({
                "group": f.key,
                "category": f.error.category(),
                "error": f.error.to_string(),
            })).collect::<Vec<_>>(),
        })
    }
}

/// Orchestrates grouped merges.
pub struct MergeSession<P: SurfaceProvider = CpuSurfaceProvider> {
    options: MergeOptions,
    sink: Box<dyn OutputSink>,
    provider: P,
    cancel: Arc<AtomicBool>,
}

impl MergeSession<CpuSurfaceProvider> {
    /// Create a new merge session using the builder pattern.
    pub fn builder() -> MergeSessionBuilder<CpuSurfaceProvider> {
        MergeSessionBuilder::new()
    }
}

impl<P: SurfaceProvider> MergeSession<P> {
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Flag that stops the batch before its next group when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the grouped merge over `batch`.
    pub async fn run(&self, batch: InputBatch) -> MergeResult<BatchReport> {
        let inputs = batch.items.len();
        let groups = group_images(batch.items);
        if groups.is_empty() {
            return Err(MergeError::NoQualifyingGroups { inputs });
        }

        let mut report = BatchReport {
            output_subdirectory: output_subdirectory(&batch.source_folder_name),
            ..BatchReport::default()
        };
        info!(
            inputs,
            groups = groups.len(),
            output = %report.output_subdirectory,
            "starting merge"
        );

        for group in groups {
            if self.cancel.load(Ordering::SeqCst) {
                warn!("merge cancelled, remaining groups skipped");
                report.cancelled = true;
                break;
            }

            report.attempted += 1;
            let key = group.key.clone();
            match self.merge_group(group, &report.output_subdirectory).await {
                Ok(path) => {
                    info!(group = %key, path = %path.display(), "group merged");
                    report.succeeded += 1;
                    report.outputs.push(path);
                }
                Err(error) => {
                    warn!(group = %key, %error, "group skipped");
                    report.failures.push(GroupFailure { key, error });
                }
            }
        }

        info!("{}", report.summary());
        Ok(report)
    }

    /// Full pipeline for one group. Decoded pixels are released when the
    /// loaded group goes out of scope, on success and on every error path.
    async fn merge_group(&self, group: Group<RawImage>, subdirectory: &str) -> MergeResult<PathBuf> {
        let artifact = {
            let loaded = load_group(group)?;
            let bytes = render(&self.provider, &loaded.images, &self.options)?;
            CompositeResult {
                bytes,
                filename: format!("{}.{}", loaded.key, self.options.format.extension()),
                subdirectory: subdirectory.to_string(),
            }
        };
        self.sink.write(&artifact).await
    }
}

/// Layout, composite and encode already-decoded images.
fn render<P: SurfaceProvider>(
    provider: &P,
    images: &[LoadedImage],
    options: &MergeOptions,
) -> MergeResult<Vec<u8>> {
    let sizes: Vec<_> = images.iter().map(LoadedImage::size).collect();
    let plan = build_plan(&sizes, options.arrangement, options.gap, options.target)?;
    debug!(
        natural_width = plan.natural.width,
        natural_height = plan.natural.height,
        "layout planned"
    );
    let canvas = composite(provider, images, &plan, options.background)?.into_image();
    encode(canvas, options.format)
}

/// Merge `images` in the given order into one encoded image, without grouping.
pub fn merge_images<P: SurfaceProvider>(
    images: &[RawImage],
    options: &MergeOptions,
    provider: &P,
) -> MergeResult<Vec<u8>> {
    let loaded = images.iter().map(decode).collect::<MergeResult<Vec<_>>>()?;
    render(provider, &loaded, options)
}

/// Builder for creating merge sessions with fluent API.
pub struct MergeSessionBuilder<P: SurfaceProvider> {
    options: MergeOptions,
    sink: Option<Box<dyn OutputSink>>,
    provider: P,
    cancel: Option<Arc<AtomicBool>>,
}

impl MergeSessionBuilder<CpuSurfaceProvider> {
    pub fn new() -> Self {
        Self {
            options: MergeOptions::default(),
            sink: None,
            provider: CpuSurfaceProvider,
            cancel: None,
        }
    }
}

impl Default for MergeSessionBuilder<CpuSurfaceProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SurfaceProvider> MergeSessionBuilder<P> {
    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Share an externally owned cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Swap the drawing backend.
    pub fn with_surface_provider<Q: SurfaceProvider>(self, provider: Q) -> MergeSessionBuilder<Q> {
        MergeSessionBuilder {
            options: self.options,
            sink: self.sink,
            provider,
            cancel: self.cancel,
        }
    }

    /// Build the session.
    pub fn build(self) -> MergeResult<MergeSession<P>> {
        let sink = self
            .sink
            .ok_or_else(|| MergeError::config("sink", "none", "an output sink is required"))?;
        Ok(MergeSession {
            options: self.options,
            sink,
            provider: self.provider,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}
