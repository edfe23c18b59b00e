use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use image_merge::config::{FormatChoice, LayoutMode, MergeConfig};
use image_merge::sink::write_single;
use image_merge::{
    merge_images, read_image_files, read_images_in_dir, CpuSurfaceProvider, DirectorySink,
    HasRecoverySuggestion, InputBatch, MergeError, MergeSession,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Merge numbered images (A1.jpg, A2.jpg, ...) into one image per letter prefix.
#[derive(Parser, Debug)]
#[command(name = "imerge")]
#[command(about = "🖼  Merge numbered images into one composite per name prefix")]
#[command(long_about = "Merge images whose names share a letter prefix (A1.jpg, A2.jpg, A10.png)
into one composite per prefix, written to a '<folder>_merged' directory next to the source folder.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Show per-group geometry and resource logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Group inputs by name prefix and write one merged image per group
    Groups {
        /// One directory, or a set of image files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Root directory for the '<folder>_merged' output (default: next to the source folder)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        merge: MergeArgs,
    },

    /// Merge the given files, in order, into a single image
    Join {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        merge: MergeArgs,
    },
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Arrangement of the images
    #[arg(long, value_enum, default_value_t = LayoutMode::Horizontal)]
    layout: LayoutMode,

    /// Pixels between neighbouring images
    #[arg(long, default_value_t = 8)]
    gap: u32,

    /// Canvas color: #rgb, #rrggbb or #rrggbbaa
    #[arg(long, default_value = "#ffffff")]
    background: String,

    /// Grid columns (default: ceil(sqrt(n)))
    #[arg(long)]
    columns: Option<u32>,

    /// Scale the merged image to this width
    #[arg(long)]
    width: Option<f64>,

    /// Scale the merged image to this height (with --width: fit inside both)
    #[arg(long)]
    height: Option<f64>,

    /// Output encoding
    #[arg(long, value_enum, default_value_t = FormatChoice::Jpeg)]
    format: FormatChoice,

    /// JPEG quality in [0, 1]
    #[arg(long, default_value_t = 0.92)]
    quality: f32,
}

impl MergeArgs {
    fn to_config(&self, destination: Option<PathBuf>) -> MergeConfig {
        MergeConfig {
            layout: self.layout,
            gap: self.gap,
            background: self.background.clone(),
            columns: self.columns,
            target_width: self.width,
            target_height: self.height,
            format: self.format,
            quality: self.quality,
            destination,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Command::Groups {
            inputs,
            out,
            json,
            merge,
        } => run_groups(&inputs, merge.to_config(out), json).await,
        Command::Join {
            files,
            output,
            merge,
        } => run_join(&files, &output, merge.to_config(None)).await,
    };

    outcome.map_err(|e| {
        if let Some(hint) = e.recovery_suggestion() {
            eprintln!("hint: {}", hint);
        }
        anyhow!(e)
    })
}

/// Log to stderr so `--json` output stays machine-readable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn read_inputs(inputs: &[PathBuf]) -> Result<InputBatch, MergeError> {
    if let [single] = inputs {
        let is_dir = tokio::fs::metadata(single)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            return read_images_in_dir(single).await;
        }
    }
    read_image_files(inputs).await
}

/// Parent of the source folder, so `Photos_merged` lands next to `Photos`.
fn default_destination(batch: &InputBatch) -> PathBuf {
    batch
        .origin
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Set the flag on Ctrl-C; the session notices it before its next group.
fn install_ctrl_c(flag: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, stopping after the current group");
            flag.store(true, Ordering::SeqCst);
        }
    });
}

async fn run_groups(inputs: &[PathBuf], config: MergeConfig, json: bool) -> Result<(), MergeError> {
    let options = config.to_merge_options()?;
    let batch = read_inputs(inputs).await?;
    let root = config
        .destination
        .clone()
        .unwrap_or_else(|| default_destination(&batch));
    debug!(root = %root.display(), items = batch.items.len(), "resolved inputs");

    let cancel = Arc::new(AtomicBool::new(false));
    install_ctrl_c(Arc::clone(&cancel));

    let session = MergeSession::builder()
        .with_options(options)
        .with_sink(DirectorySink::new(root))
        .with_cancel_flag(cancel)
        .build()?;
    let report = session.run(batch).await?;

    if json {
        println!("{}", report.to_json());
    } else {
        println!("{}", report.summary());
        for path in &report.outputs {
            println!("  {}", path.display());
        }
    }

    if report.cancelled {
        return Err(MergeError::Cancelled);
    }
    if let Some(first) = report.failures.into_iter().next() {
        return Err(first.error);
    }
    Ok(())
}

async fn run_join(files: &[PathBuf], output: &Path, config: MergeConfig) -> Result<(), MergeError> {
    let options = config.to_merge_options()?;
    let batch = read_image_files(files).await?;
    let bytes = merge_images(&batch.items, &options, &CpuSurfaceProvider)?;
    let path = write_single(output, &bytes).await?;
    info!(path = %path.display(), images = batch.items.len(), "joined images");
    println!("{}", path.display());
    Ok(())
}
