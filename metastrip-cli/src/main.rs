//! CLI for metastrip: write copies of PNG and JPEG files without their metadata chunks.

use anyhow::{bail, Context};
use clap::Parser;
use glob::glob;
use metastrip::image_file::{ImageFile, ImageFormat};
use metastrip::strip::strip;
use metastrip::strip_policy::StripPolicy;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::NamedTempFile;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "metastrip", version)]
#[command(about = "Strip metadata chunks from PNG and JPEG files without re-encoding them", long_about = None)]
struct Args {
    /// Files or glob patterns to process (e.g. "photos/**/*.jpg")
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Retention policy file (`png.keep = ...`, `jpeg.drop = ...`). Built-in defaults otherwise.
    #[arg(short, long, value_name = "FILE")]
    policy: Option<PathBuf>,

    /// Directory for stripped files. Defaults to the directory of each input.
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Inserted before the extension of each output name: photo.<suffix>.jpg
    #[arg(short, long, default_value = "stripped")]
    suffix: String,

    /// Print the chunk/segment directory of each file instead of writing output
    #[arg(short, long)]
    list: bool,

    /// Fail files that have data after their last chunk or segment
    #[arg(long)]
    strict: bool,

    /// Log every dropped chunk (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            error!(failed, "some files could not be processed");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Processes every input and returns how many failed.
fn run(args: &Args) -> anyhow::Result<usize> {
    let policy = match &args.policy {
        Some(path) => StripPolicy::from_file(path)
            .with_context(|| format!("failed to load policy {}", path.display()))?,
        None => StripPolicy::default(),
    };
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let inputs = expand_patterns(&args.patterns)?;
    let mut failed = 0;
    for input in &inputs {
        if let Err(err) = process(input, args, &policy) {
            error!(path = %input.display(), "{err:#}");
            failed += 1;
        }
    }
    info!(files = inputs.len(), failed, "done");
    Ok(failed)
}

fn process(input: &Path, args: &Args, policy: &StripPolicy) -> anyhow::Result<()> {
    let mut image = ImageFile::open(input)?;
    if args.strict {
        image = image.into_strict()?;
    }

    if args.list {
        print!("{image}");
        return Ok(());
    }

    let output = output_path(input, image.format(), args.out_dir.as_deref(), &args.suffix);
    if writes_over(input, &output)? {
        bail!(
            "output {} would overwrite the input, choose a suffix or output directory",
            output.display()
        );
    }

    // Stage next to the destination so a failed strip leaves nothing behind.
    let mut staged = NamedTempFile::new_in(parent_dir(&output))
        .with_context(|| format!("failed to create a temporary file for {}", output.display()))?;
    let report = {
        let mut sink = BufWriter::new(staged.as_file_mut());
        let report = strip(&image, policy, &mut sink)?;
        sink.flush()?;
        report
    };
    staged
        .persist(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    image.close()?;

    info!(
        input = %input.display(),
        output = %output.display(),
        kept = report.kept,
        dropped = ?report.dropped,
        bytes = report.bytes_written,
        "stripped"
    );
    Ok(())
}

/// Expands glob patterns. A pattern matching nothing is passed through as a literal path so the
/// open error gets reported for it.
fn expand_patterns(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let before = paths.len();
        let entries = glob(pattern).with_context(|| format!("invalid pattern {pattern:?}"))?;
        for entry in entries {
            let path = entry?;
            if path.is_file() {
                paths.push(path);
            }
        }
        if paths.len() == before {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

/// Whether `output` names the same file as `input`, however the two paths are spelled.
fn writes_over(input: &Path, output: &Path) -> anyhow::Result<bool> {
    let input = std::fs::canonicalize(input)
        .with_context(|| format!("failed to resolve {}", input.display()))?;
    let Some(name) = output.file_name() else {
        return Ok(false);
    };
    match std::fs::canonicalize(parent_dir(output)) {
        Ok(dir) => Ok(dir.join(name) == input),
        Err(_) => Ok(false),
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn output_path(input: &Path, format: ImageFormat, out_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let extension = input
        .extension()
        .map(|ext| ext.to_string_lossy())
        .unwrap_or(format.extension().into());
    let name = if suffix.is_empty() {
        format!("{stem}.{extension}")
    } else {
        format!("{stem}.{suffix}.{extension}")
    };
    match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}
