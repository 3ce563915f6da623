use anyhow::{bail, Context, Result};
use clap::Parser;
use ogc_gml::{
    convert_gml, parse_gml_with, ConvertOptions, GmlDocument, GmlError, GmlVersion,
    OwsExceptionReport, ParseOptions, RasterMetadata,
};
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const INPUT_EXTENSIONS: &[&str] = &["gml", "xml"];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input GML file, or a directory searched recursively for .gml/.xml files
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", required_unless_present = "inspect")]
    output: Option<PathBuf>,

    /// Target GML version (2.1.2 or 3.2)
    #[arg(long, value_name = "VERSION", default_value = "3.2")]
    to: GmlVersion,

    /// Source GML version; detected from the namespace when omitted
    #[arg(long, value_name = "VERSION")]
    from: Option<GmlVersion>,

    /// Indent the written GML
    #[arg(long)]
    pretty: bool,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Log a summary of each document instead of converting it
    #[arg(long)]
    inspect: bool,
}

impl Args {
    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            input_version: self.from,
            output_version: self.to,
            pretty_print: self.pretty,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let start_time = std::time::Instant::now();

    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    run(&args)?;

    info!("Total processing time: {:?}", start_time.elapsed());
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    if let Some(output) = &args.output {
        fs::create_dir_all(output)
            .with_context(|| format!("Failed to create output directory {:?}", output))?;
    }

    if args.input.is_file() {
        if !has_input_extension(&args.input) {
            error!("Unsupported file type: {:?}", args.input);
            bail!("Input file must be .gml or .xml");
        }
        process_file(&args.input, args)
    } else if args.input.is_dir() {
        info!("Processing directory: {:?}", args.input);
        process_directory(&args.input, args)
    } else {
        error!("Invalid input path: {:?}", args.input);
        bail!("Input path must be a file or directory");
    }
}

fn process_file(path: &Path, args: &Args) -> Result<()> {
    info!("Processing file: {:?}", path);
    let xml = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

    if args.inspect {
        let options = ParseOptions {
            version_override: args.from,
        };
        let document = parse_gml_with(&xml, &options).map_err(|e| report_failure(path, e))?;
        inspect(path, &document);
        return Ok(());
    }

    let output_dir = match &args.output {
        Some(output) => output,
        None => bail!("An output directory is required unless --inspect is given"),
    };
    let converted =
        convert_gml(&xml, &args.convert_options()).map_err(|e| report_failure(path, e))?;

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let output_path = output_dir.join(format!("{}.gml", stem));
    fs::write(&output_path, converted)
        .with_context(|| format!("Failed to write {:?}", output_path))?;
    info!("Written GML {}: {:?}", args.to, output_path);
    Ok(())
}

/// Logs service exception reports in full before handing the error back.
fn report_failure(path: &Path, err: GmlError) -> anyhow::Error {
    if let Some(report) = err.exception_report() {
        log_exception_report(path, report);
    }
    anyhow::Error::new(err)
}

fn log_exception_report(path: &Path, report: &OwsExceptionReport) {
    error!(
        "{:?} is an exception report (version {}) with {} exceptions",
        path,
        report.version,
        report.exceptions.len()
    );
    for exception in &report.exceptions {
        error!(
            "  code={} locator={}",
            exception.exception_code,
            exception.locator.as_deref().unwrap_or("-")
        );
        for text in &exception.exception_text {
            error!("    {}", text);
        }
    }
}

fn inspect(path: &Path, document: &GmlDocument) {
    info!("{:?}: {}", path, describe(document));
    if let GmlDocument::Coverage(coverage) = document {
        match RasterMetadata::from_coverage(coverage) {
            Ok(raster) => info!(
                "  {}x{} pixels, crs {}, bbox {:?}, resolution {:?}, rotation {}°, {} bands",
                raster.width,
                raster.height,
                raster.crs.as_deref().unwrap_or("unknown"),
                raster.bbox.to_array(),
                raster.resolution,
                raster.rotation,
                raster.bands.len()
            ),
            Err(e) => warn!("  no raster metadata: {}", e),
        }
    }
}

fn describe(document: &GmlDocument) -> String {
    let version = document.version();
    match document {
        GmlDocument::Geometry(geometry) => format!(
            "GML {} {} with {} positions",
            version,
            geometry.kind.type_name(),
            geometry.kind.positions().len()
        ),
        GmlDocument::Feature(feature) => format!(
            "GML {} feature {} ({}) with {} properties",
            version,
            feature.feature_type,
            feature.geometry.kind.type_name(),
            feature.properties.len()
        ),
        GmlDocument::FeatureCollection(collection) => format!(
            "GML {} {} with {} features",
            version,
            collection.name,
            collection.features.len()
        ),
        GmlDocument::Coverage(coverage) => format!(
            "GML {} {} with {} bands",
            version,
            coverage.kind.tag(),
            coverage.range_type.len()
        ),
    }
}

fn process_directory(dir: &Path, args: &Args) -> Result<()> {
    use rayon::prelude::*;

    let input_files = collect_input_files(dir)?;
    info!("Found {} input files (GML/XML)", input_files.len());

    let results: Vec<Result<()>> = input_files
        .par_iter()
        .map(|path| process_file(path, args))
        .collect();

    let mut errors = Vec::new();
    for (path, result) in input_files.iter().zip(results) {
        if let Err(e) = result {
            errors.push(format!("{}: {}", path.display(), e));
        }
    }

    info!(
        "Processed {} files, {} failed",
        input_files.len(),
        errors.len()
    );
    if !errors.is_empty() {
        error!("Failed to process {} files:", errors.len());
        for err in &errors {
            error!("  {}", err);
        }
        bail!("{} files failed to process", errors.len());
    }

    Ok(())
}

fn collect_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(collect_input_files(&path)?);
        } else if has_input_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| INPUT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
