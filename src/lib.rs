//! cxrprep: chest X-ray detection dataset preparation.
//!
//! cxrprep turns the bounding-box CSV published with the NIH chest X-ray
//! dataset into YOLO label files, writes the dataset descriptor a YOLO trainer
//! reads, and partitions images plus labels into train/test/val folders.
//!
//! # Modules
//!
//! - [`annotation`]: Box geometry, class vocabulary, CSV records and label lines
//! - [`convert`]: CSV rows to per-image YOLO label files
//! - [`descriptor`]: Dataset descriptor YAML
//! - [`split`]: Random train/test/val partitioning
//! - [`housekeeping`]: Directory clearing and copying between stages
//! - [`train`]: External trainer launcher
//! - [`pipeline`]: All stages driven by one config
//! - [`error`]: Error types for cxrprep operations

pub mod annotation;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod housekeeping;
pub mod pipeline;
pub mod split;
pub mod train;

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use annotation::ClassMapping;
use convert::{ConvertOptions, ImageDimensions, LabelWriteMode};
use pipeline::PipelineConfig;
use split::{SplitOptions, SplitPercentages};
use train::TrainOptions;

pub use error::PrepError;

/// The cxrprep CLI application.
#[derive(Parser)]
#[command(name = "cxrprep")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert the bounding-box CSV into per-image YOLO label files.
    Convert(ConvertArgs),
    /// Write the dataset descriptor YAML.
    Descriptor(DescriptorArgs),
    /// Partition images and labels into train/test/val folders.
    Split(SplitArgs),
    /// Run descriptor, conversion and partitioning in one go.
    Prepare(PrepareArgs),
    /// Launch the external YOLO trainer on a prepared dataset.
    Train(TrainArgs),
}

/// Report rendering for the CLI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Bounding-box CSV to read.
    #[arg(long, env = "CXRPREP_CSV", default_value = "BBox_List_2017.csv")]
    csv: PathBuf,

    /// Directory receiving one `<stem>.txt` per image.
    #[arg(long, default_value = "annotations_yolo")]
    out_dir: PathBuf,

    /// Image width in pixels used for normalization.
    #[arg(long, default_value_t = convert::DEFAULT_IMAGE_SIZE)]
    width: u32,

    /// Image height in pixels used for normalization.
    #[arg(long, default_value_t = convert::DEFAULT_IMAGE_SIZE)]
    height: u32,

    /// Read each image's size from this directory instead of --width/--height.
    #[arg(long, value_name = "IMAGE_DIR")]
    image_sizes_from: Option<PathBuf>,

    /// Keep every box of an image instead of only the last one.
    #[arg(long)]
    accumulate: bool,

    /// classes.txt overriding the built-in 14 findings.
    #[arg(long, env = "CXRPREP_CLASSES")]
    classes: Option<PathBuf>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the descriptor subcommand.
#[derive(clap::Args)]
struct DescriptorArgs {
    /// Dataset root recorded in the descriptor.
    #[arg(long, default_value = "datasets/coco8")]
    dataset: PathBuf,

    /// Descriptor file to write.
    #[arg(long, default_value = "data/coco8.yaml")]
    out: PathBuf,

    /// classes.txt overriding the built-in 14 findings.
    #[arg(long, env = "CXRPREP_CLASSES")]
    classes: Option<PathBuf>,
}

/// Arguments for the split subcommand.
#[derive(clap::Args)]
struct SplitArgs {
    /// Image pool (non-recursive).
    #[arg(long, default_value = "data/images")]
    images: PathBuf,

    /// Directory holding `<stem>.txt` label files.
    #[arg(long, default_value = "data/annotations")]
    annotations: PathBuf,

    /// Dataset root receiving `images/` and `labels/`.
    #[arg(long, default_value = "datasets/coco8")]
    out_dir: PathBuf,

    /// Number of image + label pairs to sample.
    #[arg(long, default_value_t = 10)]
    total: usize,

    /// Training share in percent.
    #[arg(long, default_value_t = 70)]
    train: u8,

    /// Test share in percent.
    #[arg(long, default_value_t = 20)]
    test: u8,

    /// Validation share in percent.
    #[arg(long, default_value_t = 10)]
    val: u8,

    /// Seed for a reproducible partition.
    #[arg(long, env = "CXRPREP_SEED")]
    seed: Option<u64>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the prepare subcommand.
#[derive(clap::Args)]
struct PrepareArgs {
    /// YAML pipeline config; built-in defaults when omitted.
    #[arg(long, env = "CXRPREP_CONFIG")]
    config: Option<PathBuf>,

    /// Seed overriding the config's.
    #[arg(long, env = "CXRPREP_SEED")]
    seed: Option<u64>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the train subcommand.
#[derive(clap::Args)]
struct TrainArgs {
    /// Trainer executable.
    #[arg(long, env = "CXRPREP_TRAINER", default_value = "yolo")]
    program: String,

    /// Dataset descriptor.
    #[arg(long, default_value = "data/coco8.yaml")]
    data: PathBuf,

    /// Number of epochs.
    #[arg(long, default_value_t = 1)]
    epochs: u32,

    /// Model or weights to start from.
    #[arg(long)]
    model: Option<String>,

    /// Directory the trainer writes runs into.
    #[arg(long, default_value = "runs")]
    runs_dir: PathBuf,

    /// Delete previous runs before training.
    #[arg(long)]
    clear_runs: bool,

    /// Extra `key=value` arguments passed to the trainer.
    #[arg(last = true)]
    extra: Vec<String>,
}

/// Run the cxrprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PrepError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => run_convert(args),
        Commands::Descriptor(args) => run_descriptor(args),
        Commands::Split(args) => run_split(args),
        Commands::Prepare(args) => run_prepare(args),
        Commands::Train(args) => run_train(args),
    }
}

fn load_classes(path: Option<&PathBuf>) -> Result<ClassMapping, PrepError> {
    match path {
        Some(path) => ClassMapping::from_classes_txt(path),
        None => Ok(ClassMapping::chest_xray()),
    }
}

fn emit<T: Serialize + fmt::Display>(report: &T, output: OutputFormat) -> Result<(), PrepError> {
    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)
                .map_err(|source| PrepError::ReportJson { source })?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{report}"),
    }
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<(), PrepError> {
    let classes = load_classes(args.classes.as_ref())?;
    let dimensions = match args.image_sizes_from {
        Some(dir) => ImageDimensions::FromImages(dir),
        None => ImageDimensions::Fixed {
            width: args.width,
            height: args.height,
        },
    };
    let opts = ConvertOptions {
        dimensions,
        write_mode: if args.accumulate {
            LabelWriteMode::Accumulate
        } else {
            LabelWriteMode::Overwrite
        },
    };

    let report = convert::convert_csv(&args.csv, &classes, &opts, &args.out_dir)?;
    emit(&report, args.output)
}

fn run_descriptor(args: DescriptorArgs) -> Result<(), PrepError> {
    let classes = load_classes(args.classes.as_ref())?;
    descriptor::generate_descriptor(&args.dataset, classes.names(), &args.out)?;
    println!("Descriptor written to '{}'", args.out.display());
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<(), PrepError> {
    let opts = SplitOptions {
        image_dir: args.images,
        annotation_dir: args.annotations,
        output_dir: args.out_dir,
        total: args.total,
        percentages: SplitPercentages::new(args.train, args.test, args.val),
        seed: args.seed,
    };

    let report = split::partition(&opts)?;
    emit(&report, args.output)
}

fn run_prepare(args: PrepareArgs) -> Result<(), PrepError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let report = pipeline::run_pipeline(&config)?;
    emit(&report, args.output)
}

fn run_train(args: TrainArgs) -> Result<(), PrepError> {
    if args.clear_runs {
        housekeeping::clear_folders(&args.runs_dir)?;
    }

    let opts = TrainOptions {
        program: args.program,
        data: args.data,
        epochs: args.epochs,
        model: args.model,
        runs_dir: args.runs_dir,
        extra_args: args.extra,
    };
    train::run_training(&opts)?;
    info!("Runs written under '{}'", opts.runs_dir.display());
    Ok(())
}
