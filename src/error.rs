use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// The main error type for cxrprep operations.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse bounding-box CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Non-finite bounding box in {path} at data row {row} ({image_id})")]
    NonFiniteBox {
        path: PathBuf,
        row: usize,
        image_id: String,
    },

    #[error("Invalid image dimensions {width}x{height}: both must be greater than zero")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid class mapping: {message}")]
    InvalidClassMap { message: String },

    #[error("Invalid classes file {path}: {message}")]
    ClassesTxtInvalid { path: PathBuf, message: String },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to write dataset descriptor {path}: {source}")]
    DescriptorWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse dataset descriptor {path}: {source}")]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(
        "Split percentages must sum to 100 (got train={train} + test={test} + val={val} = {sum})"
    )]
    InvalidSplit {
        train: u8,
        test: u8,
        val: u8,
        sum: u32,
    },

    #[error("Requested {requested} images, but only {available} valid images with annotations are available")]
    InsufficientImages { requested: usize, available: usize },

    #[error("Failed while traversing {path}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to parse pipeline config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize report as JSON: {source}")]
    ReportJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to launch trainer '{program}': {source}")]
    TrainLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Trainer '{program}' exited unsuccessfully ({status})")]
    TrainFailed { program: String, status: ExitStatus },
}
