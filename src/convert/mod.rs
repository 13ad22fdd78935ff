//! Bounding-box CSV to YOLO label conversion.
//!
//! Each record whose finding label is in the [`ClassMapping`] becomes one
//! normalized line in `<output_dir>/<image_stem>.txt`. Unknown labels are
//! logged and skipped.
//!
//! # Several boxes on one image
//!
//! The historical behaviour is last-write-wins: every row for an image
//! rewrites that image's label file, so only the box from the last row
//! survives. That is [`LabelWriteMode::Overwrite`], the default.
//! [`LabelWriteMode::Accumulate`] writes one line per box instead.
//!
//! # Image dimensions
//!
//! By default one width and height apply to every record
//! ([`ImageDimensions::Fixed`]). [`ImageDimensions::FromImages`] reads each
//! image's size from its file header instead.

mod report;

pub use report::ConvertReport;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::annotation::{BoundingBoxRecord, ClassMapping, NormalizedAnnotation};
use crate::error::PrepError;

/// Image width and height used when none are configured.
pub const DEFAULT_IMAGE_SIZE: u32 = 1024;

/// How rows for the same image combine in its label file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelWriteMode {
    /// Each row replaces the file; the last row for an image wins.
    #[default]
    Overwrite,
    /// Each row adds a line; rows keep their table order.
    Accumulate,
}

/// Where the normalization divisors come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageDimensions {
    /// The same size for every image.
    Fixed { width: u32, height: u32 },
    /// Read each image's size from `<dir>/<image_id>`.
    FromImages(PathBuf),
}

impl Default for ImageDimensions {
    fn default() -> Self {
        ImageDimensions::Fixed {
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
        }
    }
}

/// Converter settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub dimensions: ImageDimensions,
    pub write_mode: LabelWriteMode,
}

/// Reads a bounding-box CSV and converts it. See [`convert_records`].
pub fn convert_csv(
    csv_path: &Path,
    classes: &ClassMapping,
    opts: &ConvertOptions,
    output_dir: &Path,
) -> Result<ConvertReport, PrepError> {
    let records = crate::annotation::read_bbox_csv(csv_path)?;
    info!(
        "Loaded {} bounding-box rows from {}",
        records.len(),
        csv_path.display()
    );
    convert_records(&records, classes, opts, output_dir)
}

/// Writes one YOLO label file per image.
///
/// # Errors
/// Fails on invalid fixed dimensions, or when the output directory or a label
/// file cannot be written. Unknown labels and unreadable images are not
/// errors; they are logged, counted in the report and skipped.
pub fn convert_records(
    records: &[BoundingBoxRecord],
    classes: &ClassMapping,
    opts: &ConvertOptions,
    output_dir: &Path,
) -> Result<ConvertReport, PrepError> {
    if let ImageDimensions::Fixed { width, height } = opts.dimensions {
        if width == 0 || height == 0 {
            return Err(PrepError::InvalidDimensions { width, height });
        }
    }

    fs::create_dir_all(output_dir)?;

    let mut report = ConvertReport::new(output_dir);
    report.rows = records.len();

    let mut dimensions = DimensionSource::new(&opts.dimensions);
    // Label files in first-seen order, with the lines each will hold.
    let mut files: Vec<(String, Vec<String>)> = Vec::new();
    let mut file_index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(class_id) = classes.id_of(&record.finding_label) else {
            warn!(
                "Unknown class: {} ({}), skipping",
                record.finding_label, record.image_id
            );
            report.record_unknown_label(&record.finding_label);
            continue;
        };

        let Some((width, height)) = dimensions.lookup(&record.image_id) else {
            report.skipped_unreadable_images += 1;
            continue;
        };

        let bbox = record.bbox().to_normalized_center(width, height);
        let line = NormalizedAnnotation::new(class_id, bbox).to_line();
        let stem = record.image_stem().to_string();

        let index = *file_index.entry(stem.clone()).or_insert_with(|| {
            files.push((stem.clone(), Vec::new()));
            files.len() - 1
        });
        let lines = &mut files[index].1;

        match opts.write_mode {
            LabelWriteMode::Overwrite => {
                if !lines.is_empty() {
                    debug!("Replacing earlier annotation for {}", stem);
                    report.replaced_annotations += lines.len();
                    lines.clear();
                }
                lines.push(line);
            }
            LabelWriteMode::Accumulate => lines.push(line),
        }
    }

    for (stem, lines) in &files {
        let path = output_dir.join(format!("{stem}.txt"));
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content)?;

        report.label_files += 1;
        report.annotations_written += lines.len();
    }

    info!(
        "YOLO annotations saved in '{}' ({} files)",
        output_dir.display(),
        report.label_files
    );
    Ok(report)
}

/// Resolves normalization divisors per record, caching header reads.
struct DimensionSource<'a> {
    dimensions: &'a ImageDimensions,
    cache: HashMap<String, Option<(f64, f64)>>,
}

impl<'a> DimensionSource<'a> {
    fn new(dimensions: &'a ImageDimensions) -> Self {
        Self {
            dimensions,
            cache: HashMap::new(),
        }
    }

    fn lookup(&mut self, image_id: &str) -> Option<(f64, f64)> {
        let dimensions = self.dimensions;
        match dimensions {
            ImageDimensions::Fixed { width, height } => Some((*width as f64, *height as f64)),
            ImageDimensions::FromImages(dir) => *self
                .cache
                .entry(image_id.to_string())
                .or_insert_with(|| match read_image_dimensions(&dir.join(image_id)) {
                    Ok(size) => Some(size),
                    Err(err) => {
                        warn!("{}, skipping", err);
                        None
                    }
                }),
        }
    }
}

fn read_image_dimensions(path: &Path) -> Result<(f64, f64), PrepError> {
    let size = imagesize::size(path).map_err(|source| PrepError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    if size.width == 0 || size.height == 0 {
        return Err(PrepError::InvalidDimensions {
            width: size.width as u32,
            height: size.height as u32,
        });
    }

    Ok((size.width as f64, size.height as f64))
}
