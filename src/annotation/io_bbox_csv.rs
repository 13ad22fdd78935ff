//! Bounding-box CSV reader.
//!
//! The source table is the chest X-ray `BBox_List` export. Each row describes
//! one finding on one image:
//!
//! | column          | meaning                         |
//! |-----------------|---------------------------------|
//! | `Image Index`   | image filename                  |
//! | `Finding Label` | finding (class) name            |
//! | `Bbox [x`       | left edge in pixels             |
//! | `y`             | top edge in pixels              |
//! | `w`             | box width in pixels             |
//! | `h]`            | box height in pixels            |
//!
//! The odd `Bbox [x` / `h]` headers come from the upstream export, which
//! splits a `Bbox [x,y,w,h]` header on commas. Extra columns (the export has
//! trailing empty ones) are ignored. Headers and fields are whitespace-trimmed.
//!
//! Numeric fields are parsed strictly: a malformed number, or a `NaN`/`inf`
//! coordinate, fails the whole read rather than being coerced.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use super::bbox::BBoxXYWH;
use super::space::Pixel;
use crate::error::PrepError;

/// One row of the source table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BoundingBoxRecord {
    #[serde(rename = "Image Index")]
    pub image_id: String,
    #[serde(rename = "Finding Label")]
    pub finding_label: String,
    #[serde(rename = "Bbox [x")]
    pub x: f64,
    pub y: f64,
    pub w: f64,
    #[serde(rename = "h]")]
    pub h: f64,
}

impl BoundingBoxRecord {
    /// The pixel-space box described by this row.
    pub fn bbox(&self) -> BBoxXYWH<Pixel> {
        BBoxXYWH::from_xywh(self.x, self.y, self.w, self.h)
    }

    /// The image filename without its extension.
    ///
    /// Only the last extension is removed, so `a.b.png` becomes `a.b`.
    pub fn image_stem(&self) -> &str {
        Path::new(&self.image_id)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.image_id)
    }
}

/// Reads every record from a bounding-box CSV file.
///
/// # Errors
/// Returns [`PrepError::Io`] if the file cannot be opened and
/// [`PrepError::CsvParse`] for missing columns or malformed values, and
/// [`PrepError::NonFiniteBox`] for a `NaN` or infinite coordinate.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use cxrprep::annotation::read_bbox_csv;
///
/// let records = read_bbox_csv(Path::new("BBox_List_2017.csv"))?;
/// # Ok::<(), cxrprep::PrepError>(())
/// ```
pub fn read_bbox_csv(path: &Path) -> Result<Vec<BoundingBoxRecord>, PrepError> {
    let file = File::open(path).map_err(PrepError::Io)?;
    read_records(BufReader::new(file), path)
}

/// Reads records from a CSV string.
///
/// Useful for testing without file I/O.
pub fn from_bbox_csv_str(csv_str: &str) -> Result<Vec<BoundingBoxRecord>, PrepError> {
    from_bbox_csv_slice(csv_str.as_bytes())
}

/// Reads records from CSV bytes.
///
/// Useful for fuzzing and processing raw bytes without requiring UTF-8 upfront.
pub fn from_bbox_csv_slice(bytes: &[u8]) -> Result<Vec<BoundingBoxRecord>, PrepError> {
    read_records(bytes, Path::new("<bytes>"))
}

fn read_records<R: Read>(reader: R, path: &Path) -> Result<Vec<BoundingBoxRecord>, PrepError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, result) in csv_reader.deserialize().enumerate() {
        let record: BoundingBoxRecord = result.map_err(|source| PrepError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        if !record.bbox().is_finite() {
            return Err(PrepError::NonFiniteBox {
                path: path.to_path_buf(),
                row: index + 1,
                image_id: record.image_id,
            });
        }
        records.push(record);
    }

    Ok(records)
}
