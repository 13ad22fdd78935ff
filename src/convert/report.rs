//! Conversion report: what the converter wrote and what it skipped.
//!
//! Skips are informational. A run in which every row was skipped is still a
//! successful run.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Summary of one conversion run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConvertReport {
    /// Directory the label files were written to.
    pub output_dir: PathBuf,
    /// Rows read from the source table.
    pub rows: usize,
    /// Label files written (one per image).
    pub label_files: usize,
    /// Label lines present in the written files.
    pub annotations_written: usize,
    /// Boxes discarded because a later row for the same image replaced them.
    pub replaced_annotations: usize,
    /// Rows skipped because their finding label is not in the class mapping,
    /// keyed by label.
    pub skipped_unknown_labels: BTreeMap<String, usize>,
    /// Rows skipped because their image size could not be determined.
    pub skipped_unreadable_images: usize,
}

impl ConvertReport {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub(crate) fn record_unknown_label(&mut self, label: &str) {
        *self
            .skipped_unknown_labels
            .entry(label.to_string())
            .or_insert(0) += 1;
    }

    /// Total rows skipped for any reason.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_unknown_labels.values().sum::<usize>() + self.skipped_unreadable_images
    }
}

impl fmt::Display for ConvertReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "YOLO annotations saved in '{}'",
            self.output_dir.display()
        )?;
        writeln!(
            f,
            "  {} rows, {} label files, {} annotations",
            self.rows, self.label_files, self.annotations_written
        )?;

        if self.replaced_annotations > 0 {
            writeln!(
                f,
                "  {} annotation(s) replaced by a later row for the same image",
                self.replaced_annotations
            )?;
        }

        if self.skipped_rows() > 0 {
            writeln!(f)?;
            writeln!(f, "Skipped ({}):", self.skipped_rows())?;
            for (label, count) in &self.skipped_unknown_labels {
                writeln!(f, "  - unknown class '{}': {} row(s)", label, count)?;
            }
            if self.skipped_unreadable_images > 0 {
                writeln!(
                    f,
                    "  - image size unavailable: {} row(s)",
                    self.skipped_unreadable_images
                )?;
            }
        }

        Ok(())
    }
}
