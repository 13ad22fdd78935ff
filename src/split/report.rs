//! Partition report: what landed in each split.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::Split;

/// Summary of one partitioning run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    /// Root of the `images/` + `labels/` tree.
    pub output_dir: PathBuf,
    /// Image + annotation pairs found before sampling.
    pub available_pairs: usize,
    /// Pairs sampled into the splits.
    pub requested: usize,
    /// Per-split counts, in train, test, val order.
    pub splits: Vec<SplitCounts>,
}

impl SplitReport {
    /// Counts for one split, if present.
    pub fn get(&self, split: Split) -> Option<&SplitCounts> {
        self.splits.iter().find(|counts| counts.split == split)
    }

    /// Items skipped across all splits.
    pub fn skipped(&self) -> usize {
        self.splits
            .iter()
            .map(|counts| counts.skipped_images + counts.missing_labels)
            .sum()
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Partitioned {} of {} valid image(s) into '{}'",
            self.requested,
            self.available_pairs,
            self.output_dir.display()
        )?;

        for counts in &self.splits {
            writeln!(
                f,
                "  {:<5} {} image(s), {} label(s)",
                counts.split.as_str(),
                counts.images,
                counts.labels
            )?;
        }

        let skipped = self.skipped();
        if skipped > 0 {
            writeln!(f)?;
            writeln!(f, "Skipped ({}):", skipped)?;
            for counts in &self.splits {
                if counts.skipped_images > 0 {
                    writeln!(
                        f,
                        "  - {}: {} image(s) could not be copied",
                        counts.split.as_str(),
                        counts.skipped_images
                    )?;
                }
                if counts.missing_labels > 0 {
                    writeln!(
                        f,
                        "  - {}: {} label(s) missing",
                        counts.split.as_str(),
                        counts.missing_labels
                    )?;
                }
            }
        }

        Ok(())
    }
}

/// Counts for a single split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub split: Split,
    /// Images assigned to the split.
    pub planned: usize,
    /// Images copied.
    pub images: usize,
    /// Labels copied.
    pub labels: usize,
    /// Images whose copy failed (their labels are skipped too).
    pub skipped_images: usize,
    /// Images copied without a label because the label vanished.
    pub missing_labels: usize,
}

impl SplitCounts {
    pub fn new(split: Split, planned: usize) -> Self {
        Self {
            split,
            planned,
            images: 0,
            labels: 0,
            skipped_images: 0,
            missing_labels: 0,
        }
    }
}
