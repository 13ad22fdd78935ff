//! Train/test/val partitioning of image + label pairs.
//!
//! The partitioner pairs images in `image_dir` with `<stem>.txt` files in
//! `annotation_dir`, samples a fixed number of pairs, and copies them into
//!
//! ```text
//! <output_dir>/images/{train,test,val}/
//! <output_dir>/labels/{train,test,val}/
//! ```
//!
//! Only two conditions are fatal: percentages that do not sum to 100, and
//! fewer valid pairs than requested. Both are checked before anything on
//! disk changes. Per-file copy problems are logged and skipped.
//!
//! The new tree is assembled in a staging directory inside `output_dir` and
//! swapped into place once every copy has been attempted, so an interrupted
//! run leaves the previous `images/` and `labels/` untouched.

mod report;

pub use report::{SplitCounts, SplitReport};

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::PrepError;

/// Image extensions eligible for partitioning (matched case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];
const LABEL_EXTENSION: &str = "txt";
const STAGING_DIR_NAME: &str = ".cxrprep-staging";
const TREE_ROOTS: [&str; 2] = ["images", "labels"];

/// One of the three dataset subsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
    Val,
}

impl Split {
    /// All splits, in slicing order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Test, Split::Val];

    /// Directory name of the split.
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
            Split::Val => "val",
        }
    }

    fn set_name(&self) -> &'static str {
        match self {
            Split::Train => "Training Set",
            Split::Test => "Testing Set",
            Split::Val => "Validation Set",
        }
    }
}

/// Integer split percentages. Must sum to exactly 100.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitPercentages {
    pub train: u8,
    pub test: u8,
    pub val: u8,
}

impl Default for SplitPercentages {
    fn default() -> Self {
        Self {
            train: 70,
            test: 20,
            val: 10,
        }
    }
}

impl SplitPercentages {
    pub fn new(train: u8, test: u8, val: u8) -> Self {
        Self { train, test, val }
    }

    /// Checks the sum is exactly 100.
    pub fn validate(&self) -> Result<(), PrepError> {
        let sum = self.train as u32 + self.test as u32 + self.val as u32;
        if sum != 100 {
            return Err(PrepError::InvalidSplit {
                train: self.train,
                test: self.test,
                val: self.val,
                sum,
            });
        }
        Ok(())
    }

    /// Split sizes for `total` items.
    ///
    /// Train and test are floored; val absorbs the remainder so the three
    /// always sum to `total`.
    ///
    /// # Errors
    /// Returns [`PrepError::InvalidSplit`] unless the percentages sum to 100.
    pub fn sizes(&self, total: usize) -> Result<SplitSizes, PrepError> {
        self.validate()?;
        let train = self.train as usize * total / 100;
        let test = self.test as usize * total / 100;
        Ok(SplitSizes {
            train,
            test,
            val: total - train - test,
        })
    }
}

/// Number of items per split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitSizes {
    pub train: usize,
    pub test: usize,
    pub val: usize,
}

/// Partitioner settings.
#[derive(Clone, Debug)]
pub struct SplitOptions {
    pub image_dir: PathBuf,
    pub annotation_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Number of pairs to sample from the valid pool.
    pub total: usize,
    pub percentages: SplitPercentages,
    /// Seed for reproducible sampling; `None` uses the thread RNG.
    pub seed: Option<u64>,
}

/// Which images go where.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitPlan {
    pub available_pairs: usize,
    pub train: Vec<PathBuf>,
    pub test: Vec<PathBuf>,
    pub val: Vec<PathBuf>,
}

impl SplitPlan {
    pub fn images(&self, split: Split) -> &[PathBuf] {
        match split {
            Split::Train => &self.train,
            Split::Test => &self.test,
            Split::Val => &self.val,
        }
    }

    pub fn total(&self) -> usize {
        self.train.len() + self.test.len() + self.val.len()
    }
}

/// Partitions with the seed in `opts` (or the thread RNG when unset).
pub fn partition(opts: &SplitOptions) -> Result<SplitReport, PrepError> {
    if let Some(seed) = opts.seed {
        let mut rng = StdRng::seed_from_u64(seed);
        partition_with_rng(opts, &mut rng)
    } else {
        let mut rng = rand::rng();
        partition_with_rng(opts, &mut rng)
    }
}

/// Partitions using the given random source. `opts.seed` is ignored.
pub fn partition_with_rng<R: Rng + ?Sized>(
    opts: &SplitOptions,
    rng: &mut R,
) -> Result<SplitReport, PrepError> {
    let plan = plan_split(opts, rng)?;
    materialize(&plan, opts)
}

/// Validates the request and decides the assignment without touching the
/// output directory.
pub fn plan_split<R: Rng + ?Sized>(
    opts: &SplitOptions,
    rng: &mut R,
) -> Result<SplitPlan, PrepError> {
    opts.percentages.validate()?;

    let candidates = collect_images(&opts.image_dir);
    let mut valid = validate_annotations(candidates, &opts.annotation_dir);
    let available = valid.len();
    debug!(
        "{} image(s) in {} have annotations",
        available,
        opts.image_dir.display()
    );

    if available < opts.total {
        return Err(PrepError::InsufficientImages {
            requested: opts.total,
            available,
        });
    }

    // Sorted first so a seeded run does not depend on directory order.
    valid.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
    valid.shuffle(rng);
    valid.truncate(opts.total);
    valid.shuffle(rng);

    let sizes = opts.percentages.sizes(opts.total)?;
    let val = valid.split_off(sizes.train + sizes.test);
    let test = valid.split_off(sizes.train);

    Ok(SplitPlan {
        available_pairs: available,
        train: valid,
        test,
        val,
    })
}

/// Keeps the images that have a `<stem>.txt` in `annotation_dir`.
pub fn validate_annotations(images: Vec<PathBuf>, annotation_dir: &Path) -> Vec<PathBuf> {
    images
        .into_iter()
        .filter(|image| label_path_for(image, annotation_dir).is_some_and(|p| p.is_file()))
        .collect()
}

/// Image files directly inside `dir` (not recursive).
///
/// A missing directory is an empty pool. Entries that cannot be read, such
/// as dangling symlinks, are logged and left out.
pub fn collect_images(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        warn!("Image directory '{}' does not exist.", dir.display());
        return files;
    }

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(dir);
                warn!("Cannot read {} ({}). Skipping...", path.display(), err);
                continue;
            }
        };

        if entry.file_type().is_file() && has_extension(entry.path(), &IMAGE_EXTENSIONS) {
            files.push(entry.path().to_path_buf());
        }
    }

    files
}

fn materialize(plan: &SplitPlan, opts: &SplitOptions) -> Result<SplitReport, PrepError> {
    fs::create_dir_all(&opts.output_dir)?;

    let staging = opts.output_dir.join(STAGING_DIR_NAME);
    if staging.exists() {
        debug!("Removing leftover staging dir {}", staging.display());
        fs::remove_dir_all(&staging)?;
    }
    for root in TREE_ROOTS {
        for split in Split::ALL {
            fs::create_dir_all(staging.join(root).join(split.as_str()))?;
        }
    }

    let mut report = SplitReport {
        output_dir: opts.output_dir.clone(),
        available_pairs: plan.available_pairs,
        requested: plan.total(),
        splits: Vec::with_capacity(Split::ALL.len()),
    };

    for split in Split::ALL {
        let counts = copy_files_and_labels(
            split,
            plan.images(split),
            &staging.join("images").join(split.as_str()),
            &staging.join("labels").join(split.as_str()),
            &opts.annotation_dir,
        );
        report.splits.push(counts);
    }

    for root in TREE_ROOTS {
        let target = opts.output_dir.join(root);
        if target.exists() {
            fs::remove_dir_all(&target)?;
            info!("Deleted old folder: {}", target.display());
        }
        fs::rename(staging.join(root), &target)?;
    }
    fs::remove_dir_all(&staging)?;

    Ok(report)
}

fn copy_files_and_labels(
    split: Split,
    images: &[PathBuf],
    images_out: &Path,
    labels_out: &Path,
    annotation_dir: &Path,
) -> SplitCounts {
    info!("Copying {} images and labels...", split.set_name());
    let mut counts = SplitCounts::new(split, images.len());

    for image in images {
        let Some(file_name) = image.file_name() else {
            warn!("Image path {} has no file name. Skipping...", image.display());
            counts.skipped_images += 1;
            continue;
        };

        let destination = images_out.join(file_name);
        if let Err(err) = fs::copy(image, &destination) {
            warn!("File {} could not be copied ({}). Skipping...", image.display(), err);
            counts.skipped_images += 1;
            continue;
        }
        debug!("Copied {} to {}", image.display(), destination.display());
        counts.images += 1;

        let label = label_path_for(image, annotation_dir).filter(|path| path.is_file());
        let Some(label) = label else {
            warn!(
                "Label file not found for {}. Skipping label.",
                image.display()
            );
            counts.missing_labels += 1;
            continue;
        };

        let Some(label_name) = label.file_name() else {
            counts.missing_labels += 1;
            continue;
        };
        let label_destination = labels_out.join(label_name);
        match fs::copy(&label, &label_destination) {
            Ok(_) => {
                debug!(
                    "Copied {} to {}",
                    label.display(),
                    label_destination.display()
                );
                counts.labels += 1;
            }
            Err(err) => {
                warn!(
                    "Label {} could not be copied ({}). Skipping label.",
                    label.display(),
                    err
                );
                counts.missing_labels += 1;
            }
        }
    }

    counts
}

fn label_path_for(image: &Path, annotation_dir: &Path) -> Option<PathBuf> {
    // Appended rather than `with_extension`, which would eat a dotted stem.
    let mut name = image.file_stem()?.to_os_string();
    name.push(".");
    name.push(LABEL_EXTENSION);
    Some(annotation_dir.join(name))
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}
