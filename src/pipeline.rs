//! End-to-end preparation: descriptor, conversion, staging copy, partition.
//!
//! Every path and constant the stages need lives in one [`PipelineConfig`],
//! which can be loaded from YAML. Missing keys take the defaults below.
//!
//! ```yaml
//! csv: BBox_List_2017.csv
//! annotations_dir: annotations_yolo
//! data_dir: data
//! image_dir: data/images
//! dataset_dir: datasets/coco8
//! descriptor: data/coco8.yaml
//! image_width: 1024
//! image_height: 1024
//! total_images: 10
//! train_pct: 70
//! test_pct: 20
//! val_pct: 10
//! write_mode: overwrite
//! runs_base: .
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::annotation::ClassMapping;
use crate::convert::{self, ConvertOptions, ConvertReport, ImageDimensions, LabelWriteMode};
use crate::descriptor;
use crate::error::PrepError;
use crate::housekeeping::{self, ANNOTATIONS_DIR_NAME, RUNS_DIR_NAME};
use crate::split::{self, SplitOptions, SplitPercentages, SplitReport};

/// All settings for a preparation run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Bounding-box CSV.
    pub csv: PathBuf,
    /// Where converted label files are written (cleared first).
    pub annotations_dir: PathBuf,
    /// Labels are copied to `<data_dir>/annotations` for partitioning.
    pub data_dir: PathBuf,
    /// Image pool to partition.
    pub image_dir: PathBuf,
    /// Root of the partitioned `images/` + `labels/` tree.
    pub dataset_dir: PathBuf,
    /// Descriptor output path.
    pub descriptor: PathBuf,
    pub image_width: u32,
    pub image_height: u32,
    /// Read each image's size from `image_dir` instead of the fixed size.
    pub read_image_sizes: bool,
    pub write_mode: LabelWriteMode,
    /// `classes.txt` overriding the built-in vocabulary.
    pub classes_file: Option<PathBuf>,
    pub total_images: usize,
    pub train_pct: u8,
    pub test_pct: u8,
    pub val_pct: u8,
    pub seed: Option<u64>,
    /// When set, `<runs_base>/runs` is cleared before partitioning.
    pub runs_base: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let pct = SplitPercentages::default();
        Self {
            csv: PathBuf::from("BBox_List_2017.csv"),
            annotations_dir: PathBuf::from("annotations_yolo"),
            data_dir: PathBuf::from("data"),
            image_dir: PathBuf::from("data/images"),
            dataset_dir: PathBuf::from("datasets/coco8"),
            descriptor: PathBuf::from("data/coco8.yaml"),
            image_width: convert::DEFAULT_IMAGE_SIZE,
            image_height: convert::DEFAULT_IMAGE_SIZE,
            read_image_sizes: false,
            write_mode: LabelWriteMode::default(),
            classes_file: None,
            total_images: 10,
            train_pct: pct.train,
            test_pct: pct.test,
            val_pct: pct.val,
            seed: None,
            runs_base: None,
        }
    }
}

impl PipelineConfig {
    /// Loads a config from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, PrepError> {
        let data = fs::read_to_string(path)?;
        serde_yaml::from_str(&data).map_err(|source| PrepError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The class vocabulary: `classes_file` if set, else the built-in one.
    pub fn class_mapping(&self) -> Result<ClassMapping, PrepError> {
        match &self.classes_file {
            Some(path) => ClassMapping::from_classes_txt(path),
            None => Ok(ClassMapping::chest_xray()),
        }
    }

    pub fn convert_options(&self) -> ConvertOptions {
        let dimensions = if self.read_image_sizes {
            ImageDimensions::FromImages(self.image_dir.clone())
        } else {
            ImageDimensions::Fixed {
                width: self.image_width,
                height: self.image_height,
            }
        };
        ConvertOptions {
            dimensions,
            write_mode: self.write_mode,
        }
    }

    pub fn split_options(&self) -> SplitOptions {
        SplitOptions {
            image_dir: self.image_dir.clone(),
            annotation_dir: self.data_dir.join(ANNOTATIONS_DIR_NAME),
            output_dir: self.dataset_dir.clone(),
            total: self.total_images,
            percentages: SplitPercentages::new(self.train_pct, self.test_pct, self.val_pct),
            seed: self.seed,
        }
    }
}

/// Combined report of a preparation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub descriptor: PathBuf,
    pub convert: ConvertReport,
    pub split: SplitReport,
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Descriptor written to '{}'", self.descriptor.display())?;
        writeln!(f)?;
        write!(f, "{}", self.convert)?;
        writeln!(f)?;
        write!(f, "{}", self.split)
    }
}

/// Runs every preparation stage in order.
///
/// Split percentages are checked before any stage runs, so a bad split
/// request changes nothing on disk.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport, PrepError> {
    let split_opts = config.split_options();
    split_opts.percentages.validate()?;
    let classes = config.class_mapping()?;

    descriptor::generate_descriptor(&config.dataset_dir, classes.names(), &config.descriptor)?;

    fs::create_dir_all(&config.annotations_dir)?;
    housekeeping::clear_directory(&config.annotations_dir, None, true)?;
    let convert_report = convert::convert_csv(
        &config.csv,
        &classes,
        &config.convert_options(),
        &config.annotations_dir,
    )?;

    housekeeping::copy_annotations(&config.annotations_dir, &config.data_dir)?;

    if let Some(base) = &config.runs_base {
        info!("Clearing '{}'", base.join(RUNS_DIR_NAME).display());
        housekeeping::clear_runs_directory(base)?;
    }

    let split_report = split::partition(&split_opts)?;
    info!("Dataset ready in '{}'", config.dataset_dir.display());

    Ok(PipelineReport {
        descriptor: config.descriptor.clone(),
        convert: convert_report,
        split: split_report,
    })
}
