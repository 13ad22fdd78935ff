//! Dataset descriptor (`data.yaml` style) generation.
//!
//! The descriptor points the trainer at the three image splits and lists the
//! class names by id:
//!
//! ```yaml
//! train: datasets/coco8/images/train/
//! val: datasets/coco8/images/val/
//! test: datasets/coco8/images/test/
//! names:
//!   0: Atelectasis
//!   1: Consolidation
//! stuff_names: [ 'unlabeled' ]
//! ```
//!
//! `stuff_names` must be written in flow style exactly as shown. The document
//! is serialized with `serde_yaml` first and the `stuff_names` line is then
//! rewritten, since the serializer has no per-field style control.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::PrepError;

const STUFF_NAMES_KEY: &str = "stuff_names:";
const STUFF_NAMES_LINE: &str = "stuff_names: [ 'unlabeled' ]";

#[derive(Serialize)]
struct DescriptorDoc<'a> {
    train: String,
    val: String,
    test: String,
    names: BTreeMap<usize, &'a str>,
    stuff_names: &'static str,
}

/// A parsed descriptor, as the trainer would see it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DatasetDescriptor {
    pub train: String,
    pub val: String,
    pub test: String,
    pub names: BTreeMap<usize, String>,
    #[serde(default)]
    pub stuff_names: Vec<String>,
}

/// Renders the descriptor text.
pub fn render_descriptor(dataset_path: &Path, class_names: &[String]) -> Result<String, PrepError> {
    let doc = DescriptorDoc {
        train: split_dir(dataset_path, "train"),
        val: split_dir(dataset_path, "val"),
        test: split_dir(dataset_path, "test"),
        names: class_names
            .iter()
            .enumerate()
            .map(|(id, name)| (id, name.as_str()))
            .collect(),
        stuff_names: "[ 'unlabeled' ]",
    };

    let serialized =
        serde_yaml::to_string(&doc).map_err(|source| PrepError::DescriptorWrite {
            path: PathBuf::from("<string>"),
            source,
        })?;

    let mut out = String::with_capacity(serialized.len());
    for line in serialized.lines() {
        if line.trim_start().starts_with(STUFF_NAMES_KEY) {
            out.push_str(STUFF_NAMES_LINE);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    Ok(out)
}

/// Writes the descriptor to `output_path`, creating its parent directory.
pub fn generate_descriptor(
    dataset_path: &Path,
    class_names: &[String],
    output_path: &Path,
) -> Result<(), PrepError> {
    let content = render_descriptor(dataset_path, class_names).map_err(|err| match err {
        PrepError::DescriptorWrite { source, .. } => PrepError::DescriptorWrite {
            path: output_path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output_path, content)?;

    info!("YAML file generated at: {}", output_path.display());
    Ok(())
}

/// Reads a descriptor back.
pub fn read_descriptor(path: &Path) -> Result<DatasetDescriptor, PrepError> {
    let data = fs::read_to_string(path)?;
    serde_yaml::from_str(&data).map_err(|source| PrepError::DescriptorParse {
        path: path.to_path_buf(),
        source,
    })
}

fn split_dir(dataset_path: &Path, split: &str) -> String {
    dataset_path
        .join(format!("images/{split}/"))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::ClassMapping;

    #[test]
    fn keys_are_written_in_order() {
        let names = vec!["Mass".to_string(), "Nodule".to_string()];
        let text = render_descriptor(Path::new("datasets/coco8"), &names).expect("render");

        assert_eq!(
            text,
            "train: datasets/coco8/images/train/\n\
             val: datasets/coco8/images/val/\n\
             test: datasets/coco8/images/test/\n\
             names:\n  0: Mass\n  1: Nodule\n\
             stuff_names: [ 'unlabeled' ]\n"
        );
    }

    #[test]
    fn stuff_names_is_flow_style_and_parses_as_list() {
        let classes = ClassMapping::chest_xray();
        let text = render_descriptor(Path::new("../datasets/coco8/"), classes.names())
            .expect("render");

        assert_eq!(
            text.lines().filter(|l| l.starts_with("stuff_names")).count(),
            1
        );
        assert!(text.contains("\nstuff_names: [ 'unlabeled' ]\n"));

        let parsed: DatasetDescriptor = serde_yaml::from_str(&text).expect("parse back");
        assert_eq!(parsed.stuff_names, vec!["unlabeled".to_string()]);
        assert_eq!(parsed.train, "../datasets/coco8/images/train/");
        assert_eq!(parsed.names.len(), 14);
        assert_eq!(parsed.names[&9], "Pleural_thickening");
    }

    #[test]
    fn generate_creates_parent_dir() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let output = temp.path().join("data/coco8.yaml");
        let names = vec!["Edema".to_string()];

        generate_descriptor(Path::new("datasets/coco8"), &names, &output).expect("generate");

        let parsed = read_descriptor(&output).expect("read back");
        assert_eq!(parsed.val, "datasets/coco8/images/val/");
        assert_eq!(parsed.names[&0], "Edema");
    }
}
