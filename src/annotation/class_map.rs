//! The closed class vocabulary shared by the converter and the descriptor.
//!
//! A [`ClassMapping`] is an ordered bijection from class name to a dense,
//! 0-based [`ClassId`]. It is built once and never mutated afterwards.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

/// The chest X-ray finding labels, in id order.
pub const CHEST_XRAY_CLASSES: [&str; 14] = [
    "Atelectasis",
    "Consolidation",
    "Infiltrate",
    "Pneumothorax",
    "Edema",
    "Emphysema",
    "Fibrosis",
    "Effusion",
    "Pneumonia",
    "Pleural_thickening",
    "Cardiomegaly",
    "Nodule",
    "Mass",
    "Hernia",
];

/// A YOLO class index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub usize);

impl ClassId {
    /// Returns the underlying index.
    #[inline]
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, immutable class name to id mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassMapping {
    names: Vec<String>,
    ids: HashMap<String, ClassId>,
}

impl ClassMapping {
    /// Builds a mapping where each name's id is its position in `names`.
    ///
    /// # Errors
    /// Returns [`PrepError::InvalidClassMap`] if a name is empty or repeated.
    pub fn new<I, S>(names: I) -> Result<Self, PrepError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut ids = HashMap::new();

        for (index, name) in names.into_iter().enumerate() {
            let name: String = name.into();
            if name.trim().is_empty() {
                return Err(PrepError::InvalidClassMap {
                    message: format!("class name at index {} is empty", index),
                });
            }
            if ids.insert(name.clone(), ClassId(index)).is_some() {
                return Err(PrepError::InvalidClassMap {
                    message: format!("class name '{}' appears more than once", name),
                });
            }
            ordered.push(name);
        }

        Ok(Self {
            names: ordered,
            ids,
        })
    }

    /// The built-in 14-class chest X-ray vocabulary.
    pub fn chest_xray() -> Self {
        Self::new(CHEST_XRAY_CLASSES).expect("built-in class list is valid")
    }

    /// Loads a mapping from a `classes.txt` file, one name per line.
    ///
    /// A trailing newline is allowed; blank lines anywhere else are rejected.
    pub fn from_classes_txt(path: &Path) -> Result<Self, PrepError> {
        let data = fs::read_to_string(path)?;
        let mut names = Vec::new();

        for (line_idx, line) in data.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Err(PrepError::ClassesTxtInvalid {
                    path: path.to_path_buf(),
                    message: format!("line {} is empty", line_idx + 1),
                });
            }
            names.push(trimmed.to_string());
        }

        if names.is_empty() {
            return Err(PrepError::ClassesTxtInvalid {
                path: path.to_path_buf(),
                message: "no class names found".to_string(),
            });
        }

        Self::new(names).map_err(|err| PrepError::ClassesTxtInvalid {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Looks up a class name. Matching is exact (case-sensitive).
    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.ids.get(name).copied()
    }

    /// Returns the name for an id, if in range.
    pub fn name_of(&self, id: ClassId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    /// Class names in id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
