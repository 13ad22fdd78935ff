//! Annotation types shared by the converter, the descriptor and the splitter.
//!
//! Boxes are tagged with their coordinate space ([`Pixel`] or
//! [`Normalized`]) so a pixel box cannot be written to a label file without
//! going through normalization first.
//!
//! # Example
//!
//! ```
//! use cxrprep::annotation::{BBoxXYWH, ClassMapping, NormalizedAnnotation, Pixel};
//!
//! let classes = ClassMapping::chest_xray();
//! let class_id = classes.id_of("Mass").unwrap();
//! let bbox = BBoxXYWH::<Pixel>::from_xywh(256.0, 512.0, 128.0, 64.0);
//! let ann = NormalizedAnnotation::new(class_id, bbox.to_normalized_center(1024.0, 1024.0));
//! assert_eq!(ann.to_line(), "12 0.312500 0.531250 0.125000 0.062500");
//! ```

mod bbox;
mod class_map;
pub mod io_bbox_csv;
mod label;
mod space;

pub use bbox::{BBoxCXCYWH, BBoxXYWH};
pub use class_map::{ClassId, ClassMapping, CHEST_XRAY_CLASSES};
pub use io_bbox_csv::{from_bbox_csv_slice, from_bbox_csv_str, read_bbox_csv, BoundingBoxRecord};
pub use label::{parse_label_line, LabelLineError, NormalizedAnnotation};
pub use space::{Normalized, Pixel};
