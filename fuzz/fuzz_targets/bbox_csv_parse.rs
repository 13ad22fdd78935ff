//! Fuzz target for bounding-box CSV parsing.
//!
//! Arbitrary bytes go to the CSV reader; parsed records are then normalized
//! and rendered, checking for panics along the whole conversion path.

#![no_main]

use cxrprep::annotation::{from_bbox_csv_slice, ClassMapping, NormalizedAnnotation};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(records) = from_bbox_csv_slice(data) else {
        return;
    };

    let classes = ClassMapping::chest_xray();
    for record in &records {
        let _ = record.image_stem();
        if let Some(class_id) = classes.id_of(&record.finding_label) {
            let bbox = record.bbox().to_normalized_center(1024.0, 1024.0);
            let _ = NormalizedAnnotation::new(class_id, bbox).to_line();
        }
    }
});
