use std::collections::BTreeMap;
use std::fs;

use cxrprep::annotation::{parse_label_line, BBoxXYWH, ClassMapping, NormalizedAnnotation, Pixel};
use cxrprep::convert::{self, ConvertOptions, LabelWriteMode};
use proptest::prelude::*;

mod proptest_helpers;

fn arb_dims_and_bbox() -> impl Strategy<Value = ((u32, u32), BBoxXYWH<Pixel>)> {
    proptest_helpers::arb_image_dims()
        .prop_flat_map(|(w, h)| (Just((w, h)), proptest_helpers::arb_bbox_within(w, h)))
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn normalization_roundtrip_recovers_pixels(
        ((width, height), bbox) in arb_dims_and_bbox()
    ) {
        let (w, h) = (width as f64, height as f64);
        let restored = bbox.to_normalized_center(w, h).to_pixel_xywh(w, h);
        let eps = 1e-9 * w.max(h);

        prop_assert!((restored.x - bbox.x).abs() <= eps);
        prop_assert!((restored.y - bbox.y).abs() <= eps);
        prop_assert!((restored.w - bbox.w).abs() <= eps);
        prop_assert!((restored.h - bbox.h).abs() <= eps);
    }

    #[test]
    fn boxes_inside_the_image_normalize_into_unit_range(
        ((width, height), bbox) in arb_dims_and_bbox()
    ) {
        let norm = bbox.to_normalized_center(width as f64, height as f64);
        let (cx, cy, nw, nh) = norm.to_cxcywh();
        for value in [cx, cy, nw, nh] {
            prop_assert!((0.0..=1.0 + 1e-12).contains(&value), "{} out of range", value);
        }
    }

    #[test]
    fn label_text_roundtrip_stays_within_six_decimals(
        ((width, height), bbox) in arb_dims_and_bbox(),
        class_id in 0usize..14
    ) {
        let (w, h) = (width as f64, height as f64);
        let line = NormalizedAnnotation::new(
            cxrprep::annotation::ClassId(class_id),
            bbox.to_normalized_center(w, h),
        )
        .to_line();

        let parsed = parse_label_line(&line).expect("parse").expect("annotation");
        prop_assert_eq!(parsed.class_id.as_usize(), class_id);

        let restored = parsed.bbox.to_pixel_xywh(w, h);
        let eps = proptest_helpers::eps_label_text(width, height);
        prop_assert!((restored.x - bbox.x).abs() <= eps);
        prop_assert!((restored.y - bbox.y).abs() <= eps);
        prop_assert!((restored.w - bbox.w).abs() <= eps);
        prop_assert!((restored.h - bbox.h).abs() <= eps);
    }

    #[test]
    fn write_modes_agree_on_line_counts(
        records in proptest_helpers::arb_records(4, 12)
    ) {
        let temp = tempfile::tempdir().expect("create temp dir");
        let classes = ClassMapping::chest_xray();

        let mut rows_per_stem: BTreeMap<String, usize> = BTreeMap::new();
        let mut last_line: BTreeMap<String, String> = BTreeMap::new();
        for record in &records {
            let stem = record.image_stem().to_string();
            *rows_per_stem.entry(stem.clone()).or_default() += 1;
            let class_id = classes.id_of(&record.finding_label).expect("known class");
            let line = NormalizedAnnotation::new(
                class_id,
                record.bbox().to_normalized_center(1024.0, 1024.0),
            )
            .to_line();
            last_line.insert(stem, line);
        }

        let overwrite_dir = temp.path().join("overwrite");
        convert::convert_records(&records, &classes, &ConvertOptions::default(), &overwrite_dir)
            .expect("convert overwrite");
        let accumulate_dir = temp.path().join("accumulate");
        let opts = ConvertOptions {
            write_mode: LabelWriteMode::Accumulate,
            ..Default::default()
        };
        convert::convert_records(&records, &classes, &opts, &accumulate_dir)
            .expect("convert accumulate");

        for (stem, rows) in &rows_per_stem {
            let name = format!("{stem}.txt");
            let overwritten = fs::read_to_string(overwrite_dir.join(&name)).expect("read overwrite");
            prop_assert_eq!(overwritten, format!("{}\n", last_line[stem]));

            let accumulated = fs::read_to_string(accumulate_dir.join(&name)).expect("read accumulate");
            prop_assert_eq!(accumulated.lines().count(), *rows);
        }
        prop_assert_eq!(
            fs::read_dir(&overwrite_dir).expect("list overwrite").count(),
            rows_per_stem.len()
        );
    }
}
