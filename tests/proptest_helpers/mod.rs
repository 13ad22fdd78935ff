#![allow(dead_code)]

use cxrprep::annotation::{BBoxXYWH, BoundingBoxRecord, Pixel, CHEST_XRAY_CLASSES};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Tolerance for a pixel value recovered from six-decimal label text.
pub fn eps_label_text(image_w: u32, image_h: u32) -> f64 {
    image_w.max(image_h) as f64 * 1e-6
}

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_image_dims() -> BoxedStrategy<(u32, u32)> {
    (1u32..=4096, 1u32..=4096).boxed()
}

/// A pixel box lying inside a `width` x `height` image.
pub fn arb_bbox_within(width: u32, height: u32) -> BoxedStrategy<BBoxXYWH<Pixel>> {
    let (w, h) = (width as f64, height as f64);
    (0.0..1.0f64, 0.0..1.0f64, 0.0..=1.0f64, 0.0..=1.0f64)
        .prop_map(move |(fx, fy, fw, fh)| {
            let x = fx * w;
            let y = fy * h;
            BBoxXYWH::from_xywh(x, y, fw * (w - x), fh * (h - y))
        })
        .boxed()
}

pub fn arb_class_name() -> BoxedStrategy<String> {
    prop::sample::select(CHEST_XRAY_CLASSES.to_vec())
        .prop_map(str::to_string)
        .boxed()
}

/// Rows on `max_images` distinct images inside a 1024 x 1024 frame.
pub fn arb_records(max_images: usize, max_rows: usize) -> BoxedStrategy<Vec<BoundingBoxRecord>> {
    prop::collection::vec(
        (0..max_images, arb_class_name(), arb_bbox_within(1024, 1024)),
        0..=max_rows,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(image, finding_label, bbox)| BoundingBoxRecord {
                image_id: format!("{:08}_000.png", image),
                finding_label,
                x: bbox.x,
                y: bbox.y,
                w: bbox.w,
                h: bbox.h,
            })
            .collect()
    })
    .boxed()
}
