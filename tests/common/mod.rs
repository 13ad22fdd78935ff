#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Header of the upstream `BBox_List` export, trailing empty columns included.
pub const BBOX_HEADER: &str = "Image Index,Finding Label,Bbox [x,y,w,h],,,";

pub fn bbox_csv(rows: &[&str]) -> String {
    let mut csv = String::from(BBOX_HEADER);
    csv.push('\n');
    for row in rows {
        csv.push_str(row);
        csv.push_str(",,,\n");
    }
    csv
}

pub fn write_csv(path: &Path, rows: &[&str]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bbox_csv(rows)).expect("write csv file");
}

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

/// Writes a BMP header under an image name; the extension is not checked by
/// the header reader.
pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Creates `<stem>.png` images and matching `<stem>.txt` labels.
pub fn write_pairs(image_dir: &Path, annotation_dir: &Path, stems: &[String]) {
    fs::create_dir_all(image_dir).expect("create image dir");
    fs::create_dir_all(annotation_dir).expect("create annotation dir");
    for stem in stems {
        fs::write(image_dir.join(format!("{stem}.png")), stem.as_bytes()).expect("write image");
        fs::write(
            annotation_dir.join(format!("{stem}.txt")),
            "0 0.500000 0.500000 0.100000 0.100000\n",
        )
        .expect("write label");
    }
}

pub fn stems(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{:08}_000", i)).collect()
}

/// File names directly inside `dir`; empty when it does not exist.
pub fn file_names(dir: &Path) -> BTreeSet<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return BTreeSet::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect()
}

/// File stems directly inside `dir`.
pub fn file_stems(dir: &Path) -> BTreeSet<String> {
    file_names(dir)
        .into_iter()
        .map(|name| match name.rsplit_once('.') {
            Some((stem, _)) => stem.to_string(),
            None => name,
        })
        .collect()
}
