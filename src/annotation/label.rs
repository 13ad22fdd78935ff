//! YOLO label lines.
//!
//! One line per box: `<class_id> <x_center> <y_center> <width> <height>`,
//! space separated, coordinates normalized and printed with 6 decimals.

use std::fmt;

use super::bbox::BBoxCXCYWH;
use super::class_map::ClassId;
use super::space::Normalized;

/// A box ready to be written to a label file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedAnnotation {
    pub class_id: ClassId,
    pub bbox: BBoxCXCYWH<Normalized>,
}

impl NormalizedAnnotation {
    pub fn new(class_id: ClassId, bbox: BBoxCXCYWH<Normalized>) -> Self {
        Self { class_id, bbox }
    }

    /// Renders the label line without a trailing newline.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NormalizedAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cx, cy, w, h) = self.bbox.to_cxcywh();
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, cx, cy, w, h
        )
    }
}

/// Why a label line could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelLineError {
    pub message: String,
}

impl fmt::Display for LabelLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LabelLineError {}

/// Parses one label line. Blank lines yield `Ok(None)`.
pub fn parse_label_line(line: &str) -> Result<Option<NormalizedAnnotation>, LabelLineError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // At most 6 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();
    if tokens.len() != 5 {
        return Err(LabelLineError {
            message: format!("expected 5 tokens, found {}", tokens.len()),
        });
    }

    let class_id = tokens[0].parse::<usize>().map_err(|_| LabelLineError {
        message: format!(
            "invalid class_id '{}'; expected non-negative integer",
            tokens[0]
        ),
    })?;

    let cx = parse_f64_token(tokens[1], "x_center")?;
    let cy = parse_f64_token(tokens[2], "y_center")?;
    let w = parse_f64_token(tokens[3], "width")?;
    let h = parse_f64_token(tokens[4], "height")?;

    Ok(Some(NormalizedAnnotation::new(
        ClassId(class_id),
        BBoxCXCYWH::from_cxcywh(cx, cy, w, h),
    )))
}

fn parse_f64_token(raw: &str, field_name: &str) -> Result<f64, LabelLineError> {
    raw.parse::<f64>().map_err(|_| LabelLineError {
        message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_six_decimals() {
        let ann = NormalizedAnnotation::new(
            ClassId(12),
            BBoxCXCYWH::from_cxcywh(0.5, 0.25, 1.0 / 3.0, 0.1),
        );
        assert_eq!(ann.to_line(), "12 0.500000 0.250000 0.333333 0.100000");
    }

    #[test]
    fn parses_rendered_line() {
        let parsed = parse_label_line("2 0.500000 0.250000 0.300000 0.100000")
            .expect("parse should succeed")
            .expect("line should produce an annotation");
        assert_eq!(parsed.class_id, ClassId(2));
        assert_eq!(parsed.bbox.to_cxcywh(), (0.5, 0.25, 0.3, 0.1));
    }

    #[test]
    fn skips_blank_lines() {
        assert_eq!(parse_label_line("   "), Ok(None));
    }

    #[test]
    fn rejects_wrong_token_counts() {
        assert!(parse_label_line("0 0.1 0.2").is_err());
        assert!(parse_label_line("0 0.1 0.2 0.3 0.4 0.5").is_err());
    }

    #[test]
    fn rejects_negative_class() {
        let err = parse_label_line("-1 0.1 0.2 0.3 0.4").unwrap_err();
        assert!(err.message.contains("class_id"));
    }
}
