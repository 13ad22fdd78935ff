//! Bounding box types for the two layouts the pipeline deals with.
//!
//! The source CSV describes boxes by their top-left corner plus size
//! ([`BBoxXYWH`]); YOLO label files describe them by their center plus size
//! ([`BBoxCXCYWH`]). The `TSpace` parameter is either [`Pixel`] or
//! [`Normalized`].
//!
//! Neither type enforces positive sizes or unit-interval values; boxes are
//! carried through as given, without clamping.

use std::marker::PhantomData;

use super::space::{Normalized, Pixel};

/// An axis-aligned box given by its top-left corner and its size.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYWH<TSpace> {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxXYWH<TSpace> {
    /// Creates a box from its top-left corner and size.
    #[inline]
    pub fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            _space: PhantomData,
        }
    }

    /// Returns true if all four values are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYWH<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYWH")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("w", &self.w)
            .field("h", &self.h)
            .finish()
    }
}

/// An axis-aligned box given by its center and its size.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxCXCYWH<TSpace> {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxCXCYWH<TSpace> {
    /// Creates a box from its center and size.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self {
            cx,
            cy,
            w,
            h,
            _space: PhantomData,
        }
    }

    /// Returns `(cx, cy, w, h)`.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (self.cx, self.cy, self.w, self.h)
    }
}

impl<TSpace> std::fmt::Debug for BBoxCXCYWH<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxCXCYWH")
            .field("cx", &self.cx)
            .field("cy", &self.cy)
            .field("w", &self.w)
            .field("h", &self.h)
            .finish()
    }
}

impl BBoxXYWH<Pixel> {
    /// Converts a pixel box to the normalized center form used by YOLO labels.
    ///
    /// ```
    /// use cxrprep::annotation::{BBoxXYWH, Pixel};
    ///
    /// let bbox = BBoxXYWH::<Pixel>::from_xywh(100.0, 200.0, 50.0, 100.0);
    /// let norm = bbox.to_normalized_center(1000.0, 1000.0);
    /// assert_eq!(norm.to_cxcywh(), (0.125, 0.25, 0.05, 0.1));
    /// ```
    pub fn to_normalized_center(
        &self,
        image_width: f64,
        image_height: f64,
    ) -> BBoxCXCYWH<Normalized> {
        BBoxCXCYWH::from_cxcywh(
            (self.x + self.w / 2.0) / image_width,
            (self.y + self.h / 2.0) / image_height,
            self.w / image_width,
            self.h / image_height,
        )
    }
}

impl BBoxCXCYWH<Normalized> {
    /// Converts a normalized center box back to a pixel top-left box.
    pub fn to_pixel_xywh(&self, image_width: f64, image_height: f64) -> BBoxXYWH<Pixel> {
        let w = self.w * image_width;
        let h = self.h * image_height;
        BBoxXYWH::from_xywh(
            self.cx * image_width - w / 2.0,
            self.cy * image_height - h / 2.0,
            w,
            h,
        )
    }
}
