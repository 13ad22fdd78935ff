//! Coordinate space marker types.
//!
//! Zero-sized types used as type parameters so pixel-space and
//! normalized-space boxes cannot be mixed by accident.

use std::fmt;

/// Marker type for pixel coordinates (absolute values, origin top-left).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker type for coordinates scaled to the unit interval by image size.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
