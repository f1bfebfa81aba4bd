//! Pure math/data for positions and sizes in viewbridge
//!
//! This crate contains the geometry primitives shared by the shadow tree,
//! the layout engine and the native view hierarchy.

mod geometry;

pub use geometry::*;

pub mod prelude {
    pub use crate::geometry::{Point, Rect, Size};
}
