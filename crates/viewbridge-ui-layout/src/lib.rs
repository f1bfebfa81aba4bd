//! Layout contracts & policies for viewbridge
//!
//! The bridge treats layout as a black box behind [`LayoutEngine`]. The
//! [`StackLayoutEngine`] shipped here is enough to drive the pipeline end to
//! end; hosts with a real flexbox implementation plug in their own engine.

mod axis;
mod constraints;
mod engine;
mod stack;
mod style;

pub use axis::*;
pub use constraints::*;
pub use engine::*;
pub use stack::*;
pub use style::*;

pub mod prelude {
    pub use crate::constraints::Constraints;
    pub use crate::engine::{LayoutEngine, LayoutTree};
    pub use crate::stack::StackLayoutEngine;
    pub use crate::style::LayoutStyle;
}
