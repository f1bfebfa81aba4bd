use viewbridge_core::Props;

use crate::Axis;

/// The subset of a view's props the stack engine understands.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutStyle {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub padding: f32,
    /// Absolute offsets. A child with either one set is taken out of the
    /// stack and placed relative to its parent's content box.
    pub left: Option<f32>,
    pub top: Option<f32>,
    pub direction: Axis,
}

impl LayoutStyle {
    pub fn from_props(props: &Props) -> Self {
        let direction = match props.get_str("flexDirection") {
            Some("row") | Some("row-reverse") => Axis::Horizontal,
            _ => Axis::Vertical,
        };
        Self {
            width: props.get_f32("width"),
            height: props.get_f32("height"),
            padding: props.get_f32("padding").unwrap_or(0.0).max(0.0),
            left: props.get_f32("left"),
            top: props.get_f32("top"),
            direction,
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.left.is_some() || self.top.is_some()
    }
}
