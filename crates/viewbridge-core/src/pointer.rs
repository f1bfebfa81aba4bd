use viewbridge_ui_graphics::Point;

use crate::collections::map::{HashMap, HashSet};
use crate::Tag;

pub type PointerId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
    /// Movement with no button pressed (mouse and pen hover).
    Hover,
    /// The pointer left the surface.
    Leave,
}

impl PointerEventKind {
    pub fn phase(self) -> PointerPhase {
        match self {
            PointerEventKind::Down => PointerPhase::Start,
            PointerEventKind::Move | PointerEventKind::Hover => PointerPhase::Move,
            PointerEventKind::Up | PointerEventKind::Leave => PointerPhase::End,
            PointerEventKind::Cancel => PointerPhase::Cancel,
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary = 0,
    Secondary = 1,
    Middle = 2,
    Back = 3,
    Forward = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerButtons(u8);

impl PointerButtons {
    pub const NONE: Self = Self(0);

    pub fn new() -> Self {
        Self::NONE
    }

    pub fn with(mut self, button: PointerButton) -> Self {
        self.insert(button);
        self
    }

    pub fn insert(&mut self, button: PointerButton) {
        self.0 |= 1 << (button as u8);
    }

    pub fn remove(&mut self, button: PointerButton) {
        self.0 &= !(1 << (button as u8));
    }

    pub fn contains(&self, button: PointerButton) -> bool {
        (self.0 & (1 << (button as u8))) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Buttons whose state differs between `previous` and `self`.
    pub fn changed_since(self, previous: PointerButtons) -> PointerButtons {
        PointerButtons(self.0 ^ previous.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl Default for PointerButtons {
    fn default() -> Self {
        Self::NONE
    }
}

/// How a view takes part in hit testing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerEvents {
    /// The view and its children can be targets.
    #[default]
    Auto,
    /// Neither the view nor its children can be targets.
    None,
    /// Only the children can be targets.
    BoxNone,
    /// Only the view itself can be a target.
    BoxOnly,
}

impl PointerEvents {
    /// Parses the description-layer spelling. Unknown values fall back to
    /// [`PointerEvents::Auto`].
    pub fn parse(value: &str) -> Self {
        match value {
            "none" => PointerEvents::None,
            "box-none" => PointerEvents::BoxNone,
            "box-only" => PointerEvents::BoxOnly,
            "auto" => PointerEvents::Auto,
            other => {
                log::warn!("unknown pointerEvents value `{other}`, using auto");
                PointerEvents::Auto
            }
        }
    }

    pub fn can_be_target(self) -> bool {
        matches!(self, PointerEvents::Auto | PointerEvents::BoxOnly)
    }

    pub fn can_children_be_target(self) -> bool {
        matches!(self, PointerEvents::Auto | PointerEvents::BoxNone)
    }
}

/// Snapshot of everything known about the pointers on one surface at the
/// moment an event is dispatched. Passed by value to the event sink.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEventState {
    /// Pointer that started the current gesture, if one is in progress.
    pub primary_pointer_id: Option<PointerId>,
    /// Pointer this event is about.
    pub active_pointer_id: PointerId,
    pub buttons: PointerButtons,
    pub changed_buttons: PointerButtons,
    /// Root tag of the surface the event was delivered on.
    pub surface_id: Tag,
    /// Position relative to the hit target, per pointer.
    pub offset_by_pointer_id: HashMap<PointerId, Point>,
    /// Position relative to the surface, per pointer.
    pub event_coordinates_by_pointer_id: HashMap<PointerId, Point>,
    /// Hit path from the deepest target up to the root, per pointer.
    pub hit_path_by_pointer_id: HashMap<PointerId, Vec<Tag>>,
    pub hovering_pointer_ids: HashSet<PointerId>,
}

impl PointerEventState {
    pub fn new(surface_id: Tag, active_pointer_id: PointerId) -> Self {
        Self {
            primary_pointer_id: None,
            active_pointer_id,
            buttons: PointerButtons::NONE,
            changed_buttons: PointerButtons::NONE,
            surface_id,
            offset_by_pointer_id: HashMap::default(),
            event_coordinates_by_pointer_id: HashMap::default(),
            hit_path_by_pointer_id: HashMap::default(),
            hovering_pointer_ids: HashSet::default(),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.primary_pointer_id == Some(self.active_pointer_id)
    }

    pub fn active_offset(&self) -> Option<Point> {
        self.offset_by_pointer_id
            .get(&self.active_pointer_id)
            .copied()
    }

    pub fn active_coordinates(&self) -> Option<Point> {
        self.event_coordinates_by_pointer_id
            .get(&self.active_pointer_id)
            .copied()
    }

    pub fn active_hit_path(&self) -> &[Tag] {
        self.hit_path_by_pointer_id
            .get(&self.active_pointer_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Deepest view under the active pointer.
    pub fn target(&self) -> Option<Tag> {
        self.active_hit_path().first().copied()
    }
}
