use viewbridge_core::collections::map::{HashMap, HashSet};
use viewbridge_core::{
    PointerButtons, PointerEventKind, PointerEventState, PointerId, Tag, ViewResult,
};
use viewbridge_ui_graphics::Point;

use crate::NativeViewHierarchyManager;

/// Pointer event as delivered by the host, in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawPointerEvent {
    pub pointer_id: PointerId,
    pub kind: PointerEventKind,
    pub position: Point,
    pub buttons: PointerButtons,
}

impl RawPointerEvent {
    pub fn new(pointer_id: PointerId, kind: PointerEventKind, position: Point) -> Self {
        Self {
            pointer_id,
            kind,
            position,
            buttons: PointerButtons::NONE,
        }
    }

    pub fn with_buttons(mut self, buttons: PointerButtons) -> Self {
        self.buttons = buttons;
        self
    }
}

/// Receives dispatched pointer events. The state is forwarded untouched;
/// interpreting it is up to the sink.
pub trait PointerEventSink {
    fn dispatch(&mut self, kind: PointerEventKind, state: PointerEventState);
}

/// Turns raw pointer events on one surface into [`PointerEventState`]s.
///
/// The first pointer to go down becomes primary until it lifts or is
/// cancelled. Coordinates and hit paths are remembered per pointer while it
/// is down or hovering.
pub struct PointerDispatcher {
    surface_id: Tag,
    primary_pointer_id: Option<PointerId>,
    last_buttons: PointerButtons,
    offsets: HashMap<PointerId, Point>,
    coordinates: HashMap<PointerId, Point>,
    hit_paths: HashMap<PointerId, Vec<Tag>>,
    hovering: HashSet<PointerId>,
}

impl PointerDispatcher {
    pub fn new(surface_id: Tag) -> Self {
        Self {
            surface_id,
            primary_pointer_id: None,
            last_buttons: PointerButtons::NONE,
            offsets: HashMap::default(),
            coordinates: HashMap::default(),
            hit_paths: HashMap::default(),
            hovering: HashSet::default(),
        }
    }

    pub fn surface_id(&self) -> Tag {
        self.surface_id
    }

    pub fn primary_pointer_id(&self) -> Option<PointerId> {
        self.primary_pointer_id
    }

    /// Hit-tests `event` against the surface and emits one state to `sink`.
    pub fn handle_event(
        &mut self,
        manager: &mut NativeViewHierarchyManager,
        event: RawPointerEvent,
        sink: &mut dyn PointerEventSink,
    ) -> ViewResult<()> {
        let (path, offset) = manager.hit_path(self.surface_id, event.position)?;
        let id = event.pointer_id;

        match event.kind {
            PointerEventKind::Down if self.primary_pointer_id.is_none() => {
                self.primary_pointer_id = Some(id);
            }
            PointerEventKind::Hover => {
                self.hovering.insert(id);
            }
            PointerEventKind::Leave => {
                self.hovering.remove(&id);
            }
            _ => {}
        }
        self.offsets.insert(id, offset);
        self.coordinates.insert(id, event.position);
        self.hit_paths.insert(id, path);

        let state = PointerEventState {
            primary_pointer_id: self.primary_pointer_id,
            active_pointer_id: id,
            buttons: event.buttons,
            changed_buttons: event.buttons.changed_since(self.last_buttons),
            surface_id: self.surface_id,
            offset_by_pointer_id: self.offsets.clone(),
            event_coordinates_by_pointer_id: self.coordinates.clone(),
            hit_path_by_pointer_id: self.hit_paths.clone(),
            hovering_pointer_ids: self.hovering.clone(),
        };
        self.last_buttons = event.buttons;
        sink.dispatch(event.kind, state);

        let finished = match event.kind {
            PointerEventKind::Up | PointerEventKind::Cancel => !self.hovering.contains(&id),
            PointerEventKind::Leave => true,
            _ => false,
        };
        if matches!(event.kind, PointerEventKind::Up | PointerEventKind::Cancel)
            && self.primary_pointer_id == Some(id)
        {
            self.primary_pointer_id = None;
        }
        if finished {
            self.offsets.remove(&id);
            self.coordinates.remove(&id);
            self.hit_paths.remove(&id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/pointer_tests.rs"]
mod tests;
