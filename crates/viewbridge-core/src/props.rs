use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::pointer::PointerEvents;

/// Key under which a view declares its stacking order among siblings.
pub const Z_INDEX: &str = "zIndex";
/// Key under which a view declares how it takes part in hit testing.
pub const POINTER_EVENTS: &str = "pointerEvents";

/// A single property value as sent by the description layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<PropValue>),
    Map(Props),
}

impl PropValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::String(value)
    }
}

impl From<Props> for PropValue {
    fn from(value: Props) -> Self {
        PropValue::Map(value)
    }
}

/// Ordered property bag of a view.
///
/// Insertion order is kept so view managers see properties in the order the
/// description layer sent them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(IndexMap<String, PropValue>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Applies an update on top of the current values. A `Null` in the
    /// update resets the key.
    pub fn merge(&mut self, update: &Props) {
        for (key, value) in &update.0 {
            if value.is_null() {
                self.0.shift_remove(key);
            } else {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(PropValue::as_f64).map(|v| v as f32)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(PropValue::as_bool)
    }

    /// `Some(None)` when the update explicitly clears the z-index, `None`
    /// when it does not mention it.
    pub fn z_index_update(&self) -> Option<Option<i32>> {
        self.get(Z_INDEX).map(|value| value.as_f64().map(|z| z as i32))
    }

    pub fn z_index(&self) -> Option<i32> {
        self.z_index_update().flatten()
    }

    /// Pointer-events mode carried by this bag, if any.
    pub fn pointer_events(&self) -> Option<PointerEvents> {
        self.get(POINTER_EVENTS).map(|value| {
            value
                .as_str()
                .map(PointerEvents::parse)
                .unwrap_or_default()
        })
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Props(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_and_null_resets() {
        let mut props = Props::new().with("opacity", 0.5).with("testID", "a");
        props.merge(&Props::new().with("opacity", 1.0).with("testID", PropValue::Null));
        assert_eq!(props.get_f32("opacity"), Some(1.0));
        assert!(!props.contains_key("testID"));
    }

    #[test]
    fn z_index_distinguishes_clear_from_absent() {
        assert_eq!(Props::new().z_index_update(), None);
        assert_eq!(
            Props::new().with(Z_INDEX, PropValue::Null).z_index_update(),
            Some(None)
        );
        assert_eq!(Props::new().with(Z_INDEX, 3).z_index(), Some(3));
    }

    #[test]
    fn pointer_events_parse_from_string() {
        let props = Props::new().with(POINTER_EVENTS, "box-none");
        assert_eq!(props.pointer_events(), Some(PointerEvents::BoxNone));
        assert_eq!(Props::new().pointer_events(), None);
    }

    #[test]
    fn json_keeps_insertion_order() {
        let props: Props = [("b", PropValue::from(1)), ("a", PropValue::from(true))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&props).expect("serialize props");
        assert_eq!(json, r#"{"b":1.0,"a":true}"#);
        let back: Props = serde_json::from_str(&json).expect("deserialize props");
        assert_eq!(back, props);
    }
}
