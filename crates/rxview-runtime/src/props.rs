#![forbid(unsafe_code)]

//! Property, state and render-prop maps.
//!
//! # Merge order
//!
//! [`RenderProps::merge`] layers three maps in a fixed order:
//!
//! 1. raw [`PropertySnapshot`] entries,
//! 2. [`CombinedState`] entries,
//! 3. [`ActionMap`] entries.
//!
//! A later layer replaces an earlier entry with the same name.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::actions::{Action, ActionMap};
use crate::error::{BindError, Result};

/// Externally supplied properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySnapshot(Map<String, Value>);

impl PropertySnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Copy of this snapshot without the given keys.
    #[must_use]
    pub fn without<I, S>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filtered = self.0.clone();
        for key in keys {
            filtered.remove(key.as_ref());
        }
        Self(filtered)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for PropertySnapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PropertySnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Latest value of every view-model input, keyed by input name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedState(BTreeMap<String, Value>);

impl CombinedState {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl FromIterator<(String, Value)> for CombinedState {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One entry of [`RenderProps`].
#[derive(Debug, Clone)]
pub enum Prop {
    Value(Value),
    Action(Action),
}

impl Prop {
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Action(_) => None,
        }
    }

    #[must_use]
    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Self::Action(action) => Some(action),
            Self::Value(_) => None,
        }
    }
}

/// The effective properties handed to a wrapped component.
#[derive(Debug, Clone, Default)]
pub struct RenderProps {
    entries: BTreeMap<String, Prop>,
}

impl RenderProps {
    /// Layer raw props, then combined state, then actions.
    #[must_use]
    pub fn merge(raw: &PropertySnapshot, state: &CombinedState, actions: &ActionMap) -> Self {
        let mut entries = BTreeMap::new();
        for (name, value) in raw.iter() {
            entries.insert(name.clone(), Prop::Value(value.clone()));
        }
        for (name, value) in state.iter() {
            entries.insert(name.clone(), Prop::Value(value.clone()));
        }
        for (name, action) in actions.iter() {
            entries.insert(name.clone(), Prop::Action(action.clone()));
        }
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Prop> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Prop::as_value)
    }

    /// String value of `name`, if it is a JSON string.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.get(name).and_then(Prop::as_action)
    }

    /// Invoke the action `name` with a typed argument.
    pub fn call(&self, name: &str, argument: impl serde::Serialize) -> Result<()> {
        let action = self.action(name).ok_or_else(|| BindError::UnknownAction {
            name: name.to_string(),
        })?;
        action.invoke(argument)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn state(pairs: &[(&str, Value)]) -> CombinedState {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn snapshot_builder_and_filter() {
        let snapshot = PropertySnapshot::new()
            .with("label", "cheese")
            .with("total", "stale")
            .with("count", 3);

        let filtered = snapshot.without(["total"]);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.get("label"), Some(&json!("cheese")));
        assert!(filtered.get("total").is_none());
        // Original untouched.
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn merge_state_overrides_raw() {
        let raw = PropertySnapshot::new()
            .with("label", "cheese")
            .with("total", "raw");
        let merged = RenderProps::merge(
            &raw,
            &state(&[("total", json!("2 bananas"))]),
            &ActionMap::default(),
        );

        assert_eq!(merged.str("label"), Some("cheese"));
        assert_eq!(merged.str("total"), Some("2 bananas"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_action_overrides_state_and_raw() {
        let pushed = Rc::new(RefCell::new(Vec::new()));
        let pushed_clone = Rc::clone(&pushed);
        let actions: ActionMap = [(
            "clash".to_string(),
            Action::new("clash", move |v| {
                pushed_clone.borrow_mut().push(v);
                Ok(())
            }),
        )]
        .into_iter()
        .collect();

        let merged = RenderProps::merge(
            &PropertySnapshot::new().with("clash", 1),
            &state(&[("clash", json!(2))]),
            &actions,
        );

        assert!(merged.value("clash").is_none());
        merged.call("clash", 9).unwrap();
        assert_eq!(*pushed.borrow(), vec![json!(9)]);
    }

    #[test]
    fn call_unknown_action() {
        let merged = RenderProps::default();
        let err = merged.call("missing", 1).unwrap_err();
        assert!(matches!(err, BindError::UnknownAction { ref name } if name == "missing"));
    }

    #[test]
    fn combined_state_keys_sorted() {
        let s = state(&[("b", json!(1)), ("a", json!(2))]);
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
