#![forbid(unsafe_code)]

//! Action materialization: named sinks become plain callbacks.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

use crate::error::{BindError, Result};
use crate::view_model::OutputSink;

/// A cloneable callback that pushes its argument into one sink.
///
/// Cloning an `Action` creates a new handle to the **same** sink. Actions stay
/// usable after the owning component unmounts.
#[derive(Clone)]
pub struct Action {
    name: Rc<str>,
    push: Rc<dyn Fn(Value) -> Result<()>>,
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("push", &"<function>")
            .finish()
    }
}

impl Action {
    pub fn new(name: &str, push: impl Fn(Value) -> Result<()> + 'static) -> Self {
        Self {
            name: Rc::from(name),
            push: Rc::new(push),
        }
    }

    /// Bind an action to `sink`. Argument conversion failures are reported
    /// as [`BindError::ActionArgument`] and push nothing.
    #[must_use]
    pub fn from_sink(name: &str, sink: OutputSink) -> Self {
        let label: Rc<str> = Rc::from(name);
        let push_label = Rc::clone(&label);
        Self {
            name: label,
            push: Rc::new(move |value| {
                sink.push(value).map_err(|source| BindError::ActionArgument {
                    name: push_label.to_string(),
                    source,
                })
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Push a raw value.
    pub fn call(&self, argument: Value) -> Result<()> {
        (self.push)(argument)
    }

    /// Push a typed value.
    pub fn invoke(&self, argument: impl serde::Serialize) -> Result<()> {
        let value = serde_json::to_value(argument).map_err(|source| BindError::ActionArgument {
            name: self.name.to_string(),
            source,
        })?;
        self.call(value)
    }
}

/// Named actions, one per view-model output.
#[derive(Debug, Clone, Default)]
pub struct ActionMap(BTreeMap<String, Action>);

impl ActionMap {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Action)> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
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
}

impl FromIterator<(String, Action)> for ActionMap {
    fn from_iter<I: IntoIterator<Item = (String, Action)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build one [`Action`] per output sink.
///
/// An empty `outputs` map yields an empty (not absent) [`ActionMap`].
#[must_use]
pub fn materialize(outputs: &BTreeMap<String, OutputSink>) -> ActionMap {
    outputs
        .iter()
        .map(|(name, sink)| (name.clone(), Action::from_sink(name, sink.clone())))
        .collect()
}
