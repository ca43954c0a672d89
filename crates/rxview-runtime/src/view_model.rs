#![forbid(unsafe_code)]

//! View models and how they are supplied.
//!
//! A [`ViewModel`] names its inputs (reactive sources of render state) and
//! its outputs (sinks fed by actions). Values cross the boundary as
//! [`serde_json::Value`]: typed sources are serialized on the way in, typed
//! sinks deserialize on the way out.
//!
//! [`ViewModelSource`] is either one static view model shared by every
//! instance, or a factory called once per instance with the instance's
//! property stream.

use std::collections::BTreeMap;
use std::rc::Rc;

use rxview_reactive::{Sink, Source, StreamError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::props::PropertySnapshot;

/// A sink erased to accept [`Value`]s.
#[derive(Clone)]
pub struct OutputSink {
    push: Rc<dyn Fn(Value) -> std::result::Result<(), serde_json::Error>>,
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}

impl OutputSink {
    /// Wrap a typed sink; values are deserialized into `T` before the push.
    pub fn typed<T, S>(sink: S) -> Self
    where
        T: DeserializeOwned + 'static,
        S: Sink<T> + 'static,
    {
        Self {
            push: Rc::new(move |value| {
                let typed: T = serde_json::from_value(value)?;
                sink.push(typed);
                Ok(())
            }),
        }
    }

    /// Wrap a sink that already takes [`Value`]s.
    pub fn raw(sink: impl Sink<Value> + 'static) -> Self {
        Self {
            push: Rc::new(move |value| {
                sink.push(value);
                Ok(())
            }),
        }
    }

    pub fn push(&self, value: Value) -> std::result::Result<(), serde_json::Error> {
        (self.push)(value)
    }
}

/// Named inputs and outputs describing a component's reactive contract.
///
/// Cloning shares the underlying sources and sinks.
#[derive(Clone, Default)]
pub struct ViewModel {
    inputs: BTreeMap<String, Source<Value>>,
    outputs: BTreeMap<String, OutputSink>,
}

impl std::fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModel")
            .field("inputs", &self.inputs.keys().collect::<Vec<_>>())
            .field("outputs", &self.outputs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ViewModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a typed input. A value that fails to serialize fails the input.
    #[must_use]
    pub fn input<T: Serialize + 'static>(self, name: impl Into<String>, source: Source<T>) -> Self {
        let name = name.into();
        let label = name.clone();
        let lifted = source.try_map(move |value| {
            serde_json::to_value(value).map_err(|e| StreamError::Serialize {
                name: label.clone(),
                message: e.to_string(),
            })
        });
        self.raw_input(name, lifted)
    }

    #[must_use]
    pub fn raw_input(mut self, name: impl Into<String>, source: Source<Value>) -> Self {
        self.inputs.insert(name.into(), source);
        self
    }

    /// Add a typed output.
    #[must_use]
    pub fn output<T, S>(mut self, name: impl Into<String>, sink: S) -> Self
    where
        T: DeserializeOwned + 'static,
        S: Sink<T> + 'static,
    {
        self.outputs.insert(name.into(), OutputSink::typed(sink));
        self
    }

    #[must_use]
    pub fn raw_output(mut self, name: impl Into<String>, sink: impl Sink<Value> + 'static) -> Self {
        self.outputs.insert(name.into(), OutputSink::raw(sink));
        self
    }

    #[must_use]
    pub fn inputs(&self) -> &BTreeMap<String, Source<Value>> {
        &self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> &BTreeMap<String, OutputSink> {
        &self.outputs
    }

    /// Every input and output name.
    pub fn reserved_names(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .keys()
            .chain(self.outputs.keys())
            .map(String::as_str)
    }
}

pub type ViewModelFactory = Rc<dyn Fn(Source<PropertySnapshot>) -> Result<ViewModel>>;

/// How a bound component obtains its view model.
#[derive(Clone)]
pub enum ViewModelSource {
    /// The same view model for every instance.
    Static(ViewModel),
    /// A fresh view model per instance, built from its property stream.
    Factory(ViewModelFactory),
}

impl std::fmt::Debug for ViewModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(view_model) => f.debug_tuple("Static").field(view_model).finish(),
            Self::Factory(_) => f.write_str("Factory(<function>)"),
        }
    }
}

impl ViewModelSource {
    /// A fallible factory. An `Err` aborts instantiation.
    pub fn factory(
        factory: impl Fn(Source<PropertySnapshot>) -> Result<ViewModel> + 'static,
    ) -> Self {
        Self::Factory(Rc::new(factory))
    }

    /// A factory that cannot fail.
    pub fn from_fn(factory: impl Fn(Source<PropertySnapshot>) -> ViewModel + 'static) -> Self {
        Self::Factory(Rc::new(move |props| Ok(factory(props))))
    }

    pub(crate) fn resolve(&self, props: Source<PropertySnapshot>) -> Result<ViewModel> {
        match self {
            Self::Static(view_model) => Ok(view_model.clone()),
            Self::Factory(factory) => factory(props),
        }
    }
}

impl From<ViewModel> for ViewModelSource {
    fn from(view_model: ViewModel) -> Self {
        Self::Static(view_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindError;
    use rxview_reactive::{Notification, Observer, Subject};
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn typed_input_serializes() {
        let vm = ViewModel::new().input("count", Source::of(3u32));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = vm.inputs()["count"].subscribe(move |v| seen_clone.borrow_mut().push(v));
        assert_eq!(*seen.borrow(), vec![json!(3)]);
    }

    #[test]
    fn unserializable_input_fails() {
        let mut bad = std::collections::HashMap::new();
        bad.insert((1, 2), "tuple keys are not JSON object keys");
        let vm = ViewModel::new().input("bad", Source::of(bad));

        let failure = Rc::new(RefCell::new(None));
        let failure_clone = Rc::clone(&failure);
        let _sub = vm.inputs()["bad"].subscribe_observer(Observer::new(move |n| {
            if let Notification::Error(e) = n {
                *failure_clone.borrow_mut() = Some(e);
            }
        }));

        assert!(matches!(
            &*failure.borrow(),
            Some(StreamError::Serialize { name, .. }) if name == "bad"
        ));
    }

    #[test]
    fn reserved_names_cover_both_sides() {
        let sink: Subject<String> = Subject::new();
        let vm = ViewModel::new()
            .input("total", Source::of("x".to_string()))
            .output("setStr", sink);
        let names: Vec<&str> = vm.reserved_names().collect();
        assert_eq!(names, vec!["total", "setStr"]);
    }

    #[test]
    fn static_resolves_to_shared_clone() {
        let sink: Subject<i64> = Subject::new();
        let source = ViewModelSource::from(ViewModel::new().output("n", sink.clone()));
        let a = source.resolve(Source::never()).unwrap();
        let b = source.resolve(Source::never()).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = sink.source().subscribe(move |v| seen_clone.borrow_mut().push(v));
        a.outputs()["n"].push(json!(1)).unwrap();
        b.outputs()["n"].push(json!(2)).unwrap();
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn factory_error_propagates() {
        let source = ViewModelSource::factory(|_| Err(BindError::factory("no backend")));
        let err = source.resolve(Source::never()).unwrap_err();
        assert!(matches!(err, BindError::Factory { .. }));
    }
}
