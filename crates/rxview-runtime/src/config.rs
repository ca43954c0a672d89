#![forbid(unsafe_code)]

//! Per-binding configuration.

use std::rc::Rc;

/// Configuration shared by every instance of a bound component.
#[derive(Clone)]
pub struct BindConfig {
    /// Display name used in log events.
    pub name: String,
    /// Strip property keys that collide with input or output names before
    /// they reach the property bridge.
    pub filter_reserved_props: bool,
    /// Called synchronously with the new render version whenever an instance
    /// needs to re-render.
    pub on_invalidate: Option<Rc<dyn Fn(u64)>>,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            name: "Connected".to_string(),
            filter_reserved_props: true,
            on_invalidate: None,
        }
    }
}

impl std::fmt::Debug for BindConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindConfig")
            .field("name", &self.name)
            .field("filter_reserved_props", &self.filter_reserved_props)
            .field("on_invalidate", &self.on_invalidate.is_some())
            .finish()
    }
}

impl BindConfig {
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_filter_reserved_props(mut self, filter: bool) -> Self {
        self.filter_reserved_props = filter;
        self
    }

    #[must_use]
    pub fn with_on_invalidate(mut self, hook: impl Fn(u64) + 'static) -> Self {
        self.on_invalidate = Some(Rc::new(hook));
        self
    }
}
