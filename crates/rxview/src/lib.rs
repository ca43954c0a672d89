#![forbid(unsafe_code)]

//! rxview public facade crate.
//!
//! Bind reactive view models to component lifecycles. See
//! [`rxview_runtime`] for the binding itself and [`rxview_reactive`] for the
//! sources and sinks it is built on.

pub use rxview_reactive as reactive;
pub use rxview_runtime as runtime;

pub use rxview_runtime::{
    Action, ActionMap, BindConfig, BindError, Bound, CombinedState, Component, Connected,
    Connector, Phase, PropertySnapshot, RenderProps, ViewModel, ViewModelSource, connect,
    with_view_model,
};

pub mod prelude {
    pub use rxview_reactive::{ReplaySubject, Sink, Source, StreamError, Subject, Subscription};
    pub use rxview_runtime::{
        BindConfig, BindError, Component, PropertySnapshot, RenderProps, ViewModel,
        ViewModelSource, connect, with_view_model,
    };
}
