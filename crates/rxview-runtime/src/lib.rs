#![forbid(unsafe_code)]

//! View-model binding for rxview components.
//!
//! A component declares its render inputs as named reactive sources and its
//! events as named sinks (a [`ViewModel`]). [`with_view_model`] binds that
//! view model to the component's mount/update/unmount cycle:
//!
//! - [`PropertyBridge`] turns pushed property snapshots into a replaying
//!   source the view-model factory can derive signals from.
//! - [`combine_state`] merges the named inputs into one [`CombinedState`]
//!   stream with combine-latest semantics.
//! - [`materialize`] turns the named sinks into an [`ActionMap`] of plain
//!   callbacks.
//! - [`Connected`] owns all of the above for one component instance and holds
//!   the only subscription, released at unmount or drop.

pub mod actions;
pub mod bridge;
pub mod combine;
pub mod component;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod props;
pub mod view_model;

pub use actions::{Action, ActionMap, materialize};
pub use bridge::PropertyBridge;
pub use combine::combine_state;
pub use component::Component;
pub use config::BindConfig;
pub use error::{BindError, Result};
pub use lifecycle::{Bound, Connected, Connector, Phase, connect, with_view_model};
pub use props::{CombinedState, Prop, PropertySnapshot, RenderProps};
pub use serde_json::Value;
pub use view_model::{OutputSink, ViewModel, ViewModelFactory, ViewModelSource};
