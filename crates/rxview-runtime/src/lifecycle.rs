#![forbid(unsafe_code)]

//! Binding a view model to one component instance's lifecycle.
//!
//! # Design
//!
//! [`with_view_model`] (or the curried [`connect`]) pairs a
//! [`ViewModelSource`] with a [`Component`] and returns a [`Bound`]
//! component type. Each call to [`Bound::instantiate`] builds a
//! [`Connected`] instance that owns, exclusively:
//!
//! - its [`PropertyBridge`],
//! - the view model resolved for it (static clone or fresh factory output),
//! - the combined-state source and the [`ActionMap`],
//! - the one combined-state [`Subscription`].
//!
//! State written from the subscription callback lives in a shared
//! `Rc<InstanceState>`, reached from the callback through a `Weak`; the
//! callback never holds a borrow while calling out, so the invalidate hook
//! may render or fire actions.
//!
//! # State machine
//!
//! ```text
//! Uninitialized --mount--> Mounted --unmount--> Unmounted
//!       |                                          ^
//!       +------------------unmount-----------------+
//! ```
//!
//! `mount` and `unmount` are no-ops outside their source phase.
//!
//! # Failure Modes
//!
//! - **Factory error**: [`Bound::instantiate`] returns it; no instance exists.
//! - **Upstream failure**: recorded; the combined-state subscription is
//!   released at once and [`Connected::render`] returns
//!   [`BindError::Upstream`] from then on.
//! - **Actions after unmount**: still push into their sinks.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use rxview_reactive::{Notification, Observer, Source, StreamError, Subscription};
use tracing::{debug, trace, warn};

use crate::actions::{ActionMap, materialize};
use crate::bridge::PropertyBridge;
use crate::combine::combine_state;
use crate::component::Component;
use crate::config::BindConfig;
use crate::error::{BindError, Result};
use crate::props::{CombinedState, PropertySnapshot, RenderProps};
use crate::view_model::ViewModelSource;

/// Lifecycle phase of a [`Connected`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Mounted,
    /// Terminal.
    Unmounted,
}

/// Bind `view_model` to `component`.
pub fn with_view_model<C: Component>(
    view_model: impl Into<ViewModelSource>,
    component: C,
) -> Bound<C> {
    Bound {
        view_model: view_model.into(),
        component: Rc::new(component),
        config: BindConfig::default(),
    }
}

/// Curried form of [`with_view_model`].
pub fn connect(view_model: impl Into<ViewModelSource>) -> Connector {
    Connector {
        view_model: view_model.into(),
        config: BindConfig::default(),
    }
}

/// A view model waiting for components to wrap.
#[derive(Debug, Clone)]
pub struct Connector {
    view_model: ViewModelSource,
    config: BindConfig,
}

impl Connector {
    #[must_use]
    pub fn with_config(mut self, config: BindConfig) -> Self {
        self.config = config;
        self
    }

    pub fn wrap<C: Component>(&self, component: C) -> Bound<C> {
        Bound {
            view_model: self.view_model.clone(),
            component: Rc::new(component),
            config: self.config.clone(),
        }
    }
}

/// A component type bound to a view model.
pub struct Bound<C> {
    view_model: ViewModelSource,
    component: Rc<C>,
    config: BindConfig,
}

impl<C> Clone for Bound<C> {
    fn clone(&self) -> Self {
        Self {
            view_model: self.view_model.clone(),
            component: Rc::clone(&self.component),
            config: self.config.clone(),
        }
    }
}

impl<C> std::fmt::Debug for Bound<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bound")
            .field("view_model", &self.view_model)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C: Component> Bound<C> {
    #[must_use]
    pub fn with_config(mut self, config: BindConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Construct an instance with its initial properties.
    ///
    /// Resolves the view model (calling the factory, if any, exactly once)
    /// and prepares the combined-state source and action map. Nothing is
    /// subscribed until [`Connected::mount`].
    pub fn instantiate(&self, props: PropertySnapshot) -> Result<Connected<C>> {
        let bridge = PropertyBridge::new();
        let view_model = self.view_model.resolve(bridge.source()).inspect_err(|err| {
            warn!(component = %self.config.name, error = %err, "view model construction failed");
        })?;

        let reserved: BTreeSet<String> = view_model.reserved_names().map(str::to_owned).collect();
        let state_source = combine_state(view_model.inputs());
        let actions = materialize(view_model.outputs());
        debug!(
            component = %self.config.name,
            inputs = view_model.inputs().len(),
            outputs = actions.len(),
            "view model resolved"
        );

        let shared = Rc::new(InstanceState {
            state: RefCell::new(None),
            failure: RefCell::new(None),
            version: Cell::new(0),
            needs_render: Cell::new(false),
            on_invalidate: self.config.on_invalidate.clone(),
            subscription: RefCell::new(None),
        });

        let mut instance = Connected {
            component: Rc::clone(&self.component),
            config: self.config.clone(),
            phase: Phase::Uninitialized,
            bridge,
            state_source,
            actions,
            reserved,
            props: PropertySnapshot::default(),
            shared,
        };
        instance.props = instance.filter(props);
        Ok(instance)
    }
}

/// State written by the combined-state subscription.
struct InstanceState {
    state: RefCell<Option<CombinedState>>,
    failure: RefCell<Option<StreamError>>,
    version: Cell<u64>,
    needs_render: Cell<bool>,
    on_invalidate: Option<Rc<dyn Fn(u64)>>,
    subscription: RefCell<Option<Subscription>>,
}

impl InstanceState {
    fn invalidate(&self) {
        let version = self.version.get() + 1;
        self.version.set(version);
        self.needs_render.set(true);
        if let Some(hook) = &self.on_invalidate {
            hook(version);
        }
    }
}

/// One bound component instance.
pub struct Connected<C: Component> {
    component: Rc<C>,
    config: BindConfig,
    phase: Phase,
    bridge: PropertyBridge,
    state_source: Source<CombinedState>,
    actions: ActionMap,
    reserved: BTreeSet<String>,
    props: PropertySnapshot,
    shared: Rc<InstanceState>,
}

impl<C: Component> std::fmt::Debug for Connected<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connected")
            .field("name", &self.config.name)
            .field("phase", &self.phase)
            .field("props", &self.props)
            .field("state", &self.shared.state.borrow())
            .field("actions", &self.actions)
            .field("version", &self.shared.version.get())
            .finish_non_exhaustive()
    }
}

impl<C: Component> Connected<C> {
    fn filter(&self, props: PropertySnapshot) -> PropertySnapshot {
        if self.config.filter_reserved_props {
            props.without(&self.reserved)
        } else {
            props
        }
    }

    /// Supply the current props to the bridge, then subscribe to the
    /// combined state.
    pub fn mount(&mut self) {
        if self.phase != Phase::Uninitialized {
            trace!(component = %self.config.name, phase = ?self.phase, "mount ignored");
            return;
        }

        self.bridge.supply(self.props.clone());

        let weak = Rc::downgrade(&self.shared);
        let name = self.config.name.clone();
        let subscription = self.state_source.subscribe_observer(Observer::new(
            move |notification: Notification<CombinedState>| {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                match notification {
                    Notification::Next(state) => {
                        trace!(component = %name, keys = state.len(), "combined state received");
                        *shared.state.borrow_mut() = Some(state);
                        shared.invalidate();
                    }
                    Notification::Error(error) => {
                        warn!(component = %name, error = %error, "upstream source failed");
                        *shared.failure.borrow_mut() = Some(error);
                        let released = shared.subscription.borrow_mut().take();
                        drop(released);
                        shared.invalidate();
                    }
                    Notification::Complete => {}
                }
            },
        ));
        if self.shared.failure.borrow().is_none() {
            *self.shared.subscription.borrow_mut() = Some(subscription);
        } else {
            drop(subscription);
        }
        self.phase = Phase::Mounted;
        debug!(component = %self.config.name, "mounted");
    }

    /// Accept new external properties.
    ///
    /// Before mount they replace the pending props; while mounted they are
    /// pushed into the bridge and trigger a re-render; after unmount they
    /// are ignored.
    pub fn receive_props(&mut self, props: PropertySnapshot) {
        let props = self.filter(props);
        match self.phase {
            Phase::Uninitialized => self.props = props,
            Phase::Mounted => {
                trace!(component = %self.config.name, keys = props.len(), "props received");
                self.props = props.clone();
                self.bridge.supply(props);
                self.shared.invalidate();
            }
            Phase::Unmounted => {
                warn!(component = %self.config.name, "props received after unmount were ignored");
            }
        }
    }

    /// Release the combined-state subscription. Idempotent.
    pub fn unmount(&mut self) {
        if self.phase == Phase::Unmounted {
            return;
        }
        let released = self.shared.subscription.borrow_mut().take();
        if let Some(mut subscription) = released {
            subscription.unsubscribe();
        }
        self.phase = Phase::Unmounted;
        debug!(component = %self.config.name, "unmounted");
    }

    /// Render the wrapped component.
    ///
    /// Returns `Ok(None)` until a combined state has arrived, and after
    /// unmount. Returns the upstream failure once one has been observed.
    pub fn render(&self) -> Result<Option<C::Output>> {
        if let Some(error) = self.shared.failure.borrow().clone() {
            return Err(BindError::Upstream(error));
        }
        let Some(props) = self.render_props() else {
            return Ok(None);
        };
        self.shared.needs_render.set(false);
        Ok(Some(self.component.render(&props)))
    }

    /// The merged props the next render would receive.
    #[must_use]
    pub fn render_props(&self) -> Option<RenderProps> {
        if self.phase == Phase::Unmounted {
            return None;
        }
        let state = self.shared.state.borrow();
        state
            .as_ref()
            .map(|state| RenderProps::merge(&self.props, state, &self.actions))
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Latest combined state, if any has arrived.
    #[must_use]
    pub fn state(&self) -> Option<CombinedState> {
        self.shared.state.borrow().clone()
    }

    /// The bridge feeding props into this instance's view model.
    #[must_use]
    pub fn bridge(&self) -> &PropertyBridge {
        &self.bridge
    }

    #[must_use]
    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    /// Current props after reserved-key filtering.
    #[must_use]
    pub fn props(&self) -> &PropertySnapshot {
        &self.props
    }

    #[must_use]
    pub fn failure(&self) -> Option<StreamError> {
        self.shared.failure.borrow().clone()
    }

    /// Number of re-render requests so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.version.get()
    }

    /// Whether something changed since the last [`render`](Self::render).
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.shared.needs_render.get()
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.shared
            .subscription
            .borrow()
            .as_ref()
            .is_some_and(|subscription| !subscription.is_closed())
    }
}
