#![forbid(unsafe_code)]

//! Reactive sources and sinks for rxview.
//!
//! This crate provides the push-based primitives the view-model runtime is
//! built on:
//!
//! - [`Source`]: A cold, cloneable value-over-time producer. Subscribing runs
//!   the source's subscribe function for that subscriber only.
//! - [`Observer`]: The receiving end handed to a source, carrying
//!   [`Notification`]s.
//! - [`Subscription`]: RAII guard that releases the subscription on drop.
//! - [`Subject`] / [`ReplaySubject`]: Hot multicast sources that are also
//!   [`Sink`]s.
//!
//! # Architecture
//!
//! Everything is single-threaded and synchronous. Shared state lives in
//! `Rc<RefCell<..>>` and no `RefCell` borrow is held while a callback runs, so
//! an observer may push into a subject from inside a notification.
//!
//! # Invariants
//!
//! 1. Values from one source reach each of its observers in emission order.
//! 2. After `error` or `complete`, an observer receives nothing further.
//! 3. Releasing a [`Subscription`] closes its observer before the next
//!    notification, even if the upstream still holds a reference to it.
//! 4. `Subscription::unsubscribe` is idempotent.

pub mod error;
pub mod observer;
pub mod operators;
pub mod sink;
pub mod source;
pub mod subject;
pub mod subscription;

pub use error::StreamError;
pub use observer::{Notification, Observer};
pub use operators::combine_latest;
pub use sink::Sink;
pub use source::Source;
pub use subject::{ReplaySubject, Subject};
pub use subscription::Subscription;
