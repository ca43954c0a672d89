#![forbid(unsafe_code)]

//! Cold reactive sources.
//!
//! # Design
//!
//! [`Source<T>`] wraps a subscribe function in an `Rc`. Each call to
//! [`subscribe_observer`](Source::subscribe_observer) runs that function for
//! the given observer and wraps whatever it returns in an outer
//! [`Subscription`] that also closes the observer. Releasing the outer guard
//! therefore stops delivery immediately, even when the producer keeps a clone
//! of the observer around (a subject's subscriber list, say).

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::StreamError;
use crate::observer::{Notification, Observer};
use crate::subscription::Subscription;

/// A cloneable, cold value-over-time producer.
///
/// Cloning a `Source` creates a new handle to the **same** subscribe function.
pub struct Source<T> {
    subscribe_fn: Rc<dyn Fn(Observer<T>) -> Subscription>,
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Rc::clone(&self.subscribe_fn),
        }
    }
}

impl<T> std::fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source").finish_non_exhaustive()
    }
}

impl<T: 'static> Source<T> {
    /// Create a source from a subscribe function.
    ///
    /// The function is called once per subscriber and returns the
    /// subscription that releases whatever it set up.
    pub fn new(subscribe: impl Fn(Observer<T>) -> Subscription + 'static) -> Self {
        Self {
            subscribe_fn: Rc::new(subscribe),
        }
    }

    /// Subscribe a full observer.
    pub fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        let closed = observer.closed_flag();
        let upstream = (self.subscribe_fn)(observer);
        Subscription::new(move || {
            closed.set(true);
            drop(upstream);
        })
    }

    /// Subscribe to values only; errors and completion are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `on_next` causes this same subscription to be notified
    /// again while it is still running (re-entrant `FnMut` call). Use
    /// [`subscribe_observer`](Self::subscribe_observer) with an `Fn`
    /// callback when re-entrant delivery is possible.
    pub fn subscribe(&self, on_next: impl FnMut(T) + 'static) -> Subscription {
        let on_next = RefCell::new(on_next);
        self.subscribe_observer(Observer::new(move |notification| {
            if let Notification::Next(value) = notification {
                (&mut *on_next.borrow_mut())(value);
            }
        }))
    }

    /// A source that never emits and never completes.
    pub fn never() -> Self {
        Self::new(|_| Subscription::empty())
    }

    /// A source that fails immediately with `error`.
    pub fn fail(error: StreamError) -> Self {
        Self::new(move |observer| {
            observer.error(error.clone());
            Subscription::empty()
        })
    }
}

impl<T: Clone + 'static> Source<T> {
    /// Emit `value` synchronously on subscribe, then complete.
    pub fn of(value: T) -> Self {
        Self::new(move |observer| {
            observer.next(value.clone());
            observer.complete();
            Subscription::empty()
        })
    }

    /// Emit every item synchronously on subscribe, then complete.
    pub fn from_iter(values: impl IntoIterator<Item = T>) -> Self {
        let values: Rc<[T]> = values.into_iter().collect();
        Self::new(move |observer| {
            for value in values.iter() {
                if observer.is_closed() {
                    break;
                }
                observer.next(value.clone());
            }
            observer.complete();
            Subscription::empty()
        })
    }
}
