#![forbid(unsafe_code)]

//! Hot multicast sources.
//!
//! A [`Subject`] keeps a list of observers and pushes each value to every
//! observer registered at the time of the push. A [`ReplaySubject`]
//! additionally caches the last `capacity` values and hands them to each new
//! subscriber as soon as it is registered.
//!
//! Observer lists are snapshotted before delivery, so observers may subscribe,
//! unsubscribe or push from inside a notification.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::error::StreamError;
use crate::observer::Observer;
use crate::source::Source;
use crate::subscription::Subscription;

#[derive(Debug, Clone)]
enum Terminal {
    Errored(StreamError),
    Completed,
}

struct SubjectInner<T> {
    observers: Vec<(u64, Observer<T>)>,
    next_id: u64,
    terminal: Option<Terminal>,
}

/// A hot source that is also a sink.
///
/// Cloning a `Subject` creates a new handle to the **same** observer list.
pub struct Subject<T> {
    inner: Rc<RefCell<SubjectInner<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Subject")
            .field("observers", &inner.observers.len())
            .field("terminal", &inner.terminal)
            .finish()
    }
}

impl<T: Clone + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Subject<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SubjectInner {
                observers: Vec::new(),
                next_id: 0,
                terminal: None,
            })),
        }
    }

    /// Push `value` to every current observer.
    ///
    /// Ignored once the subject has errored or completed.
    pub fn next(&self, value: T) {
        let observers: Vec<Observer<T>> = {
            let inner = self.inner.borrow();
            if inner.terminal.is_some() {
                tracing::trace!("value pushed into a terminated subject was dropped");
                return;
            }
            inner.observers.iter().map(|(_, o)| o.clone()).collect()
        };
        for observer in observers {
            observer.next(value.clone());
        }
    }

    /// Fail every current and future observer.
    pub fn error(&self, error: StreamError) {
        for observer in self.terminate(Terminal::Errored(error.clone())) {
            observer.error(error.clone());
        }
    }

    /// Complete every current and future observer.
    pub fn complete(&self) {
        for observer in self.terminate(Terminal::Completed) {
            observer.complete();
        }
    }

    fn terminate(&self, terminal: Terminal) -> Vec<Observer<T>> {
        let mut inner = self.inner.borrow_mut();
        if inner.terminal.is_some() {
            return Vec::new();
        }
        inner.terminal = Some(terminal);
        inner.observers.drain(..).map(|(_, o)| o).collect()
    }

    /// Number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// View this subject as a [`Source`].
    #[must_use]
    pub fn source(&self) -> Source<T> {
        let inner = Rc::clone(&self.inner);
        Source::new(move |observer| {
            let terminal = inner.borrow().terminal.clone();
            match terminal {
                Some(Terminal::Errored(error)) => {
                    observer.error(error);
                    return Subscription::empty();
                }
                Some(Terminal::Completed) => {
                    observer.complete();
                    return Subscription::empty();
                }
                None => {}
            }

            let id = {
                let mut inner = inner.borrow_mut();
                let id = inner.next_id;
                inner.next_id += 1;
                inner.observers.push((id, observer));
                id
            };
            let weak: Weak<RefCell<SubjectInner<T>>> = Rc::downgrade(&inner);
            Subscription::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let removed = {
                        let mut inner = inner.borrow_mut();
                        let position = inner.observers.iter().position(|(oid, _)| *oid == id);
                        position.map(|p| inner.observers.remove(p))
                    };
                    // Dropped outside the borrow; the observer may own subscriptions.
                    drop(removed);
                }
            })
        })
    }
}

/// A [`Subject`] that replays its last `capacity` values to new subscribers.
///
/// Values pushed before anyone subscribes are kept, so the first subscriber
/// still receives them.
pub struct ReplaySubject<T> {
    subject: Subject<T>,
    buffer: Rc<RefCell<VecDeque<T>>>,
    capacity: usize,
}

impl<T> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            buffer: Rc::clone(&self.buffer),
            capacity: self.capacity,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ReplaySubject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplaySubject")
            .field("buffer", &self.buffer.borrow())
            .field("capacity", &self.capacity)
            .field("subject", &self.subject)
            .finish()
    }
}

impl<T: Clone + 'static> ReplaySubject<T> {
    /// Create a replay subject keeping at most `capacity` values.
    ///
    /// A capacity of zero behaves like a plain [`Subject`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            subject: Subject::new(),
            buffer: Rc::new(RefCell::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn next(&self, value: T) {
        if self.subject.inner.borrow().terminal.is_none() && self.capacity > 0 {
            let mut buffer = self.buffer.borrow_mut();
            if buffer.len() == self.capacity {
                buffer.pop_front();
            }
            buffer.push_back(value.clone());
        }
        self.subject.next(value);
    }

    pub fn error(&self, error: StreamError) {
        self.subject.error(error);
    }

    pub fn complete(&self) {
        self.subject.complete();
    }

    /// Most recently buffered value.
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.buffer.borrow().back().cloned()
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }

    /// View this subject as a [`Source`].
    ///
    /// On subscribe the observer is registered for live values first, then
    /// receives a snapshot of the buffer. A terminated subject replays the
    /// buffer before its terminal notification.
    #[must_use]
    pub fn source(&self) -> Source<T> {
        let buffer = Rc::clone(&self.buffer);
        let inner = Rc::clone(&self.subject.inner);
        let live = self.subject.source();
        Source::new(move |observer: Observer<T>| {
            let terminated = inner.borrow().terminal.is_some();
            let subscription = if terminated {
                Subscription::empty()
            } else {
                live.subscribe_observer(observer.clone())
            };
            let replay: Vec<T> = buffer.borrow().iter().cloned().collect();
            for value in replay {
                if observer.is_closed() {
                    break;
                }
                observer.next(value);
            }
            if terminated {
                return live.subscribe_observer(observer);
            }
            subscription
        })
    }
}
