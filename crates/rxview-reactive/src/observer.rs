#![forbid(unsafe_code)]

//! Observers: the receiving end of a [`Source`](crate::Source).

use std::cell::Cell;
use std::rc::Rc;

use crate::error::StreamError;

/// A single event delivered to an [`Observer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Notification<T> {
    Next(T),
    Error(StreamError),
    Complete,
}

/// Cloneable handle to a notification callback.
///
/// All clones share one `closed` flag. Once the flag is set, by a terminal
/// notification or by releasing the owning subscription, every further call
/// is dropped.
pub struct Observer<T> {
    handler: Rc<dyn Fn(Notification<T>)>,
    closed: Rc<Cell<bool>>,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            handler: Rc::clone(&self.handler),
            closed: Rc::clone(&self.closed),
        }
    }
}

impl<T> std::fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("closed", &self.closed.get())
            .finish()
    }
}

impl<T> Observer<T> {
    pub fn new(handler: impl Fn(Notification<T>) + 'static) -> Self {
        Self {
            handler: Rc::new(handler),
            closed: Rc::new(Cell::new(false)),
        }
    }

    /// Deliver a value. Dropped if the observer is closed.
    pub fn next(&self, value: T) {
        if !self.closed.get() {
            (self.handler)(Notification::Next(value));
        }
    }

    /// Deliver a failure and close the observer.
    pub fn error(&self, error: StreamError) {
        if !self.closed.replace(true) {
            (self.handler)(Notification::Error(error));
        }
    }

    /// Signal completion and close the observer.
    pub fn complete(&self) {
        if !self.closed.replace(true) {
            (self.handler)(Notification::Complete);
        }
    }

    /// Route a notification to the matching method.
    pub fn notify(&self, notification: Notification<T>) {
        match notification {
            Notification::Next(value) => self.next(value),
            Notification::Error(error) => self.error(error),
            Notification::Complete => self.complete(),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub(crate) fn closed_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recording() -> (Observer<i32>, Rc<RefCell<Vec<Notification<i32>>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let observer = Observer::new(move |n| log_clone.borrow_mut().push(n));
        (observer, log)
    }

    #[test]
    fn next_then_complete() {
        let (observer, log) = recording();
        observer.next(1);
        observer.next(2);
        observer.complete();

        assert_eq!(
            *log.borrow(),
            vec![
                Notification::Next(1),
                Notification::Next(2),
                Notification::Complete
            ]
        );
    }

    #[test]
    fn nothing_after_error() {
        let (observer, log) = recording();
        observer.error(StreamError::failed("boom"));
        observer.next(3);
        observer.complete();
        observer.error(StreamError::failed("again"));

        assert_eq!(
            *log.borrow(),
            vec![Notification::Error(StreamError::failed("boom"))]
        );
        assert!(observer.is_closed());
    }

    #[test]
    fn clones_share_closed_flag() {
        let (observer, log) = recording();
        let other = observer.clone();
        other.complete();
        observer.next(1);

        assert_eq!(*log.borrow(), vec![Notification::Complete]);
    }
}
