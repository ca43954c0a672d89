#![forbid(unsafe_code)]

//! Write-only consumers.

use crate::observer::Observer;
use crate::subject::{ReplaySubject, Subject};

/// Something values can be pushed into.
pub trait Sink<T> {
    fn push(&self, value: T);
}

impl<T: Clone + 'static> Sink<T> for Subject<T> {
    fn push(&self, value: T) {
        self.next(value);
    }
}

impl<T: Clone + 'static> Sink<T> for ReplaySubject<T> {
    fn push(&self, value: T) {
        self.next(value);
    }
}

impl<T> Sink<T> for Observer<T> {
    fn push(&self, value: T) {
        self.next(value);
    }
}
