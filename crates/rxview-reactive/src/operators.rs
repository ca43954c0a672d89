#![forbid(unsafe_code)]

//! Operators deriving new sources from existing ones.
//!
//! Every operator is cold: nothing happens until the derived source is
//! subscribed, and each subscription gets its own operator state.
//!
//! # Combine-latest
//!
//! [`combine_latest`] and [`Source::combine_latest2`] stay silent until every
//! input has emitted at least once. From then on each input emission yields
//! exactly one combined value built from the latest value of every input.
//! Emissions are never coalesced. The combination fails as soon as any input
//! fails, and completes when every input has completed or when an input
//! completes without ever emitting.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::StreamError;
use crate::observer::{Notification, Observer};
use crate::source::Source;
use crate::subscription::Subscription;

impl<T: 'static> Source<T> {
    /// Transform every value with `f`.
    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + 'static) -> Source<U> {
        let upstream = self.clone();
        let f = Rc::new(f);
        Source::new(move |downstream: Observer<U>| {
            let f = Rc::clone(&f);
            upstream.subscribe_observer(Observer::new(move |notification| match notification {
                Notification::Next(value) => downstream.next(f(value)),
                Notification::Error(error) => downstream.error(error),
                Notification::Complete => downstream.complete(),
            }))
        })
    }

    /// Transform every value with a fallible `f`; the first `Err` fails the
    /// derived source.
    pub fn try_map<U: 'static>(
        &self,
        f: impl Fn(T) -> Result<U, StreamError> + 'static,
    ) -> Source<U> {
        let upstream = self.clone();
        let f = Rc::new(f);
        Source::new(move |downstream: Observer<U>| {
            let f = Rc::clone(&f);
            upstream.subscribe_observer(Observer::new(move |notification| match notification {
                Notification::Next(value) => match f(value) {
                    Ok(mapped) => downstream.next(mapped),
                    Err(error) => downstream.error(error),
                },
                Notification::Error(error) => downstream.error(error),
                Notification::Complete => downstream.complete(),
            }))
        })
    }

    /// Forward only the values for which `predicate` holds.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Source<T> {
        let upstream = self.clone();
        let predicate = Rc::new(predicate);
        Source::new(move |downstream: Observer<T>| {
            let predicate = Rc::clone(&predicate);
            upstream.subscribe_observer(Observer::new(move |notification| match notification {
                Notification::Next(value) => {
                    if predicate(&value) {
                        downstream.next(value);
                    }
                }
                other => downstream.notify(other),
            }))
        })
    }
}

impl<T: Clone + 'static> Source<T> {
    /// Emit `first` synchronously on subscribe, then everything upstream
    /// emits.
    pub fn start_with(&self, first: T) -> Source<T> {
        let upstream = self.clone();
        Source::new(move |downstream: Observer<T>| {
            downstream.next(first.clone());
            if downstream.is_closed() {
                return Subscription::empty();
            }
            upstream.subscribe_observer(downstream)
        })
    }

    /// Combine with `other` into pairs of latest values.
    pub fn combine_latest2<U: Clone + 'static>(&self, other: &Source<U>) -> Source<(T, U)> {
        let left = self.clone();
        let right = other.clone();
        Source::new(move |downstream: Observer<(T, U)>| {
            let latest: Rc<RefCell<(Option<T>, Option<U>)>> = Rc::new(RefCell::new((None, None)));
            let completed = Rc::new(Cell::new(0u8));
            let mut subscription = Subscription::empty();

            let pair = {
                let latest = Rc::clone(&latest);
                move || {
                    let latest = latest.borrow();
                    match &*latest {
                        (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                        _ => None,
                    }
                }
            };
            let pair = Rc::new(pair);

            {
                let latest = Rc::clone(&latest);
                let completed = Rc::clone(&completed);
                let pair = Rc::clone(&pair);
                let downstream = downstream.clone();
                subscription.add(left.subscribe_observer(Observer::new(move |notification| {
                    match notification {
                        Notification::Next(value) => {
                            latest.borrow_mut().0 = Some(value);
                            if let Some(values) = pair() {
                                downstream.next(values);
                            }
                        }
                        Notification::Error(error) => downstream.error(error),
                        Notification::Complete => {
                            let never_emitted = latest.borrow().0.is_none();
                            completed.set(completed.get() + 1);
                            if never_emitted || completed.get() == 2 {
                                downstream.complete();
                            }
                        }
                    }
                })));
            }

            if !downstream.is_closed() {
                let downstream = downstream.clone();
                subscription.add(right.subscribe_observer(Observer::new(move |notification| {
                    match notification {
                        Notification::Next(value) => {
                            latest.borrow_mut().1 = Some(value);
                            if let Some(values) = pair() {
                                downstream.next(values);
                            }
                        }
                        Notification::Error(error) => downstream.error(error),
                        Notification::Complete => {
                            let never_emitted = latest.borrow().1.is_none();
                            completed.set(completed.get() + 1);
                            if never_emitted || completed.get() == 2 {
                                downstream.complete();
                            }
                        }
                    }
                })));
            }

            subscription
        })
    }
}

impl<T: Clone + PartialEq + 'static> Source<T> {
    /// Drop values equal to the one forwarded just before.
    pub fn distinct_until_changed(&self) -> Source<T> {
        let upstream = self.clone();
        Source::new(move |downstream: Observer<T>| {
            let last: RefCell<Option<T>> = RefCell::new(None);
            upstream.subscribe_observer(Observer::new(move |notification| match notification {
                Notification::Next(value) => {
                    let changed = last.borrow().as_ref() != Some(&value);
                    if changed {
                        *last.borrow_mut() = Some(value.clone());
                        downstream.next(value);
                    }
                }
                other => downstream.notify(other),
            }))
        })
    }
}

/// Per-subscription state of [`combine_latest`].
struct CombineSlots<T> {
    latest: RefCell<Vec<Option<T>>>,
    missing: Cell<usize>,
    completed: Cell<usize>,
}

impl<T: Clone> CombineSlots<T> {
    fn new(len: usize) -> Self {
        Self {
            latest: RefCell::new((0..len).map(|_| None).collect()),
            missing: Cell::new(len),
            completed: Cell::new(0),
        }
    }

    /// Store `value` in `index`; return the full row once every slot is set.
    fn store(&self, index: usize, value: T) -> Option<Vec<T>> {
        let mut latest = self.latest.borrow_mut();
        if latest[index].is_none() {
            self.missing.set(self.missing.get() - 1);
        }
        latest[index] = Some(value);
        if self.missing.get() == 0 {
            latest.iter().cloned().collect()
        } else {
            None
        }
    }

    fn has_value(&self, index: usize) -> bool {
        self.latest.borrow()[index].is_some()
    }
}

/// Combine `sources` into rows of their latest values, in input order.
///
/// With no sources the result completes immediately without emitting. Once
/// the result fails or completes, every input subscription is released.
pub fn combine_latest<T: Clone + 'static>(sources: Vec<Source<T>>) -> Source<Vec<T>> {
    let sources: Rc<[Source<T>]> = sources.into();
    Source::new(move |downstream: Observer<Vec<T>>| {
        let len = sources.len();
        if len == 0 {
            downstream.complete();
            return Subscription::empty();
        }

        let slots = Rc::new(CombineSlots::new(len));
        let inner = Rc::new(RefCell::new(Subscription::empty()));
        for (index, source) in sources.iter().enumerate() {
            if downstream.is_closed() {
                break;
            }
            let slots = Rc::clone(&slots);
            let downstream = downstream.clone();
            let release = Rc::downgrade(&inner);
            let child = source.subscribe_observer(Observer::new(move |notification| {
                match notification {
                    Notification::Next(value) => {
                        if let Some(row) = slots.store(index, value) {
                            downstream.next(row);
                        }
                        return;
                    }
                    Notification::Error(error) => downstream.error(error),
                    Notification::Complete => {
                        slots.completed.set(slots.completed.get() + 1);
                        if slots.has_value(index) && slots.completed.get() < len {
                            return;
                        }
                        downstream.complete();
                    }
                }
                if let Some(inner) = release.upgrade() {
                    release_inputs(&inner);
                }
            }));
            inner.borrow_mut().add(child);
        }
        if downstream.is_closed() {
            release_inputs(&inner);
        }
        Subscription::new(move || release_inputs(&inner))
    })
}

/// Swap out and release the input subscriptions of a combination.
fn release_inputs(inner: &RefCell<Subscription>) {
    let mut taken = std::mem::replace(&mut *inner.borrow_mut(), Subscription::empty());
    taken.unsubscribe();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Subject;

    fn values<T: Clone + 'static>(source: &Source<T>) -> (Rc<RefCell<Vec<T>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let sub = source.subscribe(move |v| seen_clone.borrow_mut().push(v));
        (seen, sub)
    }

    #[test]
    fn map_transforms() {
        let (seen, _sub) = values(&Source::from_iter([1, 2, 3]).map(|v| v * 10));
        assert_eq!(*seen.borrow(), vec![10, 20, 30]);
    }

    #[test]
    fn try_map_fails_on_err() {
        let source = Source::from_iter([1, -1, 2]).try_map(|v| {
            if v < 0 {
                Err(StreamError::failed("negative"))
            } else {
                Ok(v)
            }
        });
        let failure = Rc::new(RefCell::new(None));
        let failure_clone = Rc::clone(&failure);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = source.subscribe_observer(Observer::new(move |n| match n {
            Notification::Next(v) => seen_clone.borrow_mut().push(v),
            Notification::Error(e) => *failure_clone.borrow_mut() = Some(e),
            Notification::Complete => {}
        }));

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(*failure.borrow(), Some(StreamError::failed("negative")));
    }

    #[test]
    fn filter_drops_rejected() {
        let (seen, _sub) = values(&Source::from_iter(1..=6).filter(|v| v % 2 == 0));
        assert_eq!(*seen.borrow(), vec![2, 4, 6]);
    }

    #[test]
    fn start_with_then_live() {
        let subject = Subject::new();
        let (seen, _sub) = values(&subject.source().start_with("oranges"));
        assert_eq!(*seen.borrow(), vec!["oranges"]);

        subject.next("apples");
        assert_eq!(*seen.borrow(), vec!["oranges", "apples"]);
    }

    #[test]
    fn distinct_until_changed_skips_repeats() {
        let (seen, _sub) = values(&Source::from_iter([1, 1, 2, 2, 1]).distinct_until_changed());
        assert_eq!(*seen.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn combine_latest_waits_for_all() {
        let a = Subject::new();
        let b = Subject::new();
        let (seen, _sub) = values(&combine_latest(vec![a.source(), b.source()]));

        a.next(1);
        a.next(2);
        assert!(seen.borrow().is_empty());

        b.next(10);
        assert_eq!(*seen.borrow(), vec![vec![2, 10]]);

        a.next(3);
        b.next(20);
        assert_eq!(
            *seen.borrow(),
            vec![vec![2, 10], vec![3, 10], vec![3, 20]]
        );
    }

    #[test]
    fn combine_latest_empty_completes() {
        let completed = Rc::new(Cell::new(false));
        let completed_clone = Rc::clone(&completed);
        let _sub = combine_latest::<i32>(Vec::new()).subscribe_observer(Observer::new(move |n| {
            assert_eq!(n, Notification::Complete);
            completed_clone.set(true);
        }));
        assert!(completed.get());
    }

    #[test]
    fn combine_latest_propagates_error() {
        let a = Subject::new();
        let b = Subject::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let _sub = combine_latest(vec![a.source(), b.source()])
            .subscribe_observer(Observer::new(move |n| log_clone.borrow_mut().push(n)));

        a.next(1);
        assert_eq!(a.observer_count(), 1);
        b.error(StreamError::failed("b broke"));
        assert_eq!(a.observer_count(), 0);
        a.next(2);

        assert_eq!(
            *log.borrow(),
            vec![Notification::Error(StreamError::failed("b broke"))]
        );
    }

    #[test]
    fn combine_latest_completes_when_silent_input_completes() {
        let a = Subject::new();
        let b: Subject<i32> = Subject::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let _sub = combine_latest(vec![a.source(), b.source()])
            .subscribe_observer(Observer::new(move |n| log_clone.borrow_mut().push(n)));

        a.next(1);
        b.complete();
        assert_eq!(*log.borrow(), vec![Notification::Complete]);
        assert_eq!(a.observer_count(), 0);
    }

    #[test]
    fn combine_latest_keeps_going_after_one_completes() {
        let (seen, _sub) = values(&combine_latest(vec![
            Source::of(1),
            Source::from_iter([5, 6]),
        ]));
        assert_eq!(*seen.borrow(), vec![vec![1, 5], vec![1, 6]]);
    }

    #[test]
    fn combine_latest_release_unsubscribes_inputs() {
        let a: Subject<i32> = Subject::new();
        let b: Subject<i32> = Subject::new();
        let (_seen, sub) = values(&combine_latest(vec![a.source(), b.source()]));
        assert_eq!(a.observer_count(), 1);
        assert_eq!(b.observer_count(), 1);

        drop(sub);
        assert_eq!(a.observer_count(), 0);
        assert_eq!(b.observer_count(), 0);
    }

    #[test]
    fn combine_latest2_pairs() {
        let num = Subject::new();
        let word = Subject::new();
        let (seen, _sub) = values(&num.source().combine_latest2(&word.source()));

        num.next(6);
        assert!(seen.borrow().is_empty());
        word.next("apples");
        num.next(7);
        assert_eq!(*seen.borrow(), vec![(6, "apples"), (7, "apples")]);
    }
}
