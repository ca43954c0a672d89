#![forbid(unsafe_code)]

//! Operator pipelines exercised through the public API only.
//!
//! Validates that:
//! 1. A derived "count + noun" signal keeps its seed until both inputs fired.
//! 2. Late subscribers to a replay subject see only the latest value.
//! 3. Releasing a derived subscription releases every subject it reached.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use rxview_reactive::{ReplaySubject, Sink, Source, Subject, Subscription, combine_latest};

// ============================================================================
// Helpers
// ============================================================================

fn record<T: Clone + 'static>(source: &Source<T>) -> (Rc<RefCell<Vec<T>>>, Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);
    let sub = source.subscribe(move |v| seen_clone.borrow_mut().push(v));
    (seen, sub)
}

fn fruit_signal(num: &Subject<i64>, word: &Subject<String>) -> Source<String> {
    num.source()
        .combine_latest2(&word.source())
        .map(|(n, w)| format!("{n} {w}"))
        .start_with("2 bananas".to_string())
}

// ============================================================================
// Pipelines
// ============================================================================

#[test]
fn seeded_pair_signal() {
    let num = Subject::new();
    let word = Subject::new();
    let (seen, _sub) = record(&fruit_signal(&num, &word));

    assert_eq!(*seen.borrow(), vec!["2 bananas".to_string()]);

    num.push(6);
    assert_eq!(seen.borrow().len(), 1);

    word.push("apples".to_string());
    assert_eq!(
        *seen.borrow(),
        vec!["2 bananas".to_string(), "6 apples".to_string()]
    );
}

#[test]
fn replay_late_subscriber_sees_latest_only() {
    let props = ReplaySubject::new(1);
    props.push("cheese");
    props.push("moldy cheese");

    let (seen, _sub) = record(&props.source().map(|p| format!("how bout some {p}")));
    assert_eq!(*seen.borrow(), vec!["how bout some moldy cheese".to_string()]);
}

#[test]
fn release_reaches_every_subject() {
    let num = Subject::new();
    let word = Subject::new();
    let (_seen, sub) = record(&fruit_signal(&num, &word));
    assert_eq!(num.observer_count(), 1);
    assert_eq!(word.observer_count(), 1);

    drop(sub);
    assert_eq!(num.observer_count(), 0);
    assert_eq!(word.observer_count(), 0);
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Every emission after the gate opens yields exactly one row.
    #[test]
    fn combine_latest_one_row_per_emission(
        pushes in proptest::collection::vec((0usize..3, any::<i16>()), 0..64)
    ) {
        let subjects: Vec<Subject<i16>> = (0..3).map(|_| Subject::new()).collect();
        let (rows, _sub) = record(&combine_latest(subjects.iter().map(Subject::source).collect()));

        let mut latest: [Option<i16>; 3] = [None; 3];
        let mut expected: Vec<Vec<i16>> = Vec::new();
        for (index, value) in &pushes {
            subjects[*index].push(*value);
            latest[*index] = Some(*value);
            if latest.iter().all(Option::is_some) {
                expected.push(latest.iter().flatten().copied().collect());
            }
        }

        prop_assert_eq!(&*rows.borrow(), &expected);
    }
}
