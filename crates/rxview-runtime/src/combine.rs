#![forbid(unsafe_code)]

//! State combination: named inputs merged into one [`CombinedState`] stream.
//!
//! # Invariants
//!
//! 1. With no inputs, each subscriber receives one empty state synchronously
//!    and nothing after.
//! 2. Otherwise nothing is emitted until every input has emitted once.
//! 3. After that, each input emission yields exactly one state holding the
//!    latest value of every input (no coalescing).
//! 4. Keys of every emitted state are exactly the input names.
//! 5. An input failure fails the combined stream.

use std::collections::BTreeMap;
use std::rc::Rc;

use rxview_reactive::{Source, combine_latest};
use serde_json::Value;

use crate::props::CombinedState;

#[must_use]
pub fn combine_state(inputs: &BTreeMap<String, Source<Value>>) -> Source<CombinedState> {
    if inputs.is_empty() {
        return Source::of(CombinedState::default());
    }

    let names: Rc<[String]> = inputs.keys().cloned().collect();
    let sources: Vec<Source<Value>> = inputs.values().cloned().collect();
    combine_latest(sources).map(move |row| names.iter().cloned().zip(row).collect())
}
