#![forbid(unsafe_code)]

//! RAII subscription handles.

/// Guard for an active subscription.
///
/// Dropping the guard unsubscribes. Child subscriptions added with
/// [`add`](Subscription::add) are released together with their parent.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
    children: Vec<Subscription>,
    closed: bool,
}

impl Subscription {
    /// Create a subscription that runs `teardown` exactly once when released.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
            children: Vec::new(),
            closed: false,
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self {
            teardown: None,
            children: Vec::new(),
            closed: false,
        }
    }

    /// Tie `child` to this subscription's lifetime.
    ///
    /// If this subscription is already closed the child is released at once.
    pub fn add(&mut self, child: Subscription) {
        if self.closed {
            drop(child);
        } else {
            self.children.push(child);
        }
    }

    /// Release the subscription. Calling this more than once is a no-op.
    pub fn unsubscribe(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
        // Children are released in the order they were added.
        for child in self.children.drain(..) {
            drop(child);
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.closed)
            .field("children", &self.children.len())
            .finish()
    }
}
