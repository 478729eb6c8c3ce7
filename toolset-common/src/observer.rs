//! Layout observation: the seam between a rendering host and the coordinator
//!
//! A host measures its views once per layout pass and reports one sample per
//! tagged view. Samples reported during a pass are appended to each other and
//! delivered as a single batch when the pass is committed.

use crate::frame::FrameSample;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::trace;
use uuid::Uuid;

/// Receives one batch of frame samples per layout pass
pub trait LayoutSubscriber {
    fn on_layout(&mut self, batch: &[FrameSample]);
}

/// Identifies a registration with a [`LayoutObserver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        SubscriptionId(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability that delivers layout batches to registered subscribers
pub trait LayoutObserver {
    /// Registers a subscriber. The observer keeps only a weak reference.
    fn subscribe(&mut self, subscriber: Rc<RefCell<dyn LayoutSubscriber>>) -> SubscriptionId;

    /// Returns false if the id was not registered
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// In-memory observer fed directly by the host
#[derive(Default)]
pub struct LayoutHub {
    pending: Vec<FrameSample>,
    subscribers: Vec<(SubscriptionId, Weak<RefCell<dyn LayoutSubscriber>>)>,
}

impl LayoutHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sample to the current pass
    pub fn report(&mut self, sample: FrameSample) {
        self.pending.push(sample);
    }

    /// Delivers the current pass to every live subscriber and starts a new one.
    ///
    /// Subscribers that have been dropped are pruned. Returns the number of
    /// subscribers the batch was delivered to.
    pub fn commit_pass(&mut self) -> usize {
        let batch = std::mem::take(&mut self.pending);
        self.subscribers
            .retain(|(_, subscriber)| subscriber.strong_count() > 0);

        let live: Vec<_> = self
            .subscribers
            .iter()
            .filter_map(|(_, subscriber)| subscriber.upgrade())
            .collect();

        trace!(samples = batch.len(), subscribers = live.len(), "Layout pass");

        for subscriber in &live {
            subscriber.borrow_mut().on_layout(&batch);
        }

        live.len()
    }

    /// Number of samples reported since the last commit
    pub fn pending_samples(&self) -> usize {
        self.pending.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|(_, subscriber)| subscriber.strong_count() > 0)
            .count()
    }
}

impl LayoutObserver for LayoutHub {
    fn subscribe(&mut self, subscriber: Rc<RefCell<dyn LayoutSubscriber>>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscribers.push((id, Rc::downgrade(&subscriber)));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }
}
