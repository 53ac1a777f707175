//! Recently closed tabs and the undo toast

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashSet, VecDeque};

use skiff_tabs::{SavedTab, TabId};

/// Undo stack of close batches, newest first.
#[derive(Debug, Clone)]
pub struct RecentlyClosed {
    batches: VecDeque<Vec<SavedTab>>,
    capacity: usize,
}

impl RecentlyClosed {
    pub fn new(capacity: usize) -> Self {
        Self {
            batches: VecDeque::new(),
            capacity,
        }
    }

    /// Record one close batch. Incognito tabs are never remembered.
    pub fn push(&mut self, batch: Vec<SavedTab>) {
        let batch: Vec<SavedTab> = batch.into_iter().filter(|t| !t.is_incognito).collect();
        if batch.is_empty() {
            return;
        }
        self.batches.push_front(batch);
        self.enforce_capacity();
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.enforce_capacity();
    }

    fn enforce_capacity(&mut self) {
        while self.batches.len() > self.capacity {
            if let Some(dropped) = self.batches.pop_back() {
                tracing::debug!(tabs = dropped.len(), "Dropped oldest closed-tab batch");
            }
        }
    }

    /// Forget the given snapshots; batches left empty disappear.
    pub fn remove(&mut self, ids: &HashSet<TabId>) {
        for batch in self.batches.iter_mut() {
            batch.retain(|tab| !ids.contains(&tab.id));
        }
        self.batches.retain(|batch| !batch.is_empty());
    }

    pub fn batches(&self) -> impl Iterator<Item = &Vec<SavedTab>> {
        self.batches.iter()
    }

    pub fn to_vec(&self) -> Vec<Vec<SavedTab>> {
        self.batches.iter().cloned().collect()
    }

    /// Replace the whole stack, e.g. from a restored session.
    pub fn replace(&mut self, batches: Vec<Vec<SavedTab>>) {
        self.batches.clear();
        for batch in batches.into_iter().rev() {
            self.push(batch);
        }
    }

    pub fn find_by_url(&self, url: &url::Url) -> Option<&SavedTab> {
        self.batches
            .iter()
            .flatten()
            .find(|tab| tab.url.as_ref() == Some(url))
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }
}

/// Collects closed tabs for a single undo toast.
///
/// Every close pushes the deadline out again, so closing several tabs in
/// quick succession yields one toast covering all of them.
#[derive(Debug, Default)]
pub struct ToastBatcher {
    pending: Vec<SavedTab>,
    deadline: Option<DateTime<Utc>>,
}

impl ToastBatcher {
    pub fn add(&mut self, tabs: &[SavedTab], now: DateTime<Utc>, interval: Duration) {
        if tabs.is_empty() {
            return;
        }
        self.pending.extend_from_slice(tabs);
        self.deadline = Some(now + interval);
    }

    pub fn remove(&mut self, ids: &HashSet<TabId>) {
        self.pending.retain(|tab| !ids.contains(&tab.id));
        if self.pending.is_empty() {
            self.deadline = None;
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Take the batch once its deadline has passed.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<Vec<SavedTab>> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(std::mem::take(&mut self.pending))
            }
            _ => None,
        }
    }
}
