//! Cancellable deferred selections

use chrono::{DateTime, Utc};

use skiff_tabs::TabId;

/// Popups are selected a moment after they open so the opener can still
/// script them. A pending selection dies with its tab.
#[derive(Debug, Default)]
pub struct DeferredSelections {
    pending: Vec<(TabId, DateTime<Utc>)>,
}

impl DeferredSelections {
    pub fn schedule(&mut self, tab: TabId, at: DateTime<Utc>) {
        self.cancel(tab);
        self.pending.push((tab, at));
    }

    pub fn cancel(&mut self, tab: TabId) {
        self.pending.retain(|(id, _)| *id != tab);
    }

    pub fn is_pending(&self, tab: TabId) -> bool {
        self.pending.iter().any(|(id, _)| *id == tab)
    }

    /// Remove and return every selection due at `now`, oldest first.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<TabId> {
        let mut due: Vec<(TabId, DateTime<Utc>)> = Vec::new();
        self.pending.retain(|&(id, at)| {
            if at <= now {
                due.push((id, at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(_, at)| at);
        due.into_iter().map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_due_and_cancel() {
        let now = Utc::now();
        let mut deferred = DeferredSelections::default();
        let a = TabId::new();
        let b = TabId::new();
        deferred.schedule(a, now + Duration::milliseconds(100));
        deferred.schedule(b, now + Duration::milliseconds(50));

        assert!(deferred.take_due(now).is_empty());

        deferred.cancel(a);
        assert!(!deferred.is_pending(a));
        assert_eq!(deferred.take_due(now + Duration::seconds(1)), vec![b]);
        assert!(!deferred.is_pending(b));
    }
}
