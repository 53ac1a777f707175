//! Selection recovery
//!
//! Decides which tab takes over after tabs are removed from the active
//! partition. Pure functions over the surviving collection; the manager
//! applies the result.

use chrono::{DateTime, Utc};

use skiff_tabs::{Tab, TabId};

/// Which tabs may be selected.
#[derive(Debug, Clone, Copy)]
pub struct Viability {
    pub incognito: bool,
    pub now: DateTime<Utc>,
    pub time_based_switcher: bool,
}

impl Viability {
    pub fn allows(&self, tab: &Tab) -> bool {
        if tab.is_incognito() != self.incognito {
            return false;
        }
        if self.incognito || !self.time_based_switcher {
            return true;
        }
        tab.is_pinned_or_executed_today(self.now)
    }
}

/// What was removed, as seen before the removal.
#[derive(Debug, Clone, Copy)]
pub struct Removal {
    /// Parent of the tab the selection is recovered from
    pub parent: Option<TabId>,
    /// Number of viable survivors that preceded the removed tab
    pub index: usize,
}

/// Most recently executed tab. Ties go to the earlier tab; tabs that never
/// ran rank below every tab that did.
pub fn most_recent<'a, I>(tabs: I) -> Option<&'a Tab>
where
    I: IntoIterator<Item = &'a Tab>,
{
    let mut best: Option<&Tab> = None;
    for tab in tabs {
        match best {
            Some(current) if tab.last_executed <= current.last_executed => {}
            _ => best = Some(tab),
        }
    }
    best
}

/// Pick the tab to select after a removal, or `None` when nothing viable
/// remains.
pub fn recover(
    survivors: &[Tab],
    current: Option<TabId>,
    removal: Removal,
    viability: &Viability,
) -> Option<TabId> {
    let viable: Vec<&Tab> = survivors
        .iter()
        .filter(|tab| viability.allows(tab))
        .collect();

    if let Some(current) = current {
        if viable.iter().any(|tab| tab.id() == current) {
            return Some(current);
        }
    }

    if viable.is_empty() {
        return None;
    }

    if let Some(parent_id) = removal.parent {
        let mru = most_recent(viable.iter().copied());
        if let Some(parent) = mru.filter(|tab| tab.id() == parent_id) {
            if parent.last_executed.is_some() {
                return Some(parent.id());
            }
        }
    }

    let neighbour = viable.get(removal.index).or_else(|| {
        removal
            .index
            .checked_sub(1)
            .and_then(|left| viable.get(left))
    });
    if let Some(tab) = neighbour {
        return Some(tab.id());
    }

    most_recent(viable.iter().copied()).map(Tab::id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn viability(now: DateTime<Utc>) -> Viability {
        Viability {
            incognito: false,
            now,
            time_based_switcher: false,
        }
    }

    fn tabs(now: DateTime<Utc>, n: usize) -> Vec<Tab> {
        (0..n)
            .map(|i| {
                let mut tab = Tab::new(false, i as u64, now);
                tab.last_executed = Some(now - Duration::minutes(60 - i as i64));
                tab
            })
            .collect()
    }

    #[test]
    fn test_keeps_live_selection() {
        let now = Utc::now();
        let tabs = tabs(now, 3);
        let current = tabs[2].id();
        let removal = Removal {
            parent: None,
            index: 0,
        };

        assert_eq!(
            recover(&tabs, Some(current), removal, &viability(now)),
            Some(current)
        );
    }

    #[test]
    fn test_selects_parent_when_most_recent() {
        let now = Utc::now();
        let mut tabs = tabs(now, 3);
        tabs[0].last_executed = Some(now);
        let removal = Removal {
            parent: Some(tabs[0].id()),
            index: 2,
        };

        assert_eq!(
            recover(&tabs, None, removal, &viability(now)),
            Some(tabs[0].id())
        );
    }

    #[test]
    fn test_skips_parent_that_is_not_most_recent() {
        let now = Utc::now();
        let tabs = tabs(now, 3);
        let removal = Removal {
            parent: Some(tabs[0].id()),
            index: 1,
        };

        assert_eq!(
            recover(&tabs, None, removal, &viability(now)),
            Some(tabs[1].id())
        );
    }

    #[test]
    fn test_skips_parent_that_never_ran() {
        let now = Utc::now();
        let mut tabs = tabs(now, 1);
        tabs[0].last_executed = None;
        let removal = Removal {
            parent: Some(tabs[0].id()),
            index: 5,
        };

        // No neighbour at that index, so the most recent tab wins
        assert_eq!(
            recover(&tabs, None, removal, &viability(now)),
            Some(tabs[0].id())
        );
    }

    #[test]
    fn test_right_then_left_neighbour() {
        let now = Utc::now();
        let tabs = tabs(now, 3);

        let middle = Removal {
            parent: None,
            index: 1,
        };
        assert_eq!(
            recover(&tabs, None, middle, &viability(now)),
            Some(tabs[1].id())
        );

        let end = Removal {
            parent: None,
            index: 3,
        };
        assert_eq!(
            recover(&tabs, None, end, &viability(now)),
            Some(tabs[2].id())
        );
    }

    #[test]
    fn test_empty_when_nothing_viable() {
        let now = Utc::now();
        let incognito = vec![Tab::new(true, 1, now)];
        let removal = Removal {
            parent: None,
            index: 0,
        };

        assert_eq!(recover(&incognito, None, removal, &viability(now)), None);
    }

    #[test]
    fn test_time_based_switcher_filters_stale_tabs() {
        let now = Utc::now();
        let mut tabs = tabs(now, 2);
        tabs[0].last_executed = Some(now - Duration::days(3));
        let viability = Viability {
            time_based_switcher: true,
            ..viability(now)
        };

        assert!(!viability.allows(&tabs[0]));
        tabs[0].toggle_pinned(now);
        assert!(viability.allows(&tabs[0]));
    }

    #[test]
    fn test_most_recent_tie_break() {
        let now = Utc::now();
        let mut tabs = tabs(now, 3);
        tabs[0].last_executed = None;
        tabs[1].last_executed = Some(now);
        tabs[2].last_executed = Some(now);

        assert_eq!(most_recent(&tabs).map(Tab::id), Some(tabs[1].id()));

        for tab in tabs.iter_mut() {
            tab.last_executed = None;
        }
        assert_eq!(most_recent(&tabs).map(Tab::id), Some(tabs[0].id()));
    }
}
