//! Tab groups
//!
//! A group is every normal tab sharing one root id, provided there are at
//! least two of them. Groups are derived views; nothing stores them.

use crate::id::{RootId, TabId};
use crate::tab::Tab;

pub const DEFAULT_GROUP_TITLE: &str = "Tab Group";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGroup {
    pub id: RootId,
    /// Members in collection order
    pub children: Vec<TabId>,
    pub display_title: String,
}

impl TabGroup {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.children.contains(&id)
    }
}

/// Title for a set of group members, in collection order.
///
/// First non-empty page title wins, then the host of the first member with
/// a URL.
pub fn choose_display_title(members: &[&Tab]) -> String {
    if let Some(tab) = members.iter().find(|tab| !tab.title.trim().is_empty()) {
        return tab.title.clone();
    }

    members
        .iter()
        .filter_map(|tab| tab.url())
        .find_map(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_GROUP_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use url::Url;

    fn tab(url: Option<&str>, title: &str) -> Tab {
        let mut tab = Tab::new(false, 1, Utc::now());
        tab.set_url(url.map(|u| Url::parse(u).unwrap()));
        tab.title = title.to_string();
        tab
    }

    #[test]
    fn test_first_title_wins() {
        let a = tab(Some("https://a.com"), "");
        let b = tab(Some("https://b.com"), "Bee");
        let c = tab(Some("https://c.com"), "Sea");

        assert_eq!(choose_display_title(&[&a, &b, &c]), "Bee");
    }

    #[test]
    fn test_falls_back_to_host() {
        let a = tab(None, "");
        let b = tab(Some("https://news.example.org/today"), "  ");

        assert_eq!(choose_display_title(&[&a, &b]), "news.example.org");
    }

    #[test]
    fn test_default_title() {
        let a = tab(None, "");
        assert_eq!(choose_display_title(&[&a]), DEFAULT_GROUP_TITLE);
        assert_eq!(choose_display_title(&[]), DEFAULT_GROUP_TITLE);
    }
}
