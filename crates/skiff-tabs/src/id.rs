//! Tab and group identities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = crate::TabError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Stable tab identity, generated once and never reassigned.
    TabId
);

uuid_id!(
    /// Group membership key. Tabs sharing a root form a tab group.
    RootId
);

/// Generation-checked reference to one incarnation of a tab.
///
/// Background work holds a handle instead of the tab itself. A handle only
/// resolves while the tab with the same id *and* generation is still in the
/// collection, so a result for a closed tab can never land on a later tab
/// that was restored under the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabHandle {
    pub id: TabId,
    pub generation: u64,
}

impl fmt::Display for TabHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.id, self.generation)
    }
}
