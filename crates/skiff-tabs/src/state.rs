//! Tab Lifecycle State Machine
//!
//! ```text
//! Zombie ──materialize──▶ Live ──content process gone──▶ Crashed
//!   ▲                      │  ▲                            │
//!   └──────close renderer──┘  └──────────reload────────────┘
//!   ▲                                                      │
//!   └──────────────────────close renderer──────────────────┘
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabState {
    /// Metadata only; no renderer session attached
    Zombie,
    /// Renderer session attached and usable
    Live,
    /// Renderer attached but its content process terminated
    Crashed,
}

impl TabState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: TabState) -> bool {
        match (self, target) {
            (TabState::Zombie, TabState::Live) => true,
            (TabState::Live, TabState::Zombie) => true,
            (TabState::Live, TabState::Crashed) => true,
            (TabState::Crashed, TabState::Live) => true,
            (TabState::Crashed, TabState::Zombie) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabState::Zombie => "zombie",
            TabState::Live => "live",
            TabState::Crashed => "crashed",
        }
    }
}

impl std::fmt::Display for TabState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TabState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zombie" => Ok(TabState::Zombie),
            "live" => Ok(TabState::Live),
            "crashed" => Ok(TabState::Crashed),
            _ => Err(format!("Unknown tab state: {}", s)),
        }
    }
}
