//! Navigation event types
//!
//! Mirrors the callbacks a renderer makes while a frame navigates.

use serde::{Deserialize, Serialize};
use skiff_tabs::TabId;
use url::Url;

/// One navigation in flight, as identified by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub tab_id: TabId,
    pub url: Option<Url>,
    pub navigation_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationFailure {
    pub code: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationAction {
    pub tab_id: TabId,
    pub request_url: Url,
    pub is_main_frame: bool,
    /// The user activated a link rather than the page navigating itself
    pub user_initiated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationResponse {
    pub tab_id: TabId,
    pub url: Url,
    pub is_main_frame: bool,
    pub status: u16,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    HttpBasic,
    HttpDigest,
    ClientCertificate,
    ServerTrust,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthChallenge {
    pub tab_id: TabId,
    pub host: String,
    pub port: u16,
    pub method: AuthMethod,
    pub previous_failure_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeDisposition {
    UseCredential,
    PerformDefaultHandling,
    CancelChallenge,
    RejectProtectionSpace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub disposition: ChallengeDisposition,
    pub credential: Option<Credential>,
}

impl ChallengeResponse {
    pub fn default_handling() -> Self {
        Self {
            disposition: ChallengeDisposition::PerformDefaultHandling,
            credential: None,
        }
    }

    pub fn use_credential(credential: Credential) -> Self {
        Self {
            disposition: ChallengeDisposition::UseCredential,
            credential: Some(credential),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionPolicy {
    #[default]
    Allow,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePolicy {
    #[default]
    Allow,
    Cancel,
}

/// Informational navigation callbacks, in a form that can be queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavigationEvent {
    DidStartProvisionalNavigation(Navigation),
    DidReceiveServerRedirect(Navigation),
    DidCommit(Navigation),
    DidFinish(Navigation),
    DidFail {
        navigation: Navigation,
        failure: NavigationFailure,
    },
    DidFailProvisional {
        navigation: Navigation,
        failure: NavigationFailure,
    },
    ContentProcessDidTerminate {
        tab_id: TabId,
    },
}

impl NavigationEvent {
    pub fn tab_id(&self) -> TabId {
        match self {
            NavigationEvent::DidStartProvisionalNavigation(nav)
            | NavigationEvent::DidReceiveServerRedirect(nav)
            | NavigationEvent::DidCommit(nav)
            | NavigationEvent::DidFinish(nav) => nav.tab_id,
            NavigationEvent::DidFail { navigation, .. }
            | NavigationEvent::DidFailProvisional { navigation, .. } => navigation.tab_id,
            NavigationEvent::ContentProcessDidTerminate { tab_id } => *tab_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NavigationEvent::DidStartProvisionalNavigation(_) => "did_start_provisional_navigation",
            NavigationEvent::DidReceiveServerRedirect(_) => "did_receive_server_redirect",
            NavigationEvent::DidCommit(_) => "did_commit",
            NavigationEvent::DidFinish(_) => "did_finish",
            NavigationEvent::DidFail { .. } => "did_fail",
            NavigationEvent::DidFailProvisional { .. } => "did_fail_provisional",
            NavigationEvent::ContentProcessDidTerminate { .. } => "content_process_did_terminate",
        }
    }
}
