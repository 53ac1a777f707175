//! Navigation delegate trait

use skiff_tabs::TabId;

use crate::event::{
    ActionPolicy, AuthChallenge, ChallengeResponse, Navigation, NavigationAction, NavigationEvent,
    NavigationFailure, NavigationResponse, ResponsePolicy,
};

/// Observer of renderer navigation callbacks.
///
/// Every method has a no-op default so observers only implement what they
/// care about.
pub trait NavigationDelegate: Send + Sync {
    fn did_start_provisional_navigation(&self, _navigation: &Navigation) {}

    fn did_receive_server_redirect(&self, _navigation: &Navigation) {}

    fn did_commit(&self, _navigation: &Navigation) {}

    fn did_finish(&self, _navigation: &Navigation) {}

    fn did_fail(&self, _navigation: &Navigation, _failure: &NavigationFailure) {}

    fn did_fail_provisional(&self, _navigation: &Navigation, _failure: &NavigationFailure) {}

    fn content_process_did_terminate(&self, _tab_id: TabId) {}

    fn decide_policy_for_action(&self, _action: &NavigationAction) -> ActionPolicy {
        ActionPolicy::Allow
    }

    fn decide_policy_for_response(&self, _response: &NavigationResponse) -> ResponsePolicy {
        ResponsePolicy::Allow
    }

    /// Whether this delegate wants to answer the challenge.
    fn can_authenticate(&self, _challenge: &AuthChallenge) -> bool {
        false
    }

    /// Only called when `can_authenticate` returned true.
    fn did_receive_challenge(&self, _challenge: &AuthChallenge) -> ChallengeResponse {
        ChallengeResponse::default_handling()
    }
}

/// Route a queued informational event to the matching delegate method.
pub fn dispatch_event(delegate: &dyn NavigationDelegate, event: &NavigationEvent) {
    match event {
        NavigationEvent::DidStartProvisionalNavigation(nav) => {
            delegate.did_start_provisional_navigation(nav)
        }
        NavigationEvent::DidReceiveServerRedirect(nav) => delegate.did_receive_server_redirect(nav),
        NavigationEvent::DidCommit(nav) => delegate.did_commit(nav),
        NavigationEvent::DidFinish(nav) => delegate.did_finish(nav),
        NavigationEvent::DidFail {
            navigation,
            failure,
        } => delegate.did_fail(navigation, failure),
        NavigationEvent::DidFailProvisional {
            navigation,
            failure,
        } => delegate.did_fail_provisional(navigation, failure),
        NavigationEvent::ContentProcessDidTerminate { tab_id } => {
            delegate.content_process_did_terminate(*tab_id)
        }
    }
}
