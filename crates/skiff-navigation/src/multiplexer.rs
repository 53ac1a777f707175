//! Navigation delegate multiplexer
//!
//! Fans renderer navigation callbacks out to any number of observers.
//! Observers are held weakly; a delegate that has been dropped is skipped
//! and pruned on the next dispatch.

use parking_lot::RwLock;
use skiff_tabs::TabId;
use std::sync::{Arc, Weak};

use crate::delegate::{dispatch_event, NavigationDelegate};
use crate::event::{
    ActionPolicy, AuthChallenge, ChallengeResponse, Navigation, NavigationAction, NavigationEvent,
    NavigationFailure, NavigationResponse, ResponsePolicy,
};

#[derive(Default)]
pub struct NavigationMultiplexer {
    delegates: RwLock<Vec<Weak<dyn NavigationDelegate>>>,
}

fn same_allocation(weak: &Weak<dyn NavigationDelegate>, ptr: *const ()) -> bool {
    Weak::as_ptr(weak) as *const () == ptr
}

impl NavigationMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a delegate. Registering the same delegate twice is a no-op.
    pub fn insert<D: NavigationDelegate + 'static>(&self, delegate: &Arc<D>) {
        let ptr = Arc::as_ptr(delegate) as *const ();
        let mut delegates = self.delegates.write();
        if delegates.iter().any(|weak| same_allocation(weak, ptr)) {
            return;
        }
        let weak = Arc::downgrade(delegate);
        let weak: Weak<dyn NavigationDelegate> = weak;
        delegates.push(weak);
    }

    pub fn remove<D: NavigationDelegate + 'static>(&self, delegate: &Arc<D>) {
        let ptr = Arc::as_ptr(delegate) as *const ();
        self.delegates
            .write()
            .retain(|weak| !same_allocation(weak, ptr));
    }

    /// Number of registrations, including ones not yet pruned.
    pub fn len(&self) -> usize {
        self.delegates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upgrade every registration, pruning the dead ones.
    ///
    /// The lock is released before any delegate runs, so delegates may
    /// register or unregister from inside a callback.
    fn live(&self) -> Vec<Arc<dyn NavigationDelegate>> {
        let (live, dead) = {
            let delegates = self.delegates.read();
            let live: Vec<_> = delegates.iter().filter_map(Weak::upgrade).collect();
            let dead = delegates.len() - live.len();
            (live, dead)
        };

        if dead > 0 {
            tracing::debug!(pruned = dead, "Pruning dropped navigation delegates");
            self.delegates.write().retain(|weak| weak.strong_count() > 0);
        }
        live
    }

    /// Deliver a queued event to every live delegate in registration order.
    pub fn dispatch(&self, event: &NavigationEvent) {
        for delegate in self.live() {
            dispatch_event(delegate.as_ref(), event);
        }
    }
}

impl NavigationDelegate for NavigationMultiplexer {
    fn did_start_provisional_navigation(&self, navigation: &Navigation) {
        for delegate in self.live() {
            delegate.did_start_provisional_navigation(navigation);
        }
    }

    fn did_receive_server_redirect(&self, navigation: &Navigation) {
        for delegate in self.live() {
            delegate.did_receive_server_redirect(navigation);
        }
    }

    fn did_commit(&self, navigation: &Navigation) {
        for delegate in self.live() {
            delegate.did_commit(navigation);
        }
    }

    fn did_finish(&self, navigation: &Navigation) {
        for delegate in self.live() {
            delegate.did_finish(navigation);
        }
    }

    fn did_fail(&self, navigation: &Navigation, failure: &NavigationFailure) {
        for delegate in self.live() {
            delegate.did_fail(navigation, failure);
        }
    }

    fn did_fail_provisional(&self, navigation: &Navigation, failure: &NavigationFailure) {
        for delegate in self.live() {
            delegate.did_fail_provisional(navigation, failure);
        }
    }

    fn content_process_did_terminate(&self, tab_id: TabId) {
        for delegate in self.live() {
            delegate.content_process_did_terminate(tab_id);
        }
    }

    /// Every delegate is consulted; a single cancel wins.
    fn decide_policy_for_action(&self, action: &NavigationAction) -> ActionPolicy {
        let mut policy = ActionPolicy::Allow;
        for delegate in self.live() {
            if delegate.decide_policy_for_action(action) == ActionPolicy::Cancel {
                policy = ActionPolicy::Cancel;
            }
        }

        if policy == ActionPolicy::Cancel {
            tracing::info!(
                tab_id = %action.tab_id,
                url = %action.request_url,
                "Navigation action cancelled by delegate"
            );
        }
        policy
    }

    fn decide_policy_for_response(&self, response: &NavigationResponse) -> ResponsePolicy {
        let mut policy = ResponsePolicy::Allow;
        for delegate in self.live() {
            if delegate.decide_policy_for_response(response) == ResponsePolicy::Cancel {
                policy = ResponsePolicy::Cancel;
            }
        }

        if policy == ResponsePolicy::Cancel {
            tracing::info!(
                tab_id = %response.tab_id,
                url = %response.url,
                status = response.status,
                "Navigation response cancelled by delegate"
            );
        }
        policy
    }

    fn can_authenticate(&self, challenge: &AuthChallenge) -> bool {
        self.live()
            .iter()
            .any(|delegate| delegate.can_authenticate(challenge))
    }

    /// The first delegate able to authenticate answers; the rest are skipped.
    fn did_receive_challenge(&self, challenge: &AuthChallenge) -> ChallengeResponse {
        for delegate in self.live() {
            if delegate.can_authenticate(challenge) {
                return delegate.did_receive_challenge(challenge);
            }
        }

        tracing::debug!(
            tab_id = %challenge.tab_id,
            host = %challenge.host,
            "No delegate handles auth challenge"
        );
        ChallengeResponse::default_handling()
    }
}
