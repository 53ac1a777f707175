//! Skiff Navigation
//!
//! Renderer navigation callbacks and the multiplexer that fans them out:
//! - informational events reach every live delegate in registration order
//! - policy decisions ask every delegate; any cancel wins
//! - auth challenges go to the first delegate that can answer them

mod delegate;
mod event;
mod multiplexer;

pub use delegate::{dispatch_event, NavigationDelegate};
pub use event::{
    ActionPolicy, AuthChallenge, AuthMethod, ChallengeDisposition, ChallengeResponse, Credential,
    Navigation, NavigationAction, NavigationEvent, NavigationFailure, NavigationResponse,
    ResponsePolicy,
};
pub use multiplexer::NavigationMultiplexer;
