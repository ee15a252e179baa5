//! Core business logic for sharegraph.
//!
//! [`FriendService`] owns the follow graph and the friend-request state
//! machine; [`RecommendService`] ranks posts for a viewer.

pub mod services;

pub use services::*;
