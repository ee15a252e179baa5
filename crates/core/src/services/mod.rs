//! Business logic services.

#![allow(missing_docs)]

pub mod event_publisher;
pub mod friend;
pub mod recommend;

pub use event_publisher::{
    EventPublisher, EventPublisherService, GraphEvent, LogEventPublisher, NoOpEventPublisher,
};
pub use friend::FriendService;
pub use recommend::{RecommendService, RecommendedPost, cosine_similarity};
