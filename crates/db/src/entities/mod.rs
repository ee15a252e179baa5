//! Database entities.

#![allow(missing_docs)]

pub mod document_feature;
pub mod following;
pub mod friend_request;
pub mod friendship;
pub mod post;
pub mod post_like;
pub mod post_save;
pub mod post_tag;
pub mod tag;
pub mod user;

pub use document_feature::Entity as DocumentFeature;
pub use following::Entity as Following;
pub use friend_request::Entity as FriendRequest;
pub use friendship::Entity as Friendship;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use post_save::Entity as PostSave;
pub use post_tag::Entity as PostTag;
pub use tag::Entity as Tag;
pub use user::Entity as User;
