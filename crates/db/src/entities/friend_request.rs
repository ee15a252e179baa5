//! Friend request entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a friend request.
///
/// `Pending` is the only state that may transition; `Accepted` and
/// `Declined` rows are kept as history. A cancelled request is deleted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "declined")]
    Declined,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friend_request")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The user who sent the request
    #[sea_orm(indexed)]
    pub requester_id: i64,

    /// The user who received the request
    #[sea_orm(indexed)]
    pub addressee_id: i64,

    pub status: FriendRequestStatus,

    pub created_at: DateTimeWithTimeZone,

    /// Set once, when the request leaves `pending`
    #[sea_orm(nullable)]
    pub decided_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequesterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Requester,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AddresseeId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Addressee,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the request can still be accepted, declined or cancelled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }
}
