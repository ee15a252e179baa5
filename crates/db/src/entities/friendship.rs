//! Friendship entity.
//!
//! One row per undirected pair, stored canonically with
//! `user_low_id < user_high_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friendship")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_low_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub user_high_id: i64,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserLowId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    UserLow,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserHighId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    UserHigh,
}

impl ActiveModelBehavior for ActiveModel {}

/// Order a pair of user ids into `(low, high)`.
#[must_use]
pub const fn canonical_pair(a: i64, b: i64) -> (i64, i64) {
    if a < b { (a, b) } else { (b, a) }
}
