//! Poll entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// User who created the poll
    #[sea_orm(indexed)]
    pub creator_id: String,

    pub title: String,

    pub description: String,

    /// Whether a voter may select more than one option
    #[sea_orm(default_value = false)]
    pub is_multiple_choice: bool,

    /// One-way flag: set by the creator or once `closing_date` passes
    #[sea_orm(default_value = false)]
    pub is_closed: bool,

    /// When the poll closes automatically (null for no deadline)
    #[sea_orm(nullable)]
    pub closing_date: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id",
        on_delete = "Restrict"
    )]
    Creator,

    #[sea_orm(has_many = "super::poll_option::Entity")]
    Options,

    #[sea_orm(has_many = "super::poll_vote::Entity")]
    Votes,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::poll_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Options.def()
    }
}

impl Related<super::poll_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
