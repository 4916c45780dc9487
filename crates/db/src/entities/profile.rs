//! Profile entity.
//!
//! One row per authenticated identity; holds the trust and moderation
//! flags the comment subsystem reads. Identity itself (credentials,
//! sessions) lives outside this system.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Identity id from the external identity store.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name; defaults to the local part of the email on creation.
    #[sea_orm(nullable)]
    pub username: Option<String>,

    /// Avatar URL
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// Moderators bypass the comment queue and run the moderation
    /// endpoints. Never mutated through this subsystem.
    #[sea_orm(default_value = false)]
    pub is_moderator: bool,

    /// Trusted users' comments skip the pending queue.
    #[sea_orm(default_value = false)]
    pub is_trusted: bool,

    /// Banned users cannot submit comments.
    #[sea_orm(default_value = false)]
    pub is_banned: bool,

    /// Suspension end date; the suspension is active while this date is
    /// strictly after the current date.
    #[sea_orm(nullable)]
    pub suspended_until: Option<Date>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
