//! Comment entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Comment moderation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl CommentStatus {
    /// Stable lowercase name, matching the stored column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a status from its wire representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// External content item this comment belongs to (opaque).
    #[sea_orm(indexed)]
    pub post_id: String,

    /// Author profile ID
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Parent comment ID; None for top-level comments. Storage keeps the
    /// original parent even though rendering flattens replies to their
    /// top-level ancestor.
    #[sea_orm(nullable, indexed)]
    pub parent_id: Option<String>,

    /// Comment text, non-empty after trimming.
    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Usernames mentioned in the content (`@name` tokens).
    #[sea_orm(column_type = "JsonBinary")]
    pub mentions: Json,

    /// Moderation status
    pub status: CommentStatus,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Mentioned usernames as a plain vector.
    #[must_use]
    pub fn mention_list(&self) -> Vec<String> {
        serde_json::from_value(self.mentions.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Author,

    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
