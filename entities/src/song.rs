use sea_orm::entity::prelude::*;
use serde::Serialize;

/// An uploaded song. `play_count` and `like_count` are denormalized counters
/// maintained inside the like/play code paths. `active` is a soft-delete
/// flag; the delete endpoint hard-deletes, the startup sweep only clears it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "songs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub artist: String,
    pub genre: Option<String>,
    pub file_url: String,
    pub cover_url: Option<String>,
    pub duration: i32,
    pub file_size: i64,
    pub play_count: i32,
    pub like_count: i32,
    pub active: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::song_like::Entity")]
    SongLike,
    #[sea_orm(has_many = "super::play_log::Entity")]
    PlayLog,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::song_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SongLike.def()
    }
}

impl Related<super::play_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
