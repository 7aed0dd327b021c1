use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    SongId,
}

#[derive(DeriveIden)]
enum Songs {
    Table,
    Id,
    UserId,
    Title,
    Artist,
    Genre,
    FileUrl,
    CoverUrl,
    Duration,
    FileSize,
    PlayCount,
    LikeCount,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SongLikes {
    Table,
    Id,
    SongId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PlayLogs {
    Table,
    Id,
    SongId,
    UserId,
    SecondsPlayed,
    Completed,
    Ip,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Songs::Table)
                    .col(
                        ColumnDef::new(Songs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Songs::UserId).integer().not_null())
                    .col(ColumnDef::new(Songs::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Songs::Artist).string_len(200).not_null())
                    .col(ColumnDef::new(Songs::Genre).string_len(50))
                    .col(ColumnDef::new(Songs::FileUrl).text().not_null())
                    .col(ColumnDef::new(Songs::CoverUrl).text())
                    .col(ColumnDef::new(Songs::Duration).integer().not_null())
                    .col(ColumnDef::new(Songs::FileSize).big_integer().not_null())
                    .col(
                        ColumnDef::new(Songs::PlayCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Songs::LikeCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Songs::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Songs::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-songs-user_id")
                            .from(Songs::Table, Songs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // posts.song_id could not reference songs before this migration ran.
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk-posts-song_id")
                    .from(Posts::Table, Posts::SongId)
                    .to(Songs::Table, Songs::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SongLikes::Table)
                    .col(
                        ColumnDef::new(SongLikes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SongLikes::SongId).integer().not_null())
                    .col(ColumnDef::new(SongLikes::UserId).integer().not_null())
                    .col(ColumnDef::new(SongLikes::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-song_likes-song_id")
                            .from(SongLikes::Table, SongLikes::SongId)
                            .to(Songs::Table, Songs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-song_likes-user_id")
                            .from(SongLikes::Table, SongLikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-song_likes-song-user")
                    .table(SongLikes::Table)
                    .col(SongLikes::SongId)
                    .col(SongLikes::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayLogs::Table)
                    .col(
                        ColumnDef::new(PlayLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlayLogs::SongId).integer().not_null())
                    .col(ColumnDef::new(PlayLogs::UserId).integer())
                    .col(
                        ColumnDef::new(PlayLogs::SecondsPlayed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlayLogs::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PlayLogs::Ip).string_len(45).not_null())
                    .col(ColumnDef::new(PlayLogs::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-play_logs-song_id")
                            .from(PlayLogs::Table, PlayLogs::SongId)
                            .to(Songs::Table, Songs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-play_logs-user_id")
                            .from(PlayLogs::Table, PlayLogs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SongLikes::Table).to_owned())
            .await?;
        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name("fk-posts-song_id")
                    .table(Posts::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Songs::Table).to_owned())
            .await?;
        Ok(())
    }
}
