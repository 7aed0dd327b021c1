use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // At most one live relationship per unordered pair. Rejected rows are
        // history and stay out of the index, so a later request is allowed.
        // Expression indexes are not expressible through the builder API.
        db.execute_unprepared(
            r#"CREATE UNIQUE INDEX "idx-friendships-pair"
ON friendships (LEAST(requester_id, recipient_id), GREATEST(requester_id, recipient_id))
WHERE status <> 'rechazada';"#,
        )
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(r#"DROP INDEX "idx-friendships-pair";"#)
            .await?;
        Ok(())
    }
}
