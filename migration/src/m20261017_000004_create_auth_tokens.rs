use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // The unique user_id is the conflict target of the token upsert.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS accounts.auth_tokens (
                key CHAR(32) PRIMARY KEY,
                user_id INTEGER NOT NULL UNIQUE REFERENCES accounts.users(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS accounts.auth_tokens")
            .await?;

        Ok(())
    }
}
