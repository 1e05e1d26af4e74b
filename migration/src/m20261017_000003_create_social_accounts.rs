use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per external identity; (provider, uid) is what a login is matched on.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS accounts.social_accounts (
                id SERIAL PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES accounts.users(id) ON DELETE CASCADE,
                provider VARCHAR(32) NOT NULL,
                uid VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                UNIQUE(provider, uid)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS social_accounts_user_id_idx \
                 ON accounts.social_accounts (user_id)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS accounts.social_accounts")
            .await?;

        Ok(())
    }
}
