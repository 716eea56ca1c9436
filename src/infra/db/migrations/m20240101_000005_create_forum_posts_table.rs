//! Migration: forum posts with self-referencing replies.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ForumPosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ForumPosts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ForumPosts::UserId).big_integer().not_null())
                    .col(ColumnDef::new(ForumPosts::Title).string_len(255).not_null())
                    .col(ColumnDef::new(ForumPosts::Content).text().not_null())
                    .col(ColumnDef::new(ForumPosts::ParentId).big_integer().null())
                    .col(
                        ColumnDef::new(ForumPosts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ForumPosts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_posts_user_id")
                            .from(ForumPosts::Table, ForumPosts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_posts_parent_id")
                            .from(ForumPosts::Table, ForumPosts::ParentId)
                            .to(ForumPosts::Table, ForumPosts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_forum_posts_parent_id")
                    .table(ForumPosts::Table)
                    .col(ForumPosts::ParentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ForumPosts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ForumPosts {
    Table,
    Id,
    UserId,
    Title,
    Content,
    ParentId,
    CreatedAt,
    UpdatedAt,
}
