//! Forum post repository.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    sea_query::Query, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::{
    forum_post::{self, ActiveModel, Entity as PostEntity},
    user::{self, Entity as UserEntity},
};
use super::search::icontains;
use crate::domain::{AdminQuery, ForumPost, ForumPostInput};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Forum repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ForumRepository: Send + Sync {
    /// Root posts, newest first
    async fn topics(&self, page: u64, per_page: u64) -> AppResult<(Vec<ForumPost>, u64)>;

    async fn find(&self, id: i64) -> AppResult<Option<ForumPost>>;

    /// Replies under `root_id`, loaded level by level for at most
    /// `levels` levels
    async fn descendants(&self, root_id: i64, levels: usize) -> AppResult<Vec<ForumPost>>;

    async fn create(&self, user_id: i64, input: ForumPostInput) -> AppResult<ForumPost>;

    async fn update(&self, id: i64, title: String, content: String) -> AppResult<ForumPost>;

    /// Removes the post and, through the foreign key, its replies
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Admin list: search on title, content and author username
    async fn search(&self, query: AdminQuery) -> AppResult<(Vec<ForumPost>, u64)>;
}

/// Concrete implementation of ForumRepository
pub struct ForumStore {
    pub(crate) db: DatabaseConnection,
}

impl ForumStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_authors(&self, rows: Vec<forum_post::Model>) -> AppResult<Vec<ForumPost>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
        let authors: HashMap<i64, String> = UserEntity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| ForumPost {
                author: authors.get(&row.user_id).cloned().unwrap_or_default(),
                id: row.id,
                user_id: row.user_id,
                title: row.title,
                content: row.content,
                parent_id: row.parent_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    async fn with_author(&self, row: forum_post::Model) -> AppResult<ForumPost> {
        self.with_authors(vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal("Forum post lost while loading its author"))
    }
}

#[async_trait]
impl ForumRepository for ForumStore {
    async fn topics(&self, page: u64, per_page: u64) -> AppResult<(Vec<ForumPost>, u64)> {
        let paginator = PostEntity::find()
            .filter(forum_post::Column::ParentId.is_null())
            .order_by_desc(forum_post::Column::CreatedAt)
            .order_by_desc(forum_post::Column::Id)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((self.with_authors(rows).await?, total))
    }

    async fn find(&self, id: i64) -> AppResult<Option<ForumPost>> {
        match PostEntity::find_by_id(id).one(&self.db).await? {
            Some(row) => Ok(Some(self.with_author(row).await?)),
            None => Ok(None),
        }
    }

    async fn descendants(&self, root_id: i64, levels: usize) -> AppResult<Vec<ForumPost>> {
        let mut collected = Vec::new();
        let mut frontier = vec![root_id];

        for _ in 0..levels {
            if frontier.is_empty() {
                break;
            }
            let level = PostEntity::find()
                .filter(forum_post::Column::ParentId.is_in(frontier))
                .all(&self.db)
                .await
                .map_err(AppError::from)?;
            frontier = level.iter().map(|row| row.id).collect();
            collected.extend(level);
        }

        self.with_authors(collected).await
    }

    async fn create(&self, user_id: i64, input: ForumPostInput) -> AppResult<ForumPost> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            user_id: Set(user_id),
            title: Set(input.title),
            content: Set(input.content),
            parent_id: Set(input.parent_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        self.with_author(model).await
    }

    async fn update(&self, id: i64, title: String, content: String) -> AppResult<ForumPost> {
        let existing = PostEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.title = Set(title);
        active.content = Set(content);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        self.with_author(model).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn search(&self, query: AdminQuery) -> AppResult<(Vec<ForumPost>, u64)> {
        let mut select = PostEntity::find();
        for term in query.search_terms() {
            let user_ids = Query::select()
                .column(user::Column::Id)
                .from(UserEntity)
                .and_where(icontains((UserEntity, user::Column::Username), &term))
                .to_owned();
            select = select.filter(
                Condition::any()
                    .add(icontains((PostEntity, forum_post::Column::Title), &term))
                    .add(icontains((PostEntity, forum_post::Column::Content), &term))
                    .add(forum_post::Column::UserId.in_subquery(user_ids)),
            );
        }
        if let Some(user_id) = query.user {
            select = select.filter(forum_post::Column::UserId.eq(user_id));
        }
        let (from, to) = query.created_range();
        if let Some(from) = from {
            select = select.filter(forum_post::Column::CreatedAt.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(forum_post::Column::CreatedAt.lt(to));
        }

        let paginator = select
            .order_by_desc(forum_post::Column::CreatedAt)
            .order_by_desc(forum_post::Column::Id)
            .paginate(&self.db, query.per_page());
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(query.page() - 1).await?;

        Ok((self.with_authors(rows).await?, total))
    }
}
