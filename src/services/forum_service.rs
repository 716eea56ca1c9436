//! Forum service - topics, bounded reply trees and posting.

use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use crate::config::MAX_THREAD_DEPTH;
use crate::domain::{build_thread, validation_field_errors, ForumPost, ForumPostInput, ForumThread};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait ForumService: Send + Sync {
    /// Root posts, newest first
    async fn topics(&self, params: PaginationParams) -> AppResult<Paginated<ForumPost>>;

    /// Post with replies nested at most `MAX_THREAD_DEPTH` levels deep
    async fn thread(&self, id: i64) -> AppResult<ForumThread>;

    async fn create(&self, user_id: i64, input: ForumPostInput) -> AppResult<ForumPost>;

    /// Author only; replies go with the post
    async fn delete(&self, user_id: i64, id: i64) -> AppResult<()>;
}

pub struct Forum<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Forum<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ForumService for Forum<U> {
    async fn topics(&self, params: PaginationParams) -> AppResult<Paginated<ForumPost>> {
        let page = params.page.max(1);
        let per_page = params.limit().max(1);
        let (posts, total) = self.uow.forum().topics(page, per_page).await?;
        Ok(Paginated::new(posts, page, per_page, total))
    }

    async fn thread(&self, id: i64) -> AppResult<ForumThread> {
        let root = self.uow.forum().find(id).await?.ok_or_not_found()?;
        // One level past the limit so truncation can be reported.
        let descendants = self
            .uow
            .forum()
            .descendants(id, MAX_THREAD_DEPTH + 1)
            .await?;
        Ok(build_thread(root, descendants, MAX_THREAD_DEPTH))
    }

    async fn create(&self, user_id: i64, mut input: ForumPostInput) -> AppResult<ForumPost> {
        input.title = input.title.trim().to_string();
        input.validate().map_err(validation_field_errors)?;

        if let Some(parent_id) = input.parent_id {
            if self.uow.forum().find(parent_id).await?.is_none() {
                return Err(AppError::field("parent_id", "Post being replied to does not exist"));
            }
        }

        let post = self.uow.forum().create(user_id, input).await?;
        tracing::info!(post_id = post.id, parent_id = ?post.parent_id, "Forum post created");
        Ok(post)
    }

    async fn delete(&self, user_id: i64, id: i64) -> AppResult<()> {
        let post = self.uow.forum().find(id).await?.ok_or_not_found()?;
        if post.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        self.uow.forum().delete(id).await
    }
}
