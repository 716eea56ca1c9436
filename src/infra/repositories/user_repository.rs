//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::search::icontains;
use crate::domain::{AdminQuery, UpdateUser, User, UserRole};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Fields for a new account; the password is already hashed
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub password_hash: String,
    pub is_staff: bool,
}

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<User>>;

    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Apply the staff edit form; `Some("")` clears the phone
    async fn update(&self, id: i64, changes: UpdateUser) -> AppResult<User>;

    async fn touch_last_login(&self, id: i64) -> AppResult<()>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Admin list: search on username, email and phone
    async fn search(&self, query: AdminQuery) -> AppResult<(Vec<User>, u64)>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    pub(crate) db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            phone: Set(new_user.phone.filter(|p| !p.is_empty())),
            role: Set(new_user.role.as_str().to_string()),
            password_hash: Set(new_user.password_hash),
            is_staff: Set(new_user.is_staff),
            is_active: Set(true),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn update(&self, id: i64, changes: UpdateUser) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = user.into();

        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            let phone = phone.trim().to_string();
            active.phone = Set((!phone.is_empty()).then_some(phone));
        }
        if let Some(role) = changes.role {
            active.role = Set(role.as_str().to_string());
        }
        if let Some(is_staff) = changes.is_staff {
            active.is_staff = Set(is_staff);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn touch_last_login(&self, id: i64) -> AppResult<()> {
        UserEntity::update_many()
            .col_expr(user::Column::LastLogin, Expr::value(chrono::Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn search(&self, query: AdminQuery) -> AppResult<(Vec<User>, u64)> {
        let mut select = UserEntity::find();

        for term in query.search_terms() {
            select = select.filter(
                Condition::any()
                    .add(icontains(user::Column::Username, &term))
                    .add(icontains(user::Column::Email, &term))
                    .add(icontains(user::Column::Phone, &term)),
            );
        }
        if let Some(role) = query.role.as_deref().filter(|r| !r.is_empty()) {
            select = select.filter(user::Column::Role.eq(role));
        }
        if let Some(is_staff) = query.is_staff {
            select = select.filter(user::Column::IsStaff.eq(is_staff));
        }
        if let Some(is_active) = query.is_active {
            select = select.filter(user::Column::IsActive.eq(is_active));
        }
        let (from, to) = query.created_range();
        if let Some(from) = from {
            select = select.filter(user::Column::CreatedAt.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(user::Column::CreatedAt.lt(to));
        }

        let paginator = select
            .order_by_asc(user::Column::Username)
            .paginate(&self.db, query.per_page());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(query.page() - 1).await?;

        Ok((models.into_iter().map(User::from).collect(), total))
    }
}
