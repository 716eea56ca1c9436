//! Authentication service - registration, login and token checks.
//!
//! Password hashing lives in the domain `Password` value object;
//! repository access goes through the Unit of Work.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{password::DUMMY_HASH, Password, RegisterUser, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{NewUser, UnitOfWork};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account; field errors name the offending inputs
    async fn register(&self, input: RegisterUser) -> AppResult<User>;

    /// Check credentials, stamp `last_login` and issue a token
    async fn login(&self, username: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Resolve a token to an active user
    async fn authenticate(&self, token: &str) -> AppResult<User>;

    /// Create a staff account (administration CLI)
    async fn create_staff(&self, username: String, email: String, password: String)
        -> AppResult<User>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    async fn ensure_available(&self, username: &str, phone: Option<&str>) -> AppResult<()> {
        if self.uow.users().find_by_username(username).await?.is_some() {
            return Err(AppError::field(
                "username",
                "A user with that username already exists",
            ));
        }
        if let Some(phone) = phone {
            if self.uow.users().find_by_phone(phone).await?.is_some() {
                return Err(AppError::field(
                    "phone",
                    "A user with that phone number already exists",
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: RegisterUser) -> AppResult<User> {
        let password = Password::confirmed(&input.password1, &input.password2)?;
        self.ensure_available(&input.username, input.phone.as_deref())
            .await?;

        let user = self
            .uow
            .users()
            .create(NewUser {
                username: input.username,
                email: input.email,
                phone: input.phone,
                role: input.role,
                password_hash: password.into_string(),
                is_staff: false,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    async fn login(&self, username: String, password: String) -> AppResult<TokenResponse> {
        let user = self.uow.users().find_by_username(username.trim()).await?;

        // Unknown usernames still pay for one hash verification.
        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());
        let password_valid = Password::from_hash(hash).verify(&password);

        let user = match user {
            Some(user) if password_valid && user.is_active => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        self.uow.users().touch_last_login(user.id).await?;
        tracing::debug!(user_id = user.id, "User logged in");
        generate_token(&user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;
        match self.uow.users().find_by_id(claims.sub).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AppError::Unauthorized),
        }
    }

    async fn create_staff(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> AppResult<User> {
        let password = Password::new(&password)?;
        self.ensure_available(&username, None).await?;

        let user = self
            .uow
            .users()
            .create(NewUser {
                username,
                email,
                phone: None,
                role: UserRole::Admin,
                password_hash: password.into_string(),
                is_staff: true,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "Staff account created");
        Ok(user)
    }
}
