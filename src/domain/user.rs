//! User domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::config::{
    MAX_PHONE_LENGTH, MAX_USERNAME_LENGTH, ROLE_ADMIN, ROLE_MODERATOR, ROLE_SELLER, ROLE_USER,
};
use crate::errors::{AppError, AppResult, FieldErrors};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username pattern"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()-]{4,19}$").expect("valid phone pattern"));

/// User roles enumeration.
///
/// Stored and reported, but not used for authorization: listing
/// ownership and the staff flag are the only access checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Seller,
    Moderator,
    Admin,
}

impl UserRole {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::User => "Обычный пользователь",
            UserRole::Seller => "Продавец",
            UserRole::Moderator => "Модератор",
            UserRole::Admin => "Администратор",
        }
    }

    /// Parse a stored role value, rejecting unknown ones
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            ROLE_USER => Some(UserRole::User),
            ROLE_SELLER => Some(UserRole::Seller),
            ROLE_MODERATOR => Some(UserRole::Moderator),
            ROLE_ADMIN => Some(UserRole::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => ROLE_USER,
            UserRole::Seller => ROLE_SELLER,
            UserRole::Moderator => ROLE_MODERATOR,
            UserRole::Admin => ROLE_ADMIN,
        }
    }

    pub fn all() -> [UserRole; 4] {
        [
            UserRole::User,
            UserRole::Seller,
            UserRole::Moderator,
            UserRole::Admin,
        ]
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name used in listings and forum posts
    pub fn display_name(&self) -> &str {
        &self.username
    }
}

/// Registration data after form/JSON parsing
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub password1: String,
    pub password2: String,
}

/// Registration fields as submitted by the sign-up page or the API
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegisterForm {
    #[serde(default)]
    #[schema(example = "ivan")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "ivan@example.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "+7 900 000-00-00")]
    pub phone: String,
    #[serde(default)]
    #[schema(example = "seller")]
    pub role: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl RegisterForm {
    /// Check formats and collect one message per failing field.
    ///
    /// Uniqueness and password strength are checked by the auth service.
    pub fn parse(&self) -> AppResult<RegisterUser> {
        let mut errors = FieldErrors::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.insert("username".into(), "This field is required".into());
        } else if username.chars().count() > MAX_USERNAME_LENGTH as usize {
            errors.insert(
                "username".into(),
                format!("Ensure this value has at most {} characters", MAX_USERNAME_LENGTH),
            );
        } else if !USERNAME_RE.is_match(username) {
            errors.insert(
                "username".into(),
                "Enter a valid username. Letters, digits and @/./+/-/_ only".into(),
            );
        }

        let email = self.email.trim();
        if !email.is_empty() && !email.validate_email() {
            errors.insert("email".into(), "Enter a valid email address".into());
        }

        let phone = self.phone.trim();
        if phone.chars().count() > MAX_PHONE_LENGTH as usize {
            errors.insert(
                "phone".into(),
                format!("Ensure this value has at most {} characters", MAX_PHONE_LENGTH),
            );
        } else if !phone.is_empty() && !PHONE_RE.is_match(phone) {
            errors.insert("phone".into(), "Enter a valid phone number".into());
        }

        let role = match self.role.trim() {
            "" => UserRole::default(),
            raw => UserRole::parse(raw).unwrap_or_else(|| {
                errors.insert(
                    "role".into(),
                    format!("Select a valid choice. {} is not one of the available choices", raw),
                );
                UserRole::default()
            }),
        };

        if self.password1.is_empty() {
            errors.insert("password1".into(), "This field is required".into());
        }
        if self.password2.is_empty() {
            errors.insert("password2".into(), "This field is required".into());
        }

        if !errors.is_empty() {
            return Err(AppError::FieldErrors(errors));
        }

        Ok(RegisterUser {
            username: username.to_string(),
            email: email.to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            role,
            password1: self.password1.clone(),
            password2: self.password2.clone(),
        })
    }
}

/// Credentials from the login page or `POST /api/auth/login`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    #[schema(example = "ivan")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Fields a staff member may change on a user
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUser {
    #[schema(example = "ivan@example.com")]
    pub email: Option<String>,
    /// Empty string clears the phone number
    #[schema(example = "+7 900 000-00-00")]
    pub phone: Option<String>,
    #[schema(example = "seller")]
    pub role: Option<UserRole>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// Format checks for the fields being changed
    pub fn check(&self) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        if let Some(email) = self.email.as_deref() {
            let email = email.trim();
            if !email.is_empty() && !email.validate_email() {
                errors.insert("email".into(), "Enter a valid email address".into());
            }
        }
        if let Some(phone) = self.phone.as_deref() {
            let phone = phone.trim();
            if phone.chars().count() > MAX_PHONE_LENGTH as usize
                || (!phone.is_empty() && !PHONE_RE.is_match(phone))
            {
                errors.insert("phone".into(), "Enter a valid phone number".into());
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::FieldErrors(errors))
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "ivan")]
    pub username: String,
    #[schema(example = "ivan@example.com")]
    pub email: String,
    pub phone: Option<String>,
    #[schema(example = "seller")]
    pub role: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            role: user.role.to_string(),
            is_staff: user.is_staff,
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        for role in UserRole::all() {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_unknown_role_defaults_to_user() {
        assert_eq!(UserRole::from("root"), UserRole::User);
        assert_eq!(UserRole::parse("root"), None);
    }

    fn form() -> RegisterForm {
        RegisterForm {
            username: "ivan".into(),
            email: "ivan@example.com".into(),
            phone: String::new(),
            role: "seller".into(),
            password1: "Password123".into(),
            password2: "Password123".into(),
        }
    }

    #[test]
    fn test_register_form_parses() {
        let user = form().parse().unwrap();
        assert_eq!(user.role, UserRole::Seller);
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_register_form_rejects_bad_fields() {
        let bad = RegisterForm {
            username: "bad name!".into(),
            phone: "call me".into(),
            role: "root".into(),
            ..form()
        };
        let err = bad.parse().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("role"));
    }

    #[test]
    fn test_register_form_keeps_phone() {
        let with_phone = RegisterForm { phone: " +7 (900) 123-45-67 ".into(), ..form() };
        assert_eq!(with_phone.parse().unwrap().phone.as_deref(), Some("+7 (900) 123-45-67"));
    }

    #[test]
    fn test_register_email_is_optional_but_checked() {
        let blank = RegisterForm { email: "  ".into(), ..form() };
        assert_eq!(blank.parse().unwrap().email, "");

        for email in ["ivan@@example.com", "ivan example@mail.ru", "@example.com"] {
            let bad = RegisterForm { email: email.into(), ..form() };
            let err = bad.parse().unwrap_err();
            assert!(err.field_errors().unwrap().contains_key("email"), "{}", email);
        }
    }

    #[test]
    fn test_update_user_check() {
        let bad = UpdateUser {
            email: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(bad.check().unwrap_err().field_errors().unwrap().contains_key("email"));

        let clear_phone = UpdateUser {
            phone: Some(String::new()),
            ..Default::default()
        };
        assert!(clear_phone.check().is_ok());
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(UserRole::Seller.label(), "Продавец");
    }
}
