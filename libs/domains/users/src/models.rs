use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Normalized (trimmed, lowercased) email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> UserResult<Self> {
        let normalized = raw.trim().to_lowercase();
        if !EMAIL_PATTERN.is_match(&normalized) {
            return Err(UserError::InvalidEmail(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Request-level check with the same rule as [`Email::parse`].
fn validate_email_address(raw: &str) -> Result<(), validator::ValidationError> {
    if Email::parse(raw).is_err() {
        return Err(validator::ValidationError::new("email"));
    }
    Ok(())
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Email,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: Email) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body for `POST /users`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 255, message = "name must be between 1 and 255 characters"))]
    #[schema(example = "John Doe")]
    pub name: String,

    #[validate(custom(function = "validate_email_address", message = "email must be an email"))]
    #[schema(example = "john.doe@example.com")]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "123e4567-e89b-12d3-a456-426614174000")]
    pub id: Uuid,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    #[schema(example = true)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email.0,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// `?page=&limit=` for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// 1-based page number
    #[validate(range(min = 1, message = "page must not be less than 1"))]
    #[param(minimum = 1, default = 1)]
    pub page: u64,

    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, default = 10)]
    pub limit: u64,
}

impl PaginationQuery {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, query: PaginationQuery) -> Self {
        Self {
            data,
            total,
            page: query.page,
            limit: query.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        let email = Email::parse("  John.Doe@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "john.doe@example.com");
    }

    #[test]
    fn test_email_rejects_malformed_addresses() {
        for raw in [
            "invalid-email",
            "a@b",
            "@example.com",
            "john doe@example.com",
            "a@@b.com",
            "",
        ] {
            assert!(
                matches!(Email::parse(raw), Err(UserError::InvalidEmail(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_new_user_is_active() {
        let user = User::new("John Doe", Email::parse("john@example.com").unwrap());
        assert!(user.is_active);
        assert_eq!(user.created_at, user.updated_at);
        assert_eq!(user.id.get_version_num(), 4);
    }

    #[test]
    fn test_user_response_is_camel_case() {
        let user = User::new("John Doe", Email::parse("john@example.com").unwrap());
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert_eq!(json["isActive"], true);
        assert_eq!(json["email"], "john@example.com");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("is_active").is_none());
    }

    #[test]
    fn test_create_user_rejects_unknown_fields() {
        let result: Result<CreateUser, _> = serde_json::from_str(
            r#"{"name":"John","email":"john@example.com","isAdmin":true}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_create_user_validation() {
        let input = CreateUser {
            name: String::new(),
            email: "invalid-email".to_string(),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_create_user_email_rule_matches_parse() {
        for raw in [
            "a@localhost",
            "a@b",
            "john doe@example.com",
            "  John@Example.COM ",
            "john@example.com",
        ] {
            let input = CreateUser {
                name: "John".to_string(),
                email: raw.to_string(),
            };
            assert_eq!(
                input.validate().is_ok(),
                Email::parse(raw).is_ok(),
                "{raw:?} must be accepted or rejected by both"
            );
        }
    }

    #[test]
    fn test_pagination_defaults_and_offset() {
        let query: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query, PaginationQuery::new(1, 10));
        assert_eq!(query.offset(), 0);
        assert_eq!(PaginationQuery::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_pagination_bounds() {
        assert!(PaginationQuery::new(0, 10).validate().is_err());
        assert!(PaginationQuery::new(1, 0).validate().is_err());
        assert!(PaginationQuery::new(1, 101).validate().is_err());
        assert!(PaginationQuery::new(1, MAX_LIMIT).validate().is_ok());
    }
}
