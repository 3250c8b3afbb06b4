use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, Email, PaginatedResponse, PaginationQuery, User, UserResponse};
use crate::repository::UserRepository;

pub const CREATE_USER_CONTEXT: &str = "CreateUserUseCase";
pub const GET_USER_CONTEXT: &str = "GetUserUseCase";
pub const LIST_USERS_CONTEXT: &str = "ListUsersUseCase";

/// Service layer for user use cases
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a user; the email must not be taken.
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        info!(context = CREATE_USER_CONTEXT, "Creating user with email: {}", input.email);

        let email = Email::parse(&input.email)?;

        if self.repository.find_by_email(&email).await?.is_some() {
            warn!(
                context = CREATE_USER_CONTEXT,
                "User with email {} already exists", email
            );
            return Err(UserError::DuplicateEmail(email.to_string()));
        }

        let saved = self.repository.save(User::new(input.name, email)).await?;

        info!(
            context = CREATE_USER_CONTEXT,
            "User created successfully with id: {}", saved.id
        );
        Ok(saved)
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        info!(context = GET_USER_CONTEXT, "Getting user with id: {}", id);

        match self.repository.find_by_id(id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(context = GET_USER_CONTEXT, "User with id {} not found", id);
                Err(UserError::NotFound(id))
            }
        }
    }

    pub async fn list_users(
        &self,
        query: PaginationQuery,
    ) -> UserResult<PaginatedResponse<UserResponse>> {
        info!(
            context = LIST_USERS_CONTEXT,
            "Listing users - page: {}, limit: {}", query.page, query.limit
        );

        let (users, total) = self.repository.find_all(query.page, query.limit).await?;

        info!(context = LIST_USERS_CONTEXT, "Found {} users", total);
        Ok(PaginatedResponse::new(
            users.into_iter().map(UserResponse::from).collect(),
            total,
            query,
        ))
    }
}
