//! Users Domain
//!
//! User registration and lookup behind a repository trait.
//!
//! ```text
//! handlers  → HTTP endpoints, OpenAPI
//! service   → use cases (create, get, list)
//! repository→ persistence trait, in-memory and PostgreSQL implementations
//! models    → User, Email, DTOs
//! ```
//!
//! ```rust,no_run
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//!
//! let service = UserService::new(InMemoryUserRepository::new());
//! let router: axum::Router = axum::Router::new().nest("/users", handlers::router(service));
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateUser, Email, PaginatedResponse, PaginationQuery, User, UserResponse,
};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
