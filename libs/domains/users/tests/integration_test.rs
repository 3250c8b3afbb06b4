//! Integration tests for the users domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Queries and row mapping work against the migrated schema
//! - The unique email constraint surfaces as a duplicate error
//! - Paging counts and orders rows as expected
//!
//! They need a Docker daemon: `cargo test -p domain_users -- --ignored`

use domain_users::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};
use uuid::Uuid;

fn new_user(builder: &TestDataBuilder, local: &str) -> User {
    let email = Email::parse(&builder.email(local)).unwrap();
    User::new(builder.name("user", local), email)
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_save_and_find_user() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("save_and_find");

    let user = new_user(&builder, "john");
    let saved = repo.save(user.clone()).await.unwrap();

    assert_uuid_eq(saved.id, user.id, "saved id");
    assert_eq!(saved.email, user.email);
    assert!(saved.is_active);

    let by_id = assert_some(repo.find_by_id(user.id).await.unwrap(), "user by id");
    assert_eq!(by_id.name, user.name);

    let by_email = assert_some(
        repo.find_by_email(&user.email).await.unwrap(),
        "user by email",
    );
    assert_uuid_eq(by_email.id, user.id, "user by email id");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_email_is_rejected() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("duplicate_email");

    let first = new_user(&builder, "jane");
    repo.save(first.clone()).await.unwrap();

    let second = User::new("Someone Else", first.email.clone());
    let result = repo.save(second).await;

    assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_save_updates_existing_row() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("update_existing");

    let mut user = repo.save(new_user(&builder, "ann")).await.unwrap();
    user.name = "Ann Renamed".to_string();
    user.is_active = false;

    let updated = repo.save(user.clone()).await.unwrap();

    assert_eq!(updated.name, "Ann Renamed");
    assert!(!updated.is_active);
    let (_, total) = repo.find_all(1, 10).await.unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_all_pages_newest_first() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let mut ids = Vec::new();
    for i in 0..3 {
        let builder = TestDataBuilder::new(i);
        let mut user = new_user(&builder, "paged");
        user.created_at += chrono::Duration::seconds(i as i64);
        ids.push(repo.save(user).await.unwrap().id);
    }

    let (first_page, total) = repo.find_all(1, 2).await.unwrap();
    let (second_page, _) = repo.find_all(2, 2).await.unwrap();

    assert_eq!(total, 3);
    assert_eq!(first_page.len(), 2);
    assert_eq!(second_page.len(), 1);
    assert_uuid_eq(first_page[0].id, ids[2], "newest first");
    assert_uuid_eq(second_page[0].id, ids[0], "oldest last");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_delete_user() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("delete");

    let user = repo.save(new_user(&builder, "gone")).await.unwrap();

    assert!(repo.delete(user.id).await.unwrap());
    assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
}

// ============================================================================
// Service Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_service_create_normalizes_email() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let created = service
        .create_user(CreateUser {
            name: "Mixed Case".to_string(),
            email: "Mixed.Case@Example.COM".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.email.as_str(), "mixed.case@example.com");

    let duplicate = service
        .create_user(CreateUser {
            name: "Other".to_string(),
            email: "mixed.case@example.com".to_string(),
        })
        .await;
    assert!(matches!(duplicate, Err(UserError::DuplicateEmail(_))));
}
