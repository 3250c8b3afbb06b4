use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{Email, User},
    repository::UserRepository,
};

/// PostgreSQL implementation of [`UserRepository`] using SeaORM
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn save_error(err: DbErr, user: &User) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            UserError::DuplicateEmail(user.email.to_string())
        }
        _ => UserError::Database(err),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &Email) -> UserResult<Option<User>> {
        entity::Entity::find()
            .filter(entity::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_all(&self, page: u64, limit: u64) -> UserResult<(Vec<User>, u64)> {
        let total = entity::Entity::find().count(&self.db).await?;

        let models = entity::Entity::find()
            .order_by_desc(entity::Column::CreatedAt)
            .offset(page.saturating_sub(1).saturating_mul(limit))
            .limit(limit)
            .all(&self.db)
            .await?;

        let users = models
            .into_iter()
            .map(User::try_from)
            .collect::<UserResult<Vec<_>>>()?;

        Ok((users, total))
    }

    async fn save(&self, user: User) -> UserResult<User> {
        let model = entity::Entity::insert(entity::ActiveModel::from(&user))
            .on_conflict(
                OnConflict::column(entity::Column::Id)
                    .update_columns([
                        entity::Column::Name,
                        entity::Column::Email,
                        entity::Column::IsActive,
                        entity::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| save_error(e, &user))?;

        tracing::debug!(user_id = %model.id, "Saved user");
        User::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
