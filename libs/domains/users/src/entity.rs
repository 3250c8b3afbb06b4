use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::error::UserError;
use crate::models::{Email, User};

/// Sea-ORM entity for the `users` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = UserError;

    /// A stored email that no longer parses is corrupt data, not client input.
    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let email = Email::parse(&model.email).map_err(|_| {
            DbErr::Type(format!(
                "users.email for {} is not a valid address: {:?}",
                model.id, model.email
            ))
        })?;

        Ok(Self {
            id: model.id,
            name: model.name,
            email,
            is_active: model.is_active,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.as_str().to_string()),
            is_active: Set(user.is_active),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_helpers::{AppError, Fault};
    use chrono::Utc;

    fn model(email: &str) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id: Uuid::new_v4(),
            name: "John Doe".to_string(),
            email: email.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_model_converts_to_user() {
        let row = model("john@example.com");
        let user = User::try_from(row.clone()).unwrap();

        assert_eq!(user.id, row.id);
        assert_eq!(user.email.as_str(), "john@example.com");
        assert_eq!(user.created_at, row.created_at);
    }

    #[test]
    fn test_corrupt_email_is_a_server_fault() {
        let err = User::try_from(model("garbage")).unwrap_err();
        assert!(matches!(err, UserError::Database(DbErr::Type(_))));

        let fault = AppError::from(err).into_fault();
        assert_eq!(fault.status(), StatusCode::INTERNAL_SERVER_ERROR);
        match fault {
            Fault::Unknown(unknown) => assert!(unknown.message.contains("garbage")),
            other => panic!("expected unknown fault, got {other:?}"),
        }
    }
}
