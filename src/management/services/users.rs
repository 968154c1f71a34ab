//! User registration and lookup

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

use entity::users;

use crate::error::{GatewayError, Result};

/// Register a user for an external identity. Re-registering the same
/// identity is idempotent and returns the existing row.
pub async fn register(
    db: &DatabaseConnection,
    clerk_id: &str,
    email: &str,
) -> Result<users::Model> {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::ClerkId.eq(clerk_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let model = users::ActiveModel {
        email: Set(email.to_string()),
        clerk_id: Set(clerk_id.to_string()),
        role: Set(1),
        confirmed: Set(false),
        deleted: Set(false),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    match model.insert(db).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "user registered");
            Ok(user)
        }
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Err(GatewayError::already_exists(
                "a user with this email already exists",
            )),
            _ => Err(e.into()),
        },
    }
}

/// Resolve the internal user for an external identity.
pub async fn find_by_clerk_id(db: &DatabaseConnection, clerk_id: &str) -> Result<users::Model> {
    let user = users::Entity::find()
        .filter(users::Column::ClerkId.eq(clerk_id))
        .one(db)
        .await?
        .ok_or_else(|| GatewayError::not_found("user"))?;
    if user.deleted {
        return Err(GatewayError::not_found("user"));
    }
    Ok(user)
}
