//! # User entity
//!
//! Registered account rows. Identity is external (Clerk); no local
//! password material is stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    /// External identity reference
    #[sea_orm(unique)]
    pub clerk_id: String,
    pub role: i64,
    pub confirmed: bool,
    /// Soft-delete marker; deleted users fail provisioning preconditions
    pub deleted: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::services::Entity")]
    Services,
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Services.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
