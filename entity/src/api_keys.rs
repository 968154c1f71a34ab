//! # API key entity
//!
//! Persisted capability record for an issued API key. The unique index on
//! `opaque_id` is the final backstop for key-id uniqueness at issue time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// API key entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "api_keys")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub key_id: i64,
    /// The random id segment of the key string
    #[sea_orm(unique)]
    pub opaque_id: String,
    /// The full handed-out key string
    #[sea_orm(unique, column_type = "Text")]
    pub key: String,
    pub cache: bool,
    pub storage: bool,
    pub revoked: bool,
    /// Epoch seconds
    pub expires_at: i64,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::services::Entity")]
    Service,
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
