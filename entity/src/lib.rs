//! # Entity definitions
//!
//! Sea-ORM entity models for the gateway schema.

pub mod api_keys;
pub mod services;
pub mod users;

pub use api_keys::Entity as ApiKeys;
pub use services::Entity as Services;
pub use users::Entity as Users;
