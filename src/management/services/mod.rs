//! Business services behind the management handlers

pub mod projects;
pub mod users;
