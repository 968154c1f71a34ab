//! HTTP handlers

pub mod projects;
pub mod users;
