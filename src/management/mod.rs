//! Management surface: accounts, projects, HTTP plumbing

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod services;

pub use server::AppState;
