//! Request middleware

pub mod identity;
pub mod session;

pub use identity::{ClerkIdentity, perimeter_auth};
pub use session::{AuthContext, session_auth};
