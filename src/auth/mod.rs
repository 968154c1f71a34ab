//! Credential subsystem
//!
//! Session tokens (short-lived access + rotated refresh) for interactive
//! users, and signed capability-scoped API keys for programmatic clients.

pub mod api_key;
pub mod capability;
pub mod jwt;
pub mod session;
pub mod store;

pub use api_key::{ApiKeyCodec, ApiKeyMaterial, VerifiedKey};
pub use capability::{Capability, CapabilityGate, CapabilitySet, OwnerContext};
pub use jwt::{SessionClaims, SessionTokenCodec, TokenKind, TokenPair};
pub use session::{SessionOutcome, SessionRotator};
pub use store::{CapabilityRecord, NewKeyRow};
