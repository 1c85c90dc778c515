//! `rigshop-auth`: account model, credential checks and session tokens.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use claims::SessionClaims;
pub use password::{PasswordError, hash_password, verify_password};
pub use roles::Role;
pub use token::{Hs256Tokens, TokenError, TokenVerifier};
pub use user::{Credentials, Registration, User};
