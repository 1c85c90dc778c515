//! `rigshop-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error taxonomy shared by every layer and the strongly typed identifiers.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult, FieldViolation};
pub use id::{ProductId, UserId};
