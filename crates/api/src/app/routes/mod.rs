//! Route trees, one module per area.

pub mod auth;
pub mod products;
pub mod system;
