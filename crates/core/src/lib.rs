//! Domain types and pure logic shared by the database, provider, and API crates.
//!
//! Nothing in this crate performs I/O.

pub mod asset;
pub mod error;
pub mod reorder;
pub mod roles;
pub mod signature;
pub mod types;
