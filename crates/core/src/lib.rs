//! Domain types and pure logic shared by every studio crate.
//!
//! Nothing in here performs I/O: the gateway, database and HTTP layers
//! depend on these types, never the other way round.

pub mod error;
pub mod error_category;
pub mod generation;
pub mod types;
