//! Row structs and DTOs, one module per table.

pub mod creative_work;
