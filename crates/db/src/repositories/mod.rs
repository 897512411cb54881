//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod creative_work_repo;
pub mod user_repo;

pub use creative_work_repo::CreativeWorkRepo;
pub use user_repo::UserRepo;
