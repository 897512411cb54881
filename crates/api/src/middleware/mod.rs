pub mod owner;
pub mod timeout;
