// src/config/mod.rs
pub mod sentinel;

pub use sentinel::{Domain, SentinelConfig};
