// Library module for bucketdiff
// Re-exports modules for use in integration tests and the binary

pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod hash;
pub mod store;
