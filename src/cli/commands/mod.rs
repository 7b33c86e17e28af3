//! CLI command implementations.

pub mod init;
pub mod shift;
pub mod slot;
pub mod worker;
