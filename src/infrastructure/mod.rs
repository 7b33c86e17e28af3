//! Infrastructure layer module
//!
//! Configuration loading and logging setup. Persistence lives in
//! `adapters::sqlite`.

pub mod config;
pub mod logging;
