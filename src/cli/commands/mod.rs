//! Command implementations for the srcfix CLI

pub mod config;
pub mod process;
pub mod tools;
pub mod version;
