pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod facts;
pub mod lifecycle;
pub mod runtime;
pub mod snapshot;
pub mod storage;
pub mod types;
