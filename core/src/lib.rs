pub mod api;
pub mod artifact;
pub mod backend;
pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod plan;
pub mod store;
