pub mod backend;
pub mod executor;
pub mod factory;
pub mod runner;
pub mod tokenizer;
