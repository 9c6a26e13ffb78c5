#[allow(clippy::module_inception)]
pub mod error;
pub mod chain;
pub mod executor;

pub use chain::{ChainError, CompletionError};
pub use error::{CliError, InputError, RolesError};
pub use executor::ExecError;
