//! Run orchestration: chained completions in, versioned artifacts and a
//! run report out.

mod batch;
mod run;
mod types;

pub use batch::BatchProcessor;
pub use run::{process_input, run_plans, run_prompt};
pub use types::{BatchReport, RunReport};
