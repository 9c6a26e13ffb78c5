//! Task catalog and role prompt builder.
//!
//! Every task is expanded into one message sequence per configured role:
//! the objective, one system message per role instruction, and a user
//! message naming the task, its data and the role.

mod prompt;
mod task;

pub use prompt::{parse_roles, PromptBuilder, RoleMessages, RolePlan, RoleSpec};
pub use task::{Task, TaskCatalog};
