mod load;
mod types;

pub use load::{apply_env_overrides, get_chatops_data_dir, load, load_default, load_from_path};
pub use types::*;
