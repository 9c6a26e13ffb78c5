pub mod http_error;
pub mod openai;
pub mod replay;

pub use http_error::{CompletionHttpError, CompletionHttpErrorKind};
pub use openai::ChatCompletionBackend;
pub use replay::ReplayBackend;
