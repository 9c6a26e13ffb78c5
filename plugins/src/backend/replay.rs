use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::OnceCell;

use chatops_core::api::{CompletionBackend, CompletionError, CompletionRequest};

pub const COMPLETION_SEPARATOR: &str = "---COMPLETION---";

/// Serves canned completions from a file, cycling through them in order.
/// Entries are separated by lines holding only `---COMPLETION---`.
pub struct ReplayBackend {
    completions_file: String,
    entries: OnceCell<Vec<String>>,
    cursor: AtomicUsize,
}

impl ReplayBackend {
    pub fn new(completions_file: String) -> Self {
        Self {
            completions_file,
            entries: OnceCell::new(),
            cursor: AtomicUsize::new(0),
        }
    }

    async fn entries(&self) -> Result<&Vec<String>, CompletionError> {
        self.entries
            .get_or_try_init(|| async {
                let content = tokio::fs::read_to_string(&self.completions_file)
                    .await
                    .map_err(|e| {
                        CompletionError::Permanent(format!(
                            "cannot read replay file {}: {e}",
                            self.completions_file
                        ))
                    })?;
                let entries = split_completions(&content);
                if entries.is_empty() {
                    return Err(CompletionError::Permanent(format!(
                        "replay file {} holds no completions",
                        self.completions_file
                    )));
                }
                tracing::info!(target: "chatops.chain", file = %self.completions_file, entries = entries.len(), "loaded replay completions");
                Ok(entries)
            })
            .await
    }
}

pub fn split_completions(content: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for line in content.lines() {
        if line.trim() == COMPLETION_SEPARATOR {
            out.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    out.push(current);
    out.into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

#[async_trait]
impl CompletionBackend for ReplayBackend {
    fn name(&self) -> &str {
        "replay"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
        let entries = self.entries().await?;
        let idx = self.cursor.fetch_add(1, Ordering::SeqCst) % entries.len();
        Ok(entries[idx].clone())
    }
}
