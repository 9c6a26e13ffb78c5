use std::sync::{Mutex, MutexGuard};

/// Append-only record of the raw completions accepted so far in a run.
///
/// Shared by every concurrent role completion. Reads and appends are each
/// atomic, but nothing orders a reader against another task's writer: the
/// latest entry is whichever completion finished most recently.
#[derive(Debug, Default)]
pub struct CompletionHistory {
    entries: Mutex<Vec<String>>,
}

impl CompletionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn append(&self, text: impl Into<String>) {
        self.entries().push(text.into());
    }

    pub fn latest(&self) -> Option<String> {
        self.entries().last().cloned()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
