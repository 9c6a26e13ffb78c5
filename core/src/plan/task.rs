use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub data: Option<String>,
}

/// Ordered set of tasks for one run. Names are unique.
#[derive(Debug, Clone, Default)]
pub struct TaskCatalog {
    tasks: Vec<Task>,
}

impl TaskCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a task. Re-registering a name replaces its data but keeps
    /// the position it was first added at.
    pub fn add(&mut self, name: impl Into<String>, data: Option<String>) {
        let name = name.into();
        tracing::info!(target: "chatops.plan", task = %name, "adding task to task list");
        match self.tasks.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.data = data,
            None => self.tasks.push(Task { name, data }),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
