#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chatops_core::api::{
    CompletionBackend, CompletionError, CompletionRequest, ProgramOutput, ProgramRunner,
    RetryStrategyPlugin, RunError, Tokenizer,
};

/// Completion source that replies from a fixed script, in call order.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Result<S, CompletionError>>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(Into::into)).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Permanent("script exhausted".into())))
    }
}

/// Interpreter stand-in: records invocations, fails for `missing` types.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: Mutex<Vec<(String, String)>>,
    pub missing: Vec<String>,
}

impl RecordingRunner {
    pub fn missing(types: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            missing: types.iter().map(|t| t.to_string()).collect(),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgramRunner for RecordingRunner {
    fn name(&self) -> &str {
        "recording"
    }

    async fn run(&self, interpreter: &str, content: &str) -> Result<ProgramOutput, RunError> {
        self.calls
            .lock()
            .unwrap()
            .push((interpreter.to_string(), content.to_string()));
        if self.missing.iter().any(|m| m == interpreter) {
            return Err(RunError::NotInstalled(interpreter.to_string()));
        }
        Ok(ProgramOutput {
            exit_code: Some(0),
            stdout: "ok\n".into(),
            stderr: String::new(),
        })
    }
}

pub struct NoDelay(pub u32);

impl RetryStrategyPlugin for NoDelay {
    fn name(&self) -> &str {
        "no-delay"
    }

    fn next_delay(&self, _attempt: u32, _error: &str) -> Option<Duration> {
        None
    }

    fn max_retries(&self) -> u32 {
        self.0
    }
}

pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn count_tokens(&self, text: &str, _model: &str) -> usize {
        text.split_whitespace().count()
    }
}

pub fn record(name: &str, response: &str, app_type: &str, path: &str) -> String {
    format!(
        "{{'{name}': {{'response': ```{response}```, 'status': 'pending_validation', 'result': '', 'app_type': '{app_type}', 'path': '{path}'}}}}"
    )
}
