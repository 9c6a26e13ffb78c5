use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::artifact::extract;
use crate::backend::{CompletionBackend, CompletionRequest, Message};
use crate::error::{ChainError, CompletionError};
use crate::plan::{RoleMessages, RolePlan};

use super::history::CompletionHistory;
use super::protocol::{previous_completion_hint, ARTIFACT_PROTOCOL};
use super::traits::RetryStrategyPlugin;
use super::types::{CompletionAttempt, RoleCompletion, TaskCompletions};

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Drives role completions for a set of plans.
///
/// Every role of every task runs concurrently (optionally capped by
/// `max_concurrency`). Each attempt is seeded with the latest accepted
/// completion of the run, so a role may be chained onto another task's
/// output; that ordering is best-effort.
pub struct Chainer {
    backend: Arc<dyn CompletionBackend>,
    retry: Arc<dyn RetryStrategyPlugin>,
    history: Arc<CompletionHistory>,
    model: String,
    temperature: f32,
    max_concurrency: usize,
}

impl Chainer {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        retry: Arc<dyn RetryStrategyPlugin>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            retry,
            history: Arc::new(CompletionHistory::new()),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_concurrency: 0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// 0 means unbounded.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_history(mut self, history: Arc<CompletionHistory>) -> Self {
        self.history = history;
        self
    }

    pub fn history(&self) -> &Arc<CompletionHistory> {
        &self.history
    }

    /// Completes every role of every plan. Results keep plan and role order;
    /// a failed role never cancels its siblings.
    pub async fn run(&self, plans: &[RolePlan]) -> Vec<TaskCompletions> {
        let limiter = (self.max_concurrency > 0).then(|| Semaphore::new(self.max_concurrency));
        let limiter = limiter.as_ref();

        tracing::info!(
            target: "chatops.chain",
            tasks = plans.len(),
            roles = plans.iter().map(|p| p.roles.len()).sum::<usize>(),
            max_retries = self.retry.max_retries(),
            strategy = self.retry.name(),
            backend = self.backend.name(),
            "collecting responses"
        );

        join_all(plans.iter().map(|plan| async move {
            let roles = join_all(
                plan.roles
                    .iter()
                    .map(|role| self.complete_role(&plan.task.name, role, limiter)),
            )
            .await;
            TaskCompletions {
                task: plan.task.name.clone(),
                roles,
            }
        }))
        .await
    }

    /// One completion with the artifact protocol and a single user message.
    /// No retry and no chaining hint; the response is still recorded.
    pub async fn complete_single(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            messages: vec![Message::system(ARTIFACT_PROTOCOL), Message::user(prompt)],
            model: self.model.clone(),
            temperature: self.temperature,
        };
        let text = self.backend.complete(request).await?;
        self.history.append(text.clone());
        Ok(text)
    }

    async fn complete_role(
        &self,
        task: &str,
        role: &RoleMessages,
        limiter: Option<&Semaphore>,
    ) -> RoleCompletion {
        let mut retries = 0u32;
        loop {
            let mut attempt = CompletionAttempt {
                attempt_number: retries + 1,
                prompt: self.attempt_messages(&role.messages),
                response: None,
                error: None,
            };

            match self.call(&attempt.prompt, limiter).await {
                Ok(text) if has_artifacts(&text) => {
                    tracing::info!(
                        target: "chatops.chain",
                        task,
                        role = %role.role,
                        attempt = attempt.attempt_number,
                        "completion accepted"
                    );
                    self.history.append(text.clone());
                    return RoleCompletion {
                        task: task.to_string(),
                        role: role.role.clone(),
                        attempts: attempt.attempt_number,
                        outcome: Ok(text),
                    };
                }
                Ok(text) => {
                    attempt.error = Some(ChainError::NoArtifacts.to_string());
                    attempt.response = Some(text);
                }
                Err(source @ CompletionError::Permanent(_)) => {
                    tracing::error!(target: "chatops.chain", task, role = %role.role, error = %source, "completion aborted");
                    return RoleCompletion {
                        task: task.to_string(),
                        role: role.role.clone(),
                        attempts: attempt.attempt_number,
                        outcome: Err(ChainError::Fatal {
                            task: task.to_string(),
                            role: role.role.clone(),
                            source,
                        }),
                    };
                }
                Err(err) => attempt.error = Some(err.to_string()),
            }

            let error = attempt.error.take().unwrap_or_default();
            tracing::warn!(
                target: "chatops.chain",
                task,
                role = %role.role,
                attempt = attempt.attempt_number,
                max_retries = self.retry.max_retries(),
                error = %error,
                response = attempt.response.as_deref().unwrap_or(""),
                "attempt failed"
            );

            if !self.retry.should_retry(retries, &error) {
                return RoleCompletion {
                    task: task.to_string(),
                    role: role.role.clone(),
                    attempts: attempt.attempt_number,
                    outcome: Err(ChainError::RetriesExhausted {
                        task: task.to_string(),
                        role: role.role.clone(),
                        attempts: attempt.attempt_number,
                        last_error: error,
                    }),
                };
            }
            if let Some(delay) = self.retry.next_delay(retries, &error) {
                tokio::time::sleep(delay).await;
            }
            retries += 1;
        }
    }

    /// Base role messages plus the protocol and, when the run already has an
    /// accepted completion, the revision hint. Rebuilt for every attempt.
    fn attempt_messages(&self, base: &[Message]) -> Vec<Message> {
        let mut messages = base.to_vec();
        messages.push(Message::system(ARTIFACT_PROTOCOL));
        if let Some(previous) = self.history.latest() {
            messages.push(Message::system(previous_completion_hint(&previous)));
        }
        messages
    }

    async fn call(
        &self,
        messages: &[Message],
        limiter: Option<&Semaphore>,
    ) -> Result<String, CompletionError> {
        let _permit = match limiter {
            Some(sem) => Some(sem.acquire().await.map_err(|_| {
                CompletionError::Transient("concurrency limiter closed".to_string())
            })?),
            None => None,
        };
        let request = CompletionRequest {
            messages: messages.to_vec(),
            model: self.model.clone(),
            temperature: self.temperature,
        };
        self.backend.complete(request).await
    }
}

/// Only structured or fenced candidates count; a prose-only reply is retried.
fn has_artifacts(text: &str) -> bool {
    extract(text).iter().any(|c| c.is_encoded())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Task;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const GOOD: &str = "{'reqs': {'response': 'pandas', 'status': 'pending_validation', 'result': '', 'app_type': 'text', 'path': '.'}}";

    struct Scripted {
        replies: Mutex<VecDeque<Result<String, CompletionError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<&str, CompletionError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().map(|r| r.map(String::from)).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for Scripted {
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

    struct Immediate(u32);

    impl RetryStrategyPlugin for Immediate {
        fn name(&self) -> &str {
            "immediate"
        }
        fn next_delay(&self, _attempt: u32, _error: &str) -> Option<Duration> {
            None
        }
        fn max_retries(&self) -> u32 {
            self.0
        }
    }

    fn plan(task: &str, roles: &[&str]) -> RolePlan {
        RolePlan {
            task: Task {
                name: task.into(),
                data: None,
            },
            roles: roles
                .iter()
                .map(|r| RoleMessages {
                    role: r.to_string(),
                    messages: vec![Message::user(format!("do {task} as {r}"))],
                    token_usage: 0,
                })
                .collect(),
            token_usage: 0,
        }
    }

    #[tokio::test]
    async fn retries_until_artifacts_appear() {
        let backend = Scripted::new(vec![
            Err(CompletionError::Transient("429".into())),
            Ok("no artifacts here"),
            Ok(GOOD),
        ]);
        let chainer = Chainer::new(backend.clone(), Arc::new(Immediate(3)), "m");
        let out = chainer.run(&[plan("t", &["dev"])]).await;

        let role = &out[0].roles[0];
        assert_eq!(role.attempts, 3);
        assert_eq!(role.text(), Some(GOOD));
        assert_eq!(chainer.history().snapshot(), vec![GOOD.to_string()]);

        // each attempt is rebuilt from the base messages
        for request in backend.requests.lock().unwrap().iter() {
            assert_eq!(request.messages.len(), 2);
            assert_eq!(request.messages[1].content, ARTIFACT_PROTOCOL);
            assert!((request.temperature - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
        }
    }

    #[tokio::test]
    async fn exhausting_retries_is_reported_per_role() {
        let backend = Scripted::new(vec![Ok("prose"), Ok("prose")]);
        let chainer = Chainer::new(backend, Arc::new(Immediate(1)), "m");
        let out = chainer.run(&[plan("t", &["dev"])]).await;

        match &out[0].roles[0].outcome {
            Err(ChainError::RetriesExhausted { attempts, .. }) => assert_eq!(*attempts, 2),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(chainer.history().is_empty());
    }

    #[tokio::test]
    async fn permanent_errors_stop_immediately() {
        let backend = Scripted::new(vec![Err(CompletionError::Permanent("401".into())), Ok(GOOD)]);
        let chainer = Chainer::new(backend.clone(), Arc::new(Immediate(3)), "m");
        let out = chainer.run(&[plan("t", &["dev"])]).await;
        assert!(matches!(out[0].roles[0].outcome, Err(ChainError::Fatal { .. })));
        assert_eq!(backend.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn later_attempts_carry_the_previous_completion() {
        let backend = Scripted::new(vec![Ok(GOOD), Ok(GOOD)]);
        let chainer = Chainer::new(backend.clone(), Arc::new(Immediate(0)), "m").with_max_concurrency(1);
        chainer.run(&[plan("a", &["dev"])]).await;
        chainer.run(&[plan("b", &["dev"])]).await;

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].messages.len(), 2);
        let hint = &requests[1].messages[2];
        assert!(hint.content.starts_with("Use the output from the previous completion:"));
        assert!(hint.content.contains("pandas"));
    }

    #[tokio::test]
    async fn failed_sibling_does_not_affect_others() {
        let backend = Scripted::new(vec![
            Ok(GOOD),
            Err(CompletionError::Permanent("bad request".into())),
        ]);
        let chainer = Chainer::new(backend, Arc::new(Immediate(0)), "m").with_max_concurrency(1);
        let out = chainer.run(&[plan("t", &["dev", "qa"])]).await;

        assert_eq!(out[0].roles[0].role, "dev");
        assert!(out[0].roles[0].outcome.is_ok());
        assert!(out[0].roles[1].outcome.is_err());
    }

    /// Fast calls meet at a barrier, so they only finish if all of them are
    /// in flight together. Calls for a "slow" role hold until every fast
    /// call has returned.
    struct Gated {
        barrier: tokio::sync::Barrier,
        fast: usize,
        finished: AtomicUsize,
        released: tokio::sync::Notify,
    }

    impl Gated {
        fn new(fast: usize) -> Arc<Self> {
            Arc::new(Self {
                barrier: tokio::sync::Barrier::new(fast),
                fast,
                finished: AtomicUsize::new(0),
                released: tokio::sync::Notify::new(),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for Gated {
        fn name(&self) -> &str {
            "gated"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
            if request.messages[0].content.ends_with("as slow") {
                while self.finished.load(Ordering::SeqCst) < self.fast {
                    self.released.notified().await;
                }
                return Ok(GOOD.replace("pandas", "slow"));
            }
            self.barrier.wait().await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            self.released.notify_one();
            Ok(GOOD.to_string())
        }
    }

    #[tokio::test]
    async fn roles_and_tasks_run_concurrently() {
        let backend = Gated::new(3);
        let chainer = Chainer::new(backend, Arc::new(Immediate(0)), "m");
        let plans = [plan("a", &["dev", "qa"]), plan("b", &["dev", "slow"])];

        let out = tokio::time::timeout(Duration::from_secs(5), chainer.run(&plans))
            .await
            .expect("fast calls overlap and the stalled one is released");

        assert!(out.iter().flat_map(|t| &t.roles).all(|r| r.outcome.is_ok()));
        assert_eq!(out[1].roles[1].role, "slow");
        let history = chainer.history().snapshot();
        assert_eq!(history.len(), 4);
        assert!(history[3].contains("slow"));
    }

    #[tokio::test]
    async fn concurrency_bound_serializes_calls() {
        let backend = Gated::new(2);
        let chainer = Chainer::new(backend, Arc::new(Immediate(0)), "m").with_max_concurrency(1);
        let plans = [plan("a", &["dev"]), plan("b", &["dev"])];

        let out = tokio::time::timeout(Duration::from_millis(200), chainer.run(&plans)).await;
        assert!(out.is_err(), "two calls were in flight under a bound of one");
    }

    #[tokio::test]
    async fn single_completion_is_recorded() {
        let backend = Scripted::new(vec![Ok("hello")]);
        let chainer = Chainer::new(backend.clone(), Arc::new(Immediate(0)), "m");
        assert_eq!(chainer.complete_single("hi").await.unwrap(), "hello");
        assert_eq!(chainer.history().latest().as_deref(), Some("hello"));
        assert_eq!(backend.requests.lock().unwrap()[0].messages[1], Message::user("hi"));
    }
}
