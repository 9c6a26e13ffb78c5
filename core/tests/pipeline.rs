mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chatops_core::api::{
    parse_roles, process_input, run_plans, run_prompt, BatchProcessor, Chainer, CompletionError,
    ExecError, Executor, OutcomeStatus, OutputOverride, OutputStore, PromptBuilder, TaskCatalog,
};
use common::{record, NoDelay, RecordingRunner, ScriptedBackend, WordTokenizer};
use pretty_assertions::assert_eq;

fn processor(location: &Path, project: &str, runner: Arc<RecordingRunner>) -> BatchProcessor {
    let store = OutputStore::open(location, project, false);
    BatchProcessor::new(Executor::new(store, runner))
}

#[tokio::test]
async fn requirements_record_is_saved_as_text() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = Arc::new(RecordingRunner::default());
    let mut proc = processor(tmp.path(), "bot", runner.clone());

    let raw = "Here you go\n{'reqs': {'response': 'pandas', 'status': 'pending_validation', 'result': '', 'app_type': 'text', 'path': '.'}}";
    let report = process_input(&mut proc, "input", raw).await.unwrap();

    let batch = &report.batches[0];
    assert_eq!(batch.valid, 1);
    assert!(batch.invalid.is_empty());
    assert_eq!(batch.outcomes["reqs"].status, OutcomeStatus::SavedDirectly);
    assert_eq!(
        fs::read_to_string(tmp.path().join("bot_v1/reqs.txt")).unwrap(),
        "pandas"
    );
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn structured_and_fenced_encodings_write_identical_files() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = Arc::new(RecordingRunner::default());

    let structured = record("config", "name = \"demo\"", "toml", "./conf");
    let fenced = "~Folder_Name:./conf~\n~File_Name:config~\n```toml\nname = \"demo\"\n```\n";

    let mut a = processor(tmp.path(), "a", runner.clone());
    process_input(&mut a, "structured", &structured).await.unwrap();
    let mut b = processor(tmp.path(), "b", runner);
    process_input(&mut b, "fenced", fenced).await.unwrap();

    let left = fs::read(tmp.path().join("a_v1/conf/config.toml")).unwrap();
    let right = fs::read(tmp.path().join("b_v1/conf/config.toml")).unwrap();
    assert_eq!(left, right);
}

#[tokio::test]
async fn last_record_with_a_name_wins() {
    let tmp = tempfile::tempdir().unwrap();
    let mut proc = processor(tmp.path(), "bot", Arc::new(RecordingRunner::default()));

    let raw = format!(
        "{}\n{}",
        record("notes", "first", "markdown", "."),
        record("notes", "second", "markdown", ".")
    );
    let report = process_input(&mut proc, "input", &raw).await.unwrap();

    assert_eq!(report.batches[0].outcomes.len(), 1);
    assert_eq!(
        fs::read_to_string(tmp.path().join("bot_v1/notes.md")).unwrap(),
        "second"
    );
}

#[tokio::test]
async fn non_executable_types_never_reach_the_runner() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = Arc::new(RecordingRunner::default());
    let mut proc = processor(tmp.path(), "bot", runner.clone());

    let raw = ["json", "yaml", "csv", "html", "sql", "text"]
        .iter()
        .map(|t| record(&format!("f_{t}"), "x", t, "."))
        .collect::<Vec<_>>()
        .join("\n");
    let report = process_input(&mut proc, "input", &raw).await.unwrap();

    assert!(runner.calls().is_empty());
    assert!(report.batches[0]
        .outcomes
        .values()
        .all(|o| o.status == OutcomeStatus::SavedDirectly));
}

#[tokio::test]
async fn missing_interpreter_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::missing(&["python"]);
    let mut proc = processor(tmp.path(), "bot", runner);

    let report = process_input(&mut proc, "input", &record("main", "print(1)", "python", "."))
        .await
        .unwrap();

    let outcome = &report.batches[0].outcomes["main"];
    assert_eq!(outcome.status, OutcomeStatus::LanguageNotInstalled);
    assert_eq!(outcome.result, "Error: python is not installed.");
    assert!(!tmp.path().join("bot_v1/main.py").exists());
}

#[tokio::test]
async fn partial_override_is_rejected_up_front() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = Arc::new(RecordingRunner::default());
    let mut proc = processor(tmp.path(), "bot", runner.clone())
        .with_output_override(OutputOverride::new(Some("run.py".into()), None));

    let err = process_input(&mut proc, "input", &record("reqs", "pandas", "text", "."))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::PartialOverride { .. }));
    assert!(!tmp.path().join("bot_v1").exists());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn invalid_records_are_reported_and_optionally_salvaged() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = "{'draft': {'response': 'hello', 'app_type': 'markdown'}}";

    let mut strict = processor(tmp.path(), "strict", Arc::new(RecordingRunner::default()));
    let report = process_input(&mut strict, "input", raw).await.unwrap();
    let batch = &report.batches[0];
    assert_eq!(batch.valid, 0);
    assert!(batch.invalid[0]
        .diagnostics
        .iter()
        .any(|d| d.contains("Missing key: 'path'")));
    assert!(batch.outcomes.is_empty());

    let mut lenient = processor(tmp.path(), "lenient", Arc::new(RecordingRunner::default()))
        .with_persist_invalid(true);
    let report = process_input(&mut lenient, "input", raw).await.unwrap();
    assert_eq!(
        report.batches[0].outcomes["draft"].status,
        OutcomeStatus::SavedDirectly
    );
    assert!(tmp.path().join("lenient_v1/draft.md").is_file());
}

#[tokio::test]
async fn chained_run_processes_every_accepted_completion() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = Arc::new(RecordingRunner::default());
    let mut proc = processor(tmp.path(), "bot", runner.clone()).with_test_mode(true);

    let roles = parse_roles(r#"{"Dev": ["write code"], "QA": ["review it"]}"#).unwrap();
    let mut catalog = TaskCatalog::new();
    catalog.add("app", Some("build an app".into()));
    let plans = PromptBuilder::new("ship it", roles, "model").plan(&catalog, &WordTokenizer);

    let backend = ScriptedBackend::new([
        Ok(record("main", "print(1)", "python", "src")),
        Err(CompletionError::Permanent("content filtered".into())),
    ]);
    let chainer = Chainer::new(backend.clone(), Arc::new(NoDelay(2)), "model").with_max_concurrency(1);

    let report = run_plans(&chainer, &mut proc, &plans).await.unwrap();

    assert_eq!(report.completions.len(), 2);
    assert_eq!(report.succeeded_completions(), 1);
    assert_eq!(report.failed_completions(), 1);
    assert_eq!(report.batches.len(), 1);
    assert_eq!(report.batches[0].source, "app/Dev");
    assert!(report.finished_at.is_some());
    assert!(tmp.path().join("bot_v1/src/main.py").is_file());
    assert!(runner.calls().is_empty());
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn prompt_runs_are_processed_like_batches() {
    let tmp = tempfile::tempdir().unwrap();
    let mut proc = processor(tmp.path(), "bot", Arc::new(RecordingRunner::default()));
    let backend = ScriptedBackend::new([Ok::<_, CompletionError>("just some prose")]);
    let chainer = Chainer::new(backend, Arc::new(NoDelay(0)), "model");

    let report = run_prompt(&chainer, &mut proc, "say hi").await.unwrap();

    let outcomes = &report.batches[0].outcomes;
    assert_eq!(outcomes["unstructured_file_1"].status, OutcomeStatus::SavedDirectly);
    assert_eq!(
        fs::read_to_string(tmp.path().join("bot_v1/unstructured/unstructured_file_1.txt")).unwrap(),
        "just some prose"
    );
}

#[tokio::test]
async fn each_run_gets_a_new_version_unless_overwriting() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = Arc::new(RecordingRunner::default());
    let raw = record("reqs", "pandas", "text", ".");

    for expected in 1..=2 {
        let mut proc = processor(tmp.path(), "bot", runner.clone());
        let report = process_input(&mut proc, "input", &raw).await.unwrap();
        assert_eq!(report.project.version, expected);
    }

    let store = OutputStore::open(tmp.path(), "bot", true);
    assert_eq!(store.version().version, 2);
}
