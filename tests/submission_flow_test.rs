use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use question_bot::error::{AppError, GitError};
use question_bot::models::{Issue, IssueEvent, Label};
use question_bot::workflow::IgnoreReason;
use question_bot::{
    AppResult, CollectionStore, IssueTracker, ProcessResult, SubmissionHandler, VersionControl,
};
use tokio_test::{assert_err, assert_ok};

/// 按顺序记录所有外部调用
type Calls = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Default)]
struct FakeTracker {
    calls: Calls,
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn create_comment(&self, issue_number: u64, body: &str) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("comment #{}: {}", issue_number, body));
        Ok(())
    }

    async fn close_issue(&self, issue_number: u64) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("close #{}", issue_number));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FakeGit {
    calls: Calls,
    fail: bool,
}

#[async_trait]
impl VersionControl for FakeGit {
    async fn commit_and_push(&self, paths: &[PathBuf], message: &str) -> AppResult<()> {
        if self.fail {
            return Err(GitError::CommandFailed {
                command: "git push".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "rejected".to_string(),
            }
            .into());
        }
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        self.calls
            .lock()
            .unwrap()
            .push(format!("commit {}: {}", names.join(","), message));
        Ok(())
    }
}

const BODY: &str = "### question\nQ\n### option-1\nA\n### option-2\nB\n### answer\n0\n### explain\nE\n### page\nquiz\n";

fn event(action: &str, label: Option<&str>, body: &str) -> IssueEvent {
    IssueEvent {
        action: action.to_string(),
        label: label.map(|name| Label {
            name: name.to_string(),
        }),
        issue: Issue {
            id: 555,
            number: 7,
            body: Some(body.to_string()),
        },
    }
}

fn setup(dir: &Path, fail_git: bool) -> (SubmissionHandler<FakeTracker, FakeGit>, Calls) {
    fs::write(dir.join("quiz.json"), "[]\n").unwrap();
    let calls = Calls::default();
    let handler = SubmissionHandler::new(
        FakeTracker {
            calls: calls.clone(),
        },
        FakeGit {
            calls: calls.clone(),
            fail: fail_git,
        },
        CollectionStore::new(dir),
        "approved",
    );
    (handler, calls)
}

fn recorded(calls: &Calls) -> Vec<String> {
    calls.lock().unwrap().clone()
}

#[tokio::test]
async fn test_full_success_commits_then_closes() {
    let dir = tempfile::tempdir().unwrap();
    let (handler, calls) = setup(dir.path(), false);

    let result = assert_ok!(
        handler
            .handle("issues", &event("labeled", Some("approved"), BODY))
            .await
    );
    match result {
        ProcessResult::Added(outcome) => assert_eq!(outcome.total(), 1),
        other => panic!("unexpected: {:?}", other),
    }

    assert_eq!(
        recorded(&calls),
        vec![
            "commit quiz.json: Update question from issue #555".to_string(),
            "close #7".to_string(),
        ]
    );
    let written = fs::read_to_string(dir.path().join("quiz.json")).unwrap();
    assert!(written.contains("\"question\": \"Q\""));
}

#[tokio::test]
async fn test_gate_mismatch_is_silent_noop() {
    let dir = tempfile::tempdir().unwrap();
    let (handler, calls) = setup(dir.path(), false);

    let cases = [
        ("issues", event("opened", None, BODY), IgnoreReason::Action("opened".to_string())),
        (
            "issues",
            event("labeled", Some("bug"), BODY),
            IgnoreReason::Label("bug".to_string()),
        ),
        (
            "issues",
            event("labeled", None, BODY),
            IgnoreReason::Label(String::new()),
        ),
        (
            "push",
            event("labeled", Some("approved"), BODY),
            IgnoreReason::EventKind("push".to_string()),
        ),
    ];

    for (event_name, event, expected) in cases {
        let result = assert_ok!(handler.handle(event_name, &event).await);
        assert_eq!(result, ProcessResult::Ignored(expected));
    }

    assert!(recorded(&calls).is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("quiz.json")).unwrap(),
        "[]\n"
    );
}

#[tokio::test]
async fn test_parse_failure_comments_and_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (handler, calls) = setup(dir.path(), false);

    let body = "### question\nQ\n### answer\nyes\n### page\nquiz";
    let err = assert_err!(
        handler
            .handle("issues", &event("labeled", Some("approved"), body))
            .await
    );
    assert!(matches!(err, AppError::Parse(_)));

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("comment #7: Failed parsing question body"));
    assert_eq!(
        fs::read_to_string(dir.path().join("quiz.json")).unwrap(),
        "[]\n"
    );
}

#[tokio::test]
async fn test_missing_collection_comments_without_commit() {
    let dir = tempfile::tempdir().unwrap();
    let (handler, calls) = setup(dir.path(), false);

    let body = BODY.replace("quiz", "history");
    let err = assert_err!(
        handler
            .handle("issues", &event("labeled", Some("approved"), &body))
            .await
    );
    assert!(matches!(err, AppError::Store(_)));
    assert!(!dir.path().join("history.json").exists());

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("comment #7: Failed updating question collection"));
}

#[tokio::test]
async fn test_commit_failure_keeps_issue_open() {
    let dir = tempfile::tempdir().unwrap();
    let (handler, calls) = setup(dir.path(), true);

    let err = assert_err!(
        handler
            .handle("issues", &event("labeled", Some("approved"), BODY))
            .await
    );
    assert!(matches!(err, AppError::Git(_)));

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("comment #7: Failed committing question collection"));
    assert!(calls[0].contains("rejected"));
    // 已写入的题目不会回滚
    let written = fs::read_to_string(dir.path().join("quiz.json")).unwrap();
    assert!(written.contains("\"question\": \"Q\""));
}
