mod common;

use std::sync::Arc;

use common::{extraction_request, png, FixedVision, GatedVision, TWO_QUESTION_REPLY};
use paper_grader::infrastructure::HandoffStore;
use paper_grader::services::{QuestionExtractor, QuestionSetSubmitter};
use paper_grader::{AppError, ExamWorkflow, ExamWorkflowState, GraderClient, VisionChat};

// 这些测试不会真正发出请求，后端地址指向一个不会被访问的端口
fn workflow<V: VisionChat>(vision: V, dir: &tempfile::TempDir) -> ExamWorkflow<V> {
    let client = GraderClient::with_http(reqwest::Client::new(), "http://127.0.0.1:9");
    ExamWorkflow::new(
        QuestionExtractor::new(vision),
        QuestionSetSubmitter::new(client),
        HandoffStore::new(dir.path().join("handoff.toml")),
    )
}

#[tokio::test]
async fn test_extract_moves_to_review_with_closed_gate() {
    let dir = tempfile::tempdir().unwrap();
    let wf = workflow(FixedVision(TWO_QUESTION_REPLY), &dir);

    assert!(matches!(wf.state(), ExamWorkflowState::Upload));
    assert!(!wf.is_submission_allowed());

    let questions = wf.extract(extraction_request(2)).await.unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(
        questions.get(2).unwrap().text,
        "Draw the circuit for a full-wave rectifier"
    );

    assert_eq!(wf.state().name(), "review");
    assert_eq!(wf.missing_diagrams(), vec![2]);
    assert!(!wf.is_submission_allowed());

    wf.attach_diagram(2, png("rectifier.png")).unwrap();
    assert!(wf.is_submission_allowed());

    wf.detach_diagram(2).unwrap();
    assert!(!wf.is_submission_allowed());
}

#[tokio::test]
async fn test_failed_extraction_stays_in_upload() {
    let dir = tempfile::tempdir().unwrap();
    let wf = workflow(FixedVision("I could not read this paper."), &dir);

    let err = wf.extract(extraction_request(3)).await.unwrap_err();
    assert!(matches!(err, AppError::ExtractionFormat(_)));
    assert!(matches!(wf.state(), ExamWorkflowState::Upload));
    assert!(!wf.is_loading());

    let wf = workflow(FixedVision("{}"), &dir);
    assert!(matches!(
        wf.extract(extraction_request(3)).await,
        Err(AppError::EmptyExtraction)
    ));
    assert!(matches!(wf.state(), ExamWorkflowState::Upload));
}

#[tokio::test]
async fn test_operations_outside_review_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let wf = workflow(FixedVision(TWO_QUESTION_REPLY), &dir);

    assert!(matches!(
        wf.attach_diagram(2, png("x.png")),
        Err(AppError::InvalidState(_))
    ));
    assert!(matches!(wf.submit().await, Err(AppError::InvalidState(_))));

    wf.extract(extraction_request(2)).await.unwrap();
    assert!(matches!(
        wf.extract(extraction_request(2)).await,
        Err(AppError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_reset_discards_questions_and_diagrams() {
    let dir = tempfile::tempdir().unwrap();
    let wf = workflow(FixedVision(TWO_QUESTION_REPLY), &dir);

    wf.extract(extraction_request(2)).await.unwrap();
    wf.attach_diagram(2, png("rectifier.png")).unwrap();

    wf.reset();

    assert!(matches!(wf.state(), ExamWorkflowState::Upload));
    assert!(wf.questions().is_none());
    assert!(wf.missing_diagrams().is_empty());

    // 重置后可以重新抽取，闸门重新关闭
    wf.extract(extraction_request(2)).await.unwrap();
    assert_eq!(wf.missing_diagrams(), vec![2]);
}

#[tokio::test]
async fn test_second_extraction_while_loading_is_busy() {
    let dir = tempfile::tempdir().unwrap();
    let vision = GatedVision::new(TWO_QUESTION_REPLY);
    let started = Arc::clone(&vision.started);
    let release = Arc::clone(&vision.release);
    let wf = workflow(vision, &dir);

    let first = wf.extract(extraction_request(2));
    let second = async {
        started.notified().await;
        assert!(wf.is_loading());
        let result = wf.extract(extraction_request(2)).await;
        release.notify_one();
        result
    };

    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Busy)));
    assert!(!wf.is_loading());
    assert_eq!(wf.state().name(), "review");
}

#[tokio::test]
async fn test_reset_during_extraction_drops_late_result() {
    let dir = tempfile::tempdir().unwrap();
    let vision = GatedVision::new(TWO_QUESTION_REPLY);
    let started = Arc::clone(&vision.started);
    let release = Arc::clone(&vision.release);
    let wf = workflow(vision, &dir);

    let first = wf.extract(extraction_request(2));
    let reset = async {
        started.notified().await;
        wf.reset();
        release.notify_one();
    };

    let (first, ()) = tokio::join!(first, reset);

    assert!(matches!(first, Err(AppError::Superseded)));
    assert!(matches!(wf.state(), ExamWorkflowState::Upload));
    assert!(!wf.is_loading());
}
