use crate::e2e::helpers;

use helpers::assertions::assert_complete_in_order;
use helpers::{narration_service, words, ScriptedTtsRepository};
use longread_tts::domain::narration::{
    segment, FailurePolicy, JobStatus, NarrationError, NarrationService, NarrationServiceApi,
    NarrationSettings, RetryPolicy,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn settings(max_segment_length: usize) -> NarrationSettings {
    NarrationSettings {
        max_segment_length,
        retry_policy: RetryPolicy::immediate(3),
        ..Default::default()
    }
}

#[tokio::test]
async fn it_should_narrate_250_words_in_segment_order() {
    let text = words(250);
    let repo = Arc::new(ScriptedTtsRepository::new());
    let service = narration_service(repo.clone(), settings(50));

    let report = service.narrate(&text).await.unwrap();

    let segments = segment(&text, 50).unwrap();
    assert!(segments.len() > 1);
    assert_eq!(report.status, JobStatus::Complete);
    assert_complete_in_order(&report, &segments);
    // One call per segment, nothing retried
    assert_eq!(repo.total_calls() as usize, segments.len());
}

#[tokio::test]
async fn it_should_report_failed_middle_segment_and_keep_the_rest() {
    // Five one-word segments; the third fails every attempt
    let text = "one two three four five";
    let repo = Arc::new(ScriptedTtsRepository::new().always_failing("three"));
    let service = narration_service(repo.clone(), settings(5));

    let report = service.narrate(text).await.unwrap();

    assert_eq!(report.status, JobStatus::Partial);
    assert_eq!(report.segment_count, 5);
    assert_eq!(report.succeeded, vec![0, 1, 3, 4]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 2);
    assert_eq!(report.failed[0].text, "three");
    assert_eq!(report.failed[0].attempts, 3);
    assert_eq!(String::from_utf8(report.audio).unwrap(), "[one][two][four][five]");
    assert_eq!(repo.calls_for("three"), 3);
    assert_eq!(repo.calls_for("four"), 1);
}

#[tokio::test]
async fn it_should_recover_from_transient_failures() {
    let repo = Arc::new(ScriptedTtsRepository::new().flaky("two", 2));
    let service = narration_service(repo.clone(), settings(5));

    let report = service.narrate("one two three").await.unwrap();

    assert_eq!(report.status, JobStatus::Complete);
    assert_eq!(String::from_utf8(report.audio).unwrap(), "[one][two][three]");
    assert_eq!(repo.calls_for("two"), 3);
}

#[tokio::test]
async fn it_should_produce_empty_audio_for_empty_text() {
    let repo = Arc::new(ScriptedTtsRepository::new());
    let service = narration_service(repo.clone(), settings(50));

    for text in ["", "   \n\t  "] {
        let report = service.narrate(text).await.unwrap();

        assert_eq!(report.status, JobStatus::Complete);
        assert_eq!(report.segment_count, 0);
        assert!(report.audio.is_empty());
        assert!(report.succeeded.is_empty());
    }
    assert_eq!(repo.total_calls(), 0);
}

#[tokio::test]
async fn it_should_fail_the_job_under_abort_policy() {
    let repo = Arc::new(ScriptedTtsRepository::new().always_failing("three"));
    let service = narration_service(
        repo,
        NarrationSettings {
            failure_policy: FailurePolicy::Abort,
            ..settings(5)
        },
    );

    let result = service.narrate("one two three four five").await;

    match result {
        Err(NarrationError::SegmentsFailed { failed, total }) => {
            assert_eq!(total, 5);
            assert!(failed.iter().any(|f| f.index == 2 && f.attempts == 3));
        }
        other => panic!("expected SegmentsFailed, got {:?}", other.map(|r| r.status)),
    }
}

#[tokio::test]
async fn it_should_reject_invalid_configuration_before_any_call() {
    let repo = Arc::new(ScriptedTtsRepository::new());

    let result = NarrationService::new(
        repo.clone(),
        NarrationSettings {
            max_concurrency: 0,
            ..Default::default()
        },
    );

    assert!(matches!(result, Err(NarrationError::InvalidConfiguration(_))));
    assert_eq!(repo.total_calls(), 0);
}

#[tokio::test]
async fn it_should_emit_over_length_words_whole() {
    let long_word = "pneumonoultramicroscopicsilicovolcanoconiosis";
    let repo = Arc::new(ScriptedTtsRepository::new());
    let service = narration_service(repo, settings(10));

    let report = service
        .narrate(&format!("a {} b", long_word))
        .await
        .unwrap();

    assert_eq!(report.segment_count, 3);
    assert_eq!(
        String::from_utf8(report.audio).unwrap(),
        format!("[a][{}][b]", long_word)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn it_should_run_independent_jobs_on_one_service() {
    let repo = Arc::new(ScriptedTtsRepository::new().always_failing("broken"));
    let service = narration_service(repo, settings(5));

    let texts = ["alpha beta gamma", "broken link here", "delta"];
    let reports = futures::future::join_all(texts.iter().map(|text| service.narrate(text))).await;

    let reports: Vec<_> = reports
        .into_iter()
        .map(|report| tokio_test::assert_ok!(report))
        .collect();
    assert_eq!(String::from_utf8_lossy(&reports[0].audio), "[alpha][beta][gamma]");
    assert_eq!(reports[1].status, JobStatus::Partial);
    assert_eq!(reports[1].failed[0].index, 0);
    assert_eq!(String::from_utf8_lossy(&reports[1].audio), "[link][here]");
    assert_eq!(reports[2].status, JobStatus::Complete);
    assert_ne!(reports[0].job_id, reports[1].job_id);
}
