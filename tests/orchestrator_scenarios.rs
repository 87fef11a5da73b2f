//! Run-loop scenarios: controllers, dropped reporters and skipped sources.

use std::sync::{Arc, Mutex};

use stepwise_engine::test_support::{recording_orchestrator, succeeding, writing};
use stepwise_engine::{Controller, DisplayEvent, ProgressReporter, ProgressSource, Task};
use stepwise_utils::error::OrchestratorError;
use stepwise_utils::types::RunState;

/// Task whose source stays open until the test drops or finishes the reporter.
fn held(title: &str, slot: Arc<Mutex<Option<ProgressReporter>>>) -> Task {
    Task::new(title, move |_, _| {
        let (reporter, source) = ProgressSource::channel();
        *slot.lock().unwrap() = Some(reporter);
        source
    })
}

#[tokio::test]
async fn test_controller_before_run_has_no_active_task() {
    let (orch, _display) = recording_orchestrator(vec![succeeding("only")]);
    let controller = orch.controller();

    let err = controller.skip("too early").unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::NoActiveTask {
            state: RunState::Ready
        }
    ));
    assert_eq!(controller.len(), 1);
    assert_eq!(controller.index(), 0);
}

#[tokio::test]
async fn test_controller_after_run_has_no_active_task() {
    let (mut orch, _display) = recording_orchestrator(vec![succeeding("only")]);
    let controller = orch.controller();

    orch.run().await.unwrap();

    assert_eq!(controller.state(), RunState::Done);
    assert_eq!(controller.index(), 1);
    assert!(controller.next().is_err());
}

#[tokio::test]
async fn test_dropped_reporter_fails_the_task() {
    let tasks = vec![
        Task::new("abandoned", |_, _| {
            let (reporter, source) = ProgressSource::channel();
            reporter.progress("started");
            drop(reporter);
            source
        }),
        succeeding("never"),
    ];
    let (mut orch, display) = recording_orchestrator(tasks);

    let err = orch.run().await.unwrap_err();

    match err {
        OrchestratorError::TaskFailed { index, title, source } => {
            assert_eq!(index, 0);
            assert_eq!(title, "abandoned");
            assert!(source.message().contains("without a terminal event"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(display.announced_titles(), vec!["abandoned"]);
}

#[tokio::test]
async fn test_next_advances_without_reason() {
    let tasks = vec![
        Task::new("confirm", |_, controller: Controller| {
            let (_reporter, source) = ProgressSource::channel();
            controller.next().unwrap();
            // Reporter dropped here; the advance request is read first.
            source
        }),
        succeeding("after"),
    ];
    let (mut orch, display) = recording_orchestrator(tasks);

    orch.run().await.unwrap();

    let skipped: Vec<_> = display
        .events()
        .into_iter()
        .filter(|e| matches!(e, DisplayEvent::Announce { skip_reason: Some(_), .. }))
        .collect();
    assert!(skipped.is_empty());
    assert_eq!(orch.index(), 2);
}

#[tokio::test]
async fn test_stale_controller_is_rejected() {
    let kept: Arc<Mutex<Option<Controller>>> = Arc::default();
    let outcome: Arc<Mutex<Option<Result<(), OrchestratorError>>>> = Arc::default();

    let keep = Arc::clone(&kept);
    let record = Arc::clone(&outcome);
    let tasks = vec![
        Task::new("first", move |_, controller| {
            *keep.lock().unwrap() = Some(controller);
            ProgressSource::completed()
        }),
        Task::new("second", move |_, _| {
            let stale = kept.lock().unwrap().take().unwrap();
            *record.lock().unwrap() = Some(stale.skip("late"));
            ProgressSource::completed()
        }),
        succeeding("third"),
    ];
    let (mut orch, display) = recording_orchestrator(tasks);

    orch.run().await.unwrap();

    let result = outcome.lock().unwrap().take().unwrap();
    assert!(matches!(
        result,
        Err(OrchestratorError::NoActiveTask {
            state: RunState::Running
        })
    ));
    assert!(display.events().iter().all(|e| !matches!(
        e,
        DisplayEvent::Announce {
            skip_reason: Some(_),
            ..
        }
    )));
}

#[tokio::test]
async fn test_external_skip_abandons_hanging_task() {
    let slot: Arc<Mutex<Option<ProgressReporter>>> = Arc::default();
    let tasks = vec![
        held("hangs", Arc::clone(&slot)),
        writing("after", "reached", "yes"),
    ];
    let (mut orch, display) = recording_orchestrator(tasks);
    let controller = orch.controller();

    let (outcome, skipped) = tokio::join!(orch.run(), async {
        assert!(controller.wait_for_task(0).await);
        controller.skip("operator skipped")
    });

    skipped.unwrap();
    let context = outcome.unwrap();
    assert_eq!(context.get_str("reached").as_deref(), Some("yes"));

    // Events from the abandoned source go nowhere.
    let reporter = slot.lock().unwrap().take().unwrap();
    assert!(!reporter.progress("late"));
    assert!(display.progress_texts().is_empty());

    assert_eq!(
        display.events()[1],
        DisplayEvent::Announce {
            position: 2,
            total: 2,
            title: "after".to_string(),
            skip_reason: Some("operator skipped".to_string()),
        }
    );
}

#[tokio::test]
async fn test_spawned_work_reports_progress() {
    let tasks = vec![Task::new("spawned", |ctx, _| {
        ProgressSource::spawn(move |progress| async move {
            for step in ["fetch", "unpack"] {
                progress.progress(step);
                tokio::task::yield_now().await;
            }
            ctx.insert("files", 3);
            Ok::<_, std::io::Error>(())
        })
    })];
    let (mut orch, display) = recording_orchestrator(tasks);

    let context = orch.run().await.unwrap();

    assert_eq!(display.progress_texts(), vec!["fetch", "unpack"]);
    assert_eq!(context.get("files"), Some(serde_json::json!(3)));
}
