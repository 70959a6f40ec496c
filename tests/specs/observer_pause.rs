//! Scenario 6 (spec.md §8): observer-requested pause.

use crate::support::{bridge, deliver, RecordingObserver};
use dbgmgr_adapters::{EngineCall, EngineProvider, FakeProvider};
use dbgmgr_core::{EngineMessage, ManagerSettings, MessageFlags, ProcessId, RuntimeId, StartOptions};
use dbgmgr_manager::DebugManager;
use std::sync::Arc;

#[tokio::test]
async fn an_observer_voting_to_pause_holds_the_engine_until_run_is_called() {
    let provider = Arc::new(FakeProvider::new(0));
    let providers: Vec<Arc<dyn EngineProvider>> = vec![provider.clone()];
    let mgr = DebugManager::new(providers, bridge(), ManagerSettings::default());
    let observer = RecordingObserver::voting_on("ModuleLoaded");
    mgr.subscribe(observer.clone());

    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    let engine = provider.last_engine().expect("engine constructed");

    deliver(
        &mgr,
        &engine,
        EngineMessage::Connected {
            pid: ProcessId::new(3),
            runtime_id: RuntimeId::new("R1"),
            failure: None,
        },
    )
    .await;
    observer.clear();

    deliver(
        &mgr,
        &engine,
        EngineMessage::ModuleLoad {
            modules: vec![],
            flags: MessageFlags::with_pause(false),
        },
    )
    .await;

    assert!(observer.kinds().contains(&"ModuleLoaded"));
    assert!(observer.kinds().contains(&"ProcessPaused"));
    // Exactly the connect-time resume, no further Run until we issue one.
    assert_eq!(engine.calls().iter().filter(|c| **c == EngineCall::Run).count(), 1);

    mgr.run(ProcessId::new(3)).await;
    assert_eq!(engine.calls().iter().filter(|c| **c == EngineCall::Run).count(), 2);
}

/// spec.md §4.5's `pauseProgram` formula at Connected includes "any
/// observer asked to pause" as one of its four OR-terms, same as the
/// conditional-break family; an observer voting on `RuntimeCreated` must
/// hold the engine paused right out of the gate, with no connect-time
/// resume at all.
#[tokio::test]
async fn an_observer_voting_to_pause_on_runtime_created_holds_the_engine_paused_from_connect() {
    let provider = Arc::new(FakeProvider::new(0));
    let providers: Vec<Arc<dyn EngineProvider>> = vec![provider.clone()];
    let mgr = DebugManager::new(providers, bridge(), ManagerSettings::default());
    let observer = RecordingObserver::voting_on("RuntimeCreated");
    mgr.subscribe(observer.clone());

    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    let engine = provider.last_engine().expect("engine constructed");

    deliver(
        &mgr,
        &engine,
        EngineMessage::Connected {
            pid: ProcessId::new(4),
            runtime_id: RuntimeId::new("R1"),
            failure: None,
        },
    )
    .await;

    assert!(observer.kinds().contains(&"RuntimeCreated"));
    assert!(observer.kinds().contains(&"ProcessPaused"));
    assert!(!engine.calls().contains(&EngineCall::Run));

    mgr.run(ProcessId::new(4)).await;
    assert_eq!(engine.calls().iter().filter(|c| **c == EngineCall::Run).count(), 1);
}
