//! Scenario 1 (spec.md §8): attach then detach.

use crate::support::{bridge, deliver, RecordingObserver};
use dbgmgr_adapters::{EngineProvider, FakeProvider};
use dbgmgr_core::{EngineMessage, IsRunning, ManagerSettings, ProcessId, RuntimeId, StartKind, StartOptions};
use dbgmgr_manager::DebugManager;
use std::sync::Arc;

#[tokio::test]
async fn attach_then_detach_raises_the_expected_event_sequence() {
    let provider = Arc::new(FakeProvider::new(0).with_start_kind(StartKind::Attach));
    let providers: Vec<Arc<dyn EngineProvider>> = vec![provider.clone()];
    let mgr = DebugManager::new(providers, bridge(), ManagerSettings::default());
    let observer = RecordingObserver::new();
    mgr.subscribe(observer.clone());

    mgr.start(StartOptions::attach(4242)).await.expect("provider accepts");
    mgr.flush().await;
    let engine = provider.last_engine().expect("engine constructed");

    deliver(
        &mgr,
        &engine,
        EngineMessage::Connected {
            pid: ProcessId::new(4242),
            runtime_id: RuntimeId::new("R1"),
            failure: None,
        },
    )
    .await;

    assert!(observer.kinds().contains(&"ProcessCreated"));
    assert!(observer.kinds().contains(&"RuntimeCreated"));
    assert!(observer.kinds().contains(&"IsDebuggingChanged"));
    assert!(observer.kinds().contains(&"IsRunningChanged"));
    assert!(mgr.is_debugging());
    assert_eq!(mgr.is_running(), IsRunning::True);

    observer.clear();
    mgr.detach(ProcessId::new(4242)).await;
    deliver(&mgr, &engine, EngineMessage::Disconnected).await;

    let kinds = observer.kinds();
    assert_eq!(
        kinds,
        vec!["RuntimeExited", "ProcessExited", "ProcessesChanged", "DebugTagsChanged", "IsRunningChanged", "IsDebuggingChanged"]
    );
    assert!(!mgr.is_debugging());
    assert_eq!(mgr.is_running(), IsRunning::False);
}
