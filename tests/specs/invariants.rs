//! Property-style checks from spec.md §8 ("Invariants"), exercised here
//! against concrete small scenarios. The invariants that admit a cheap
//! generator (`isRunning` vs. engine states, tag multiplicity vs.
//! add/remove sequences) instead get real `proptest!` coverage next to
//! the pure functions they're about, in `dbgmgr-core`'s
//! `is_running_tests.rs` and `tags_tests.rs`.

use crate::support::{bridge, deliver, manager_with_fakes, RecordingObserver};
use dbgmgr_adapters::{EngineProvider, FakeProvider};
use dbgmgr_core::{EngineMessage, ManagerError, ManagerSettings, MessageFlags, ProcessId, RuntimeId, StartOptions};
use dbgmgr_manager::{CloseableObject, DebugManager};
use parking_lot::Mutex;
use std::sync::Arc;

#[tokio::test]
async fn is_debugging_tracks_engine_count_exactly() {
    let (mgr, providers) = manager_with_fakes(1);
    assert!(!mgr.is_debugging());

    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    assert!(mgr.is_debugging());

    let engine = providers[0].last_engine().unwrap();
    deliver(&mgr, &engine, EngineMessage::Disconnected).await;
    assert!(!mgr.is_debugging());
}

#[tokio::test]
async fn a_tag_contributed_by_two_engines_survives_one_disconnecting() {
    let (mgr, providers) = manager_with_fakes(2);

    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    assert!(mgr.debug_tags().iter().any(|t| t.0 == "fake"));

    let e1 = providers[0].last_engine().unwrap();
    deliver(&mgr, &e1, EngineMessage::Disconnected).await;
    // Engine 2 (still registered) contributes the same tag.
    assert!(mgr.debug_tags().iter().any(|t| t.0 == "fake"));

    let e2 = providers[1].last_engine().unwrap();
    deliver(&mgr, &e2, EngineMessage::Disconnected).await;
    assert!(mgr.debug_tags().is_empty());
}

#[tokio::test]
async fn a_duplicate_runtime_registers_in_debugged_runtimes_exactly_once() {
    let (mgr, providers) = manager_with_fakes(1);
    let pid = ProcessId::new(55);
    let runtime = RuntimeId::new("R1");

    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    let engine = providers[0].last_engine().unwrap();
    deliver(
        &mgr,
        &engine,
        EngineMessage::Connected {
            pid,
            runtime_id: runtime.clone(),
            failure: None,
        },
    )
    .await;

    assert!(!mgr.can_debug_runtime(pid, &runtime));
}

#[tokio::test]
async fn a_process_is_paused_only_once_every_attached_engine_is_paused() {
    let (mgr, providers) = manager_with_fakes(2);
    let pid = ProcessId::new(7);

    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    let e1 = providers[0].last_engine().unwrap();
    let e2 = providers[1].last_engine().unwrap();

    deliver(&mgr, &e1, EngineMessage::Connected { pid, runtime_id: RuntimeId::new("R1"), failure: None }).await;
    deliver(&mgr, &e2, EngineMessage::Connected { pid, runtime_id: RuntimeId::new("R2"), failure: None }).await;

    deliver(&mgr, &e1, EngineMessage::Break { error_message: None, thread: None }).await;
    let process = mgr.processes().into_iter().find(|p| p.id == pid).unwrap();
    assert_ne!(process.state, dbgmgr_core::ProcessState::Paused);

    deliver(&mgr, &e2, EngineMessage::Break { error_message: None, thread: None }).await;
    let process = mgr.processes().into_iter().find(|p| p.id == pid).unwrap();
    assert_eq!(process.state, dbgmgr_core::ProcessState::Paused);
}

#[tokio::test]
async fn process_paused_is_not_raised_twice_for_an_already_paused_engine() {
    let provider = Arc::new(FakeProvider::new(0));
    let providers: Vec<Arc<dyn EngineProvider>> = vec![provider.clone()];
    let mgr = DebugManager::new(providers, bridge(), ManagerSettings::default());
    let observer = RecordingObserver::new();
    mgr.subscribe(observer.clone());

    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    let engine = provider.last_engine().unwrap();
    deliver(&mgr, &engine, EngineMessage::Connected { pid: ProcessId::new(1), runtime_id: RuntimeId::new("R1"), failure: None }).await;

    deliver(&mgr, &engine, EngineMessage::ProgramBreak { flags: MessageFlags::new() }).await;
    assert_eq!(observer.kinds().iter().filter(|k| **k == "ProcessPaused").count(), 1);

    observer.clear();
    // Still paused, no Continue flag: stays paused, no *second* ProcessPaused.
    deliver(&mgr, &engine, EngineMessage::ProgramMessage { text: "hi".into(), flags: MessageFlags::new() }).await;
    assert_eq!(observer.kinds().iter().filter(|k| **k == "ProcessPaused").count(), 0);
}

struct CountingCloseable(Mutex<u32>);

#[async_trait::async_trait]
impl CloseableObject for CountingCloseable {
    async fn close(&self) {
        *self.0.lock() += 1;
    }
}

#[tokio::test]
async fn close_invokes_the_object_close_hook_exactly_once() {
    let mgr = DebugManager::new(vec![], bridge(), ManagerSettings::default());
    let obj = Arc::new(CountingCloseable(Mutex::new(0)));

    mgr.close(obj.clone());
    mgr.flush().await;

    assert_eq!(*obj.0.lock(), 1);
}

#[tokio::test]
async fn a_refused_start_leaves_is_debugging_and_tags_unchanged() {
    let providers: Vec<Arc<dyn EngineProvider>> = vec![Arc::new(FakeProvider::refusing(0))];
    let mgr = DebugManager::new(providers, bridge(), ManagerSettings::default());

    let err = mgr.start(StartOptions::launch()).await.unwrap_err();
    assert_eq!(err, ManagerError::NoProviderAccepted);
    assert!(!mgr.is_debugging());
    assert!(mgr.debug_tags().is_empty());
}
