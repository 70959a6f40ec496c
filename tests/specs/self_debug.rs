//! Scenarios 4 and 5 (spec.md §8): self-debug and duplicate-runtime refusal.

use crate::support::{deliver, manager_with_fakes};
use dbgmgr_core::{EngineMessage, ProcessId, RuntimeId, StartOptions};

#[tokio::test]
async fn self_debug_is_always_refused() {
    let (mgr, _providers) = manager_with_fakes(1);
    let host_pid = ProcessId::new(std::process::id());

    assert!(!mgr.can_debug_runtime(host_pid, &RuntimeId::new("any-runtime")));
    assert!(!mgr.can_debug_runtime(host_pid, &RuntimeId::new("another-runtime")));
}

#[tokio::test]
async fn a_runtime_already_under_debug_cannot_be_debugged_again() {
    let (mgr, providers) = manager_with_fakes(1);
    let target = ProcessId::new(100);
    let runtime = RuntimeId::new("R1");
    assert!(mgr.can_debug_runtime(target, &runtime));

    mgr.start(StartOptions::attach(100)).await.unwrap();
    mgr.flush().await;
    let engine = providers[0].last_engine().expect("engine constructed");
    deliver(
        &mgr,
        &engine,
        EngineMessage::Connected {
            pid: target,
            runtime_id: runtime.clone(),
            failure: None,
        },
    )
    .await;

    assert!(!mgr.can_debug_runtime(target, &runtime));
    // A different runtime on the same process is still fair game.
    assert!(mgr.can_debug_runtime(target, &RuntimeId::new("R2")));
}
