//! Scenario 3 (spec.md §8): restart valid-path.

use crate::support::{deliver, manager_with_fakes, RecordingObserver};
use dbgmgr_adapters::EngineCall;
use dbgmgr_core::{EngineMessage, StartOptions};

#[tokio::test]
async fn restart_stops_both_engines_then_reposts_start_for_each_snapshot() {
    let (mgr, providers) = manager_with_fakes(2);
    let observer = RecordingObserver::new();
    mgr.subscribe(observer.clone());

    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    let a = providers[0].last_engine().expect("A constructed");
    let b = providers[1].last_engine().expect("B constructed");
    assert!(mgr.is_debugging());
    assert!(mgr.can_restart());

    let mgr_bg = mgr.clone();
    let restart_task = tokio::spawn(async move { mgr_bg.restart().await });
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    // restart() stops every engine directly; it does not wait for a
    // message round-trip to issue the stop request.
    assert!(a.calls().contains(&EngineCall::Terminate) || a.calls().contains(&EngineCall::Detach));
    assert!(b.calls().contains(&EngineCall::Terminate) || b.calls().contains(&EngineCall::Detach));
    assert!(!mgr.can_restart());

    deliver(&mgr, &a, EngineMessage::Disconnected).await;
    assert!(!mgr.can_restart());
    deliver(&mgr, &b, EngineMessage::Disconnected).await;

    // Both engines gone before the new ones are posted: isDebugging
    // dipped to false in between, mirroring a real stop-then-start cycle.
    assert!(observer.kinds().contains(&"IsDebuggingChanged"));

    restart_task.await.expect("restart task did not panic").expect("restart succeeds");
    mgr.flush().await;
    mgr.flush().await;

    assert!(mgr.is_debugging());
    assert!(mgr.can_restart());
}
