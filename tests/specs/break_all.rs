//! Scenario 2 (spec.md §8): BreakAll across two engines.

use crate::support::{deliver, manager_with_fakes};
use dbgmgr_adapters::EngineCall;
use dbgmgr_core::{EngineMessage, IsRunning, ProcessId, RuntimeId, StartOptions};

#[tokio::test]
async fn break_all_pauses_both_engines_with_a_partial_state_in_between() {
    let (mgr, providers) = manager_with_fakes(2);

    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    mgr.start(StartOptions::launch()).await.unwrap();
    mgr.flush().await;
    let e1 = providers[0].last_engine().expect("E1 constructed");
    let e2 = providers[1].last_engine().expect("E2 constructed");

    deliver(
        &mgr,
        &e1,
        EngineMessage::Connected {
            pid: ProcessId::new(1),
            runtime_id: RuntimeId::new("R1"),
            failure: None,
        },
    )
    .await;
    deliver(
        &mgr,
        &e2,
        EngineMessage::Connected {
            pid: ProcessId::new(2),
            runtime_id: RuntimeId::new("R2"),
            failure: None,
        },
    )
    .await;
    assert_eq!(mgr.is_running(), IsRunning::True);

    let mgr_bg = mgr.clone();
    let break_all = tokio::spawn(async move { mgr_bg.break_all().await });
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert!(e1.calls().contains(&EngineCall::Break));
    assert!(e2.calls().contains(&EngineCall::Break));

    deliver(&mgr, &e1, EngineMessage::Break { error_message: None, thread: None }).await;
    assert_eq!(mgr.is_running(), IsRunning::Partial);

    deliver(&mgr, &e2, EngineMessage::Break { error_message: None, thread: None }).await;
    assert_eq!(mgr.is_running(), IsRunning::False);

    break_all.await.expect("break_all task did not panic");
}
