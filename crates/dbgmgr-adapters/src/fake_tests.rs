use super::*;
use dbgmgr_core::EngineMessage;

#[tokio::test]
async fn start_records_the_call_and_captures_the_sender() {
    let engine = FakeEngine::new(StartKind::Launch);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    engine
        .start(StartOptions::launch(), EngineMessageSender::new(tx))
        .await
        .unwrap();
    assert_eq!(engine.calls(), vec![EngineCall::Start]);

    let sender = engine.messages().unwrap();
    sender.send(EngineMessage::Disconnected);
    assert!(matches!(rx.recv().await, Some(EngineMessage::Disconnected)));
}

#[tokio::test]
async fn failing_to_start_returns_error_and_keeps_no_sender() {
    let engine = FakeEngine::new(StartKind::Launch).failing_to_start("boom");
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let result = engine.start(StartOptions::launch(), EngineMessageSender::new(tx)).await;
    assert!(result.is_err());
    assert!(engine.messages().is_none());
}

#[tokio::test]
async fn refusing_provider_returns_none() {
    let provider = FakeProvider::refusing(0);
    let result = provider.create(&StartOptions::launch()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn accepting_provider_constructs_an_engine() {
    let provider = FakeProvider::new(0);
    let result = provider.create(&StartOptions::launch()).await.unwrap();
    assert!(result.is_some());
    assert!(provider.last_engine().is_some());
}
