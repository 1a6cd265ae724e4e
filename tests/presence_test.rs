//! Integration tests for presence tracking and delivery skipping.

mod helpers;

use helpers::{TestBackend, assert_no_event, recv};

use letstalk_database::store::UserStore;
use letstalk_entity::message::MessageKind;
use letstalk_entity::user::PresenceStatus;
use letstalk_realtime::{ClientEvent, ServerEvent};

#[tokio::test]
async fn test_status_is_mirrored_on_connect_and_disconnect() {
    let backend = TestBackend::new();
    let ann = backend.seed_user("Ann").await;

    let (ctx, _rx) = backend.connect(ann.id).await;
    let record = backend.store.find_by_id(ann.id).await.unwrap().unwrap();
    assert_eq!(record.status, PresenceStatus::Online);
    assert_eq!(record.socket_id, Some(ctx.connection_id()));

    backend.disconnect(&ctx).await;
    let record = backend.store.find_by_id(ann.id).await.unwrap().unwrap();
    assert_eq!(record.status, PresenceStatus::Offline);
    assert!(record.socket_id.is_none());
    assert!(backend.engine.presence.lookup(ann.id).is_none());
}

#[tokio::test]
async fn test_emit_to_disconnected_user_is_skipped_without_failing_the_operation() {
    let backend = TestBackend::new();
    let ann = backend.seed_user("Ann").await;
    let bob = backend.seed_user("Bob").await;

    let (ann_ctx, mut ann_rx) = backend.connect(ann.id).await;
    let (bob_ctx, mut bob_rx) = backend.connect(bob.id).await;

    backend
        .engine
        .router
        .dispatch(
            &ann_ctx,
            ClientEvent::StartConversation {
                from: ann.id,
                to: bob.id,
            },
        )
        .await;
    let conversation = match recv(&mut ann_rx).await {
        ServerEvent::StartChat { conversation } => conversation,
        other => panic!("unexpected {other:?}"),
    };

    backend.disconnect(&bob_ctx).await;

    backend
        .engine
        .router
        .dispatch(
            &ann_ctx,
            ClientEvent::TextMessage {
                from: ann.id,
                to: bob.id,
                conversation_id: conversation.id,
                message: "are you there?".to_string(),
                kind: MessageKind::Text,
            },
        )
        .await;

    // Bob misses the live push; the append itself still succeeded and the
    // sender's echo still arrives.
    assert_no_event(&mut bob_rx);
    match recv(&mut ann_rx).await {
        ServerEvent::NewMessage { message } => assert_eq!(message.body, "are you there?"),
        other => panic!("unexpected {other:?}"),
    }

    // Catch-up is an explicit history fetch after reconnecting.
    let (bob_ctx2, mut bob_rx2) = backend.connect(bob.id).await;
    backend
        .engine
        .router
        .dispatch(
            &bob_ctx2,
            ClientEvent::GetMessages {
                conversation_id: conversation.id,
            },
        )
        .await;
    match recv(&mut bob_rx2).await {
        ServerEvent::Messages { messages, .. } => {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].body, "are you there?");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_end_event_tears_down_the_session() {
    let backend = TestBackend::new();
    let ann = backend.seed_user("Ann").await;
    let (ctx, _rx) = backend.connect(ann.id).await;

    backend
        .engine
        .router
        .dispatch(&ctx, ClientEvent::End { user_id: ann.id })
        .await;

    assert!(!ctx.handle.is_alive());
    assert!(backend.engine.presence.lookup(ann.id).is_none());
    let record = backend.store.find_by_id(ann.id).await.unwrap().unwrap();
    assert_eq!(record.status, PresenceStatus::Offline);

    // The transport backstop that follows is an idempotent no-op.
    backend.disconnect(&ctx).await;
    assert_eq!(
        backend
            .store
            .find_by_id(ann.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        PresenceStatus::Offline
    );
}

#[tokio::test]
async fn test_reconnect_routes_to_the_new_connection() {
    let backend = TestBackend::new();
    let ann = backend.seed_user("Ann").await;
    let bob = backend.seed_user("Bob").await;

    let (ann_ctx, mut ann_rx) = backend.connect(ann.id).await;
    let (bob_ctx1, mut bob_rx1) = backend.connect(bob.id).await;
    // Bob reconnects without the first session ever saying goodbye.
    let (_bob_ctx2, mut bob_rx2) = backend.connect(bob.id).await;

    backend
        .engine
        .router
        .dispatch(
            &ann_ctx,
            ClientEvent::SendFriendRequest {
                from: ann.id,
                to: bob.id,
            },
        )
        .await;
    recv(&mut ann_rx).await; // friend_request_sent

    // Only the latest connection is live.
    assert_no_event(&mut bob_rx1);
    match recv(&mut bob_rx2).await {
        ServerEvent::NewFriendRequest { .. } => {}
        other => panic!("unexpected {other:?}"),
    }

    // The stale session's late teardown must not flip Bob offline.
    backend.disconnect(&bob_ctx1).await;
    assert!(backend.engine.presence.is_online(bob.id));
    assert_eq!(
        backend
            .store
            .find_by_id(bob.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        PresenceStatus::Online
    );
}
