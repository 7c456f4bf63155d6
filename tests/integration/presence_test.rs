//! Integration tests for presence reconciliation over a live connection.

mod helpers;

use taskhive_realtime::{ClientEvent, ConnectionState, PresenceStatus};

#[tokio::test]
async fn test_status_events_update_the_presence_map() {
    let server = helpers::TestServer::start().await;
    let engine = helpers::make_engine(&server.url, None);
    let mut events = engine.subscribe();

    engine
        .login(helpers::make_credentials("tok-1", "user-1"))
        .await;
    let mut session = server.accept().await;
    session.expect_handshake().await;
    assert!(matches!(
        helpers::next_event(&mut events).await,
        ClientEvent::Connected
    ));

    session.send_status("u2", "online");

    match helpers::next_event(&mut events).await {
        ClientEvent::PresenceChanged { user, status } => {
            assert_eq!(user.as_str(), "u2");
            assert_eq!(status, PresenceStatus::Online);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(
        engine.presence.status_of(&"u2".into()),
        PresenceStatus::Online
    );
}

#[tokio::test]
async fn test_online_then_offline_leaves_the_user_offline() {
    let server = helpers::TestServer::start().await;
    let engine = helpers::make_engine(&server.url, None);
    let mut events = engine.subscribe();

    engine
        .login(helpers::make_credentials("tok-1", "user-1"))
        .await;
    let mut session = server.accept().await;
    session.expect_handshake().await;
    assert!(matches!(
        helpers::next_event(&mut events).await,
        ClientEvent::Connected
    ));

    session.send_status("u2", "online");
    session.send_status("u2", "offline");

    assert!(matches!(
        helpers::next_event(&mut events).await,
        ClientEvent::PresenceChanged { status: PresenceStatus::Online, .. }
    ));
    assert!(matches!(
        helpers::next_event(&mut events).await,
        ClientEvent::PresenceChanged { status: PresenceStatus::Offline, .. }
    ));
    assert_eq!(
        engine.presence.status_of(&"u2".into()),
        PresenceStatus::Offline
    );
}

#[tokio::test]
async fn test_updates_are_per_user() {
    let server = helpers::TestServer::start().await;
    let engine = helpers::make_engine(&server.url, None);
    let mut events = engine.subscribe();

    engine
        .login(helpers::make_credentials("tok-1", "user-1"))
        .await;
    let mut session = server.accept().await;
    session.expect_handshake().await;
    assert!(matches!(
        helpers::next_event(&mut events).await,
        ClientEvent::Connected
    ));

    session.send_status("u2", "online");
    session.send_status("u3", "away");
    session.send_status("u2", "offline");

    for _ in 0..3 {
        assert!(matches!(
            helpers::next_event(&mut events).await,
            ClientEvent::PresenceChanged { .. }
        ));
    }

    assert_eq!(
        engine.presence.status_of(&"u2".into()),
        PresenceStatus::Offline
    );
    assert_eq!(
        engine.presence.status_of(&"u3".into()),
        PresenceStatus::Away
    );
    assert_eq!(engine.presence.tracked_count(), 2);
}

#[tokio::test]
async fn test_presence_survives_a_reconnect() {
    let server = helpers::TestServer::start().await;
    let engine = helpers::make_engine(&server.url, None);
    let mut events = engine.subscribe();

    engine
        .login(helpers::make_credentials("tok-1", "user-1"))
        .await;
    let mut first = server.accept().await;
    first.expect_handshake().await;
    assert!(matches!(
        helpers::next_event(&mut events).await,
        ClientEvent::Connected
    ));

    first.send_status("u2", "online");
    assert!(matches!(
        helpers::next_event(&mut events).await,
        ClientEvent::PresenceChanged { .. }
    ));

    first.close("restart");
    let mut second = server.accept().await;
    second.expect_handshake().await;
    helpers::wait_for_state(&engine, ConnectionState::Connected).await;

    // The map carries over; only status events change it.
    assert_eq!(
        engine.presence.status_of(&"u2".into()),
        PresenceStatus::Online
    );
}
