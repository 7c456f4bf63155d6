//! Integration tests for app lifecycle gating of the connection.

mod helpers;

use taskhive_realtime::{AppLifecycleState, ClientEvent, ConnectionState};

#[tokio::test]
async fn test_background_then_foreground_cycles_the_connection() {
    let server = helpers::TestServer::start().await;
    let engine = helpers::make_engine(&server.url, None);

    engine
        .login(helpers::make_credentials("tok-1", "user-1"))
        .await;
    let mut first = server.accept().await;
    first.expect_handshake().await;
    helpers::wait_for_state(&engine, ConnectionState::Connected).await;

    engine.app_state_changed(AppLifecycleState::Background).await;

    first.wait_closed().await;
    assert_eq!(engine.connection_state(), ConnectionState::Disconnected);
    // Suspended: no reconnect attempts while backgrounded.
    server.assert_no_connect().await;

    engine.app_state_changed(AppLifecycleState::Active).await;

    let mut second = server.accept().await;
    second.expect_handshake().await;
    helpers::wait_for_state(&engine, ConnectionState::Connected).await;
    assert_eq!(server.connection_count(), 2);
}

#[tokio::test]
async fn test_inactive_suspends_like_background() {
    let server = helpers::TestServer::start().await;
    let engine = helpers::make_engine(&server.url, None);

    engine
        .login(helpers::make_credentials("tok-1", "user-1"))
        .await;
    let mut session = server.accept().await;
    session.expect_handshake().await;
    helpers::wait_for_state(&engine, ConnectionState::Connected).await;

    engine.app_state_changed(AppLifecycleState::Inactive).await;

    session.wait_closed().await;
    assert_eq!(engine.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_transitions_while_signed_out_are_inert() {
    let server = helpers::TestServer::start().await;
    let engine = helpers::make_engine(&server.url, None);

    engine.app_state_changed(AppLifecycleState::Background).await;
    engine.app_state_changed(AppLifecycleState::Active).await;

    assert_eq!(engine.connection_state(), ConnectionState::NoConnection);
    server.assert_no_connect().await;
}

#[tokio::test]
async fn test_login_while_backgrounded_connects_on_resume() {
    let server = helpers::TestServer::start().await;
    let engine = helpers::make_engine(&server.url, None);

    engine.app_state_changed(AppLifecycleState::Background).await;
    engine
        .login(helpers::make_credentials("tok-1", "user-1"))
        .await;

    // Credentials are stored but the connection waits for the foreground.
    assert_eq!(engine.connection_state(), ConnectionState::Disconnected);
    server.assert_no_connect().await;

    engine.app_state_changed(AppLifecycleState::Active).await;

    let mut session = server.accept().await;
    let handshake = session.expect_handshake().await;
    assert_eq!(handshake["token"], "tok-1");
    helpers::wait_for_state(&engine, ConnectionState::Connected).await;
}

#[tokio::test]
async fn test_resume_skips_the_pending_retry_delay() {
    let server = helpers::TestServer::start().await;
    server.reject_next(1);
    // Retry delays far beyond the test's own timeouts: if the resumed
    // connection waited out the scheduled backoff it would never arrive.
    let engine = helpers::make_engine_with_delays(&server.url, 60_000, 60_000);
    let mut events = engine.subscribe();

    engine
        .login(helpers::make_credentials("tok-1", "user-1"))
        .await;
    assert!(matches!(
        helpers::next_event(&mut events).await,
        ClientEvent::ConnectFailed { .. }
    ));

    engine.app_state_changed(AppLifecycleState::Background).await;
    engine.app_state_changed(AppLifecycleState::Active).await;

    let mut session = server.accept().await;
    session.expect_handshake().await;
    helpers::wait_for_state(&engine, ConnectionState::Connected).await;
}
