//! Cancellation and timeout behaviour

use crate::mock_server::{MockServerFixture, SilentServer};
use env_http::{CancelHandle, Params, RequestOptions};
use std::time::Duration;

const GUARD: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_cancel_before_execute_sends_nothing() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/items")
        .expect(0)
        .create_async()
        .await;

    let prepared = fixture.requests().get.call("/items", None, None);
    prepared.cancel.cancel();
    prepared.cancel.cancel();

    let outcome = prepared.res.execute().await.unwrap();
    assert!(outcome.is_cancelled());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_in_flight_resolves_cancelled() {
    let server = SilentServer::start().await;
    let (res, cancel) = server
        .requests()
        .post
        .call("/items", Params::new().with("name", "x"), None)
        .into_parts();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let outcome = tokio::time::timeout(GUARD, res.execute())
        .await
        .expect("cancellation should end the call promptly")
        .expect("cancellation is not an error");
    assert!(outcome.is_cancelled());
}

#[tokio::test]
async fn test_caller_cancel_handle_is_observed() {
    let server = SilentServer::start().await;
    let external = CancelHandle::new();
    let prepared = server.requests().get.call(
        "/slow",
        None,
        RequestOptions::new().with_cancel(external.clone()),
    );
    let internal = prepared.cancel.clone();

    let trigger = external.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let outcome = tokio::time::timeout(GUARD, prepared.res.execute())
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.is_cancelled());
    assert!(!internal.is_cancelled());
}

#[tokio::test]
async fn test_caller_cancel_handle_does_not_replace_internal() {
    let server = SilentServer::start().await;
    let external = CancelHandle::new();
    let prepared = server.requests().delete.call(
        "/slow",
        None,
        RequestOptions::new().with_cancel(external.clone()),
    );
    let internal = prepared.cancel.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        internal.cancel();
    });

    let outcome = tokio::time::timeout(GUARD, prepared.res.execute())
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.is_cancelled());
    assert!(!external.is_cancelled());
}

#[tokio::test]
async fn test_already_cancelled_caller_handle_skips_request() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/items")
        .expect(0)
        .create_async()
        .await;

    let external = CancelHandle::new();
    external.cancel();
    let outcome = fixture
        .requests()
        .post
        .call("/items", None, RequestOptions::new().with_cancel(external))
        .execute()
        .await
        .unwrap();
    assert!(outcome.is_cancelled());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_per_call_timeout_is_an_error() {
    let server = SilentServer::start().await;
    let err = tokio::time::timeout(
        GUARD,
        server
            .requests()
            .get
            .call(
                "/slow",
                None,
                RequestOptions::new().with_timeout(Duration::from_millis(200)),
            )
            .execute(),
    )
    .await
    .unwrap()
    .unwrap_err();
    assert!(err.is_timeout(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_cancel_after_completion_is_noop() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/done")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let (res, cancel) = fixture.requests().get.call("/done", None, None).into_parts();
    let outcome = res.execute().await.unwrap();
    cancel.cancel();
    cancel.cancel();
    assert_eq!(outcome.response().unwrap().text(), "ok");
}

#[tokio::test]
async fn test_calls_are_independent() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/items")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let api = fixture.requests();
    let first = api.get.call("/items", None, None);
    let second = api.get.call("/items", None, None);
    first.cancel.cancel();

    let (a, b) = tokio::join!(first.res.execute(), second.res.execute());
    assert!(a.unwrap().is_cancelled());
    assert!(!b.unwrap().is_cancelled());
    mock.assert_async().await;
}
