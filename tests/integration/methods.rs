//! GET / POST / DELETE against a mockito server

use crate::mock_server::MockServerFixture;
use env_http::{Error, Params, RequestOptions, RequestOutcome};
use mockito::Matcher;

const FORM: &str = "application/x-www-form-urlencoded";

#[tokio::test]
async fn test_get_sends_params_as_query() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/items")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .match_header("content-type", FORM)
        .match_header("x-request-id", Matcher::Regex("^[0-9a-f-]{36}$".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items":[1,2]}"#)
        .create_async()
        .await;

    let api = fixture.requests();
    let outcome = api
        .get
        .call("/items", Params::new().with("page", 1), None)
        .execute()
        .await
        .expect("GET should succeed");

    let resp = outcome.into_response().expect("not cancelled");
    assert_eq!(resp.status.as_u16(), 200);
    assert_eq!(resp.header("content-type"), Some("application/json"));
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["items"][1], 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_appends_to_existing_query() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/items")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("sort".into(), "asc".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let outcome = fixture
        .requests()
        .get
        .call("/items?sort=asc", Params::new().with("page", 2), None)
        .execute()
        .await
        .unwrap();
    assert!(!outcome.is_cancelled());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_nested_params() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("filter[status]".into(), "open".into()),
            Matcher::UrlEncoded("ids[0]".into(), "3".into()),
            Matcher::UrlEncoded("ids[1]".into(), "4".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let params = Params::new()
        .with("filter", Params::new().with("status", "open"))
        .with("ids", vec![3, 4]);
    fixture
        .requests()
        .get
        .call("/search", params, None)
        .execute()
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_sends_params_as_form_body() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/items")
        .match_header("content-type", FORM)
        .match_body("a=1&b=x")
        .with_status(201)
        .with_body("created")
        .create_async()
        .await;

    let outcome = fixture
        .requests()
        .post
        .call("/items", Params::new().with("a", 1).with("b", "x"), None)
        .execute()
        .await
        .unwrap();

    let resp = outcome.response().unwrap();
    assert_eq!(resp.status.as_u16(), 201);
    assert_eq!(resp.text(), "created");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_without_params_sends_empty_body() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/ping")
        .match_body("")
        .with_status(204)
        .create_async()
        .await;

    let outcome = fixture
        .requests()
        .post
        .call("/ping", None, None)
        .execute()
        .await
        .unwrap();
    assert_eq!(outcome.response().unwrap().status.as_u16(), 204);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_sends_params_as_query() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("DELETE", "/items")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("a".into(), "1".into()),
            Matcher::UrlEncoded("b".into(), "x".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    fixture
        .requests()
        .delete
        .call("/items", Params::new().with("a", 1).with("b", "x"), None)
        .execute()
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_remote_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("no such item")
        .create_async()
        .await;

    let err = fixture
        .requests()
        .get
        .call("/missing", None, None)
        .execute()
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(matches!(err, Error::Remote { ref message, .. } if message == "no such item"));
}

#[tokio::test]
async fn test_empty_error_body_uses_reason_phrase() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("DELETE", "/items")
        .with_status(500)
        .create_async()
        .await;

    let err = fixture
        .requests()
        .delete
        .call("/items", None, None)
        .execute()
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("Internal Server Error"));
}

#[tokio::test]
async fn test_options_headers_override_defaults() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/raw")
        .match_header("content-type", "text/plain")
        .match_header("x-trace", "abc")
        .with_status(200)
        .create_async()
        .await;

    let options = RequestOptions::new()
        .with_header("Content-Type", "text/plain")
        .with_header("x-trace", "abc");
    fixture
        .requests()
        .post
        .call("/raw", Params::new().with("k", "v"), options)
        .execute()
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let registry = env_http::EnvironmentRegistry::new()
        .with(env_http::EnvironmentConfig::new(
            "closed",
            format!("http://{}", addr),
        ))
        .unwrap();
    let api = env_http::create_requests_in(&registry, "closed").unwrap();

    let err = api.get.call("/", None, None).execute().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_outcome_is_tagged_completed() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/empty")
        .with_status(200)
        .create_async()
        .await;

    let outcome = fixture
        .requests()
        .get
        .call("/empty", None, None)
        .execute()
        .await
        .unwrap();
    // An empty body is still a completed call, distinct from cancellation.
    match outcome {
        RequestOutcome::Completed(resp) => assert!(resp.body.is_empty()),
        RequestOutcome::Cancelled => panic!("expected a completed request"),
    }
}
