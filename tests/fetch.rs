use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trek_watch::config::Config;
use trek_watch::utils::http::{create_client, fetch_page};
use trek_watch::WatchError;

#[tokio::test]
async fn sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/road"))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&Config::default()).unwrap();
    let body = fetch_page(&client, &format!("{}/road", server.uri())).await.unwrap();
    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn non_success_status_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = create_client(&Config::default()).unwrap();
    let err = fetch_page(&client, &format!("{}/gone", server.uri())).await.unwrap_err();
    assert!(matches!(err, WatchError::Network(ref msg) if msg.contains("404")));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = Config {
        request_timeout_seconds: 1,
        ..Config::default()
    };
    let client = create_client(&config).unwrap();
    let err = fetch_page(&client, &server.uri()).await.unwrap_err();
    assert!(matches!(err, WatchError::Network(_)));
}

#[tokio::test]
async fn connection_refused_is_network_error() {
    let client = create_client(&Config::default()).unwrap();
    let err = fetch_page(&client, "http://127.0.0.1:9/road").await.unwrap_err();
    assert!(matches!(err, WatchError::Network(_)));
}
