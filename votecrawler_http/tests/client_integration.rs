use std::time::Duration;

use votecrawler_http::{Client, ClientConfig, Error};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetch_page_success() {
    let mock_server = MockServer::start().await;
    let body = "<html><body><table></table></body></html>";

    Mock::given(method("GET"))
        .and(path("/ergebnis"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let url = format!("{}/ergebnis?detailonr=001", mock_server.uri());
    let result = client.fetch_page(&url).await;
    assert_eq!(result.unwrap(), body);
}

#[tokio::test]
async fn fetch_page_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ergebnis"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let url = format!("{}/ergebnis", mock_server.uri());
    let err = client.fetch_page(&url).await.unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_page_not_found() {
    let mock_server = MockServer::start().await;

    let client = Client::new().unwrap();
    let url = format!("{}/missing", mock_server.uri());
    let err = client.fetch_page(&url).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn fetch_page_decodes_declared_charset() {
    let mock_server = MockServer::start().await;
    // "ÖVP" in ISO-8859-1
    let latin1: Vec<u8> = vec![0xD6, b'V', b'P'];

    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(latin1, "text/html; charset=iso-8859-1"))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let url = format!("{}/latin", mock_server.uri());
    assert_eq!(client.fetch_page(&url).await.unwrap(), "ÖVP");
}

#[tokio::test]
async fn fetch_page_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let url = format!("http://127.0.0.1:{port}/gone");

    let client = Client::new().unwrap();
    let err = client.fetch_page(&url).await.unwrap_err();
    assert!(matches!(err, Error::RequestFailed { .. }));
}

#[tokio::test]
async fn fetch_page_invalid_url() {
    let client = Client::new().unwrap();
    let err = client.fetch_page("not a url").await.unwrap_err();
    assert!(matches!(err, Error::InvalidUrl { .. }));
}

#[tokio::test]
async fn fetch_page_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = Client::with_config(&ClientConfig {
        timeout: Some(Duration::from_millis(100)),
        browser_user_agent: false,
    })
    .unwrap();
    let url = format!("{}/slow", mock_server.uri());
    let err = client.fetch_page(&url).await.unwrap_err();
    assert!(matches!(err, Error::RequestFailed { .. }));
}

#[tokio::test]
async fn browser_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_config(&ClientConfig {
        timeout: None,
        browser_user_agent: true,
    })
    .unwrap();
    let url = format!("{}/ua", mock_server.uri());
    assert_eq!(client.fetch_page(&url).await.unwrap(), "ok");
}
