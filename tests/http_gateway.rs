use std::collections::HashMap;
use std::time::Duration;

use kavenegar::{ApiKey, KavenegarClient, KavenegarError, Params, TransportReason};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "4F6A2B7C3D9E1F0A";

fn unused_port() -> u16 {
    // Bind then drop to get a port that nothing listens on.
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn client_for(server: &MockServer) -> KavenegarClient {
    KavenegarClient::builder(ApiKey::new(KEY).unwrap())
        .base_url(server.uri())
        .build()
        .unwrap()
}

async fn received_form(server: &MockServer) -> HashMap<String, String> {
    let requests = server.received_requests().await.unwrap();
    let request = requests.last().expect("no request reached the mock server");
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}

#[tokio::test]
async fn sms_send_posts_form_with_fixed_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/{KEY}/sms/send.json")))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header("charset", "utf-8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": {"status": 200, "message": "تایید شد"},
            "entries": [{"messageid": 8792343, "status": 1}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = Params::new()
        .with("receptor", "09121234567")
        .with("message", "سلام")
        .with("date", 1_700_000_000);
    let entries = client_for(&server).sms_send(Some(&params)).await.unwrap();
    assert_eq!(entries[0]["messageid"], json!(8792343));

    let form = received_form(&server).await;
    assert_eq!(form.get("receptor").map(String::as_str), Some("09121234567"));
    assert_eq!(form.get("message").map(String::as_str), Some("سلام"));
    assert_eq!(form.get("date").map(String::as_str), Some("1700000000"));
}

#[tokio::test]
async fn list_params_travel_as_json_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/{KEY}/sms/sendarray.json")))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"return":{"status":200},"entries":[]}"#),
        )
        .mount(&server)
        .await;

    let receptors = json!(["09121111111", "09122222222"]);
    let params = Params::new()
        .with("receptor", receptors.clone())
        .with("sender", json!(["10004346", "10004346"]));
    client_for(&server)
        .sms_send_array(Some(&params))
        .await
        .unwrap();

    let form = received_form(&server).await;
    let decoded: Value = serde_json::from_str(&form["receptor"]).unwrap();
    assert_eq!(decoded, receptors);
}

#[tokio::test]
async fn api_status_is_read_from_body_regardless_of_http_status() {
    let body = r#"{"return":{"status":403,"message":"API-Key معتبر نمی‌باشد"},"entries":null}"#;
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/{KEY}/account/info.json")))
        .respond_with(ResponseTemplate::new(403).set_body_string(body))
        .mount(&server)
        .await;

    let err = client_for(&server).account_info().await.unwrap_err();
    match err {
        KavenegarError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "API-Key معتبر نمی‌باشد");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn html_error_page_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).sms_receive(None).await.unwrap_err();
    match err {
        KavenegarError::Transport(err) => {
            assert_eq!(err.reason(), TransportReason::Decode);
            assert!(err.message().contains("Error decoding response"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_server_times_out_without_leaking_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"return":{"status":200},"entries":[]}"#)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = KavenegarClient::builder(ApiKey::new(KEY).unwrap())
        .base_url(server.uri())
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = client.sms_status(None).await.unwrap_err();
    assert!(!err.to_string().contains(KEY), "raw key leaked: {err}");
    match err {
        KavenegarError::Transport(err) => assert_eq!(err.reason(), TransportReason::Timeout),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn refused_connection_is_redacted() {
    let port = unused_port();
    let client = KavenegarClient::builder(ApiKey::new(KEY).unwrap())
        .base_url(format!("http://127.0.0.1:{port}"))
        .build()
        .unwrap();

    let err = client.sms_send(None).await.unwrap_err();
    let message = err.to_string();
    assert!(!message.contains(KEY), "raw key leaked: {message}");
    match err {
        KavenegarError::Transport(err) => assert_eq!(err.reason(), TransportReason::Connect),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn key_needing_percent_encoding_is_redacted() {
    let raw = "SECRET KEY\"ZZ";
    let client = KavenegarClient::builder(ApiKey::new(raw).unwrap())
        .base_url(format!("http://127.0.0.1:{}", unused_port()))
        .build()
        .unwrap();

    let err = client.sms_send(None).await.unwrap_err();
    let message = err.to_string();
    assert!(!message.contains(raw), "raw key leaked: {message}");
    assert!(!message.contains("SECRET%20KEY%22ZZ"), "encoded key leaked: {message}");
    assert!(!message.contains("SECRET"), "key fragment leaked: {message}");
    assert!(matches!(err, KavenegarError::Transport(_)));
}

#[tokio::test]
async fn key_is_sent_as_a_single_encoded_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/a%2Fb%3Fc/account/info.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"return":{"status":200},"entries":{}}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = KavenegarClient::builder(ApiKey::new("a/b?c").unwrap())
        .base_url(server.uri())
        .build()
        .unwrap();
    assert_eq!(client.account_info().await.unwrap(), json!({}));
}

#[tokio::test]
async fn http_proxy_entry_carries_the_request() {
    let proxy = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"return":{"status":200},"entries":"via-proxy"}"#),
        )
        .expect(1)
        .mount(&proxy)
        .await;

    let client = KavenegarClient::builder(ApiKey::new(KEY).unwrap())
        .base_url("http://api.kavenegar.invalid")
        .proxy("http", proxy.uri())
        .build()
        .unwrap();

    let params = Params::new().with("receptor", "09121234567");
    let entries = client.sms_send(Some(&params)).await.unwrap();
    assert_eq!(entries, json!("via-proxy"));

    let requests = proxy.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(received_form(&proxy).await["receptor"], "09121234567");
}

#[tokio::test]
async fn https_only_proxy_entry_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"return":{"status":200},"entries":"direct"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Nothing listens on the proxy port; using it would fail the call.
    let client = KavenegarClient::builder(ApiKey::new(KEY).unwrap())
        .base_url(server.uri())
        .proxy("https", format!("http://127.0.0.1:{}", unused_port()))
        .build()
        .unwrap();

    assert_eq!(client.sms_count_outbox(None).await.unwrap(), json!("direct"));
}

#[tokio::test]
async fn each_call_is_independent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"return":{"status":200},"entries":1}"#),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = Params::new().with("receptor", "09121111111");
    let second = Params::new().with("receptor", "09122222222");
    let (a, b, c) = tokio::join!(
        client.sms_send(Some(&first)),
        client.sms_send(Some(&second)),
        client.sms_count_inbox(None),
    );
    assert_eq!(a.unwrap(), json!(1));
    assert_eq!(b.unwrap(), json!(1));
    assert_eq!(c.unwrap(), json!(1));

    let receptors = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|request| {
            url::form_urlencoded::parse(&request.body)
                .find(|(name, _)| name == "receptor")
                .map(|(_, value)| value.into_owned())
        })
        .collect::<Vec<_>>();
    assert_eq!(receptors.len(), 2);
    assert!(receptors.contains(&"09121111111".to_owned()));
    assert!(receptors.contains(&"09122222222".to_owned()));
}
