//! Verb helpers and options exercised over real HTTP against the mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port in a background
//! thread, so hit counters are per test. The `/echo` route reports what the
//! server actually received, which is what these tests assert on.

use std::sync::Arc;
use std::time::Duration;

use mock_server::{Echo, ServerState};
use requests_core::{
    delete, get, options, patch, post, put, request, with_allow_redirects, with_form,
    with_headers, with_json, with_params, with_timeout, with_verify, Error, HttpMethod,
    JsonTarget,
};
use serde::Deserialize;
use serde_json::json;

struct Server {
    base: String,
    state: Arc<ServerState>,
}

impl Server {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

fn start_server() -> Server {
    spawn_server(false)
}

/// Same routes behind HTTPS with a self-signed certificate.
fn start_tls_server() -> Server {
    spawn_server(true)
}

fn spawn_server(tls: bool) -> Server {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let state = Arc::new(ServerState::default());
    let server_state = state.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            if tls {
                mock_server::serve_tls(listener, server_state).await
            } else {
                mock_server::serve(listener, server_state).await
            }
        })
        .unwrap();
    });

    let scheme = if tls { "https" } else { "http" };
    Server {
        base: format!("{scheme}://{addr}"),
        state,
    }
}

// ---------------------------------------------------------------------------
// Methods and bodies
// ---------------------------------------------------------------------------

#[test]
fn every_verb_reaches_the_server_as_sent() {
    let server = start_server();
    for method in HttpMethod::ALL {
        let resp = request(method, &server.url("/echo"), []).unwrap();
        assert_eq!(resp.status(), 200, "{method}");
        let echo: Echo = resp.json_into().unwrap();
        assert_eq!(echo.method, method.as_str());
    }
}

#[test]
fn get_ignores_configured_bodies() {
    let server = start_server();
    let resp = get(
        &server.url("/echo"),
        [with_json(json!({"name": "teheran"})), with_form([("a", "1")])],
    )
    .unwrap();

    let echo: Echo = resp.json_into().unwrap();
    assert_eq!(echo.method, "GET");
    assert!(echo.body.is_empty());
    assert!(!echo.headers.contains_key("content-type"));
}

#[test]
fn json_body_on_body_verbs() {
    let server = start_server();
    let payload = json!({"name": "teheran", "n": 1});
    let expected = serde_json::to_string(&payload).unwrap();

    for method in HttpMethod::ALL.into_iter().filter(HttpMethod::carries_body) {
        let resp = request(method, &server.url("/echo"), [with_json(payload.clone())]).unwrap();
        let echo: Echo = resp.json_into().unwrap();
        assert_eq!(echo.method, method.as_str());
        assert_eq!(echo.body, expected, "{method}");
        assert_eq!(echo.headers["content-type"], "application/json", "{method}");
    }
}

#[test]
fn verb_helpers_send_their_verb() {
    let server = start_server();
    let url = server.url("/echo");
    let calls = [
        ("GET", get(&url, [])),
        ("POST", post(&url, [])),
        ("PUT", put(&url, [])),
        ("DELETE", delete(&url, [])),
        ("PATCH", patch(&url, [])),
        ("OPTIONS", options(&url, [])),
    ];
    for (name, result) in calls {
        let echo: Echo = result.unwrap().json_into().unwrap();
        assert_eq!(echo.method, name);
    }
}

#[test]
fn post_echoes_json_back() {
    let server = start_server();
    let resp = post(&server.url("/echo"), [with_json(json!({"name": "teheran"}))]).unwrap();
    let echo: Echo = resp.json_into().unwrap();
    let body: serde_json::Value = serde_json::from_str(&echo.body).unwrap();
    assert_eq!(body["name"], "teheran");
}

#[test]
fn form_body_is_url_encoded() {
    let server = start_server();
    let resp = put(&server.url("/echo"), [with_form([("name", "a b"), ("x", "1")])]).unwrap();
    let echo: Echo = resp.json_into().unwrap();
    assert_eq!(echo.body, "name=a+b&x=1");
    assert_eq!(
        echo.headers["content-type"],
        "application/x-www-form-urlencoded"
    );
}

#[test]
fn delete_without_options_sends_no_body() {
    let server = start_server();
    let resp = delete(&server.url("/echo"), []).unwrap();
    let echo: Echo = resp.json_into().unwrap();
    assert_eq!(echo.method, "DELETE");
    assert!(echo.body.is_empty());
}

// ---------------------------------------------------------------------------
// Params and headers
// ---------------------------------------------------------------------------

#[test]
fn params_reach_the_query_string() {
    let server = start_server();
    let resp = get(&server.url("/echo"), [with_params([("foo", "bar")])]).unwrap();
    let echo: Echo = resp.json_into().unwrap();
    assert_eq!(echo.query["foo"], "bar");
}

#[test]
fn params_extend_an_existing_query() {
    let server = start_server();
    let resp = get(
        &server.url("/echo?lang=rust"),
        [with_params([("page", "2")])],
    )
    .unwrap();
    let echo: Echo = resp.json_into().unwrap();
    assert_eq!(echo.query["lang"], "rust");
    assert_eq!(echo.query["page"], "2");
}

#[test]
fn headers_reach_the_server() {
    let server = start_server();
    let resp = get(
        &server.url("/echo"),
        [with_headers([("X-Custom", "test-value")])],
    )
    .unwrap();
    let echo: Echo = resp.json_into().unwrap();
    assert_eq!(echo.headers["x-custom"], "test-value");
}

#[test]
fn explicit_content_type_wins() {
    let server = start_server();
    let resp = post(
        &server.url("/echo"),
        [
            with_json(json!({})),
            with_headers([("Content-Type", "application/vnd.api+json")]),
        ],
    )
    .unwrap();
    let echo: Echo = resp.json_into().unwrap();
    assert_eq!(echo.headers["content-type"], "application/vnd.api+json");
}

// ---------------------------------------------------------------------------
// Timeout and redirects
// ---------------------------------------------------------------------------

#[test]
fn timeout_shorter_than_server_delay_is_an_error() {
    let server = start_server();
    let result = get(
        &server.url("/delay/200"),
        [with_timeout(Duration::from_millis(50))],
    );
    assert!(matches!(result, Err(Error::Timeout)), "got {result:?}");
}

#[test]
fn timeout_longer_than_server_delay_succeeds() {
    let server = start_server();
    let resp = get(
        &server.url("/delay/10"),
        [with_timeout(Duration::from_secs(5))],
    )
    .unwrap();
    assert_eq!(resp.status(), 200);
}

#[test]
fn huge_timeout_is_clamped_not_fatal() {
    let server = start_server();
    let resp = get(&server.url("/json"), [with_timeout(Duration::MAX)]).unwrap();
    assert_eq!(resp.status(), 200);
}

#[test]
fn redirects_disabled_returns_first_hop() {
    let server = start_server();
    let resp = get(&server.url("/redirect"), [with_allow_redirects(false)]).unwrap();
    assert_eq!(resp.status(), 302);
    assert!(resp.is_redirect());
    assert_eq!(resp.header("location"), Some("/redirected"));
    assert_eq!(server.state.redirected_hits(), 0);
}

#[test]
fn redirects_followed_by_default() {
    let server = start_server();
    let resp = get(&server.url("/redirect"), []).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json().unwrap()["redirected"], true);
    assert_eq!(server.state.redirected_hits(), 1);
}

#[test]
fn options_do_not_carry_over_to_the_next_call() {
    let server = start_server();
    let err = get("relative/path", [with_allow_redirects(false)]).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));

    let resp = get(
        &server.url("/redirect"),
        [with_allow_redirects(false), with_headers([("x-leak", "1")])],
    )
    .unwrap();
    assert_eq!(resp.status(), 302);

    let resp = get(&server.url("/redirect"), []).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(server.state.redirected_hits(), 1);

    let echo: Echo = get(&server.url("/echo"), []).unwrap().json_into().unwrap();
    assert!(!echo.headers.contains_key("x-leak"));
}

#[test]
fn cookies_follow_redirect_hops_within_one_call_only() {
    let server = start_server();
    let resp = get(&server.url("/cookies/set"), []).unwrap();
    assert_eq!(resp.json().unwrap()["cookie"], "session=abc");

    let resp = get(&server.url("/cookies/echo"), []).unwrap();
    assert!(resp.json().unwrap()["cookie"].is_null());
}

// ---------------------------------------------------------------------------
// TLS
// ---------------------------------------------------------------------------

#[test]
fn self_signed_certificate_is_rejected_by_default() {
    let server = start_tls_server();
    let result = get(&server.url("/json"), []);
    assert!(matches!(result, Err(Error::Tls(_))), "got {result:?}");
}

#[test]
fn verify_false_accepts_self_signed_certificate() {
    let server = start_tls_server();
    let resp = get(&server.url("/json"), [with_verify(false)]).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json().unwrap()["message"], "ok");

    let resp = post(
        &server.url("/echo"),
        [with_verify(false), with_json(json!({"secure": true}))],
    )
    .unwrap();
    let echo: Echo = resp.json_into().unwrap();
    assert_eq!(echo.body, r#"{"secure":true}"#);
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn error_statuses_are_responses() {
    let server = start_server();
    let resp = get(&server.url("/status/404"), []).unwrap();
    assert_eq!(resp.status(), 404);
    assert!(!resp.is_success());
    assert!(resp.body().is_empty());
}

#[test]
fn json_decodes_to_generic_map() {
    let server = start_server();
    let resp = get(&server.url("/json"), []).unwrap();
    assert_eq!(resp.status(), 200);
    let map = resp.json().unwrap();
    assert_eq!(map["message"], "ok");
    assert_eq!(resp.json_strings().unwrap()["message"], "ok");
}

#[test]
fn json_decodes_into_typed_target() {
    #[derive(Debug, Default, Deserialize)]
    struct Message {
        message: String,
    }

    let server = start_server();
    let resp = get(&server.url("/json"), []).unwrap();
    let mut target = Message::default();
    assert!(resp.json_to(&mut [&mut target]).unwrap().is_none());
    assert_eq!(target.message, "ok");
}

#[test]
fn list_decodes_three_items() {
    let server = start_server();
    let resp = get(&server.url("/list"), []).unwrap();
    assert_eq!(resp.list().unwrap().len(), 3);
}

#[test]
fn two_decode_targets_is_a_usage_error() {
    let server = start_server();
    let resp = get(&server.url("/json"), []).unwrap();
    let mut first = serde_json::Map::new();
    let mut second = serde_json::Map::new();
    let targets: &mut [&mut dyn JsonTarget] = &mut [&mut first, &mut second];
    assert!(matches!(resp.json_to(targets), Err(Error::TooManyTargets(2))));
}

#[test]
fn repeated_headers_are_comma_joined() {
    let server = start_server();
    let resp = get(&server.url("/headers/multi"), []).unwrap();
    assert_eq!(resp.header("x-multi"), Some("a,b"));
    assert_eq!(resp.headers()["x-multi"], "a,b");
    assert_eq!(resp.text(), "ok");
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_calls_keep_their_own_options() {
    let server = Arc::new(start_server());
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let server = Arc::clone(&server);
            std::thread::spawn(move || {
                for i in 0..10 {
                    let value = format!("{n}-{i}");
                    let resp = post(
                        &server.url("/echo"),
                        [
                            with_params([("v", value.as_str())]),
                            with_headers([("x-caller", value.as_str())]),
                            with_json(json!({ "v": value })),
                        ],
                    )
                    .unwrap();
                    let echo: Echo = resp.json_into().unwrap();
                    assert_eq!(echo.query["v"], value);
                    assert_eq!(echo.headers["x-caller"], value);
                    let body: serde_json::Value = serde_json::from_str(&echo.body).unwrap();
                    assert_eq!(body["v"], value);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
