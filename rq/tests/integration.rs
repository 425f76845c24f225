//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the echo server on a random port (bound before the
//! serving thread spawns, so early connections queue) and drives a pipeline
//! through its default ureq transport, checking what actually crossed the
//! wire.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use rq::{Cookie, Error, Pipeline};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
struct Product {
    name: String,
    price: u32,
    tags: Vec<String>,
}

#[test]
fn json_round_trip_through_echo() {
    let addr = start_server();
    let product = Product {
        name: "green tea".to_string(),
        price: 4,
        tags: vec!["drink".to_string(), "hot".to_string()],
    };

    let mut echoed = Product::default();
    let p = Pipeline::new(&format!("{addr}/echo"))
        .json(&product)
        .post()
        .to_json(&mut echoed);

    assert!(p.error().is_none(), "unexpected error: {:?}", p.error());
    assert_eq!(p.status_code(), Some(200));
    assert_eq!(echoed, product);
}

#[test]
fn request_cookies_come_back_plus_one_server_cookie() {
    let addr = start_server();

    let p = Pipeline::new(&format!("{addr}/cookies"))
        .cookie(Cookie::new("a", "1"))
        .cookie(Cookie::new("b", "2"))
        .get();

    assert!(p.error().is_none(), "unexpected error: {:?}", p.error());
    let cookies = p.response().unwrap().cookies();
    assert_eq!(cookies.len(), 3, "two echoed plus one server-set");
    assert!(cookies.contains(&Cookie::new("a", "1")));
    assert!(cookies.contains(&Cookie::new("b", "2")));
    assert!(cookies.contains(&Cookie::new("flavor", "oatmeal")));
}

#[test]
fn content_type_header_gates_the_response() {
    let addr = start_server();

    let p = Pipeline::new(&format!("{addr}/gated"))
        .header("Content-Type", "application/json")
        .get();
    assert!(p.error().is_none());
    assert_eq!(p.status_code(), Some(200));

    let p = Pipeline::new(&format!("{addr}/gated"))
        .header("Content-Type", "text/plain")
        .get();
    assert!(p.error().is_none(), "non-2xx is data, not an error");
    assert_eq!(p.status_code(), Some(415));
}

#[test]
fn text_body_is_echoed_back() {
    let addr = start_server();

    let mut echoed = String::new();
    let p = Pipeline::new(&format!("{addr}/text"))
        .text("plain words")
        .post()
        .to_text(&mut echoed);

    assert!(p.error().is_none());
    assert_eq!(echoed, "plain words");
}

#[test]
fn every_verb_reaches_the_server() {
    let addr = start_server();
    let url = format!("{addr}/method");

    let verbs: [(&str, fn(Pipeline) -> Pipeline); 5] = [
        ("GET", Pipeline::get),
        ("POST", Pipeline::post),
        ("PUT", Pipeline::put),
        ("DELETE", Pipeline::delete),
        ("PATCH", Pipeline::patch),
    ];
    for (name, verb) in verbs {
        let mut body = String::new();
        let p = verb(Pipeline::new(&url)).to_text(&mut body);
        assert!(p.error().is_none(), "{name}: {:?}", p.error());
        assert_eq!(body, name, "{name}");
    }

    // HEAD gets the status but no payload.
    let mut body = String::new();
    let p = Pipeline::new(&url).head().to_text(&mut body);
    assert!(p.error().is_none(), "HEAD: {:?}", p.error());
    assert_eq!(p.status_code(), Some(200));
    assert_eq!(body, "");
}

#[test]
fn non_2xx_status_is_captured_without_an_error() {
    let addr = start_server();

    let p = Pipeline::new(&format!("{addr}/status/404")).get();
    assert!(p.error().is_none());
    assert_eq!(p.status_code(), Some(404));
}

#[test]
fn unreachable_host_stores_a_transport_error() {
    // Bind then drop to find a port nothing is listening on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let p = Pipeline::new(&format!("127.0.0.1:{port}")).get();
    assert!(matches!(p.error(), Some(Error::Transport(_))));
    assert_eq!(p.status_code(), None, "nothing was ever captured");
}

#[test]
fn a_failed_chain_never_reaches_the_network() {
    let addr = start_server();

    // The whitespace endpoint fails validation at dispatch; the later
    // retarget mutates the field but cannot clear the stored error, so the
    // second verb still short-circuits.
    let p = Pipeline::new("bad host")
        .get()
        .endpoint(&format!("{addr}/status/200"))
        .get();

    assert!(matches!(p.error(), Some(Error::Endpoint(_))));
    assert_eq!(p.status_code(), None);
}
