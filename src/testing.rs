//! Kubernetes API server double for exercising the kube-backed clients.
//!
//! A `kube::Client` is wired to a `tower_test` mock service; each test answers
//! the requests it expects with canned responses.

use http::{Method, Request, Response};
use kube::client::Body;
use kube::Client;
use tower_test::mock::{self, Handle};

pub(crate) type ApiServer = Handle<Request<Body>, Response<Body>>;

pub(crate) fn stub_client() -> (Client, ApiServer) {
    let (service, handle) = mock::pair::<Request<Body>, Response<Body>>();
    (Client::new(service, "default"), handle)
}

/// Method and path of a request seen by the double
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Seen {
    pub method: Method,
    pub path: String,
}

/// Answer the next request with `body` and the given HTTP status
pub(crate) async fn respond(server: &mut ApiServer, code: u16, body: serde_json::Value) -> Seen {
    let (request, send) = server
        .next_request()
        .await
        .expect("client did not send a request");
    let seen = Seen {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
    };
    send.send_response(
        Response::builder()
            .status(code)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
    );
    seen
}

/// Answer the next request with a `Status` failure
pub(crate) async fn respond_with_status(server: &mut ApiServer, code: u16, reason: &str) -> Seen {
    let status = serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": format!("stubbed {reason}"),
        "reason": reason,
        "code": code,
    });
    respond(server, code, status).await
}
