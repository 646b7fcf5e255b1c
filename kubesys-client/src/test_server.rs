//! A canned API server on top of `tower_test` for unit tests
use futures::pin_mut;
use http::{Request, Response, StatusCode};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{client::Body, Client};

/// A path and the response served for it
pub(crate) struct Route {
    pub(crate) path: &'static str,
    status: StatusCode,
    body: Vec<u8>,
}

impl Route {
    pub(crate) fn json(path: &'static str, body: Value) -> Self {
        Self {
            path,
            status: StatusCode::OK,
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    pub(crate) fn raw(path: &'static str, body: impl AsRef<[u8]>) -> Self {
        Self {
            path,
            status: StatusCode::OK,
            body: body.as_ref().to_vec(),
        }
    }
}

/// Serve `routes` until every clone of the returned client is dropped
///
/// Unknown paths get a plain text 404. The task resolves to the requested paths,
/// query strings excluded, in request order.
pub(crate) fn serve(routes: Vec<Route>) -> (Client, JoinHandle<Vec<String>>) {
    let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
    let task = tokio::spawn(async move {
        pin_mut!(handle);
        let mut requested = vec![];
        while let Some((request, send)) = handle.next_request().await {
            let path = request.uri().path().to_string();
            let response = match routes.iter().find(|r| r.path == path) {
                Some(route) => Response::builder()
                    .status(route.status)
                    .body(Body::from(route.body.clone()))
                    .unwrap(),
                None => Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(Body::from(b"404 page not found".to_vec()))
                    .unwrap(),
            };
            send.send_response(response);
            requested.push(path);
        }
        requested
    });
    (Client::new(mock_service, "default"), task)
}
