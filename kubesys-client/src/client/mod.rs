//! The transport used by discovery and the resource operations
//!
//! The [`Client`] issues requests built by [`kubesys_core::Request`] against the configured
//! server, turns non-success statuses into [`Error::Api`], and decodes JSON bodies and
//! newline separated watch streams.
use futures::{future::BoxFuture, Stream, StreamExt, TryStreamExt};
use http::{header::CONTENT_TYPE, HeaderValue, Request, Response, StatusCode};
use kubesys_core::{WatchEvent, WatchLine};
use serde::de::DeserializeOwned;
use tokio_util::{
    codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead},
    io::StreamReader,
};
use tower::{buffer::Buffer, util::BoxService, BoxError, Layer, Service, ServiceExt};
use tower_http::map_response_body::MapResponseBodyLayer;

use crate::{error::ErrorResponse, Config, Error, Result};

mod body;
mod builder;
mod config_ext;
pub mod middleware;
#[cfg(feature = "rustls-tls")] mod tls;

pub use body::{Body, BodyDataStream};
pub use builder::{ClientBuilder, DynBody, GenericService};
pub use config_ext::ConfigExt;
#[cfg(feature = "rustls-tls")] pub use tls::rustls_tls::Error as RustlsTlsError;

/// Client for connecting with a Kubernetes compatible API server.
///
/// The easiest way to instantiate the client is either by
/// inferring the configuration from the environment using
/// [`Client::try_default`] or with an existing [`Config`]
/// using [`Client::try_from`].
///
/// Cloning is cheap and clones share the underlying connection pool.
#[derive(Clone)]
pub struct Client {
    // - `Buffer` for cheap clone
    // - `BoxFuture` for dynamic response future type
    inner: Buffer<Request<Body>, BoxFuture<'static, Result<Response<Body>, BoxError>>>,
    default_ns: String,
}

impl Client {
    /// Create a [`Client`] using a custom `Service` stack.
    ///
    /// [`ConfigExt`](crate::client::ConfigExt) provides extensions for
    /// building a custom stack.
    ///
    /// To create with the default stack with a [`Config`], use
    /// [`Client::try_from`].
    ///
    /// # Example
    ///
    /// ```rust
    /// # async fn doc() -> Result<(), Box<dyn std::error::Error>> {
    /// use kubesys_client::{client::{Body, ConfigExt}, Client, Config};
    /// use hyper_util::rt::TokioExecutor;
    /// use tower::ServiceBuilder;
    ///
    /// let config = Config::infer()?;
    /// let service = ServiceBuilder::new()
    ///     .layer(config.base_uri_layer())
    ///     .option_layer(config.auth_layer()?)
    ///     .service(hyper_util::client::legacy::Client::builder(TokioExecutor::new()).build(config.rustls_https_connector()?));
    /// let client = Client::new(service, config.default_namespace);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new<S, B, T>(service: S, default_namespace: T) -> Self
    where
        S: Service<Request<Body>, Response = Response<B>> + Send + 'static,
        S::Future: Send + 'static,
        S::Error: Into<BoxError>,
        B: http_body::Body<Data = bytes::Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
        T: Into<String>,
    {
        // Transform response body to `crate::client::Body` and use type erased error to avoid type parameters.
        let service = MapResponseBodyLayer::new(|b: B| Body::wrap_body(b))
            .layer(service)
            .map_err(|e| e.into());
        Self {
            inner: Buffer::new(BoxService::new(service), 1024),
            default_ns: default_namespace.into(),
        }
    }

    /// Create and initialize a [`Client`] using the inferred configuration.
    ///
    /// Will use [`Config::infer`] which tries the in-cluster environment first
    /// and then the local kubeconfig.
    pub fn try_default() -> Result<Self> {
        Self::try_from(Config::infer().map_err(Error::Kubeconfig)?)
    }

    /// The namespace from the config this client was built with
    pub fn default_namespace(&self) -> &str {
        &self.default_ns
    }

    /// Perform a raw HTTP request against the API and return the raw response back.
    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        let mut svc = self.inner.clone();
        let res = svc
            .ready()
            .await
            .map_err(Error::Service)?
            .call(request)
            .await
            .map_err(|err| {
                // Error decorating request
                err.downcast::<Error>()
                    .map(|e| *e)
                    // Error requesting
                    .or_else(|err| err.downcast::<hyper::Error>().map(|err| Error::HyperError(*err)))
                    // Error from another middleware
                    .unwrap_or_else(Error::Service)
            })?;
        Ok(res)
    }

    /// Perform a raw HTTP request against the API and deserialize the response
    /// as JSON to some known type.
    pub async fn request<T>(&self, request: Request<Vec<u8>>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let text = self.request_text(request).await?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!("{}, {:?}", text, e);
            Error::SerdeError(e)
        })
    }

    /// Perform a raw HTTP request against the API and get back the response
    /// as a string
    ///
    /// Any status outside of `2xx` is returned as [`Error::Api`].
    pub async fn request_text(&self, request: Request<Vec<u8>>) -> Result<String> {
        let res = self.send(with_json_body(request)).await?;
        let status = res.status();
        let body_bytes = res.into_body().collect_bytes().await?;
        let text = String::from_utf8(body_bytes.to_vec()).map_err(Error::FromUtf8)?;
        tracing::trace!("Status = {:?}, body = {}", status, text);
        handle_api_errors(&text, status)?;

        Ok(text)
    }

    /// Perform a raw request and get back a stream of [`WatchEvent`] objects
    ///
    /// Resolves once the response headers arrive. Lines that fail to decode and
    /// unknown event types are logged and skipped; an `ERROR` event is yielded as
    /// [`Error::Api`].
    pub async fn request_events(
        &self,
        request: Request<Vec<u8>>,
    ) -> Result<impl Stream<Item = Result<WatchEvent>>> {
        let res = self.send(with_json_body(request)).await?;
        let status = res.status();
        tracing::trace!("headers: {:?}", res.headers());
        if !status.is_success() {
            let body_bytes = res.into_body().collect_bytes().await?;
            let text = String::from_utf8(body_bytes.to_vec()).map_err(Error::FromUtf8)?;
            return Err(api_error(&text, status));
        }

        // Split on raw newlines; a line that is not UTF-8 is skipped like any bad JSON
        let frames = FramedRead::new(
            StreamReader::new(res.into_body().into_data_stream().map_err(std::io::Error::other)),
            AnyDelimiterCodec::new(b"\n".to_vec(), vec![]),
        );

        Ok(frames.filter_map(|res| async {
            match res {
                Ok(line) if line.trim_ascii().is_empty() => None,
                Ok(line) => match WatchLine::parse_bytes(&line) {
                    Ok(WatchLine::Event(event)) => Some(Ok(event)),
                    Ok(WatchLine::Error(e_resp)) => Some(Err(Error::Api(e_resp))),
                    Ok(WatchLine::Other(kind)) => {
                        tracing::debug!("ignoring watch event of type {}", kind);
                        None
                    }
                    // Includes the incomplete last line from `decode_eof`
                    Err(e) => {
                        tracing::warn!(
                            "skipping malformed watch line: {}: {}",
                            e,
                            String::from_utf8_lossy(&line)
                        );
                        None
                    }
                },

                Err(AnyDelimiterCodecError::Io(e)) => Some(Err(Error::ReadEvents(e))),

                // Reached the maximum line length without finding a newline.
                // This should never happen because we're using the default `usize::MAX`.
                Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
                    Some(Err(Error::MaxLineLengthExceeded))
                }
            }
        }))
    }
}

impl TryFrom<Config> for Client {
    type Error = Error;

    /// Builds a default [`Client`] from a [`Config`].
    ///
    /// See [`ClientBuilder`] or [`Client::new`] if more customization is required
    fn try_from(config: Config) -> Result<Self> {
        Ok(ClientBuilder::try_from(config)?.build())
    }
}

// Bodies are always JSON documents
fn with_json_body(request: Request<Vec<u8>>) -> Request<Body> {
    let (mut parts, body) = request.into_parts();
    if !body.is_empty() && !parts.headers.contains_key(CONTENT_TYPE) {
        parts
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    Request::from_parts(parts, Body::from(body))
}

/// Kubernetes returned error handling
fn handle_api_errors(text: &str, s: StatusCode) -> Result<()> {
    if s.is_success() {
        Ok(())
    } else {
        Err(api_error(text, s))
    }
}

/// Either the server sent a `Status` object we can decode, or we build one from
/// the status line so the code and text are kept verbatim.
fn api_error(text: &str, s: StatusCode) -> Error {
    // Print better debug when things do fail
    tracing::debug!("Unsuccessful: {} ({})", s, text);
    if let Ok(errdata) = serde_json::from_str::<ErrorResponse>(text) {
        tracing::debug!("Unsuccessful data error parse: {:?}", errdata);
        Error::Api(errdata)
    } else {
        tracing::warn!("Unsuccessful data error parse: {}", text);
        Error::Api(ErrorResponse {
            status: s.to_string(),
            code: s.as_u16(),
            message: text.to_string(),
            reason: "Failed to parse error data".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::pin_mut;
    use http::Method;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn json_content_type_only_with_body() {
        let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::POST);
            assert_eq!(request.headers().get(CONTENT_TYPE).unwrap(), "application/json");
            send.send_response(Response::builder().status(201).body(Body::from(b"{}".to_vec())).unwrap());

            let (request, send) = handle.next_request().await.expect("service not called");
            assert!(request.headers().get(CONTENT_TYPE).is_none());
            send.send_response(Response::builder().body(Body::from(b"{}".to_vec())).unwrap());
        });

        let client = Client::new(mock_service, "default");
        let created: Value = client
            .request(Request::post("/api/v1/namespaces/default/pods").body(b"{}".to_vec()).unwrap())
            .await
            .unwrap();
        assert_eq!(created, json!({}));
        let _: Value = client
            .request(Request::get("/api/v1/namespaces/default/pods").body(vec![]).unwrap())
            .await
            .unwrap();
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn unsuccessful_status_keeps_code_and_text() {
        let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (_request, send) = handle.next_request().await.expect("service not called");
            send.send_response(
                Response::builder()
                    .status(StatusCode::SERVICE_UNAVAILABLE)
                    .body(Body::from(b"upstream connect error".to_vec()))
                    .unwrap(),
            );
        });

        let client = Client::new(mock_service, "default");
        let err = client
            .request_text(Request::get("/api/v1/pods").body(vec![]).unwrap())
            .await
            .unwrap_err();
        match err {
            Error::Api(ae) => {
                assert_eq!(ae.code, 503);
                assert_eq!(ae.status, "503 Service Unavailable");
                assert_eq!(ae.message, "upstream connect error");
            }
            other => panic!("unexpected {other:?}"),
        }
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn watch_lines_skip_garbage_and_partial_tail() {
        let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (_request, send) = handle.next_request().await.expect("service not called");
            let body = [
                r#"{"type":"ADDED","object":{"metadata":{"name":"a"}}}"#,
                "",
                r#"{"type":"BOOKMARK","object":{}}"#,
                r#"{"type":"MODIFIED","object":{"metadata":{"name":"a"}}}"#,
                r#"{"type":"DELETED","obj"#,
            ]
            .join("\n");
            send.send_response(Response::builder().body(Body::from(body.into_bytes())).unwrap());
        });

        let client = Client::new(mock_service, "default");
        let events = client
            .request_events(Request::get("/api/v1/watch/pods?watch=true").body(vec![]).unwrap())
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;
        let events = events.into_iter().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], WatchEvent::Added(_)));
        assert!(matches!(events[1], WatchEvent::Modified(_)));
        spawned.await.unwrap();
    }
}
