//! Set base URI of requests.
use http::{
    uri::{PathAndQuery, Uri},
    Request,
};
use tower::{Layer, Service};

/// Layer that applies [`BaseUri`] which makes all requests relative to the URI.
///
/// Path in the base URI is preseved, so servers behind a path prefix keep working.
#[derive(Debug, Clone)]
pub struct BaseUriLayer {
    base_uri: Uri,
}

impl BaseUriLayer {
    /// Set base URI of requests.
    pub fn new(base_uri: Uri) -> Self {
        Self { base_uri }
    }
}

impl<S> Layer<S> for BaseUriLayer {
    type Service = BaseUri<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BaseUri {
            base_uri: self.base_uri.clone(),
            inner,
        }
    }
}

/// Middleware that sets base URI so that all requests are relative to it.
#[derive(Debug, Clone)]
pub struct BaseUri<S> {
    base_uri: Uri,
    inner: S,
}

impl<S, ReqBody> Service<Request<ReqBody>> for BaseUri<S>
where
    S: Service<Request<ReqBody>>,
{
    type Error = S::Error;
    type Future = S::Future;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let (mut parts, body) = req.into_parts();
        parts.uri = join_base_uri(&self.base_uri, parts.uri.path_and_query());
        self.inner.call(Request::from_parts(parts, body))
    }
}

// Scheme and authority come from the base, the request path is appended to the base path.
fn join_base_uri(base_uri: &Uri, req_pandq: Option<&PathAndQuery>) -> Uri {
    let mut parts = base_uri.clone().into_parts();
    if let Some(req_pandq) = req_pandq {
        // `PathAndQuery` always starts with a slash
        let base_path = base_uri.path().trim_end_matches('/');
        if let Ok(joined) = format!("{base_path}{req_pandq}").parse::<PathAndQuery>() {
            parts.path_and_query = Some(joined);
        }
    }
    // scheme and authority were already valid on the base
    Uri::from_parts(parts).unwrap_or_else(|_| base_uri.clone())
}
