//! Middleware types returned from `ConfigExt` methods.
pub use tower_http::auth::AddAuthorizationLayer;

mod base_uri;

pub use base_uri::{BaseUri, BaseUriLayer};

#[cfg(test)]
mod tests {
    use super::AddAuthorizationLayer;
    use http::{header::AUTHORIZATION, HeaderValue, Request, Response};
    use tokio_test::assert_ready_ok;
    use tower_test::mock;

    #[tokio::test(flavor = "current_thread")]
    async fn bearer_token_is_attached() {
        const TOKEN: &str = "eyJhbGciOiJSUzI1NiJ9.test";
        let (mut service, mut handle) =
            mock::spawn_layer::<Request<()>, Response<()>, _>(AddAuthorizationLayer::bearer(TOKEN).as_sensitive(true));

        let spawned = tokio::spawn(async move {
            let (request, send) = handle.next_request().await.expect("service not called");
            let header = request.headers().get(AUTHORIZATION).unwrap();
            assert_eq!(header, HeaderValue::try_from(format!("Bearer {TOKEN}")).unwrap());
            assert!(header.is_sensitive());
            send.send_response(Response::new(()));
        });

        assert_ready_ok!(service.poll_ready());
        service.call(Request::get("/").body(()).unwrap()).await.unwrap();
        spawned.await.unwrap();
    }
}
