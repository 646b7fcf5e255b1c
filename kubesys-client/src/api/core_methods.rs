use serde_json::{json, Value};

use crate::{api::Api, Error, Result};
use kubesys_core::{DocumentExt, ListParams, Request};

/// PUSH/PUT/POST/GET abstractions
impl Api {
    /// Create a resource
    ///
    /// The kind, group and namespace are taken from the document itself.
    ///
    /// ```no_run
    /// use kubesys_client::{Api, Client};
    /// use serde_json::json;
    /// # async fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
    /// let api = Api::new(Client::try_default()?);
    /// let deploy = json!({
    ///     "apiVersion": "apps/v1",
    ///     "kind": "Deployment",
    ///     "metadata": {"name": "web", "namespace": "default"},
    ///     "spec": {}
    /// });
    /// api.create(&deploy).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(&self, data: &Value) -> Result<Value> {
        let request = self.document_request(data).await?;
        let req = request.create(encode(data)?)?;
        self.client.request(req).await
    }

    /// Replace a resource with the given document
    ///
    /// The target is named by `metadata.name` of the document.
    pub async fn update(&self, data: &Value) -> Result<Value> {
        let request = self.document_request(data).await?;
        let req = request.replace(data.name()?, encode(data)?)?;
        self.client.request(req).await
    }

    /// Replace the status subresource of a resource
    pub async fn update_status(&self, data: &Value) -> Result<Value> {
        let request = self.document_request(data).await?;
        let req = request.replace_status(data.name()?, encode(data)?)?;
        self.client.request(req).await
    }

    /// Delete a named resource
    ///
    /// Returns the deleted object, or the `Status` the server sent instead.
    pub async fn delete(&self, kind: &str, namespace: &str, name: &str) -> Result<Value> {
        let req = self.kind_request(kind, namespace).await?.delete(name)?;
        self.client.request(req).await
    }

    /// Get a named resource
    ///
    /// ```no_run
    /// use kubesys_client::{Api, Client};
    /// # async fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
    /// let api = Api::new(Client::try_default()?);
    /// let node = api.get("Node", "", "worker-1").await?;
    /// println!("{}", node["status"]["nodeInfo"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, kind: &str, namespace: &str, name: &str) -> Result<Value> {
        let req = self.kind_request(kind, namespace).await?.get(name)?;
        self.client.request(req).await
    }

    /// List every resource of a kind
    ///
    /// An empty namespace lists across all namespaces.
    pub async fn list(&self, kind: &str, namespace: &str) -> Result<Value> {
        self.list_with(kind, namespace, &ListParams::default()).await
    }

    /// List resources of a kind narrowed by selectors
    pub async fn list_with(&self, kind: &str, namespace: &str, lp: &ListParams) -> Result<Value> {
        let req = self.kind_request(kind, namespace).await?.list(lp)?;
        self.client.request(req).await
    }

    /// List resources of a kind whose labels match every `key=value` pair
    ///
    /// ```no_run
    /// use kubesys_client::{Api, Client};
    /// # async fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
    /// let api = Api::new(Client::try_default()?);
    /// let pods = api.list_with_labels("Pod", "default", [("app", "nginx")]).await?;
    /// for pod in pods["items"].as_array().into_iter().flatten() {
    ///     println!("{}", pod["metadata"]["name"]);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_with_labels<K, V>(
        &self,
        kind: &str,
        namespace: &str,
        labels: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Value>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.list_with(kind, namespace, &ListParams::default().labels(labels))
            .await
    }

    /// List resources of a kind whose fields match every `key=value` pair
    pub async fn list_with_fields<K, V>(
        &self,
        kind: &str,
        namespace: &str,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Value>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.list_with(kind, namespace, &ListParams::default().fields(fields))
            .await
    }

    /// Bind a pod to a node
    ///
    /// Posts a `Binding` targeting `host` to the binding subresource of the pod.
    pub async fn bind(&self, pod: &Value, host: &str) -> Result<Value> {
        let request = self.document_request(pod).await?;
        let name = pod.name()?;
        let binding = json!({
            "apiVersion": "v1",
            "kind": "Binding",
            "metadata": {
                "name": name,
                "namespace": pod.namespace(),
            },
            "target": {
                "apiVersion": "v1",
                "kind": "Node",
                "name": host,
            },
        });
        let req = request.bind(name, encode(&binding)?)?;
        self.client.request(req).await
    }
}

/// Url synthesis
impl Api {
    // Documents carry their full kind, so no short kind lookup is needed
    async fn document_request(&self, data: &Value) -> Result<Request> {
        let registry = self.init().await?;
        let full_kind = data.full_kind()?;
        Ok(Request::new(registry.url_for(&full_kind, data.namespace())?))
    }

    pub(crate) async fn kind_request(&self, kind: &str, namespace: &str) -> Result<Request> {
        let registry = self.init().await?;
        let full_kind = registry.resolve(kind)?;
        Ok(Request::new(registry.url_for(&full_kind, namespace)?))
    }
}

fn encode(data: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec(data).map_err(Error::SerdeError)
}

#[cfg(test)]
mod tests {
    use crate::{
        api::{Api, ApiResource, KindRegistry},
        client::Body,
        Client, Error,
    };
    use assert_json_diff::assert_json_eq;
    use futures::pin_mut;
    use http::{Method, Request, Response, StatusCode};
    use serde_json::{json, Value};
    use tower_test::mock::Handle;

    fn resource(prefix: &str, group: &str, kind: &str, plural: &str, namespaced: bool) -> ApiResource {
        let version = prefix.rsplit('/').next().unwrap().to_string();
        ApiResource {
            url_prefix: prefix.into(),
            group: group.into(),
            api_version: if group.is_empty() {
                version.clone()
            } else {
                format!("{group}/{version}")
            },
            version,
            kind: kind.into(),
            plural: plural.into(),
            namespaced,
            verbs: vec![],
        }
    }

    fn registry() -> KindRegistry {
        let mut reg = KindRegistry::new();
        reg.insert("Pod", resource("/api/v1", "", "Pod", "pods", true));
        reg.insert("Node", resource("/api/v1", "", "Node", "nodes", false));
        reg.insert("ConfigMap", resource("/api/v1", "", "ConfigMap", "configmaps", true));
        reg.insert(
            "apps.Deployment",
            resource("/apis/apps/v1", "apps", "Deployment", "deployments", true),
        );
        reg.insert(
            "example.io.ConfigMap",
            resource("/apis/example.io/v1", "example.io", "ConfigMap", "configmaps", true),
        );
        reg
    }

    fn testcontext() -> (Api, Handle<Request<Body>, Response<Body>>) {
        let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
        let client = Client::new(mock_service, "default");
        (Api::with_registry(client, registry()), handle)
    }

    fn echo(status: StatusCode, body: &Value) -> Response<Body> {
        Response::builder()
            .status(status)
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn create_posts_to_the_document_collection() {
        let (api, handle) = testcontext();
        let deploy = json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "web", "namespace": "default"},
        });
        let expected = deploy.clone();
        let server = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::POST);
            assert_eq!(request.uri(), "/apis/apps/v1/namespaces/default/deployments");
            let body = request.into_body().collect_bytes().await.unwrap();
            let sent: Value = serde_json::from_slice(&body).unwrap();
            assert_json_eq!(sent, expected);
            send.send_response(echo(StatusCode::CREATED, &sent));
        });

        let created = api.create(&deploy).await.unwrap();
        assert_eq!(created["metadata"]["name"], "web");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn update_and_status_use_the_document_name() {
        let (api, handle) = testcontext();
        let pod = json!({"apiVersion": "v1", "kind": "Pod", "metadata": {"name": "p", "namespace": "ns"}});
        let server = tokio::spawn(async move {
            pin_mut!(handle);
            for expected in ["/api/v1/namespaces/ns/pods/p", "/api/v1/namespaces/ns/pods/p/status"] {
                let (request, send) = handle.next_request().await.expect("service not called");
                assert_eq!(request.method(), Method::PUT);
                assert_eq!(request.uri(), expected);
                send.send_response(echo(StatusCode::OK, &json!({})));
            }
        });

        api.update(&pod).await.unwrap();
        api.update_status(&pod).await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn documents_without_namespace_target_the_cluster() {
        let (api, handle) = testcontext();
        let node = json!({"apiVersion": "v1", "kind": "Node", "metadata": {"name": "n1"}});
        let server = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.uri(), "/api/v1/nodes");
            send.send_response(echo(StatusCode::CREATED, &json!({})));
        });
        api.create(&node).await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn document_without_name_fails_before_sending() {
        let (api, _handle) = testcontext();
        let pod = json!({"apiVersion": "v1", "kind": "Pod", "metadata": {}});
        let err = api.update(&pod).await.unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }

    #[tokio::test]
    async fn get_delete_and_list_resolve_short_kinds() {
        let (api, handle) = testcontext();
        let server = tokio::spawn(async move {
            pin_mut!(handle);
            let expected = [
                (Method::GET, "/apis/apps/v1/namespaces/prod/deployments/web"),
                (Method::DELETE, "/api/v1/namespaces/prod/pods/p"),
                (Method::GET, "/api/v1/nodes"),
                (Method::GET, "/api/v1/namespaces/prod/pods?labelSelector=app%3Dweb,tier%3Dfront"),
                (Method::GET, "/api/v1/pods?fieldSelector=spec.nodeName%3Dn1"),
            ];
            for (method, uri) in expected {
                let (request, send) = handle.next_request().await.expect("service not called");
                assert_eq!(request.method(), method);
                assert_eq!(request.uri(), uri);
                send.send_response(echo(StatusCode::OK, &json!({"items": []})));
            }
        });

        api.get("Deployment", "prod", "web").await.unwrap();
        api.delete("Pod", "prod", "p").await.unwrap();
        api.list("Node", "prod").await.unwrap();
        api.list_with_labels("Pod", "prod", [("tier", "front"), ("app", "web")])
            .await
            .unwrap();
        api.list_with_fields("Pod", "", [("spec.nodeName", "n1")])
            .await
            .unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn ambiguous_kind_lists_candidates() {
        let (api, _handle) = testcontext();
        let err = api.get("ConfigMap", "default", "cm").await.unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, Error::Kind(_)));
        assert!(msg.contains("ConfigMap, example.io.ConfigMap"), "{msg}");

        assert!(matches!(
            api.get("Ghost", "default", "g").await,
            Err(Error::Kind(_))
        ));
    }

    #[tokio::test]
    async fn bind_posts_a_binding() {
        let (api, handle) = testcontext();
        let pod = json!({"apiVersion": "v1", "kind": "Pod", "metadata": {"name": "p", "namespace": "ns"}});
        let server = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::POST);
            assert_eq!(request.uri(), "/api/v1/namespaces/ns/pods/p/binding");
            let body = request.into_body().collect_bytes().await.unwrap();
            let sent: Value = serde_json::from_slice(&body).unwrap();
            assert_json_eq!(
                sent,
                json!({
                    "apiVersion": "v1",
                    "kind": "Binding",
                    "metadata": {"name": "p", "namespace": "ns"},
                    "target": {"apiVersion": "v1", "kind": "Node", "name": "worker-1"}
                })
            );
            send.send_response(echo(StatusCode::CREATED, &json!({"kind": "Status", "status": "Success"})));
        });
        api.bind(&pod, "worker-1").await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn not_found_keeps_the_status() {
        let (api, handle) = testcontext();
        let server = tokio::spawn(async move {
            pin_mut!(handle);
            let (_request, send) = handle.next_request().await.expect("service not called");
            send.send_response(echo(
                StatusCode::NOT_FOUND,
                &json!({
                    "kind": "Status",
                    "apiVersion": "v1",
                    "status": "Failure",
                    "message": "pods \"missing\" not found",
                    "reason": "NotFound",
                    "code": 404
                }),
            ));
        });
        let err = api.get("Pod", "default", "missing").await.unwrap_err();
        assert!(err.to_string().contains("404"), "{err}");
        assert!(matches!(err, Error::Api(ref ae) if ae.reason == "NotFound"));
        server.await.unwrap();
    }
}
