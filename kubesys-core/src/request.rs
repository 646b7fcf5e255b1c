//! Request builder type for arbitrary api types
use thiserror::Error;

use crate::params::{ListParams, WatchParams};

/// Possible errors when building a request.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to build a request.
    #[error("failed to build request: {0}")]
    BuildRequest(#[source] http::Error),

    /// Failed to validate request.
    #[error("failed to validate request: {0}")]
    Validation(String),
}

/// A Kubernetes request builder
///
/// Takes a collection url path (as produced by [`KindRegistry::url_for`](crate::KindRegistry::url_for))
/// and supplies constructors for the operations the client performs.
/// All of them return `http::Request` objects with a path-only uri; the client joins it to the server url.
#[derive(Debug, Clone)]
pub struct Request {
    /// The path component of a url
    pub url_path: String,
}

impl Request {
    /// New request with a resource's url path
    pub fn new<S: Into<String>>(url_path: S) -> Self {
        Self {
            url_path: url_path.into(),
        }
    }

    fn object_path(&self, name: &str) -> Result<String, Error> {
        if name.is_empty() {
            return Err(Error::Validation("A non-empty name is required".into()));
        }
        Ok(format!("{}/{}", self.url_path, name))
    }
}

/// Convenience methods found from API conventions
impl Request {
    /// List a collection of a resource
    pub fn list(&self, lp: &ListParams) -> Result<http::Request<Vec<u8>>, Error> {
        let mut query = vec![];
        lp.populate_qp(&mut query);
        let target = if query.is_empty() {
            self.url_path.clone()
        } else {
            format!("{}?{}", self.url_path, query.join("&"))
        };
        let req = http::Request::get(target);
        req.body(vec![]).map_err(Error::BuildRequest)
    }

    /// Watch a collection
    ///
    /// The url path must be the watch path of the collection.
    pub fn watch(&self, wp: &WatchParams) -> Result<http::Request<Vec<u8>>, Error> {
        self.watch_path(self.url_path.clone(), wp)
    }

    /// Watch a single named object of a collection
    pub fn watch_object(&self, name: &str, wp: &WatchParams) -> Result<http::Request<Vec<u8>>, Error> {
        self.watch_path(self.object_path(name)?, wp)
    }

    fn watch_path(&self, path: String, wp: &WatchParams) -> Result<http::Request<Vec<u8>>, Error> {
        if wp.timeout_seconds == 0 {
            return Err(Error::Validation("WatchParams::timeout_seconds must be positive".into()));
        }
        let mut query = vec!["watch=true".to_string(), format!("timeoutSeconds={}", wp.timeout_seconds)];
        wp.list.populate_qp(&mut query);
        let req = http::Request::get(format!("{path}?{}", query.join("&")));
        req.body(vec![]).map_err(Error::BuildRequest)
    }

    /// Get a single instance
    pub fn get(&self, name: &str) -> Result<http::Request<Vec<u8>>, Error> {
        let req = http::Request::get(self.object_path(name)?);
        req.body(vec![]).map_err(Error::BuildRequest)
    }

    /// Create an instance of a resource
    pub fn create(&self, data: Vec<u8>) -> Result<http::Request<Vec<u8>>, Error> {
        let req = http::Request::post(&self.url_path);
        req.body(data).map_err(Error::BuildRequest)
    }

    /// Replace an instance of a resource
    pub fn replace(&self, name: &str, data: Vec<u8>) -> Result<http::Request<Vec<u8>>, Error> {
        let req = http::Request::put(self.object_path(name)?);
        req.body(data).map_err(Error::BuildRequest)
    }

    /// Replace the status subresource of an instance
    pub fn replace_status(&self, name: &str, data: Vec<u8>) -> Result<http::Request<Vec<u8>>, Error> {
        self.replace_subresource("status", name, data)
    }

    /// Delete an instance of a resource
    pub fn delete(&self, name: &str) -> Result<http::Request<Vec<u8>>, Error> {
        let req = http::Request::delete(self.object_path(name)?);
        req.body(vec![]).map_err(Error::BuildRequest)
    }

    /// Post a `Binding` to the binding subresource of a pod
    pub fn bind(&self, name: &str, data: Vec<u8>) -> Result<http::Request<Vec<u8>>, Error> {
        let target = format!("{}/binding", self.object_path(name)?);
        let req = http::Request::post(target);
        req.body(data).map_err(Error::BuildRequest)
    }

    fn replace_subresource(
        &self,
        subresource: &str,
        name: &str,
        data: Vec<u8>,
    ) -> Result<http::Request<Vec<u8>>, Error> {
        let target = format!("{}/{subresource}", self.object_path(name)?);
        let req = http::Request::put(target);
        req.body(data).map_err(Error::BuildRequest)
    }
}

#[cfg(test)]
mod test {
    use super::Request;
    use crate::params::{ListParams, WatchParams};
    use http::Method;

    #[test]
    fn object_urls() {
        let req = Request::new("/api/v1/namespaces/ns/pods");
        let get = req.get("mypod").unwrap();
        assert_eq!(get.uri(), "/api/v1/namespaces/ns/pods/mypod");
        assert_eq!(get.method(), Method::GET);

        let status = req.replace_status("mypod", b"{}".to_vec()).unwrap();
        assert_eq!(status.uri(), "/api/v1/namespaces/ns/pods/mypod/status");
        assert_eq!(status.method(), Method::PUT);

        let bind = req.bind("mypod", b"{}".to_vec()).unwrap();
        assert_eq!(bind.uri(), "/api/v1/namespaces/ns/pods/mypod/binding");
        assert_eq!(bind.method(), Method::POST);

        let del = req.delete("mypod").unwrap();
        assert_eq!(del.method(), Method::DELETE);

        let create = req.create(b"{}".to_vec()).unwrap();
        assert_eq!(create.uri(), "/api/v1/namespaces/ns/pods");
        assert_eq!(create.body(), b"{}");
    }

    #[test]
    fn empty_names_are_rejected() {
        let req = Request::new("/api/v1/nodes");
        assert!(req.get("").is_err());
        assert!(req.delete("").is_err());
    }

    #[test]
    fn list_with_selectors() {
        let req = Request::new("/api/v1/namespaces/default/pods");
        assert_eq!(
            req.list(&ListParams::default()).unwrap().uri(),
            "/api/v1/namespaces/default/pods"
        );
        let lp = ListParams::default().labels([("app", "nginx")]);
        assert_eq!(
            req.list(&lp).unwrap().uri(),
            "/api/v1/namespaces/default/pods?labelSelector=app%3Dnginx"
        );
        let lp = ListParams::default().fields([("spec.nodeName", "n1"), ("status.phase", "Running")]);
        assert_eq!(
            req.list(&lp).unwrap().uri(),
            "/api/v1/namespaces/default/pods?fieldSelector=spec.nodeName%3Dn1,status.phase%3DRunning"
        );
    }

    #[test]
    fn watch_urls() {
        let req = Request::new("/api/v1/watch/namespaces/default/pods");
        assert_eq!(
            req.watch(&WatchParams::default()).unwrap().uri(),
            "/api/v1/watch/namespaces/default/pods?watch=true&timeoutSeconds=315360000"
        );
        assert_eq!(
            req.watch_object("web", &WatchParams::default().timeout(60)).unwrap().uri(),
            "/api/v1/watch/namespaces/default/pods/web?watch=true&timeoutSeconds=60"
        );
        assert!(req.watch(&WatchParams::default().timeout(0)).is_err());
    }
}
