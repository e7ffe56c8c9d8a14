use crate::error::{Error, Result};
use hyper::body::HttpBody;
use hyper::header::CONTENT_LENGTH;
use hyper::{Body, Request as HyperRequest};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Request {
    pub method: String,
    pub uri: String,
    pub headers: HashMap<String, String>,
    pub params: HashMap<String, String>,
    body_bytes: Vec<u8>,
}

impl Request {
    /// Build a request by hand, mostly useful in tests
    pub fn new(method: &str, uri: &str) -> Self {
        Request {
            method: method.to_uppercase(),
            uri: uri.to_string(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body_bytes = body.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Convert a hyper request, buffering at most `max_body_size` body bytes
    pub async fn from_hyper(req: HyperRequest<Body>, max_body_size: usize) -> Result<Self> {
        let (parts, body) = req.into_parts();

        let declared = parts
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > max_body_size) {
            return Err(Error::PayloadTooLarge(max_body_size));
        }

        let mut headers = HashMap::new();
        for (name, value) in &parts.headers {
            if let Ok(value_str) = value.to_str() {
                headers.insert(name.to_string(), value_str.to_string());
            }
        }

        let body_bytes = Self::read_body(body, max_body_size).await?;

        Ok(Request {
            method: parts.method.to_string(),
            uri: parts.uri.to_string(),
            headers,
            params: HashMap::new(), // filled by the router
            body_bytes,
        })
    }

    // Content-Length can be absent or wrong, so count while reading too
    async fn read_body(mut body: Body, limit: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        while let Some(chunk) = body.data().await {
            let chunk = chunk?;
            if bytes.len() + chunk.len() > limit {
                return Err(Error::PayloadTooLarge(limit));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    pub fn body_as_json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body_bytes).map_err(Error::Json)
    }

    pub fn body_as_string(&self) -> String {
        String::from_utf8_lossy(&self.body_bytes).to_string()
    }

    /// Request path without the query string
    pub fn path(&self) -> &str {
        match self.uri.find('?') {
            Some(idx) => &self.uri[..idx],
            None => &self.uri,
        }
    }

    /// Route parameter, percent-decoded
    pub fn param(&self, name: &str) -> Option<String> {
        self.params
            .get(name)
            .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_path_strips_query() {
        let req = Request::new("get", "/api/users?verbose=1&x=a%20b");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path(), "/api/users");
    }

    #[test]
    fn test_param_is_percent_decoded() {
        let mut req = Request::new("GET", "/api/users/a%2Db");
        req.params.insert("id".into(), "a%2Db".into());
        assert_eq!(req.param("id").as_deref(), Some("a-b"));
        assert_eq!(req.param("missing"), None);
    }

    #[test]
    fn test_body_as_json() {
        let req = Request::new("POST", "/").with_body(r#"{"name":"x"}"#);
        let value: Value = req.body_as_json().unwrap();
        assert_eq!(value["name"], "x");

        let bad = Request::new("POST", "/").with_body("not json");
        assert!(matches!(bad.body_as_json::<Value>(), Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_from_hyper() {
        let hyper_req = HyperRequest::builder()
            .method("PUT")
            .uri("/api/users/1?q=2")
            .header("Content-Type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let req = Request::from_hyper(hyper_req, 1024).await.unwrap();
        assert_eq!(req.method, "PUT");
        assert_eq!(req.path(), "/api/users/1");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body_as_string(), "{}");
    }

    #[tokio::test]
    async fn test_from_hyper_rejects_declared_oversized_body() {
        let hyper_req = HyperRequest::builder()
            .method("POST")
            .uri("/api/users")
            .header("Content-Length", "2048")
            .body(Body::from(vec![b'a'; 2048]))
            .unwrap();

        let err = Request::from_hyper(hyper_req, 1024).await.unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge(1024)));
        assert_eq!(err.status_code(), 413);
    }

    #[tokio::test]
    async fn test_from_hyper_counts_streamed_body() {
        let (mut sender, body) = Body::channel();
        tokio::spawn(async move {
            for _ in 0..4 {
                if sender.send_data(vec![b'x'; 400].into()).await.is_err() {
                    break;
                }
            }
        });

        // No Content-Length: the limit is enforced while reading
        let hyper_req = HyperRequest::builder()
            .method("POST")
            .uri("/api/users")
            .body(body)
            .unwrap();

        let err = Request::from_hyper(hyper_req, 1024).await.unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge(_)));

        let small = HyperRequest::builder()
            .method("POST")
            .uri("/api/users")
            .body(Body::from(vec![b'x'; 1024]))
            .unwrap();
        let req = Request::from_hyper(small, 1024).await.unwrap();
        assert_eq!(req.body_as_string().len(), 1024);
    }
}
