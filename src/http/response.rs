use crate::error::Result;
use hyper::StatusCode;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn json<T: Serialize>(data: T) -> Result<Self> {
        Self::json_with_status(StatusCode::OK, data)
    }

    pub fn json_with_status<T: Serialize>(status: StatusCode, data: T) -> Result<Self> {
        let json_string = serde_json::to_string(&data)?;
        Ok(Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(json_string.into_bytes()))
    }

    /// JSON error body: `{"error": "<message>"}`
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = json!({ "error": message }).to_string();
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(body.into_bytes())
    }

    /// `{"success": true}`
    pub fn success() -> Self {
        Self::ok()
            .with_header("Content-Type", "application/json")
            .with_body(b"{\"success\":true}".to_vec())
    }

    /// HTML body, sent as given without re-encoding
    pub fn html(content: impl Into<Vec<u8>>) -> Self {
        Self::ok()
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(content.into())
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::ok()
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(content.into().into_bytes())
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_as_string(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn into_hyper(self) -> hyper::Response<hyper::Body> {
        let mut builder = hyper::Response::builder().status(self.status);

        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        builder
            .body(hyper::Body::from(self.body))
            .unwrap_or_else(|_| hyper::Response::new(hyper::Body::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let res = Response::error(StatusCode::NOT_FOUND, "User not found");
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.body_as_string(), r#"{"error":"User not found"}"#);
    }

    #[test]
    fn test_json_with_status() {
        let res = Response::json_with_status(StatusCode::CREATED, json!({"a": 1})).unwrap();
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body_as_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_success_body() {
        let body: serde_json::Value = serde_json::from_slice(&Response::success().body).unwrap();
        assert_eq!(body, json!({"success": true}));
    }

    #[test]
    fn test_into_hyper_keeps_status_and_headers() {
        let res = Response::html("<h1>hi</h1>").into_hyper();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
    }
}
