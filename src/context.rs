use crate::app::AppState;
use crate::config::AppConfig;
use crate::error::Result;
use crate::http::{Request, Response};
use crate::models::UserRepository;
use hyper::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Per-request state handed to route handlers
///
/// Handlers read from `req` and leave their answer in `res`.
pub struct Context {
    pub req: Request,
    pub res: Option<Response>,
    state: Arc<AppState>,
}

impl Context {
    pub fn new(request: Request, state: Arc<AppState>) -> Self {
        Self {
            req: request,
            res: None,
            state,
        }
    }

    pub fn users(&self) -> &UserRepository {
        &self.state.users
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.config
    }

    /// Route parameter, empty when the route has none by that name
    pub fn param(&self, name: &str) -> String {
        self.req.param(name).unwrap_or_default()
    }

    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T> {
        self.req.body_as_json()
    }

    pub fn set_response(&mut self, response: Response) {
        self.res = Some(response);
    }

    pub fn take_response(&mut self) -> Option<Response> {
        self.res.take()
    }

    pub fn json<T: Serialize>(&mut self, data: T) -> Result<()> {
        self.json_with_status(StatusCode::OK, data)
    }

    pub fn json_with_status<T: Serialize>(&mut self, status: StatusCode, data: T) -> Result<()> {
        self.set_response(Response::json_with_status(status, data)?);
        Ok(())
    }

    /// `{"success": true}`
    pub fn success(&mut self) -> Result<()> {
        self.set_response(Response::success());
        Ok(())
    }

    pub fn html(&mut self, content: impl Into<Vec<u8>>) -> Result<()> {
        self.set_response(Response::html(content));
        Ok(())
    }

    pub fn text(&mut self, status: StatusCode, content: impl Into<String>) -> Result<()> {
        self.set_response(Response::text(content).with_status(status));
        Ok(())
    }
}
