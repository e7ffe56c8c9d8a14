use crate::config::AppConfig;
use crate::context::Context;
use crate::controllers;
use crate::error::{Error, Result};
use crate::http::{Request, Response, Server};
use crate::models::UserRepository;
use crate::routing::{Route, Router};
use crate::store::{self, DocumentStore};
use hyper::{Body, StatusCode};
use std::sync::Arc;
use std::time::Instant;

/// Shared, read-only state every request sees
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserRepository,
}

pub struct App {
    router: Router,
    state: Arc<AppState>,
}

impl App {
    /// Build the application around an already connected store
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        log::debug!("Using {} document store", store.backend_name());

        let state = Arc::new(AppState {
            config: Arc::new(config),
            users: UserRepository::new(store),
        });

        let mut app = Self {
            router: Router::new(),
            state,
        };
        app = app.routes(controllers::install());
        app
    }

    /// Connect the configured store and build the application
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let store = store::connect(&config.store).await?;
        Ok(Self::new(config, store))
    }

    pub fn routes(mut self, routes: Vec<Route>) -> Self {
        self.router.add_routes(routes);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.config
    }

    pub fn route_count(&self) -> usize {
        self.router.route_count()
    }

    pub async fn start(self) -> Result<()> {
        let addr = self.config().server_address();
        log::info!("Registered {} routes", self.route_count());
        Server::new(self).serve(&addr).await
    }

    pub async fn handle_hyper(&self, req: hyper::Request<Body>) -> hyper::Response<Body> {
        let max_body_size = self.config().server.max_body_size;
        let response = match Request::from_hyper(req, max_body_size).await {
            Ok(request) => self.handle(request).await,
            Err(e) => Self::error_response(&e),
        };
        response.into_hyper()
    }

    /// Run one request through routing and its handler. Never fails: every
    /// error becomes a JSON `{"error": ...}` response.
    pub async fn handle(&self, request: Request) -> Response {
        let started = Instant::now();
        let method = request.method.clone();
        let path = request.path().to_string();

        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => Self::error_response(&e),
        };

        log::info!(
            "{} {} {} {:.2}ms",
            method,
            path,
            response.status.as_u16(),
            started.elapsed().as_secs_f64() * 1000.0
        );

        response
    }

    async fn dispatch(&self, request: Request) -> Result<Response> {
        let Some(found) = self.router.match_route(&request.method, &request.uri) else {
            return Err(Error::RouteNotFound(request.path().to_string()));
        };

        let mut ctx = Context::new(request, Arc::clone(&self.state));
        ctx.req.params = found.params;

        (found.handler)(&mut ctx).await?;

        ctx.take_response().ok_or_else(|| {
            Error::internal(format!("Handler for {} set no response", ctx.req.path()))
        })
    }

    fn error_response(e: &Error) -> Response {
        let status =
            StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            log::error!("[{}] {}", e.error_code(), e);
        } else {
            log::debug!("[{}] {}", e.error_code(), e);
        }

        Response::error(status, &e.to_string())
    }
}
