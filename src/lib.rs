//! Userboard - a small user directory service
//!
//! Userboard exposes a JSON CRUD API over user records and serves a static
//! dashboard page:
//! - `/api/users` list and create
//! - `/api/users/{id}` fetch, replace and delete
//! - `/` the dashboard HTML
//!
//! Records live in a pluggable document store (Redis or in-memory).

#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod app;
pub mod cli;
pub mod config;
pub mod context;
pub mod controllers;
pub mod error;
pub mod http;
pub mod models;
pub mod routing;
pub mod store;

pub use app::App;
pub use config::AppConfig;
pub use context::Context;
pub use error::{Error, Result};
pub use http::{Request, Response};
pub use routing::{Route, RouteHandler};
