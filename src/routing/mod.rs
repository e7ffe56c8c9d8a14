pub mod router;

use crate::context::Context;
use crate::error::Result;
pub use router::{RouteMatch, Router};
use std::future::Future;
use std::pin::Pin;

// Route handlers write their response into the Context
pub type RouteHandler =
    for<'a> fn(&'a mut Context) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

pub struct Route {
    pub method: String,
    pub path: String,
    pub handler: RouteHandler,
}

impl Route {
    pub fn new(method: &str, path: &str, handler: RouteHandler) -> Self {
        Self {
            method: method.to_uppercase(),
            path: path.to_string(),
            handler,
        }
    }

    pub fn get(path: &str, handler: RouteHandler) -> Self {
        Self::new("GET", path, handler)
    }

    pub fn post(path: &str, handler: RouteHandler) -> Self {
        Self::new("POST", path, handler)
    }

    pub fn put(path: &str, handler: RouteHandler) -> Self {
        Self::new("PUT", path, handler)
    }

    pub fn delete(path: &str, handler: RouteHandler) -> Self {
        Self::new("DELETE", path, handler)
    }
}

/// Build a `Vec<Route>` from `METHOD "/path" => handler` lines.
///
/// ```rust,ignore
/// pub fn install() -> Vec<Route> {
///     routes![
///         GET "/api/users" => list,
///         POST "/api/users" => create,
///     ]
/// }
/// ```
#[macro_export]
macro_rules! routes {
    ($($method:ident $path:literal => $handler:expr),* $(,)?) => {
        vec![
            $(
                $crate::routing::Route::new(
                    stringify!($method),
                    $path,
                    |ctx| Box::pin(async move { $handler(ctx).await })
                )
            ),*
        ]
    };
}
