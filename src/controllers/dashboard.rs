use crate::context::Context;
use crate::error::Result;
use crate::routes;
use crate::routing::Route;
use hyper::StatusCode;
use std::io::ErrorKind;

pub const MISSING_DASHBOARD_MESSAGE: &str = "Error: Dashboard HTML file not found";

pub fn install() -> Vec<Route> {
    routes![
        GET "/" => index,
    ]
}

/// Serve the dashboard page, read from disk on every request so edits show
/// up without a restart
async fn index(ctx: &mut Context) -> Result<()> {
    let path = ctx.config().dashboard.path.clone();

    match tokio::fs::read(&path).await {
        Ok(html) => ctx.html(html),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::error!("Dashboard file {} not found", path);
            ctx.text(StatusCode::INTERNAL_SERVER_ERROR, MISSING_DASHBOARD_MESSAGE)
        }
        Err(e) => Err(e.into()),
    }
}
