pub mod dashboard;
pub mod users;

use crate::routing::Route;

/// Every route the service answers
pub fn install() -> Vec<Route> {
    let mut routes = dashboard::install();
    routes.extend(users::install());
    routes
}
