use crate::context::Context;
use crate::error::Result;
use crate::routes;
use crate::routing::Route;
use crate::store::Fields;
use hyper::StatusCode;

pub fn install() -> Vec<Route> {
    routes![
        GET    "/api/users"      => list,
        POST   "/api/users"      => create,
        GET    "/api/users/{id}" => show,
        PUT    "/api/users/{id}" => update,
        DELETE "/api/users/{id}" => remove,
    ]
}

async fn list(ctx: &mut Context) -> Result<()> {
    let users = ctx.users().list().await?;
    ctx.json(users)
}

async fn create(ctx: &mut Context) -> Result<()> {
    let fields: Fields = ctx.body_json()?;
    let user = ctx.users().create(fields).await?;
    ctx.json_with_status(StatusCode::CREATED, user)
}

async fn show(ctx: &mut Context) -> Result<()> {
    let id = ctx.param("id");
    let user = ctx.users().get(&id).await?;
    ctx.json(user)
}

// Body is parsed before the id is looked at, so malformed JSON is a 400 even
// for unknown ids
async fn update(ctx: &mut Context) -> Result<()> {
    let id = ctx.param("id");
    let fields: Fields = ctx.body_json()?;
    let user = ctx.users().update(&id, fields).await?;
    ctx.json(user)
}

async fn remove(ctx: &mut Context) -> Result<()> {
    let id = ctx.param("id");
    ctx.users().delete(&id).await?;
    ctx.success()
}
