//! Sample API served by the `apirouter` binary.
//!
//! ```text
//! /                   GET POST         root
//! /method             every verb       method
//! /inner/             GET POST         inner
//! /inner/{inner_id}/  GET              inner
//! /named/a, /named/b  GET              named (names "demo:a", "demo:b")
//! /named/xyz/{x,y,z}  GET              named (names "demo:xyz:x" ...)
//! ```

use axum::http::{HeaderName, HeaderValue, Method};

use crate::error::{Error, RouterError};
use crate::http::request::Request;
use crate::http::response::{text, Response, TextResponse};
use crate::routing::Router;

pub fn root() -> Router {
    let mut router = Router::new();
    router
        .route("/")
        .methods([Method::GET, Method::POST])
        .handle(|request: &mut Request| text(format!("{} /", request.method())));
    router
}

pub fn method() -> Router {
    let mut router = Router::new();
    router.get("/method").handle(|_: &mut Request| text("GET /method"));
    router.put("/method").handle(|_: &mut Request| text("PUT /method"));
    router.post("/method").handle(|_: &mut Request| text("POST /method"));
    router.delete("/method").handle(|_: &mut Request| text("DELETE /method"));
    router.options("/method").handle(|_: &mut Request| text("OPTIONS /method"));
    router.head("/method").handle(|_: &mut Request| {
        TextResponse::new("").header(
            HeaderName::from_static("content"),
            HeaderValue::from_static("HEAD /method"),
        )
    });
    router.patch("/method").handle(|_: &mut Request| text("PATCH /method"));
    router.trace("/method").handle(|_: &mut Request| text("TRACE /method"));
    router
}

pub fn inner() -> Router {
    let mut router = Router::new();
    router.get("/").handle(|_: &mut Request| text("GET /inner/"));
    router.post("/").handle(|_: &mut Request| text("POST /inner/"));
    router.get("/{inner_id}/").handle(inner_detail);
    router
}

fn inner_detail(request: &mut Request) -> Result<Response, Error> {
    let inner_id: u64 = request
        .path_param("inner_id")
        .and_then(|id| id.parse().ok())
        .ok_or(Error::NotFound)?;
    Ok(text(format!("GET /inner/{inner_id}/")))
}

pub fn named() -> Result<Router, RouterError> {
    let mut router = Router::new();
    router.get("/a").name("a").handle(|_: &mut Request| text("GET /named/a"));
    router.get("/b").name("b").handle(|_: &mut Request| text("GET /named/b"));

    let mut xyz = Router::named("xyz");
    xyz.get("/x").name("x").handle(|_: &mut Request| text("GET /named/xyz/x"));
    xyz.get("/y").name("y").handle(|_: &mut Request| text("GET /named/xyz/y"));
    xyz.get("/z").name("z").handle(|_: &mut Request| text("GET /named/xyz/z"));

    router.include_router(xyz, Some("xyz/"))?;
    Ok(router)
}

/// Every sample router mounted under one namespace, `"demo"`.
pub fn app() -> Result<Router, RouterError> {
    let mut router = Router::named("demo");
    router.include_router(root(), None)?;
    router.include_router(method(), None)?;
    router.include_router(inner(), Some("inner/"))?;
    router.include_router(named()?, Some("named/"))?;
    Ok(router)
}
