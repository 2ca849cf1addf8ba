mod common;

use std::time::{Duration, Instant};

use apirouter::config::ServerConfig;
use apirouter::http::server::mount;
use apirouter::http::text;
use apirouter::{HttpServer, MountError, Request, Router};
use axum::body::Body;
use axum::http::{Method, StatusCode};
use common::{app, body_bytes, call, send_body, BODY_LIMIT};
use tower::ServiceExt;

#[test]
fn test_conflicting_captures_are_rejected() {
    let mut router = Router::new();
    router.get("items/{id}").handle(|_: &mut Request| text("by id"));
    router.get("items/{slug}").handle(|_: &mut Request| text("by slug"));

    let err = mount(&router.urls(), BODY_LIMIT).unwrap_err();
    assert!(
        matches!(err, MountError::Conflict { ref path, .. } if path == "/items/{slug}"),
        "{err}"
    );
}

#[test]
fn test_colon_segment_is_rejected() {
    let mut router = Router::new();
    router.get("users/:id").handle(|_: &mut Request| text("user"));

    let err = mount(&router.urls(), BODY_LIMIT).unwrap_err();
    assert_eq!(
        err,
        MountError::InvalidSegment {
            path: "/users/:id".into(),
            segment: ":id".into(),
        }
    );
}

#[test]
fn test_server_reports_mount_errors() {
    let mut router = Router::new();
    router.get("users/:id").handle(|_: &mut Request| text("user"));
    assert!(HttpServer::new(router.urls(), ServerConfig::default()).is_err());
}

#[tokio::test]
async fn test_duplicate_path_keeps_first_binding() {
    let mut inner = Router::new();
    inner.get("dup").handle(|_: &mut Request| text("inner"));

    let mut router = Router::new();
    router.get("dup").handle(|_: &mut Request| text("outer"));
    router.include_router(inner, None).unwrap();
    assert_eq!(router.urls().resolve().len(), 2);

    let app = app(&router);
    assert_eq!(
        call(&app, Method::GET, "/dup").await,
        (StatusCode::OK, b"outer".to_vec())
    );
}

#[tokio::test]
async fn test_body_over_limit() {
    let mut router = Router::new();
    router
        .post("upload")
        .handle(|request: &mut Request| text(format!("{} bytes", request.body().len())));
    let app = app(&router);

    let response = send_body(&app, Method::POST, "/upload", None, vec![0u8; BODY_LIMIT + 1]).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let response = send_body(&app, Method::POST, "/upload", None, vec![0u8; 16]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"16 bytes");
}

#[tokio::test]
async fn test_blocking_handler_times_out() {
    let mut router = Router::new();
    router.get("slow").handle(|_: &mut Request| {
        std::thread::sleep(Duration::from_secs(3));
        text("late")
    });
    let config = ServerConfig {
        request_timeout_secs: 1,
        ..ServerConfig::default()
    };
    let server = HttpServer::new(router.urls(), config).unwrap();

    let start = Instant::now();
    let response = server
        .router()
        .oneshot(
            axum::http::Request::builder()
                .uri("/slow")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(start.elapsed() < Duration::from_millis(2500), "{:?}", start.elapsed());
}
