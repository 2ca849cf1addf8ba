//! End-to-end over a real socket.

use apirouter::config::ServerConfig;
use apirouter::{demo, HttpServer, Shutdown};
use tokio::net::TcpListener;

#[tokio::test]
async fn test_serves_demo_app_until_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let urls = demo::app().unwrap().urls();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(urls, ServerConfig::default()).unwrap();
    let handle = tokio::spawn(server.run(listener, shutdown.signalled()));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/method"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "GET /method");

    let response = client
        .delete(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 405);
    assert_eq!(response.headers()["allow"], "GET, POST");

    let response = client
        .get(format!("http://{addr}/inner/7/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "GET /inner/7/");

    drop(client);
    shutdown.trigger();
    handle.await.unwrap().unwrap();
}
