//! Decorator composition.

use std::sync::Arc;

use crate::routing::handler::BoxHandler;

/// A function that wraps a handler in another handler.
pub type Decorator = Arc<dyn Fn(BoxHandler) -> BoxHandler + Send + Sync>;

pub fn decorator<F>(f: F) -> Decorator
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Apply `decorators` to `handler`, last entry innermost.
///
/// `compose(&[a, b], h)` is `a(b(h))`: `a` runs first on the way in and last
/// on the way out.
pub fn compose(decorators: &[Decorator], handler: BoxHandler) -> BoxHandler {
    decorators
        .iter()
        .rev()
        .fold(handler, |inner, decorate| decorate(inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::Request;
    use crate::http::response::Reply;
    use crate::routing::handler::boxed;
    use axum::body::Bytes;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    fn tracing_decorator(log: Arc<Mutex<Vec<String>>>, key: &'static str) -> Decorator {
        decorator(move |inner: BoxHandler| -> BoxHandler {
            let log = log.clone();
            Arc::new(move |request: &mut Request| {
                log.lock().unwrap().push(format!("enter {key}"));
                let reply = inner(request);
                log.lock().unwrap().push(format!("exit {key}"));
                reply
            })
        })
    }

    #[test]
    fn test_first_decorator_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = boxed(|_: &mut Request| json!("ok"));
        let composed = compose(
            &[
                tracing_decorator(log.clone(), "a"),
                tracing_decorator(log.clone(), "b"),
            ],
            handler,
        );

        let raw = axum::http::Request::builder().uri("/").body(Bytes::new()).unwrap();
        let reply = composed(&mut Request::new(raw)).unwrap();
        assert!(matches!(reply, Reply::Data(Value::String(ref s)) if s == "ok"));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["enter a", "enter b", "exit b", "exit a"]
        );
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let handler = boxed(|_: &mut Request| json!(1));
        let composed = compose(&[], handler.clone());
        assert!(Arc::ptr_eq(&handler, &composed));
    }
}
