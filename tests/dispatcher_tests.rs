//! Tests for the dispatcher and the CORS middleware running inside it
//!
//! # Test Coverage
//!
//! - Middleware ordering and short-circuiting
//! - Handler skipped for invalid origins and preflights
//! - CORS headers surviving into handler responses
//! - Route policies (`Disabled`, `Custom`)
//! - Static-resource CORS middleware
//! - Headers-already-sent logging

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use brrtrouter_cors::cors::{
    CorsPolicyApplier, CorsPolicyOverrides, RouteCorsPolicy, StaticResourceCors,
};
use brrtrouter_cors::dispatcher::{
    Dispatcher, HandlerRequest, HandlerResponse, HeaderVec, PipelineAction,
};
use brrtrouter_cors::middleware::{
    CorsMiddleware, Middleware, StaticResourceCorsMiddleware, TracingMiddleware,
};
use common::logs::CapturedLogs;
use http::Method;
use serde_json::json;
use smallvec::smallvec;

fn request(method: Method, path: &str, handler: &str, headers: &[(&str, &str)]) -> HandlerRequest {
    let headers: HeaderVec = headers
        .iter()
        .map(|(k, v)| (Arc::from(*k), v.to_string()))
        .collect();
    HandlerRequest::new(method, &format!("http://api.local{path}"), handler, headers)
}

/// Dispatcher with one CORS middleware and a handler that counts its calls.
fn dispatcher_with(cors: CorsMiddleware) -> (Dispatcher, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_middleware(Arc::new(cors));
    for name in ["list_pets", "admin_settings", "upload_file"] {
        let counter = counter.clone();
        dispatcher.register_handler(name, move |_req, res| {
            counter.fetch_add(1, Ordering::SeqCst);
            res.status = 201;
            res.body = json!({ "ok": true });
        });
    }
    (dispatcher, calls)
}

fn restricted_cors() -> CorsMiddleware {
    CorsMiddleware::new(
        CorsPolicyApplier::new(),
        CorsPolicyOverrides::none()
            .allowed_origins(&["http://app.local"])
            .exposed_headers(&["X-Total-Count"]),
    )
}

#[test]
fn test_simple_request_reaches_handler_with_cors_headers() {
    let (dispatcher, calls) = dispatcher_with(restricted_cors());
    let req = request(Method::GET, "/pets", "list_pets", &[("Origin", "http://app.local")]);
    let res = dispatcher.dispatch(&req);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(res.status, 201);
    assert_eq!(res.get_header("access-control-allow-origin"), Some("http://app.local"));
    assert_eq!(res.get_header("Access-Control-Allow-Credentials"), Some("true"));
    assert_eq!(res.get_header("Access-Control-Expose-Headers"), Some("X-Total-Count"));
    assert_eq!(res.header_values("Vary"), vec!["Origin"]);
}

#[test]
fn test_invalid_origin_skips_handler() {
    let (dispatcher, calls) = dispatcher_with(restricted_cors());
    let req = request(Method::GET, "/pets", "list_pets", &[("Origin", "http://evil.local")]);
    let res = dispatcher.dispatch(&req);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::Value::Null);
    assert!(res.headers.is_empty());
}

#[test]
fn test_preflight_skips_handler() {
    let (dispatcher, calls) = dispatcher_with(restricted_cors());
    let req = request(
        Method::OPTIONS,
        "/pets",
        "list_pets",
        &[
            ("Origin", "http://app.local"),
            ("Access-Control-Request-Method", "POST"),
            ("Access-Control-Request-Headers", "Content-Type"),
        ],
    );
    let res = dispatcher.dispatch(&req);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("Access-Control-Allow-Headers"), Some("Content-Type"));
    assert_eq!(res.get_header("Access-Control-Max-Age"), Some("86400"));
    assert!(res
        .get_header("Access-Control-Allow-Methods")
        .is_some_and(|m| m.contains("OPTIONS")));
}

#[test]
fn test_same_origin_and_no_origin_pass_through_untouched() {
    let (dispatcher, calls) = dispatcher_with(restricted_cors());
    for req in [
        request(Method::GET, "/pets", "list_pets", &[]),
        request(Method::GET, "/pets", "list_pets", &[("Origin", "http://api.local")]),
    ] {
        let res = dispatcher.dispatch(&req);
        assert_eq!(res.status, 201);
        assert!(res.headers.is_empty());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_disabled_route_gets_no_cors_headers() {
    let mut routes = HashMap::new();
    routes.insert("admin_settings".to_string(), RouteCorsPolicy::Disabled);
    let (dispatcher, calls) = dispatcher_with(restricted_cors().with_route_policies(routes));

    // even an unauthorized origin is not short-circuited on a disabled route
    let req = request(
        Method::GET,
        "/admin/settings",
        "admin_settings",
        &[("Origin", "http://evil.local")],
    );
    let res = dispatcher.dispatch(&req);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(res.status, 201);
    assert!(res.get_header("Access-Control-Allow-Origin").is_none());
}

#[test]
fn test_custom_route_policy_applies_only_to_its_handler() {
    let mut routes = HashMap::new();
    routes.insert(
        "upload_file".to_string(),
        RouteCorsPolicy::Custom(
            CorsPolicyOverrides::none().allowed_origins(&["http://uploader.local"]),
        ),
    );
    let (dispatcher, _) = dispatcher_with(restricted_cors().with_route_policies(routes));

    let upload = request(
        Method::POST,
        "/upload",
        "upload_file",
        &[("Origin", "http://uploader.local")],
    );
    let res = dispatcher.dispatch(&upload);
    assert_eq!(res.status, 201);
    assert_eq!(
        res.get_header("Access-Control-Allow-Origin"),
        Some("http://uploader.local")
    );
    // global exposed headers are inherited by the custom route
    assert_eq!(res.get_header("Access-Control-Expose-Headers"), Some("X-Total-Count"));

    let pets = request(Method::GET, "/pets", "list_pets", &[("Origin", "http://uploader.local")]);
    let res = dispatcher.dispatch(&pets);
    assert!(res.get_header("Access-Control-Allow-Origin").is_none());
}

#[test]
fn test_cors_headers_survive_missing_handler() {
    let (dispatcher, _) = dispatcher_with(restricted_cors());
    let req = request(Method::GET, "/nope", "not_registered", &[("Origin", "http://app.local")]);
    let res = dispatcher.dispatch(&req);
    assert_eq!(res.status, 404);
    assert_eq!(res.get_header("Access-Control-Allow-Origin"), Some("http://app.local"));
}

struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    action: PipelineAction,
}

impl Middleware for Recorder {
    fn before(&self, _req: &HandlerRequest, _res: &mut HandlerResponse) -> PipelineAction {
        self.log.lock().unwrap().push(format!("before:{}", self.name));
        self.action
    }

    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {
        self.log.lock().unwrap().push(format!("after:{}", self.name));
    }
}

#[test]
fn test_short_circuit_stops_chain_and_unwinds_after_hooks() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = Dispatcher::new();
    for (name, action) in [
        ("first", PipelineAction::Continue),
        ("second", PipelineAction::ShortCircuit),
        ("third", PipelineAction::Continue),
    ] {
        dispatcher.add_middleware(Arc::new(Recorder {
            name,
            log: log.clone(),
            action,
        }));
    }
    let handler_log = log.clone();
    dispatcher.register_handler("h", move |_req, _res| {
        handler_log.lock().unwrap().push("handler".to_string());
    });

    dispatcher.dispatch(&request(Method::GET, "/", "h", &[]));
    assert_eq!(
        *log.lock().unwrap(),
        vec!["before:first", "before:second", "after:second", "after:first"]
    );
}

#[test]
fn test_tracing_middleware_is_transparent() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    dispatcher.add_middleware(Arc::new(restricted_cors()));
    dispatcher.register_handler("list_pets", |_req, res| res.status = 204);

    let res = dispatcher.dispatch(&request(
        Method::GET,
        "/pets",
        "list_pets",
        &[("Origin", "http://app.local")],
    ));
    assert_eq!(res.status, 204);
    assert!(res.get_header("Access-Control-Allow-Origin").is_some());
}

/// Marks the response as flushed, like a streaming handler that ran earlier.
struct FlushHeaders;

impl Middleware for FlushHeaders {
    fn before(&self, _req: &HandlerRequest, res: &mut HandlerResponse) -> PipelineAction {
        res.headers_sent = true;
        PipelineAction::Continue
    }
}

#[test]
fn test_headers_already_sent_is_logged_by_middleware() {
    let logs = CapturedLogs::init();
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_middleware(Arc::new(FlushHeaders));
    dispatcher.add_middleware(Arc::new(restricted_cors()));
    dispatcher.register_handler("list_pets", |_req, _res| {});

    let simple = dispatcher.dispatch(&request(
        Method::GET,
        "/pets",
        "list_pets",
        &[("Origin", "http://app.local")],
    ));
    assert!(simple.headers.is_empty());

    let preflight = dispatcher.dispatch(&request(
        Method::OPTIONS,
        "/pets",
        "list_pets",
        &[
            ("Origin", "http://app.local"),
            ("Access-Control-Request-Method", "PUT"),
        ],
    ));
    assert!(preflight.headers.is_empty());

    assert_eq!(
        logs.levels_for("Headers already sent"),
        vec!["WARN".to_string(), "ERROR".to_string()]
    );
}

fn static_dispatcher() -> (Dispatcher, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_middleware(Arc::new(StaticResourceCorsMiddleware::new(
        StaticResourceCors::new(
            CorsPolicyApplier::new(),
            CorsPolicyOverrides::none().allow_credentials(false),
        ),
        vec!["/assets/".to_string()],
    )));
    dispatcher.register_handler("static", move |_req, res| {
        counter.fetch_add(1, Ordering::SeqCst);
        res.body = json!("console.log('hi')");
    });
    (dispatcher, calls)
}

#[test]
fn test_static_get_gets_cors_headers() {
    let (dispatcher, calls) = static_dispatcher();
    let res = dispatcher.dispatch(&request(
        Method::GET,
        "/assets/app.js",
        "static",
        &[("Origin", "http://app.local")],
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(res.get_header("Access-Control-Allow-Origin"), Some("*"));
}

#[test]
fn test_static_post_passes_through_untouched() {
    let (dispatcher, calls) = static_dispatcher();
    let res = dispatcher.dispatch(&request(
        Method::POST,
        "/assets/app.js",
        "static",
        &[("Origin", "http://app.local")],
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(res.headers.is_empty());
}

#[test]
fn test_static_preflight_ends_the_exchange() {
    let (dispatcher, calls) = static_dispatcher();
    let res = dispatcher.dispatch(&request(
        Method::OPTIONS,
        "/assets/app.js",
        "static",
        &[
            ("Origin", "http://app.local"),
            ("Access-Control-Request-Method", "GET"),
        ],
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(res.status, 200);
    assert!(res.get_header("Access-Control-Allow-Methods").is_some());
}

#[test]
fn test_static_middleware_ignores_other_paths() {
    let (dispatcher, calls) = static_dispatcher();
    let res = dispatcher.dispatch(&request(
        Method::GET,
        "/api/pets",
        "static",
        &[("Origin", "http://app.local")],
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(res.headers.is_empty());
}

#[test]
fn test_request_id_is_taken_from_header() {
    let id = brrtrouter_cors::ids::RequestId::new();
    let headers: HeaderVec = smallvec![(Arc::from("X-Request-ID"), id.to_string())];
    let req = HandlerRequest::new(Method::GET, "http://api.local/", "h", headers);
    assert_eq!(req.request_id, id);
}

#[test]
fn test_tracing_latency_saturates_instead_of_truncating() {
    let logs = CapturedLogs::init();
    let req = request(Method::GET, "/pets", "list_pets", &[]);
    let mut res = HandlerResponse::default();
    TracingMiddleware.after(&req, &mut res, Duration::MAX);

    let completed: Vec<_> = logs
        .events()
        .into_iter()
        .filter(|e| e["fields"]["message"] == "Request completed")
        .collect();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["fields"]["latency_ms"], json!(u64::MAX));
}
