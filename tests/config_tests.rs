//! Tests for loading YAML configuration files and building middleware from them

mod common;

use std::sync::Arc;

use brrtrouter_cors::config::CorsFileConfig;
use brrtrouter_cors::dispatcher::{Dispatcher, HandlerRequest, HeaderVec};
use brrtrouter_cors::runtime_config::RuntimeConfig;
use common::temp_files::create_temp_yaml;
use http::Method;
use smallvec::smallvec;

const PET_STORE_CONFIG: &str = r#"
cors:
  policy:
    allowed_origins: ["https://app.example.com"]
    allowed_methods: [GET, POST]
    exposed_headers: [X-Total-Count]
    max_age_seconds: 600
  routes:
    admin_settings: false
    upload_file:
      allowedHeaders: [Content-Type, X-Upload-Id]
static_resources:
  enabled: true
  path_prefixes: ["/assets/"]
  policy:
    allow_credentials: false
"#;

fn origin_request(method: Method, path: &str, handler: &str, extra: Option<(&str, &str)>) -> HandlerRequest {
    let mut headers: HeaderVec = smallvec![(Arc::from("Origin"), "https://app.example.com".to_string())];
    if let Some((k, v)) = extra {
        headers.push((Arc::from(k), v.to_string()));
    }
    HandlerRequest::new(method, &format!("https://api.example.com{path}"), handler, headers)
}

#[test]
fn test_load_from_file() {
    let file = create_temp_yaml(PET_STORE_CONFIG);
    let config = CorsFileConfig::load(file.path()).unwrap();
    assert_eq!(config.cors.routes.len(), 2);
    assert!(config.static_resources.enabled);
    assert_eq!(config.default_policy().max_age_seconds(), 600);
}

#[test]
fn test_missing_file_error_names_path() {
    let err = CorsFileConfig::load("/definitely/not/here/cors.yaml").unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here/cors.yaml"));
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let file = create_temp_yaml("cors: [this, is, not, a, mapping]\n");
    let err = CorsFileConfig::load(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("Invalid CORS config"));
}

#[test]
fn test_bad_method_is_rejected() {
    let file = create_temp_yaml("cors:\n  policy:\n    allowed_methods: [\"GE T\"]\n");
    assert!(CorsFileConfig::load(file.path()).is_err());
}

#[test]
fn test_runtime_config_points_at_file() {
    let file = create_temp_yaml(PET_STORE_CONFIG);
    let runtime = RuntimeConfig {
        config_path: Some(file.path().to_path_buf()),
        max_age_seconds: Some(30),
    };
    let config = CorsFileConfig::from_runtime(&runtime).unwrap();
    assert_eq!(config.default_policy().max_age_seconds(), 30);
    assert_eq!(config.cors.routes.len(), 2);
}

#[test]
fn test_runtime_config_without_file_uses_defaults() {
    let config = CorsFileConfig::from_runtime(&RuntimeConfig::default()).unwrap();
    assert_eq!(config, CorsFileConfig::default());
}

#[test]
fn test_configured_middleware_in_dispatcher() {
    let config = CorsFileConfig::from_yaml_str(PET_STORE_CONFIG).unwrap();
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_middleware(Arc::new(config.cors_middleware()));
    for name in ["list_pets", "admin_settings", "upload_file"] {
        dispatcher.register_handler(name, |_req, res| res.status = 201);
    }

    let res = dispatcher.dispatch(&origin_request(Method::GET, "/pets", "list_pets", None));
    assert_eq!(res.status, 201);
    assert_eq!(res.get_header("Access-Control-Expose-Headers"), Some("X-Total-Count"));

    let res = dispatcher.dispatch(&origin_request(Method::GET, "/admin", "admin_settings", None));
    assert!(res.get_header("Access-Control-Allow-Origin").is_none());

    let res = dispatcher.dispatch(&origin_request(
        Method::OPTIONS,
        "/upload",
        "upload_file",
        Some(("Access-Control-Request-Method", "POST")),
    ));
    assert_eq!(res.status, 200);
    assert_eq!(
        res.get_header("Access-Control-Allow-Headers"),
        Some("Content-Type, X-Upload-Id")
    );
    assert_eq!(
        res.get_header("Access-Control-Allow-Methods"),
        Some("GET, POST, OPTIONS")
    );
    assert_eq!(res.get_header("Access-Control-Max-Age"), Some("600"));
}

#[test]
fn test_configured_static_middleware() {
    let config = CorsFileConfig::from_yaml_str(PET_STORE_CONFIG).unwrap();
    let mut dispatcher = Dispatcher::new();
    if let Some(mw) = config.static_middleware() {
        dispatcher.add_middleware(Arc::new(mw));
    }
    dispatcher.register_handler("static", |_req, _res| {});

    let res = dispatcher.dispatch(&origin_request(Method::GET, "/assets/app.css", "static", None));
    assert_eq!(res.get_header("Access-Control-Allow-Origin"), Some("*"));
}
