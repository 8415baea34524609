//! Request routing for the parse service.
//!
//! [`ParseService::handle`] is a pure function of the configuration and one
//! request, so routing is tested without a socket. Every request gets its own
//! tokenizer and parser.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::http::{HttpRequest, HttpResponse};

/// Body of a parse request.
#[derive(Debug, Deserialize)]
struct ParseRequest {
    #[serde(default)]
    sql: Option<String>,
}

/// Turns HTTP requests into parse results.
#[derive(Debug, Clone)]
pub struct ParseService {
    config: Arc<ServerConfig>,
}

impl ParseService {
    /// Creates a service for the given configuration.
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self { config }
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Routes one request. Every response carries the CORS headers.
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let response = if request.method == "OPTIONS" {
            HttpResponse::new(200)
        } else if request.path != self.config.parse_path {
            HttpResponse::error(404, format!("Not found: {}", request.path))
        } else if request.method == "POST" {
            self.parse(&request.body)
        } else {
            HttpResponse::error(405, format!("Method not allowed: {}", request.method))
                .with_header("Allow", "POST, OPTIONS")
        };

        debug!(
            "{} {} -> {}",
            request.method,
            request.path,
            response.status()
        );
        response.with_cors(&self.config.allow_origin)
    }

    /// Response for a request that could not be read, if one can be sent.
    pub fn reject(&self, err: &ServerError) -> Option<HttpResponse> {
        let status = err.status()?;
        Some(HttpResponse::error(status, err.to_string()).with_cors(&self.config.allow_origin))
    }

    fn parse(&self, body: &[u8]) -> HttpResponse {
        let request: ParseRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => return HttpResponse::error(400, format!("Invalid JSON: {}", e)),
        };

        let Some(sql) = request.sql.filter(|sql| !sql.is_empty()) else {
            return HttpResponse::error(400, "No SQL provided");
        };

        let tree = sqlscope_sql::parse(&sql);
        let json = if self.config.pretty_json {
            tree.to_json_pretty()
        } else {
            tree.to_json()
        };

        match json {
            Ok(json) => HttpResponse::json(200, json),
            Err(e) => {
                error!("Failed to serialize parse result: {}", e);
                HttpResponse::error(500, format!("Parse error: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn service() -> ParseService {
        ParseService::new(Arc::new(ServerConfig::default()))
    }

    fn post(body: impl Into<bytes::Bytes>) -> HttpRequest {
        HttpRequest::new("POST", "/parse-sql")
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    fn body_json(response: &HttpResponse) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_parse_request() {
        let response = service().handle(&post(r#"{"sql": "SELECT * FROM users"}"#));
        assert_eq!(response.status(), 200);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));

        let tree = body_json(&response);
        assert_eq!(tree["type"], "query_analysis");
        assert_eq!(tree["children"][1]["children"][0]["type"], "table_scan");
    }

    #[test]
    fn test_pretty_and_compact_output() {
        let pretty = service().handle(&post(r#"{"sql": "SELECT 1"}"#));
        assert!(pretty.body().contains(&b'\n'));

        let compact = ParseService::new(Arc::new(
            ServerConfig::builder().pretty_json(false).build(),
        ))
        .handle(&post(r#"{"sql": "SELECT 1"}"#));
        assert!(!compact.body().contains(&b'\n'));
        assert_eq!(body_json(&pretty), body_json(&compact));
    }

    #[test]
    fn test_parse_failure_is_still_200() {
        let response = service().handle(&post(r#"{"sql": "SELECT a FROM t WHERE a IS 5"}"#));
        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["type"], "error");

        let deep = format!("SELECT {}", "COUNT(".repeat(50_000));
        let body = serde_json::json!({ "sql": deep }).to_string();
        let response = service().handle(&post(body));
        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["type"], "error");
    }

    #[test]
    fn test_missing_or_empty_sql() {
        for body in [r#"{}"#, r#"{"sql": ""}"#, r#"{"sql": null}"#] {
            let response = service().handle(&post(body));
            assert_eq!(response.status(), 400, "{}", body);
            assert_eq!(body_json(&response)["error"], "No SQL provided");
            assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        }
    }

    #[test]
    fn test_invalid_json() {
        for body in ["", "not json", r#"{"sql": 5}"#] {
            let response = service().handle(&post(body));
            assert_eq!(response.status(), 400, "{}", body);
            let error = body_json(&response)["error"].as_str().unwrap().to_string();
            assert!(error.starts_with("Invalid JSON"), "{}", error);
        }
    }

    #[test]
    fn test_options_preflight() {
        for path in ["/parse-sql", "/anything"] {
            let response = service().handle(&HttpRequest::new("OPTIONS", path));
            assert_eq!(response.status(), 200);
            assert!(response.body().is_empty());
            assert_eq!(
                response.header("Access-Control-Allow-Methods"),
                Some("POST, OPTIONS")
            );
        }
    }

    #[test]
    fn test_not_found_and_method_not_allowed() {
        let response = service().handle(&HttpRequest::new("POST", "/other"));
        assert_eq!(response.status(), 404);

        let response = service().handle(&HttpRequest::new("GET", "/parse-sql"));
        assert_eq!(response.status(), 405);
        assert_eq!(response.header("Allow"), Some("POST, OPTIONS"));
    }

    #[test]
    fn test_custom_path_and_origin() {
        let config = ServerConfig::builder()
            .parse_path("/api/parse")
            .allow_origin("https://app.example")
            .build();
        let service = ParseService::new(Arc::new(config));

        let request = HttpRequest::new("POST", "/api/parse").with_body(r#"{"sql": "SELECT 1"}"#);
        let response = service.handle(&request);
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.header("Access-Control-Allow-Origin"),
            Some("https://app.example")
        );

        let response = service.handle(&post(r#"{"sql": "SELECT 1"}"#));
        assert_eq!(response.status(), 404);
    }

    #[test]
    fn test_reject() {
        let response = service()
            .reject(&ServerError::BodyTooLarge {
                length: 10,
                limit: 1,
            })
            .unwrap();
        assert_eq!(response.status(), 413);
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));

        assert!(service().reject(&ServerError::ConnectionClosed).is_none());
    }
}
