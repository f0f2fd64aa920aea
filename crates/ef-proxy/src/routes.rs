//! HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ef_gateway::{ChatCompletionRequest, ChatCompletionResponse, ErrorBody, GatewayError, ModelGateway};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::{ProxyConfig, CHAT_ROUTE, DEFAULT_ALLOWED_MODELS};

/// Shared handler state.
pub struct ProxyState {
    gateway: ModelGateway,
    allowed_models: Vec<String>,
}

impl ProxyState {
    pub fn new(gateway: ModelGateway, allowed_models: Vec<String>) -> Self {
        Self {
            gateway,
            allowed_models,
        }
    }

    /// Build the upstream gateway from config.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, GatewayError> {
        let gateway = ModelGateway::from_config(&config.gateway)?;
        if !gateway.is_configured() {
            return Err(GatewayError::Configuration(
                "OPENAI_API_KEY must be set for the proxy".to_string(),
            ));
        }
        Ok(Self::new(gateway, config.allowed_models.clone()))
    }

    /// State with the default model allowlist.
    pub fn with_default_models(gateway: ModelGateway) -> Self {
        Self::new(
            gateway,
            DEFAULT_ALLOWED_MODELS.iter().map(|m| m.to_string()).collect(),
        )
    }

    fn allows(&self, model: &str) -> bool {
        self.allowed_models.iter().any(|m| m == model)
    }
}

/// Build the proxy router.
pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route(CHAT_ROUTE, post(chat))
        .route("/health", get(health_check))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

async fn health_check(State(state): State<Arc<ProxyState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "strategy": state.gateway.strategy_name(),
    }))
}

async fn chat(State(state): State<Arc<ProxyState>>, body: Bytes) -> Response {
    let request: ChatCompletionRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
        }
    };

    if !state.allows(&request.model) {
        warn!(model = %request.model, "model not allowed");
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Model '{}' is not allowed", request.model),
        );
    }

    let start = Instant::now();
    let model = request.model.clone();
    match state
        .gateway
        .call(request.messages, &request.model, request.temperature)
        .await
    {
        Ok(text) => {
            info!(
                %model,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "relayed chat completion"
            );
            Json(ChatCompletionResponse::from_text(model, text)).into_response()
        }
        Err(e) => {
            warn!(%model, kind = e.kind().name(), error = %e, "relay failed");
            gateway_error_response(&e)
        }
    }
}

/// HTTP status the proxy answers with for a gateway failure.
///
/// Upstream auth failures surface as 502: a 401 would read as the client's
/// own credentials being wrong.
#[must_use]
pub fn status_for(error: &GatewayError) -> StatusCode {
    match error {
        GatewayError::Provider { status: 429, .. } => StatusCode::TOO_MANY_REQUESTS,
        GatewayError::Auth { .. } | GatewayError::Provider { .. } | GatewayError::Network(_) => {
            StatusCode::BAD_GATEWAY
        }
        GatewayError::Cancelled { .. } => StatusCode::GATEWAY_TIMEOUT,
        GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        GatewayError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn gateway_error_response(error: &GatewayError) -> Response {
    let message = match error {
        GatewayError::Auth { message, .. } | GatewayError::Provider { message, .. } => {
            message.clone()
        }
        other => other.to_string(),
    };
    error_response(status_for(error), message)
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use ef_gateway::{ChatRequest, DispatchStrategy};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Answers every call with a fixed result.
    struct Fixed(Result<String, GatewayError>);

    #[async_trait]
    impl DispatchStrategy for Fixed {
        async fn dispatch(&self, _request: &ChatRequest) -> Result<String, GatewayError> {
            self.0.clone()
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn app(result: Result<&str, GatewayError>) -> Router {
        let strategy = Arc::new(Fixed(result.map(str::to_string)));
        let gateway = ModelGateway::with_strategy(strategy, Duration::from_secs(5));
        router(Arc::new(ProxyState::with_default_models(gateway)))
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(CHAT_ROUTE)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn valid_body() -> serde_json::Value {
        serde_json::json!({
            "messages": [
                {"role": "system", "content": "You are an expert educator."},
                {"role": "user", "content": "Create a lesson plan for: Photosynthesis"}
            ],
            "model": "gpt-4o-mini",
            "temperature": 0.7
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_success_uses_provider_shape() {
        let (status, body) = send(app(Ok("<h1>Lesson</h1>")), chat_request(valid_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["choices"][0]["message"]["content"], "<h1>Lesson</h1>");
    }

    #[tokio::test]
    async fn test_disallowed_model_rejected() {
        let mut body = valid_body();
        body["model"] = "gpt-4-32k".into();
        let (status, body) = send(app(Ok("x")), chat_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("gpt-4-32k"));
    }

    #[tokio::test]
    async fn test_temperature_out_of_range_rejected() {
        let mut body = valid_body();
        body["temperature"] = 1.5.into();
        let (status, body) = send(app(Ok("x")), chat_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Temperature"));
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri(CHAT_ROUTE)
            .body(Body::from("not json"))
            .unwrap();
        let (status, body) = send(app(Ok("x")), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let cases = [
            (
                GatewayError::Provider { status: 429, message: "rate limited".to_string() },
                StatusCode::TOO_MANY_REQUESTS,
                "rate limited",
            ),
            (
                GatewayError::Provider { status: 500, message: "upstream error".to_string() },
                StatusCode::BAD_GATEWAY,
                "upstream error",
            ),
            (
                GatewayError::Auth { status: 401, message: "invalid api key".to_string() },
                StatusCode::BAD_GATEWAY,
                "invalid api key",
            ),
            (
                GatewayError::Network("connection reset".to_string()),
                StatusCode::BAD_GATEWAY,
                "connection reset",
            ),
            (
                GatewayError::Cancelled { after: Duration::from_secs(60) },
                StatusCode::GATEWAY_TIMEOUT,
                "cancelled",
            ),
        ];

        for (error, expected_status, fragment) in cases {
            let (status, body) = send(app(Err(error)), chat_request(valid_body())).await;
            assert_eq!(status, expected_status);
            assert!(
                body["error"].as_str().unwrap().contains(fragment),
                "{} missing from {}",
                fragment,
                body
            );
        }
    }

    #[test]
    fn test_status_for_configuration() {
        assert_eq!(
            status_for(&GatewayError::Configuration("missing".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&GatewayError::InvalidRequest("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(Ok("x")), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["strategy"], "fixed");
    }
}
