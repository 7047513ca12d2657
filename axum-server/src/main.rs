use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::Query,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use count_core::{is_truthy, ApiResponse, CountEndpoint, Settings};
use dotenvy::dotenv;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    let endpoint = Arc::new(CountEndpoint::from_settings(settings));
    info!(strategy = ?endpoint.counter().strategy(), "counter configured");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/api/count", get(get_count))
        .layer(cors)
        .layer(Extension(endpoint));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}

async fn get_count(
    Extension(endpoint): Extension<Arc<CountEndpoint>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiReply {
    let debug = is_truthy(params.get("debug").map(String::as_str));
    ApiReply(endpoint.handle(debug).await)
}

pub struct ApiReply(pub ApiResponse);

impl IntoResponse for ApiReply {
    fn into_response(self) -> Response {
        let ApiResponse {
            status,
            cache_control,
            body,
        } = self.0;

        let mut response = (status, Json(body)).into_response();
        if let Some(value) = cache_control.and_then(|v| HeaderValue::from_str(&v).ok()) {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn cache_control_reaches_the_response() {
        let reply = ApiReply(ApiResponse {
            status: StatusCode::OK,
            cache_control: Some("s-maxage=300, stale-while-revalidate=600".to_string()),
            body: json!({ "count": 137 }),
        });

        let response = reply.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "s-maxage=300, stale-while-revalidate=600"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn error_reply_keeps_status_without_cache_header() {
        let reply = ApiReply(ApiResponse {
            status: StatusCode::BAD_GATEWAY,
            cache_control: None,
            body: json!({ "error": "Database query failed" }),
        });

        let response = reply.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }
}
