use count_core::{is_truthy, ApiResponse, CountEndpoint, Settings};
use lambda_http::{run, service_fn, tracing, Body, Error, Request, RequestExt, Response};

async fn function_handler(endpoint: &CountEndpoint, event: Request) -> Result<Response<Body>, Error> {
    let debug = is_truthy(event.query_string_parameters_ref().and_then(|q| q.first("debug")));

    into_response(endpoint.handle(debug).await)
}

fn into_response(reply: ApiResponse) -> Result<Response<Body>, Error> {
    let body = serde_json::to_string(&reply.body)?;

    let mut builder = Response::builder()
        .status(reply.status)
        .header("content-type", "application/json");
    if let Some(cache_control) = reply.cache_control {
        builder = builder.header("cache-control", cache_control);
    }

    Ok(builder.body(body.into())?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    dotenvy::dotenv().ok();

    let endpoint = CountEndpoint::from_settings(Settings::from_env()?);
    let endpoint = &endpoint;

    run(service_fn(move |event: Request| async move {
        function_handler(endpoint, event).await
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http::StatusCode;
    use serde_json::json;

    #[test]
    fn cache_control_reaches_the_response() {
        let response = into_response(ApiResponse {
            status: StatusCode::OK,
            cache_control: Some("s-maxage=300, stale-while-revalidate=600".to_string()),
            body: json!({ "count": 5 }),
        })
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("cache-control").unwrap(),
            "s-maxage=300, stale-while-revalidate=600"
        );
        assert_eq!(response.headers().get("content-type").unwrap(), "application/json");
        match response.body() {
            Body::Text(text) => assert_eq!(text, r#"{"count":5}"#),
            other => panic!("expected a text body, got {other:?}"),
        }
    }

    #[test]
    fn error_reply_keeps_status_without_cache_header() {
        let response = into_response(ApiResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            cache_control: None,
            body: json!({ "error": "Missing Notion env vars" }),
        })
        .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get("cache-control").is_none());
    }
}
