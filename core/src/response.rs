use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::{
    client::{NotionApi, NotionClient},
    config::{CachePolicy, Settings},
    counter::Counter,
    error::CountError,
};

pub const DETECTION_FIX: &str =
    "Open /api/count?debug=1 to list the properties, then set COUNT_MODE=options with COUNT_PROPERTY and COUNT_OPTIONS.";

/// A host-independent HTTP reply: status, optional `Cache-Control`, JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub cache_control: Option<String>,
    pub body: Value,
}

impl ApiResponse {
    fn ok<T: Serialize>(payload: &T, cache_control: Option<String>) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self {
                status: StatusCode::OK,
                cache_control,
                body,
            },
            Err(e) => CountError::Decode(e).into(),
        }
    }

    fn error(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            cache_control: None,
            body,
        }
    }
}

impl From<CountError> for ApiResponse {
    fn from(err: CountError) -> Self {
        let message = err.to_string();

        match err {
            CountError::MissingEnv => {
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
            CountError::SchemaFetch { status, details } => {
                Self::error(status, json!({ "error": message, "details": details }))
            }
            CountError::Query {
                status,
                details,
                filter,
            } => Self::error(
                status,
                json!({
                    "error": message,
                    "used_property": filter.property(),
                    "used_type": filter.property_type(),
                    "used_filter": filter,
                    "details": details,
                }),
            ),
            CountError::Detection { .. } => Self::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message, "fix": DETECTION_FIX }),
            ),
            CountError::Transport(_) | CountError::Decode(_) => {
                error!(error = %message, "count failed unexpectedly");
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        }
    }
}

/// Query-string truthiness for `?debug`: any non-empty value, so `?debug=0`
/// still turns it on.
pub fn is_truthy(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// The `/api/count` endpoint shared by every host.
#[derive(Clone)]
pub struct CountEndpoint {
    counter: Counter,
    cache: CachePolicy,
}

impl CountEndpoint {
    pub fn new(counter: Counter, cache: CachePolicy) -> Self {
        Self { counter, cache }
    }

    pub fn from_settings(settings: Settings) -> Self {
        let api: Arc<dyn NotionApi> = Arc::new(NotionClient::new(settings.api_url));
        Self::new(
            Counter::new(api, settings.credentials, settings.strategy),
            settings.cache,
        )
    }

    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    pub async fn handle(&self, debug: bool) -> ApiResponse {
        if debug {
            return match self.counter.inspect().await {
                Ok(report) => ApiResponse::ok(&report, None),
                Err(e) => e.into(),
            };
        }

        match self.counter.count().await {
            Ok(report) => ApiResponse::ok(&report, Some(self.cache.header_value())),
            Err(e) => e.into(),
        }
    }
}
