use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{config::Credentials, error::NotionError, filter::FilterSpec, schema::Database};

pub const NOTION_VERSION: &str = "2022-06-28";

/// Body of `POST /databases/{id}/query`.
#[derive(Serialize, Debug, Clone)]
pub struct QueryRequest<'a> {
    pub page_size: u32,
    pub filter: &'a FilterSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<&'a str>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct QueryPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

// `null` reads the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The two Notion calls the counter needs.
#[async_trait]
pub trait NotionApi: Send + Sync {
    async fn retrieve_database(&self, credentials: &Credentials) -> Result<Database, NotionError>;

    async fn query_database(
        &self,
        credentials: &Credentials,
        request: &QueryRequest<'_>,
    ) -> Result<QueryPage, NotionError>;
}

#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    base_url: Arc<String>,
}

impl NotionClient {
    pub fn new_w_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: Arc::new(base_url.trim_end_matches('/').to_string()),
        }
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self::new_w_client(reqwest::Client::new(), base_url)
    }

    fn database_url(&self, credentials: &Credentials) -> String {
        format!("{}/databases/{}", self.base_url, credentials.database_id())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        credentials: &Credentials,
    ) -> Result<T, NotionError> {
        let res = request
            .bearer_auth(credentials.token())
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Err(NotionError::Status { status, body });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn retrieve_database(&self, credentials: &Credentials) -> Result<Database, NotionError> {
        let request = self
            .client
            .get(self.database_url(credentials))
            .header(header::CONTENT_TYPE, "application/json");
        self.send(request, credentials).await
    }

    async fn query_database(
        &self,
        credentials: &Credentials,
        request: &QueryRequest<'_>,
    ) -> Result<QueryPage, NotionError> {
        let url = format!("{}/query", self.database_url(credentials));
        let request = self.client.post(url).json(request);
        self.send(request, credentials).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_results_and_has_more_read_as_empty() {
        let page: QueryPage = serde_json::from_value(json!({
            "results": null,
            "has_more": null,
            "next_cursor": null
        }))
        .unwrap();

        assert!(page.results.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn missing_fields_read_as_empty() {
        let page: QueryPage = serde_json::from_value(json!({ "object": "list" })).unwrap();

        assert!(page.results.is_empty());
        assert!(!page.has_more);
    }
}
