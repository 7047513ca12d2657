use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    client::{NotionApi, QueryRequest},
    config::Credentials,
    error::CountError,
    filter::FilterSpec,
    schema::{Database, SchemaReport},
    strategy::{detect, Strategy, DEFAULT_NEEDLE},
};

pub const PAGE_SIZE: u32 = 100;

/// Result of a successful count. The `used_*` fields are only filled in when
/// the filter was auto-detected.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CountReport {
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_option: Option<String>,
}

impl CountReport {
    fn bare(count: u64) -> Self {
        Self {
            count,
            used_property: None,
            used_type: None,
            used_option: None,
        }
    }

    fn detected(count: u64, filter: &FilterSpec) -> Self {
        Self {
            count,
            used_property: Some(filter.property().to_string()),
            used_type: Some(filter.property_type().to_string()),
            used_option: filter.option().map(String::from),
        }
    }
}

#[derive(Clone)]
pub struct Counter {
    api: Arc<dyn NotionApi>,
    credentials: Credentials,
    strategy: Strategy,
}

impl Counter {
    pub fn new(api: Arc<dyn NotionApi>, credentials: Credentials, strategy: Strategy) -> Self {
        Self {
            api,
            credentials,
            strategy,
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Schema overview for choosing a property by hand. Never queries records.
    pub async fn inspect(&self) -> Result<SchemaReport, CountError> {
        self.require_credentials()?;
        Ok(self.fetch_schema().await?.into_report())
    }

    pub async fn count(&self) -> Result<CountReport, CountError> {
        self.require_credentials()?;

        let (filter, detected) = match self.strategy.static_filter() {
            Some(filter) => (filter, false),
            None => (self.detect_filter().await?, true),
        };

        let count = self.count_matching(&filter).await?;

        Ok(if detected {
            CountReport::detected(count, &filter)
        } else {
            CountReport::bare(count)
        })
    }

    fn require_credentials(&self) -> Result<(), CountError> {
        if self.credentials.is_complete() {
            Ok(())
        } else {
            Err(CountError::MissingEnv)
        }
    }

    async fn detect_filter(&self) -> Result<FilterSpec, CountError> {
        let needle = self.strategy.needle().unwrap_or(DEFAULT_NEEDLE);
        let database = self.fetch_schema().await?;

        detect(&database, needle).ok_or_else(|| {
            warn!(needle, "no option-bearing property matched");
            CountError::Detection {
                needle: needle.to_string(),
            }
        })
    }

    async fn fetch_schema(&self) -> Result<Database, CountError> {
        self.api
            .retrieve_database(&self.credentials)
            .await
            .map_err(|err| {
                warn!(error = %err, "schema fetch failed");
                CountError::from_schema(err)
            })
    }

    /// Walks every page of the query, strictly one after another.
    async fn count_matching(&self, filter: &FilterSpec) -> Result<u64, CountError> {
        let mut count: u64 = 0;
        let mut pages: u32 = 0;
        let mut cursor: Option<String> = None;

        loop {
            let request = QueryRequest {
                page_size: PAGE_SIZE,
                filter,
                start_cursor: cursor.as_deref(),
            };

            let page = self
                .api
                .query_database(&self.credentials, &request)
                .await
                .map_err(|err| {
                    warn!(error = %err, pages, "database query failed");
                    CountError::from_query(err, filter)
                })?;

            pages += 1;
            count += page.results.len() as u64;
            debug!(page = pages, results = page.results.len(), has_more = page.has_more, "counted page");

            // has_more without a cursor cannot advance
            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        info!(count, pages, property = filter.property(), "count finished");
        Ok(count)
    }
}
