#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use count_core::{
    Counter, Credentials, Database, NotionApi, NotionError, QueryPage, QueryRequest, Strategy,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

type Scripted = Result<Value, (u16, Value)>;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub page_size: u32,
    pub filter: Value,
    pub start_cursor: Option<String>,
}

#[derive(Default)]
struct FakeNotionState {
    schema: Option<Scripted>,
    pages: VecDeque<Scripted>,
    schema_calls: usize,
    queries: Vec<RecordedQuery>,
}

/// Scripted stand-in for the Notion API that records every call.
#[derive(Default)]
pub struct FakeNotion {
    state: Mutex<FakeNotionState>,
}

impl FakeNotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(self, schema: Value) -> Self {
        self.state.lock().expect("mutex poisoned").schema = Some(Ok(schema));
        self
    }

    pub fn with_failing_schema(self, status: u16, body: Value) -> Self {
        self.state.lock().expect("mutex poisoned").schema = Some(Err((status, body)));
        self
    }

    /// A page of `results` records; `has_more` is set when a cursor is given.
    pub fn with_page(self, results: usize, next_cursor: Option<&str>) -> Self {
        self.with_raw_page(page(results, next_cursor))
    }

    pub fn with_raw_page(self, page: Value) -> Self {
        self.state.lock().expect("mutex poisoned").pages.push_back(Ok(page));
        self
    }

    pub fn with_failing_page(self, status: u16, body: Value) -> Self {
        self.state
            .lock()
            .expect("mutex poisoned")
            .pages
            .push_back(Err((status, body)));
        self
    }

    pub fn schema_calls(&self) -> usize {
        self.state.lock().expect("mutex poisoned").schema_calls
    }

    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.state.lock().expect("mutex poisoned").queries.clone()
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.queries().into_iter().map(|q| q.start_cursor).collect()
    }
}

fn status_error(status: u16, body: Value) -> NotionError {
    NotionError::Status {
        status: StatusCode::from_u16(status).expect("valid status"),
        body,
    }
}

#[async_trait]
impl NotionApi for FakeNotion {
    async fn retrieve_database(&self, _credentials: &Credentials) -> Result<Database, NotionError> {
        let scripted = {
            let mut state = self.state.lock().expect("mutex poisoned");
            state.schema_calls += 1;
            state.schema.clone().expect("schema fetch was not scripted")
        };

        match scripted {
            Ok(schema) => Ok(serde_json::from_value(schema)?),
            Err((status, body)) => Err(status_error(status, body)),
        }
    }

    async fn query_database(
        &self,
        _credentials: &Credentials,
        request: &QueryRequest<'_>,
    ) -> Result<QueryPage, NotionError> {
        let scripted = {
            let mut state = self.state.lock().expect("mutex poisoned");
            state.queries.push(RecordedQuery {
                page_size: request.page_size,
                filter: serde_json::to_value(request.filter).expect("filter serializes"),
                start_cursor: request.start_cursor.map(String::from),
            });
            state.pages.pop_front().expect("no more pages scripted")
        };

        match scripted {
            Ok(page) => Ok(serde_json::from_value(page)?),
            Err((status, body)) => Err(status_error(status, body)),
        }
    }
}

pub fn page(results: usize, next_cursor: Option<&str>) -> Value {
    let results: Vec<Value> = (0..results)
        .map(|i| json!({ "object": "page", "id": format!("page-{i}") }))
        .collect();
    json!({
        "object": "list",
        "results": results,
        "has_more": next_cursor.is_some(),
        "next_cursor": next_cursor,
    })
}

/// Schema with a `Status` status property holding Reading/Finished/Dropped.
pub fn library_schema() -> Value {
    json!({
        "object": "database",
        "title": [{ "type": "text", "plain_text": "Reading list" }],
        "properties": {
            "Name": { "id": "title", "type": "title", "title": {} },
            "Author": { "id": "a1", "type": "rich_text", "rich_text": {} },
            "Status": {
                "id": "s1",
                "type": "status",
                "status": {
                    "options": [
                        { "id": "o1", "name": "Reading", "color": "blue" },
                        { "id": "o2", "name": "Finished", "color": "green" },
                        { "id": "o3", "name": "Dropped", "color": "red" }
                    ],
                    "groups": []
                }
            }
        }
    })
}

pub fn credentials() -> Credentials {
    Credentials::new("secret_test", "db-1")
}

pub fn counter(fake: &Arc<FakeNotion>, strategy: Strategy) -> Counter {
    Counter::new(fake.clone(), credentials(), strategy)
}
