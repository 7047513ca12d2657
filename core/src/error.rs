use reqwest::StatusCode;
use serde_json::Value;

use crate::{filter::FilterSpec, strategy::DEFAULT_NEEDLE};

/// Failures talking to the Notion API.
#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    #[error("notion responded with {status}")]
    Status { status: StatusCode, body: Value },
    #[error("notion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

/// Everything that can stop a count. Nothing is partially reported.
#[derive(Debug, thiserror::Error)]
pub enum CountError {
    #[error("Missing Notion env vars")]
    MissingEnv,
    #[error("Failed to fetch database schema")]
    SchemaFetch { status: StatusCode, details: Value },
    #[error("Database query failed")]
    Query {
        status: StatusCode,
        details: Value,
        filter: FilterSpec,
    },
    #[error(
        "Could not auto-detect a Status/Select property with a '{}' option.",
        shown_needle(.needle)
    )]
    Detection { needle: String },
    #[error("{0}")]
    Transport(reqwest::Error),
    #[error(transparent)]
    Decode(serde_json::Error),
}

fn shown_needle(needle: &str) -> &str {
    if needle.eq_ignore_ascii_case(DEFAULT_NEEDLE) {
        "Finished"
    } else {
        needle
    }
}

impl CountError {
    pub(crate) fn from_schema(err: NotionError) -> Self {
        match err {
            NotionError::Status { status, body } => Self::SchemaFetch {
                status,
                details: body,
            },
            NotionError::Request(e) => Self::Transport(e),
            NotionError::Decode(e) => Self::Decode(e),
        }
    }

    pub(crate) fn from_query(err: NotionError, filter: &FilterSpec) -> Self {
        match err {
            NotionError::Status { status, body } => Self::Query {
                status,
                details: body,
                filter: filter.clone(),
            },
            NotionError::Request(e) => Self::Transport(e),
            NotionError::Decode(e) => Self::Decode(e),
        }
    }
}
