//! Counts the finished records of a Notion database.
//!
//! A [`Counter`] builds a filter from its [`Strategy`], then pages through the
//! database query endpoint and sums the results. [`CountEndpoint`] wraps it
//! into the JSON replies served by the HTTP hosts.

pub mod client;
pub mod config;
pub mod counter;
pub mod error;
pub mod filter;
pub mod response;
pub mod schema;
pub mod strategy;

pub use client::{NotionApi, NotionClient, QueryPage, QueryRequest, NOTION_VERSION};
pub use config::{CachePolicy, Credentials, Settings, SettingsError};
pub use counter::{CountReport, Counter, PAGE_SIZE};
pub use error::{CountError, NotionError};
pub use filter::FilterSpec;
pub use response::{is_truthy, ApiResponse, CountEndpoint};
pub use schema::{Database, OptionKind, Property, SchemaReport};
pub use strategy::{detect, Strategy};
