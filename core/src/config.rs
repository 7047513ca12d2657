use std::{fmt, sync::Arc};

use crate::strategy::{Strategy, DEFAULT_NEEDLE};

pub const DEFAULT_API_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_PROPERTY: &str = "Status";

/// Token and database id used for every Notion call.
///
/// Either may be empty; the counter refuses to run without both.
#[derive(Clone, Default)]
pub struct Credentials {
    token: Arc<String>,
    database_id: Arc<String>,
}

impl Credentials {
    pub fn new(token: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            token: Arc::new(token.into()),
            database_id: Arc::new(database_id.into()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn is_complete(&self) -> bool {
        !self.token.trim().is_empty() && !self.database_id.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("database_id", &self.database_id)
            .finish()
    }
}

/// Freshness hint attached to successful counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_age: u32,
    pub stale_while_revalidate: u32,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_age: 300,
            stale_while_revalidate: 600,
        }
    }
}

impl CachePolicy {
    pub fn header_value(&self) -> String {
        format!(
            "s-maxage={}, stale-while-revalidate={}",
            self.max_age, self.stale_while_revalidate
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown COUNT_MODE {0:?}, expected auto, options or prefix")]
    UnknownMode(String),
    #[error("COUNT_MODE=options needs at least one value in COUNT_OPTIONS")]
    MissingOptions,
    #[error("COUNT_MODE=prefix needs COUNT_PREFIX")]
    MissingPrefix,
    #[error("{var} must be a number of seconds, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub api_url: String,
    pub strategy: Strategy,
    pub cache: CachePolicy,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let credentials = Credentials::new(
            var("NOTION_TOKEN").unwrap_or_default(),
            var("NOTION_DATABASE_ID").unwrap_or_default(),
        );
        let api_url = var("NOTION_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let property = var("COUNT_PROPERTY").unwrap_or_else(|| DEFAULT_PROPERTY.to_string());

        let strategy = match var("COUNT_MODE").as_deref().unwrap_or("auto") {
            "auto" => Strategy::AutoDetect {
                needle: var("COUNT_MATCH").unwrap_or_else(|| DEFAULT_NEEDLE.to_string()),
            },
            "options" => {
                // no escaping: a literal containing ',' can't be expressed here
                let options: Vec<String> = var("COUNT_OPTIONS")
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect();
                if options.is_empty() {
                    return Err(SettingsError::MissingOptions);
                }
                Strategy::AnyOption { property, options }
            }
            "prefix" => Strategy::Prefix {
                property,
                prefix: var("COUNT_PREFIX").ok_or(SettingsError::MissingPrefix)?,
            },
            other => return Err(SettingsError::UnknownMode(other.to_string())),
        };

        let seconds = |key: &'static str, default: u32| match var(key) {
            Some(value) => value.parse().map_err(|_| SettingsError::InvalidNumber { var: key, value }),
            None => Ok(default),
        };
        let defaults = CachePolicy::default();
        let cache = CachePolicy {
            max_age: seconds("COUNT_CACHE_MAX_AGE", defaults.max_age)?,
            stale_while_revalidate: seconds("COUNT_CACHE_SWR", defaults.stale_while_revalidate)?,
        };

        Ok(Self {
            credentials,
            api_url,
            strategy,
            cache,
        })
    }
}
