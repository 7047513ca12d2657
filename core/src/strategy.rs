use crate::{filter::FilterSpec, schema::Database};

pub const DEFAULT_NEEDLE: &str = "finished";

/// How the counter decides which records are finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Look the property up in the database schema.
    AutoDetect { needle: String },
    /// A fixed `select` property equal to any of `options`.
    AnyOption { property: String, options: Vec<String> },
    /// A text property starting with `prefix`.
    Prefix { property: String, prefix: String },
}

impl Default for Strategy {
    fn default() -> Self {
        Self::AutoDetect {
            needle: DEFAULT_NEEDLE.to_string(),
        }
    }
}

impl Strategy {
    /// The option text auto-detection looks for.
    pub fn needle(&self) -> Option<&str> {
        match self {
            Self::AutoDetect { needle } => Some(needle),
            _ => None,
        }
    }

    /// The filter for strategies configured up front; `None` for auto-detection.
    pub fn static_filter(&self) -> Option<FilterSpec> {
        match self {
            Self::AutoDetect { .. } => None,
            Self::AnyOption { property, options } => Some(FilterSpec::AnySelect {
                property: property.clone(),
                options: options.clone(),
            }),
            Self::Prefix { property, prefix } => Some(FilterSpec::RichTextStartsWith {
                property: property.clone(),
                prefix: prefix.clone(),
            }),
        }
    }
}

/// First `status`/`select`/`multi_select` property, in declaration order, with
/// an option whose name contains `needle` ignoring case.
pub fn detect(database: &Database, needle: &str) -> Option<FilterSpec> {
    let needle = needle.to_lowercase();

    database.properties.iter().find_map(|property| {
        let kind = property.option_kind()?;
        let option = property
            .options
            .as_deref()?
            .iter()
            .find(|name| name.to_lowercase().contains(&needle))?;
        Some(FilterSpec::for_option(kind, property.name.as_str(), option.as_str()))
    })
}
